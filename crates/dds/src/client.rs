//! Typed client for the DDS REST surface

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, RANGE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use fixity_errors::{ApiError, Error, Result};
use fixity_types::{Credentials, DownloadUrl, ErrorEnvelope, FileVersion, HashReport, Upload};

use crate::token::TokenCache;

/// The closed set of verbs the DDS surface needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
}

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // large chunks over slow object storage
            connect_timeout: Duration::from_secs(30),
            user_agent: format!("fixity/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Authenticated DDS API client
///
/// Requests with default headers carry `Authorization` (from the token
/// cache) plus JSON content/accept headers. Call sites that supply their
/// own headers, like the ranged chunk download, get exactly those headers
/// and no implicit Authorization.
pub struct ApiClient {
    http: Client,
    base: Url,
    tokens: TokenCache,
}

impl ApiClient {
    /// Create a client for one API base URL
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base: Url, credentials: Credentials, config: &HttpConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::from(ApiError::transport(e)))?;

        Ok(Self {
            http,
            base,
            tokens: TokenCache::new(credentials),
        })
    }

    /// Send one request and insist on the call site's expected status
    ///
    /// A response with any other status is never handed back as data; it is
    /// classified into an API error carrying `preamble` verbatim.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request cannot be sent, or a
    /// classified API error on an unexpected status.
    pub async fn send(
        &mut self,
        verb: Verb,
        url: &str,
        headers: Option<HeaderMap>,
        body: Option<String>,
        expected: StatusCode,
        preamble: &str,
    ) -> Result<Response> {
        debug!(?verb, url, %expected, "sending request");

        let mut request = match verb {
            Verb::Get => self.http.get(url),
            Verb::Post => self.http.post(url),
            Verb::Put => self.http.put(url),
        };

        request = match headers {
            Some(explicit) => request.headers(explicit),
            None => {
                let token = self.tokens.token(&self.http, &self.base).await?;
                let token = HeaderValue::from_str(&token).map_err(|e| ApiError::Decode {
                    message: format!("api_token is not a valid header value: {e}"),
                })?;
                request
                    .header(AUTHORIZATION, token)
                    .header(CONTENT_TYPE, "application/json")
                    .header(ACCEPT, "application/json")
            }
        };

        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(ApiError::transport)?;
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify(preamble, status, &body).into())
    }

    /// `GET /file_versions/{id}`
    ///
    /// # Errors
    ///
    /// Returns a classified API error on any non-200 response.
    pub async fn file_version(&mut self, id: &str) -> Result<FileVersion> {
        let url = self.endpoint(&format!("file_versions/{id}"));
        let response = self
            .send(
                Verb::Get,
                &url,
                None,
                None,
                StatusCode::OK,
                "unable to get file_version",
            )
            .await?;
        decode(response).await
    }

    /// `GET /file_versions/{id}/url`
    ///
    /// The result is pre-signed and short-lived; callers must fetch a fresh
    /// one before every chunk download and never cache it.
    ///
    /// # Errors
    ///
    /// Returns a classified API error on any non-200 response.
    pub async fn download_url(&mut self, id: &str) -> Result<DownloadUrl> {
        let url = self.endpoint(&format!("file_versions/{id}/url"));
        let response = self
            .send(
                Verb::Get,
                &url,
                None,
                None,
                StatusCode::OK,
                "unable to get download_url",
            )
            .await?;
        decode(response).await
    }

    /// `GET /uploads/{id}`
    ///
    /// # Errors
    ///
    /// Returns a classified API error on any non-200 response.
    pub async fn upload(&mut self, id: &str) -> Result<Upload> {
        let url = self.endpoint(&format!("uploads/{id}"));
        let response = self
            .send(
                Verb::Get,
                &url,
                None,
                None,
                StatusCode::OK,
                "unable to get upload",
            )
            .await?;
        decode(response).await
    }

    /// Ranged GET of one chunk's bytes from a pre-signed location
    ///
    /// Sends only the `Range` header: pre-signed URLs carry their own
    /// authorization and the storage backend rejects extra auth headers.
    ///
    /// # Errors
    ///
    /// Returns a classified API error on any status other than 206.
    pub async fn chunk(&mut self, url: &str, number: i64, start: u64, end: u64) -> Result<Vec<u8>> {
        let mut headers = HeaderMap::new();
        let range = HeaderValue::from_str(&format!("bytes={start}-{end}")).map_err(|e| {
            ApiError::Decode {
                message: format!("invalid range header: {e}"),
            }
        })?;
        headers.insert(RANGE, range);

        let preamble = format!("problem getting chunk {number} range {start}-{end}");
        let response = self
            .send(
                Verb::Get,
                url,
                Some(headers),
                None,
                StatusCode::PARTIAL_CONTENT,
                &preamble,
            )
            .await?;

        let bytes = response.bytes().await.map_err(|e| ApiError::Decode {
            message: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }

    /// `PUT /uploads/{id}/hashes` with the whole-file digest
    ///
    /// # Errors
    ///
    /// Returns a classified API error on any non-200 response.
    pub async fn report_hash(&mut self, upload_id: &str, report: &HashReport) -> Result<()> {
        let url = self.endpoint(&format!("uploads/{upload_id}/hashes"));
        let body = serde_json::to_string(report)?;
        self.send(
            Verb::Put,
            &url,
            None,
            Some(body),
            StatusCode::OK,
            "problem reporting md5",
        )
        .await?;
        Ok(())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base.as_str().trim_end_matches('/'))
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response.json().await.map_err(|e| {
        Error::from(ApiError::Decode {
            message: e.to_string(),
        })
    })
}

/// Turn an unexpected response into a classified error
///
/// When the body parses as the service's error envelope the detail is
/// `"<reason> <suggestion>"`; otherwise it is the raw status and body.
pub(crate) fn classify(preamble: &str, status: StatusCode, body: &str) -> ApiError {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{} {}", envelope.reason, envelope.suggestion),
        Err(_) => format!("{status} {body}").trim_end().to_string(),
    };
    ApiError::Classified {
        preamble: preamble.to_string(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_uses_reason_and_suggestion_when_present() {
        let err = classify(
            "unable to get file_version",
            StatusCode::NOT_FOUND,
            r#"{"error": "404", "reason": "file_version not found", "suggestion": "check the id"}"#,
        );
        assert_eq!(
            err.to_string(),
            "unable to get file_version: file_version not found check the id"
        );
    }

    #[test]
    fn classify_falls_back_to_raw_response() {
        let err = classify(
            "problem reporting md5",
            StatusCode::INTERNAL_SERVER_ERROR,
            "<html>oops</html>",
        );
        assert_eq!(
            err.to_string(),
            "problem reporting md5: 500 Internal Server Error <html>oops</html>"
        );
    }

    #[test]
    fn classify_ignores_envelopes_missing_fields() {
        let err = classify("unable to get upload", StatusCode::BAD_GATEWAY, r#"{"reason": "half"}"#);
        assert_eq!(
            err.to_string(),
            r#"unable to get upload: 502 Bad Gateway {"reason": "half"}"#
        );
    }
}
