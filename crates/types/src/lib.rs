#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Shared types for fixity
//!
//! Wire types for the DDS REST surface (file versions, uploads, chunk
//! manifests, pre-signed download locations) plus the credential pair the
//! service authenticates software agents with. Response types ignore fields
//! the verifier does not consume.

use serde::{Deserialize, Deserializer, Serialize};

/// Agent credentials for token issuance
///
/// Supplied at construction and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub user_key: String,
    pub agent_key: String,
}

/// Payload of a successful `POST /software_agents/api_token`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiToken {
    pub api_token: String,
    /// Seconds the token stays valid, counted from issuance.
    pub time_to_live: i64,
}

/// Payload of `GET /file_versions/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct FileVersion {
    pub id: String,
    pub upload: UploadRef,
}

/// Embedded upload reference inside a file version
#[derive(Debug, Clone, Deserialize)]
pub struct UploadRef {
    pub id: String,
}

/// Payload of `GET /uploads/{id}`: the chunk manifest
#[derive(Debug, Clone, Deserialize)]
pub struct Upload {
    pub id: String,
    pub chunks: Vec<ChunkSummary>,
}

/// One chunk of an upload as declared by the manifest
///
/// Manifest order is not guaranteed ascending by `number`; consumers that
/// care about byte offsets must sort first.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkSummary {
    pub number: i64,
    #[serde(deserialize_with = "size_from_number_or_string")]
    pub size: u64,
    pub hash: ChunkHash,
}

/// Declared hash of one chunk
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkHash {
    pub value: String,
    #[serde(default)]
    pub algorithm: Option<String>,
}

/// Payload of `GET /file_versions/{id}/url`
///
/// Pre-signed and short-lived; must be fetched fresh before every chunk
/// download and never cached.
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadUrl {
    pub host: String,
    pub url: String,
}

impl DownloadUrl {
    /// The directly fetchable location: host and path concatenated.
    #[must_use]
    pub fn full_url(&self) -> String {
        format!("{}{}", self.host, self.url)
    }
}

/// Body of `PUT /uploads/{id}/hashes`
#[derive(Debug, Clone, Serialize)]
pub struct HashReport {
    pub value: String,
    pub algorithm: String,
}

impl HashReport {
    /// An MD5 report for a whole-file digest in hex.
    #[must_use]
    pub fn md5(value: String) -> Self {
        Self {
            value,
            algorithm: "md5".to_string(),
        }
    }
}

/// Error envelope the service attaches to failure responses, when it does
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<String>,
    pub reason: String,
    pub suggestion: String,
}

// Some manifests encode chunk sizes as strings. Accept both.
fn size_from_number_or_string<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_size_accepts_numbers_and_strings() {
        let numeric: ChunkSummary =
            serde_json::from_str(r#"{"number": 1, "size": 4, "hash": {"value": "aa"}}"#).unwrap();
        assert_eq!(numeric.size, 4);

        let stringy: ChunkSummary =
            serde_json::from_str(r#"{"number": 2, "size": "1048576", "hash": {"value": "bb"}}"#)
                .unwrap();
        assert_eq!(stringy.size, 1_048_576);
    }

    #[test]
    fn upload_manifest_ignores_unknown_fields() {
        let upload: Upload = serde_json::from_str(
            r#"{
                "id": "up-1",
                "name": "thing.bin",
                "status": {"initiated_on": "whenever"},
                "chunks": [
                    {"number": 2, "size": 3, "hash": {"value": "cc", "algorithm": "md5"}},
                    {"number": 1, "size": 4, "hash": {"value": "dd"}}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(upload.chunks.len(), 2);
        // manifest order preserved as received; ordering is the verifier's job
        assert_eq!(upload.chunks[0].number, 2);
        assert_eq!(upload.chunks[1].hash.algorithm, None);
    }

    #[test]
    fn download_url_concatenates_host_and_path() {
        let url: DownloadUrl = serde_json::from_str(
            r#"{"host": "https://swift.example.com", "url": "/v1/c/o?temp_url_sig=abc"}"#,
        )
        .unwrap();
        assert_eq!(
            url.full_url(),
            "https://swift.example.com/v1/c/o?temp_url_sig=abc"
        );
    }

    #[test]
    fn error_envelope_requires_reason_and_suggestion() {
        let ok: Result<ErrorEnvelope, _> =
            serde_json::from_str(r#"{"error": "404", "reason": "not found", "suggestion": "check the id"}"#);
        assert!(ok.is_ok());

        let missing: Result<ErrorEnvelope, _> = serde_json::from_str(r#"{"error": "404"}"#);
        assert!(missing.is_err());
    }
}
