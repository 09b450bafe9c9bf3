//! One verification-and-reporting run for one file version

use tracing::debug;

use fixity_config::Config;
use fixity_dds::{ApiClient, HttpConfig};
use fixity_errors::{Error, Result};
use fixity_types::{FileVersion, HashReport, Upload};

use crate::verifier::ChunkedDigestVerifier;

/// Single-use workflow: FileVersion → Upload → chunk verification → digest
/// submission
///
/// FileVersion and Upload are fetched at most once and held in explicit
/// memo fields; the pre-signed download URL is deliberately not memoized
/// anywhere. An instance lives for exactly one job and carries no state
/// beyond it.
pub struct ReportWorkflow {
    client: ApiClient,
    file_version_id: String,
    file_version: Option<FileVersion>,
    upload: Option<Upload>,
}

impl ReportWorkflow {
    /// Build a workflow for one file version id
    ///
    /// # Errors
    ///
    /// Returns a configuration error, before any network call, when
    /// required credentials or the base URL are absent or malformed.
    pub fn new(file_version_id: String, config: &Config) -> Result<Self> {
        let http = HttpConfig {
            timeout: config.timeout(),
            connect_timeout: config.connect_timeout(),
            ..HttpConfig::default()
        };
        let client = ApiClient::new(config.base_url()?, config.credentials()?, &http)?;

        Ok(Self {
            client,
            file_version_id,
            file_version: None,
            upload: None,
        })
    }

    /// Run the workflow to completion
    ///
    /// The side effect is one successful PUT of the whole-file digest.
    /// Any failure at any stage aborts the run; nothing partial is ever
    /// reported.
    ///
    /// # Errors
    ///
    /// Propagates API and integrity errors from any stage.
    pub async fn run(mut self) -> Result<()> {
        let upload_id = self.file_version().await?.upload.id.clone();
        let chunks = self.upload(&upload_id).await?.chunks.clone();
        debug!(
            file_version_id = %self.file_version_id,
            upload_id = %upload_id,
            chunks = chunks.len(),
            "manifest fetched"
        );

        let digest = ChunkedDigestVerifier::new(&mut self.client, &self.file_version_id)
            .verify(&chunks)
            .await?;
        debug!(digest = %digest, "whole-file digest computed");

        self.client
            .report_hash(&upload_id, &HashReport::md5(digest.to_hex()))
            .await
    }

    async fn file_version(&mut self) -> Result<&FileVersion> {
        if self.file_version.is_none() {
            let fetched = self.client.file_version(&self.file_version_id).await?;
            self.file_version = Some(fetched);
        }
        match &self.file_version {
            Some(file_version) => Ok(file_version),
            None => Err(Error::internal("file_version memo unset after fetch")),
        }
    }

    async fn upload(&mut self, upload_id: &str) -> Result<&Upload> {
        if self.upload.is_none() {
            let fetched = self.client.upload(upload_id).await?;
            self.upload = Some(fetched);
        }
        match &self.upload {
            Some(upload) => Ok(upload),
            None => Err(Error::internal("upload memo unset after fetch")),
        }
    }
}
