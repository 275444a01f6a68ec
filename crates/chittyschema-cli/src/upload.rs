//! Artifact upload dispatcher.
//!
//! One `POST {base}/{category}/{key}` per artifact, body = artifact content.
//! Failures do not stop the batch: every artifact is attempted and the
//! outcome is collected into an [`UploadReport`].

use chittyschema_ir::Artifact;
use rayon::prelude::*;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::UploadConfig;

pub const FILENAME_HEADER: &str = "X-Artifact-Filename";
pub const DESCRIPTION_HEADER: &str = "X-Artifact-Description";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("failed to reach {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
}

#[derive(Debug, Default)]
pub struct UploadReport {
    /// Artifact ids (`category/key`) accepted by the endpoint.
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, UploadError)>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

pub struct UploadDispatcher {
    client: reqwest::blocking::Client,
    config: UploadConfig,
}

impl UploadDispatcher {
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(UploadError::Client)?;
        Ok(Self { client, config })
    }

    pub fn endpoint(&self, artifact: &Artifact) -> String {
        format!("{}/{}", self.config.base_url, artifact.id())
    }

    pub fn upload(&self, artifact: &Artifact) -> Result<(), UploadError> {
        let url = self.endpoint(artifact);
        debug!(%url, bytes = artifact.content.len(), "uploading artifact");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(FILENAME_HEADER, header_safe(&artifact.filename))
            .header(DESCRIPTION_HEADER, header_safe(&artifact.description))
            .body(artifact.content.clone())
            .send()
            .map_err(|source| UploadError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().unwrap_or_default();
        Err(UploadError::Status {
            url,
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    /// Attempt every artifact; never short-circuits.
    pub fn upload_all(&self, artifacts: &[Artifact]) -> UploadReport {
        let outcomes: Vec<(String, Result<(), UploadError>)> = artifacts
            .par_iter()
            .map(|artifact| (artifact.id(), self.upload(artifact)))
            .collect();

        let mut report = UploadReport::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.succeeded.push(id),
                Err(err) => {
                    warn!(artifact = %id, error = %err, "upload failed");
                    report.failed.push((id, err));
                }
            }
        }
        report
    }
}

/// Header values must be visible ASCII; anything else becomes `?`.
fn header_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if c == ' ' || c.is_ascii_graphic() { c } else { '?' })
        .collect()
}
