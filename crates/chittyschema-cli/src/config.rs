//! Source loading and remote-endpoint configuration.

use chittyschema_ir::Mappings;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const API_URL_ENV: &str = "CHITTYSCHEMA_API_URL";
pub const API_KEY_ENV: &str = "CHITTYSCHEMA_API_KEY";

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid mappings file {}: {source}", .path.display())]
    Mappings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_source(path: &Path) -> Result<String, CompileError> {
    fs::read_to_string(path).map_err(|source| CompileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Built-in dictionaries unless a JSON override file is given.
pub fn load_mappings(path: Option<&Path>) -> Result<Mappings, CompileError> {
    let Some(path) = path else {
        return Ok(Mappings::default());
    };
    let text = read_source(path)?;
    Mappings::from_json_str(&text).map_err(|source| CompileError::Mappings {
        path: path.to_path_buf(),
        source,
    })
}

/// Where artifacts get published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub base_url: String,
    pub api_key: String,
}

impl UploadConfig {
    /// Flags win over the environment. `None` unless both a URL and a key are
    /// available.
    pub fn resolve(api_url: Option<String>, api_key: Option<String>) -> Option<Self> {
        Self::from_parts(
            api_url.or_else(|| std::env::var(API_URL_ENV).ok()),
            api_key.or_else(|| std::env::var(API_KEY_ENV).ok()),
        )
    }

    fn from_parts(api_url: Option<String>, api_key: Option<String>) -> Option<Self> {
        let base_url = api_url.filter(|s| !s.trim().is_empty())?;
        let api_key = api_key.filter(|s| !s.trim().is_empty())?;
        Some(Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}
