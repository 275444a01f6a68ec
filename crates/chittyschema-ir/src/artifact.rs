//! Emitter output units and the run manifest.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactCategory {
    Sql,
    Json,
    Templates,
    Docs,
}

impl ArtifactCategory {
    pub const ALL: [ArtifactCategory; 4] = [
        ArtifactCategory::Sql,
        ArtifactCategory::Json,
        ArtifactCategory::Templates,
        ArtifactCategory::Docs,
    ];

    /// Also the output sub-directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactCategory::Sql => "sql",
            ArtifactCategory::Json => "json",
            ArtifactCategory::Templates => "templates",
            ArtifactCategory::Docs => "docs",
        }
    }
}

impl std::fmt::Display for ArtifactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub category: ArtifactCategory,
    /// Unique within `category`.
    pub key: String,
    pub filename: String,
    pub content: String,
    pub description: String,
}

impl Artifact {
    pub fn new(
        category: ArtifactCategory,
        key: impl Into<String>,
        filename: impl Into<String>,
        content: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            key: key.into(),
            filename: filename.into(),
            content: content.into(),
            description: description.into(),
        }
    }

    /// Path relative to the output root (`sql/core.sql`).
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.category.as_str()).join(&self.filename)
    }

    /// `{category}/{key}`, used as the upload route.
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.key)
    }
}

/// Index of every artifact produced by one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    pub generated_at: String,
    /// Category name (`sql`, `json`, ...) → artifact keys.
    pub artifacts_by_category: BTreeMap<String, Vec<String>>,
    pub total_artifact_count: usize,
    pub source_locator: String,
    pub content_hash: String,
}
