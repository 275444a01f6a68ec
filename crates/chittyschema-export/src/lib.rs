//! Backend emitters.
//!
//! Every emitter is a pure function of the assembled [`SchemaIR`] and the
//! [`Mappings`] it was built with:
//!
//! - [`sql`]: `complete`, `core` and per-entity SQL subsets
//! - [`json_schema`]: draft-07 JSON Schema and an OpenAPI 3 document
//! - [`templates`]: one workspace database config per template + a package index
//! - [`docs`]: overview, Mermaid ERD, API reference and migration guide
//!
//! [`emit_all`] runs the four concurrently; [`manifest`] indexes the result.

use chittyschema_ir::{Artifact, ArtifactCategory, Mappings, SchemaIR};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod docs;
pub mod json_schema;
pub mod manifest;
pub mod sql;
pub mod templates;

pub use manifest::{build_manifest, write_manifest};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
}

/// Output of the four emitters, grouped by category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmittedArtifacts {
    pub sql: Vec<Artifact>,
    pub json: Vec<Artifact>,
    pub templates: Vec<Artifact>,
    pub docs: Vec<Artifact>,
}

impl EmittedArtifacts {
    pub fn category(&self, category: ArtifactCategory) -> &[Artifact] {
        match category {
            ArtifactCategory::Sql => &self.sql,
            ArtifactCategory::Json => &self.json,
            ArtifactCategory::Templates => &self.templates,
            ArtifactCategory::Docs => &self.docs,
        }
    }

    /// All artifacts, category by category.
    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        ArtifactCategory::ALL
            .into_iter()
            .flat_map(move |c| self.category(c).iter())
    }

    pub fn len(&self) -> usize {
        self.sql.len() + self.json.len() + self.templates.len() + self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find(&self, category: ArtifactCategory, key: &str) -> Option<&Artifact> {
        self.category(category).iter().find(|a| a.key == key)
    }
}

/// Run every emitter over the same IR. Emitters share nothing but the IR, so
/// they run on the rayon pool.
pub fn emit_all(ir: &SchemaIR, mappings: &Mappings) -> EmittedArtifacts {
    let ((sql, json), (templates, docs)) = rayon::join(
        || {
            rayon::join(
                || sql::emit(ir, mappings),
                || json_schema::emit(ir, mappings),
            )
        },
        || {
            rayon::join(
                || templates::emit(ir, mappings),
                || docs::emit(ir, mappings),
            )
        },
    );
    let emitted = EmittedArtifacts {
        sql,
        json,
        templates,
        docs,
    };
    debug!(
        sql = emitted.sql.len(),
        json = emitted.json.len(),
        templates = emitted.templates.len(),
        docs = emitted.docs.len(),
        "emitters finished"
    );
    emitted
}

/// Write every artifact under `root/<category>/<filename>`; returns the paths
/// written, in artifact order.
pub fn write_artifacts(root: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, ExportError> {
    for category in ArtifactCategory::ALL {
        let dir = root.join(category.as_str());
        fs::create_dir_all(&dir).map_err(|source| ExportError::Io { path: dir, source })?;
    }

    let written = artifacts
        .par_iter()
        .map(|artifact| {
            let path = root.join(artifact.relative_path());
            fs::write(&path, &artifact.content).map_err(|source| ExportError::Io {
                path: path.clone(),
                source,
            })?;
            Ok(path)
        })
        .collect::<Result<Vec<_>, ExportError>>()?;

    info!(count = written.len(), root = %root.display(), "artifacts written");
    Ok(written)
}

/// Shared metadata block, embedded verbatim by the JSON emitters.
pub(crate) fn metadata_value(ir: &SchemaIR) -> serde_json::Value {
    let m = &ir.metadata;
    serde_json::json!({
        "version": m.version,
        "generated_at": m.generated_at,
        "content_hash": m.content_hash,
        "total_source_lines": m.total_source_lines,
        "fixed_entity_list": m.fixed_entity_list,
        "source_locator": m.source_locator,
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use chittyschema_ir::{AssembleOptions, Mappings, SchemaIR};

    pub const SQL: &str = "\
-- Individuals known to the chain
CREATE TABLE people (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    bio TEXT,
    status VARCHAR(20) NOT NULL DEFAULT 'active',
    tags TEXT[],
    verified BOOLEAN DEFAULT FALSE
);

CREATE TABLE places (
    id UUID PRIMARY KEY,
    label TEXT NOT NULL
);

CREATE TABLE orders (
    id SERIAL PRIMARY KEY,
    customer_id UUID REFERENCES customers(id),
    place_id UUID NOT NULL,
    payload JSONB,
    FOREIGN KEY (place_id) REFERENCES places(id)
);

CREATE INDEX idx_people_name ON people (name);
";

    pub const TEMPLATES: &str = "\
# Workspace Templates

## Database 1: People (PEO)

| Property | Type | Description |
|----------|------|-------------|
| Name | Title | Full legal name |
| Role | Select | Case role |
| Notes | Text | Free-form notes |
| Stage | Status | Review stage |

### Select Options
- **Role**: Plaintiff, Defendant
- **Stage**: Open, Closed

## Database 2: Evidence (PROP)

| Property | Type | Description |
|---|---|---|
| Exhibit | Title | Exhibit label |
";

    pub fn ir() -> SchemaIR {
        ir_from(SQL, TEMPLATES)
    }

    pub fn ir_from(sql: &str, templates: &str) -> SchemaIR {
        SchemaIR::assemble(
            sql.to_string(),
            chittyschema_ingest_sql::parse_sql_ddl(sql),
            chittyschema_ingest_docs::parse_template_document(templates),
            &Mappings::default(),
            &AssembleOptions {
                generated_at: Some("2024-01-01T00:00:00+00:00".to_string()),
                source_locator: "schema.sql".to_string(),
                ..AssembleOptions::default()
            },
        )
    }
}
