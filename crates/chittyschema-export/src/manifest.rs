//! Run manifest: an index of emitted artifact keys per category.

use chittyschema_ir::{ArtifactCategory, Manifest, SchemaIR, MANIFEST_FILENAME};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{EmittedArtifacts, ExportError};

/// Every category appears, even when its emitter produced nothing.
pub fn build_manifest(ir: &SchemaIR, emitted: &EmittedArtifacts) -> Manifest {
    let artifacts_by_category: BTreeMap<String, Vec<String>> = ArtifactCategory::ALL
        .into_iter()
        .map(|category| {
            let keys: Vec<String> = emitted
                .category(category)
                .iter()
                .map(|a| a.key.clone())
                .collect();
            (category.as_str().to_string(), keys)
        })
        .collect();
    let total_artifact_count = artifacts_by_category.values().map(Vec::len).sum();

    Manifest {
        version: ir.metadata.version.clone(),
        generated_at: ir.metadata.generated_at.clone(),
        artifacts_by_category,
        total_artifact_count,
        source_locator: ir.metadata.source_locator.clone(),
        content_hash: ir.metadata.content_hash.clone(),
    }
}

pub fn write_manifest(root: &Path, manifest: &Manifest) -> Result<PathBuf, ExportError> {
    let path = root.join(MANIFEST_FILENAME);
    let text = serde_json::to_string_pretty(manifest)?;
    fs::create_dir_all(root).map_err(|source| ExportError::Io {
        path: root.to_path_buf(),
        source,
    })?;
    fs::write(&path, text + "\n").map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
