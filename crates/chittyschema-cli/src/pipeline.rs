//! read → parse → assemble → emit → write → upload → manifest

use anyhow::{bail, Context, Result};
use chittyschema_export::{build_manifest, emit_all, write_artifacts, write_manifest, EmittedArtifacts};
use chittyschema_ir::{Artifact, AssembleOptions, Mappings, SchemaIR};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::{load_mappings, read_source, UploadConfig};
use crate::upload::{UploadDispatcher, UploadReport};

/// Inputs shared by `compile` and `check`.
#[derive(Debug, Clone)]
pub struct Sources {
    pub sql: PathBuf,
    pub templates: PathBuf,
    pub mappings: Option<PathBuf>,
    pub schema_version: String,
    pub strict: bool,
}

/// Parse both sources and assemble the IR. Diagnostics are logged; in strict
/// mode any diagnostic is an error.
pub fn load(sources: &Sources) -> Result<(SchemaIR, Mappings)> {
    let mappings = load_mappings(sources.mappings.as_deref())?;
    let sql = read_source(&sources.sql)?;
    let templates = read_source(&sources.templates)?;

    let ddl = chittyschema_ingest_sql::parse_sql_ddl(&sql);
    let docs = chittyschema_ingest_docs::parse_template_document(&templates);
    let options = AssembleOptions {
        version: sources.schema_version.clone(),
        source_locator: sources.sql.display().to_string(),
        generated_at: None,
    };
    let ir = SchemaIR::assemble(sql, ddl, docs, &mappings, &options);

    for diagnostic in &ir.diagnostics {
        warn!("{diagnostic}");
    }
    if sources.strict {
        ir.ensure_no_diagnostics()
            .context("strict mode rejects skipped constructs")?;
    }
    Ok((ir, mappings))
}

pub fn print_summary(ir: &SchemaIR) {
    println!(
        "  {} tables={} templates={} functions={} triggers={} indexes={}",
        "→".cyan(),
        ir.tables.len(),
        ir.templates.len(),
        ir.functions.len(),
        ir.triggers.len(),
        ir.indexes.len()
    );
    println!("  {} content_hash={}", "→".cyan(), ir.metadata.content_hash);
    if !ir.diagnostics.is_empty() {
        println!(
            "  {} {} diagnostic(s)",
            "!".yellow().bold(),
            ir.diagnostics.len()
        );
        for diagnostic in &ir.diagnostics {
            println!("    {diagnostic}");
        }
    }
}

pub fn compile(sources: &Sources, out: &Path, upload: Option<UploadConfig>) -> Result<()> {
    println!(
        "{} {} + {}",
        "Compiling".green().bold(),
        sources.sql.display(),
        sources.templates.display()
    );

    let (ir, mappings) = load(sources)?;
    print_summary(&ir);

    let emitted = emit_all(&ir, &mappings);
    let artifacts: Vec<Artifact> = emitted.iter().cloned().collect();
    write_artifacts(out, &artifacts)
        .with_context(|| format!("failed to write artifacts under {}", out.display()))?;
    print_categories(&emitted);

    let report = match upload {
        Some(config) => {
            println!(
                "{} {} artifacts to {}",
                "Uploading".green().bold(),
                artifacts.len(),
                config.base_url
            );
            let report = UploadDispatcher::new(config)?.upload_all(&artifacts);
            print_upload_report(&report);
            Some(report)
        }
        None => {
            info!("no API URL/key configured; upload skipped");
            println!("  {} upload skipped (no API URL/key)", "→".cyan());
            None
        }
    };

    let manifest = build_manifest(&ir, &emitted);
    let manifest_path = write_manifest(out, &manifest)?;
    println!(
        "  {} {} (artifacts={})",
        "→".cyan(),
        manifest_path.display(),
        manifest.total_artifact_count
    );

    if let Some(report) = report {
        if !report.is_success() {
            bail!(
                "{} of {} uploads failed",
                report.failed.len(),
                report.attempted()
            );
        }
    }
    println!("{}", "Done".green().bold());
    Ok(())
}

fn print_categories(emitted: &EmittedArtifacts) {
    for category in chittyschema_ir::ArtifactCategory::ALL {
        let keys: Vec<&str> = emitted
            .category(category)
            .iter()
            .map(|a| a.key.as_str())
            .collect();
        println!("  {} {}/ [{}]", "→".cyan(), category, keys.join(", "));
    }
}

fn print_upload_report(report: &UploadReport) {
    println!(
        "  {} uploaded={} failed={}",
        "→".cyan(),
        report.succeeded.len(),
        report.failed.len()
    );
    for (id, err) in &report.failed {
        println!("    {} {id}: {err}", "✗".red());
    }
}
