//! End-to-end runs of the `chittyschema` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const SQL: &str = "\
CREATE TABLE people (id UUID PRIMARY KEY, name TEXT NOT NULL, bio TEXT);
CREATE TABLE events (
    id UUID PRIMARY KEY,
    person_id UUID REFERENCES people(id),
    happened_at TIMESTAMP WITH TIME ZONE NOT NULL
);
CREATE INDEX idx_people_name ON people (name);
";

const TEMPLATES: &str = "\
## Database 1: People (PEO)

| Property | Type | Description |
|----------|------|-------------|
| Name | Title | Full legal name |
";

fn write_sources(dir: &Path, sql: &str) {
    fs::write(dir.join("schema.sql"), sql).unwrap();
    fs::write(dir.join("templates.md"), TEMPLATES).unwrap();
}

fn chittyschema(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_chittyschema"))
        .current_dir(dir)
        .args(args)
        .env_remove("CHITTYSCHEMA_API_URL")
        .env_remove("CHITTYSCHEMA_API_KEY")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

#[test]
fn compile_without_credentials_writes_everything_and_skips_upload() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path(), SQL);

    let output = chittyschema(dir.path(), &["compile", "--out", "dist"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("upload skipped"));

    let dist = dir.path().join("dist");
    for file in [
        "sql/complete.sql",
        "sql/core.sql",
        "sql/people.sql",
        "sql/events.sql",
        "json/chittychain-schema.json",
        "json/chittychain-openapi.json",
        "templates/people-template.json",
        "templates/package.json",
        "docs/overview.md",
        "docs/erd.mmd",
        "docs/api-reference.md",
        "docs/migration-guide.md",
        "manifest.json",
    ] {
        assert!(dist.join(file).is_file(), "missing {file}");
    }

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dist.join("manifest.json")).unwrap()).unwrap();
    assert_eq!(manifest["total_artifact_count"], 12);
    assert_eq!(manifest["source_locator"], "schema.sql");
}

#[test]
fn failed_uploads_exit_nonzero_after_the_manifest_is_written() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path(), SQL);

    let output = chittyschema(
        dir.path(),
        &[
            "compile",
            "--out",
            "dist",
            "--api-url",
            "http://127.0.0.1:1",
            "--api-key",
            "test-key",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join("dist/manifest.json").is_file());
    assert!(dir.path().join("dist/sql/core.sql").is_file());
}

#[test]
fn missing_source_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = chittyschema(dir.path(), &["compile", "--sql", "nope.sql"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.sql"), "{stderr}");
    assert!(!dir.path().join("dist").exists());
}

#[test]
fn check_reports_counts_and_strict_rejects_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    write_sources(dir.path(), &format!("{SQL}\nDROP TABLE legacy;\n"));

    let output = chittyschema(dir.path(), &["check"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("tables=2 templates=1"));
    assert!(stdout.contains("1 diagnostic(s)"));

    let strict = chittyschema(dir.path(), &["check", "--strict"]);
    assert_eq!(strict.status.code(), Some(1));
}
