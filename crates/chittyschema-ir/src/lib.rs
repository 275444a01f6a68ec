//! ChittySchema intermediate representation.
//!
//! Both front-ends (SQL DDL, template document) produce the raw extraction
//! types defined here; [`SchemaIR::assemble`] combines them with the injected
//! [`Mappings`] into the canonical model every emitter consumes.
//!
//! ```text
//!   schema.sql ──► DdlExtraction ──┐
//!                                  ├──► SchemaIR ──► emitters ──► artifacts
//!   templates.md ─► TemplateDocument┘
//! ```
//!
//! The IR is immutable once assembled. Parse misses are not errors: they are
//! recorded as [`Diagnostic`]s so strict and lenient consumers can share one
//! parser.

use serde::{Deserialize, Serialize};

pub mod artifact;
pub mod assemble;
pub mod digest;
pub mod mapping;

pub use artifact::*;
pub use assemble::*;
pub use mapping::*;

/// Placeholder namespace for tables the mapper does not know.
pub const UNKNOWN_NAMESPACE: &str = "UNKNOWN";

// ============================================================================
// Relational model
// ============================================================================

/// A `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
    /// Namespace code (e.g. `PEO`); filled in during assembly.
    pub entity_type: String,
    pub description: String,
    /// 1-based line of the `CREATE TABLE` keyword.
    pub line: usize,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Columns that carry a foreign-key reference, in declaration order.
    pub fn foreign_key_columns(&self) -> impl Iterator<Item = (&Column, &ForeignRef)> {
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref().map(|r| (c, r)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Raw type text as written (`VARCHAR(255)`, `TEXT[]`, ...).
    pub data_type: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ForeignRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Constraint {
    PrimaryKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        columns: Vec<String>,
    },
    ForeignKey {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        columns: Vec<String>,
        references: ForeignRef,
    },
    Unique {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        columns: Vec<String>,
    },
    Check {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        condition: String,
    },
}

impl Constraint {
    pub fn name(&self) -> Option<&str> {
        match self {
            Constraint::PrimaryKey { name, .. }
            | Constraint::ForeignKey { name, .. }
            | Constraint::Unique { name, .. }
            | Constraint::Check { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    /// Raw parameter list (text between the parentheses).
    pub parameters: String,
    pub return_type: String,
    pub body: String,
    pub language: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    pub name: String,
    /// `BEFORE`, `AFTER` or `INSTEAD OF`.
    pub timing: String,
    pub events: Vec<String>,
    pub table: String,
    /// `ROW` or `STATEMENT`.
    pub for_each: String,
    pub function: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub method: String,
    pub columns: Vec<String>,
    pub unique: bool,
    pub description: String,
}

/// A construct the parsers skipped, overrode, or could only partially read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based source line (0 when not attributable).
    pub line: usize,
    /// Short label of what was being read (`statement`, `column`, `template`...).
    pub construct: String,
    pub reason: String,
}

impl Diagnostic {
    pub fn new(line: usize, construct: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            line,
            construct: construct.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.construct, self.reason)
    }
}

/// Everything the DDL parser extracts from one SQL source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DdlExtraction {
    pub tables: Vec<Table>,
    pub functions: Vec<Function>,
    pub triggers: Vec<Trigger>,
    pub indexes: Vec<Index>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DdlExtraction {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

// ============================================================================
// Template model
// ============================================================================

/// A template section as written in the document, before kind mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateDefinition {
    pub number: u32,
    pub name: String,
    pub entity_code: String,
    /// `(property name, document type label, description)` in row order.
    pub properties: Vec<(String, String, String)>,
    /// `(property name, option labels)` in document order.
    pub select_options: Vec<(String, Vec<String>)>,
    pub line: usize,
}

/// Everything the template document parser extracts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateDocument {
    pub templates: Vec<TemplateDefinition>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateProperty {
    pub name: String,
    /// Target property kind (`title`, `rich_text`, `select`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Label as written in the document.
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub number: u32,
    pub entity_code: String,
    pub properties: Vec<TemplateProperty>,
    pub select_options: Vec<(String, Vec<String>)>,
    pub icon: String,
}

impl Template {
    pub fn property(&self, name: &str) -> Option<&TemplateProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn options_for(&self, property: &str) -> Option<&[String]> {
        self.select_options
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, options)| options.as_slice())
    }

    /// File-system friendly key (`"Legal Cases"` → `legal-cases`).
    pub fn key(&self) -> String {
        slugify(&self.name)
    }
}

/// Lowercase, ASCII-alphanumeric, dash separated.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if out.is_empty() {
        out.push_str("template");
    }
    out
}

// ============================================================================
// IR
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrMetadata {
    pub version: String,
    pub generated_at: String,
    pub content_hash: String,
    pub total_source_lines: usize,
    pub fixed_entity_list: Vec<String>,
    pub source_locator: String,
}

/// The canonical compiled schema. Constructed once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIR {
    /// SQL source text, verbatim.
    #[serde(skip)]
    pub source: String,
    pub tables: Vec<Table>,
    pub templates: Vec<Template>,
    pub functions: Vec<Function>,
    pub triggers: Vec<Trigger>,
    pub indexes: Vec<Index>,
    pub diagnostics: Vec<Diagnostic>,
    pub metadata: IrMetadata,
}

impl SchemaIR {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn indexes_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a Index> + 'a {
        self.indexes.iter().filter(move |i| i.table == table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Legal Cases"), "legal-cases");
        assert_eq!(slugify("  People & Orgs "), "people-orgs");
        assert_eq!(slugify("***"), "template");
    }

    #[test]
    fn constraint_serializes_with_kind_tag() {
        let c = Constraint::Unique {
            name: None,
            columns: vec!["email".to_string()],
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["kind"], "UNIQUE");
        assert_eq!(v["columns"][0], "email");
    }
}
