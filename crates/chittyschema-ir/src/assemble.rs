//! IR assembly: parser outputs + mappings + computed metadata.

use thiserror::Error;
use tracing::{debug, warn};

use crate::digest::content_hash_v1;
use crate::{
    DdlExtraction, Diagnostic, IrMetadata, Mappings, SchemaIR, Template, TemplateDocument,
    TemplateProperty,
};

pub const DEFAULT_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub version: String,
    /// Where the SQL source came from (path or URL); echoed into the manifest.
    pub source_locator: String,
    /// Override for reproducible output; `None` means "now" (RFC 3339, UTC).
    pub generated_at: Option<String>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            version: DEFAULT_SCHEMA_VERSION.to_string(),
            source_locator: String::new(),
            generated_at: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum IrError {
    #[error("{count} construct(s) were skipped or overridden during parsing (first: {first})")]
    Diagnostics { count: usize, first: Diagnostic },
}

impl SchemaIR {
    /// Combine both front-end outputs into the canonical IR.
    ///
    /// Resolves table namespaces, template property kinds and icons through
    /// `mappings`, and computes the metadata block from `source`.
    pub fn assemble(
        source: String,
        ddl: DdlExtraction,
        docs: TemplateDocument,
        mappings: &Mappings,
        options: &AssembleOptions,
    ) -> SchemaIR {
        let DdlExtraction {
            mut tables,
            functions,
            triggers,
            indexes,
            mut diagnostics,
        } = ddl;

        for table in &mut tables {
            table.entity_type = mappings.namespace_for_table(&table.name);
        }

        diagnostics.extend(docs.diagnostics);
        let mut templates: Vec<Template> = Vec::with_capacity(docs.templates.len());
        for def in docs.templates {
            let template = Template {
                icon: mappings.icon_for_template(&def.name),
                properties: def
                    .properties
                    .into_iter()
                    .map(|(name, label, description)| TemplateProperty {
                        kind: mappings.property_kind(&label),
                        name,
                        label,
                        description,
                    })
                    .collect(),
                select_options: def.select_options,
                number: def.number,
                entity_code: def.entity_code,
                name: def.name,
            };
            if templates.iter().any(|t| t.key() == template.key()) {
                warn!(template = %template.name, "duplicate template key; keeping the first");
                diagnostics.push(Diagnostic::new(
                    def.line,
                    "template",
                    format!("duplicate template `{}` ignored", template.name),
                ));
                continue;
            }
            templates.push(template);
        }

        let metadata = IrMetadata {
            version: options.version.clone(),
            generated_at: options
                .generated_at
                .clone()
                .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            content_hash: content_hash_v1(&source),
            total_source_lines: source.lines().count(),
            fixed_entity_list: mappings.fixed_entity_list.clone(),
            source_locator: options.source_locator.clone(),
        };

        debug!(
            tables = tables.len(),
            templates = templates.len(),
            diagnostics = diagnostics.len(),
            "assembled schema IR"
        );

        SchemaIR {
            source,
            tables,
            templates,
            functions,
            triggers,
            indexes,
            diagnostics,
            metadata,
        }
    }

    /// Strict consumers reject any IR that carries diagnostics.
    pub fn ensure_no_diagnostics(&self) -> Result<(), IrError> {
        match self.diagnostics.first() {
            None => Ok(()),
            Some(first) => Err(IrError::Diagnostics {
                count: self.diagnostics.len(),
                first: first.clone(),
            }),
        }
    }
}
