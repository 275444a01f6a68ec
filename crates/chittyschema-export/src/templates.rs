//! Workspace database template emitter.
//!
//! Each template becomes one database configuration whose properties are keyed
//! by their mapped kind:
//!
//! ```json
//! { "Role": { "select": { "options": [{ "name": "Plaintiff" }] }, "description": "..." } }
//! ```

use chittyschema_ir::{Artifact, ArtifactCategory, Mappings, SchemaIR, Template};
use serde_json::{json, Map, Value};

pub const SELECT_KIND: &str = "select";

/// Key of the package index. Template keys are slugs (`[a-z0-9-]`), so the
/// underscore keeps the two apart.
pub const PACKAGE_KEY: &str = "_package";

pub fn emit(ir: &SchemaIR, _mappings: &Mappings) -> Vec<Artifact> {
    let mut out: Vec<Artifact> = ir
        .templates
        .iter()
        .map(|template| {
            Artifact::new(
                ArtifactCategory::Templates,
                template.key(),
                format!("{}-template.json", template.key()),
                format!("{:#}\n", database_config(template)),
                format!("{} {} database template", template.icon, template.name),
            )
        })
        .collect();

    let package = package_index(ir, &out);
    out.push(Artifact::new(
        ArtifactCategory::Templates,
        PACKAGE_KEY,
        "package.json",
        format!("{package:#}\n"),
        format!("Template package ({} templates)", ir.templates.len()),
    ));
    out
}

pub fn database_config(template: &Template) -> Value {
    let mut properties = Map::new();
    for property in &template.properties {
        let mut config = Map::new();
        match template.options_for(&property.name) {
            Some(options) if property.kind == SELECT_KIND && !options.is_empty() => {
                let options: Vec<Value> = options.iter().map(|o| json!({ "name": o })).collect();
                config.insert(property.kind.clone(), json!({ "options": options }));
            }
            _ => {
                config.insert(property.kind.clone(), json!({}));
            }
        }
        if !property.description.is_empty() {
            config.insert("description".into(), property.description.clone().into());
        }
        properties.insert(property.name.clone(), Value::Object(config));
    }

    json!({
        "title": [{ "type": "text", "text": { "content": template.name } }],
        "icon": { "type": "emoji", "emoji": template.icon },
        "entity_code": template.entity_code,
        "database_number": template.number,
        "properties": properties,
    })
}

fn package_index(ir: &SchemaIR, artifacts: &[Artifact]) -> Value {
    let entries: Vec<Value> = ir
        .templates
        .iter()
        .zip(artifacts)
        .map(|(template, artifact)| {
            json!({
                "key": artifact.key,
                "name": template.name,
                "entity_code": template.entity_code,
                "icon": template.icon,
                "file": artifact.filename,
                "property_count": template.properties.len(),
            })
        })
        .collect();
    json!({
        "name": "chittychain-templates",
        "version": ir.metadata.version,
        "generated_at": ir.metadata.generated_at,
        "template_count": entries.len(),
        "templates": entries,
    })
}
