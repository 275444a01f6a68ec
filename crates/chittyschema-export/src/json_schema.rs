//! JSON Schema (draft-07) and OpenAPI 3 emitter.

use chittyschema_ir::{Artifact, ArtifactCategory, Column, JsonPrimitive, Mappings, SchemaIR, Table};
use serde_json::{json, Map, Value};

pub const JSON_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-07/schema#";
pub const OPENAPI_VERSION: &str = "3.0.3";

pub fn emit(ir: &SchemaIR, mappings: &Mappings) -> Vec<Artifact> {
    vec![
        Artifact::new(
            ArtifactCategory::Json,
            "complete",
            "chittychain-schema.json",
            format!("{:#}\n", json_schema(ir, mappings)),
            "JSON Schema for every table",
        ),
        Artifact::new(
            ArtifactCategory::Json,
            "openapi",
            "chittychain-openapi.json",
            format!("{:#}\n", openapi(ir, mappings)),
            "OpenAPI component schemas",
        ),
    ]
}

pub fn json_schema(ir: &SchemaIR, mappings: &Mappings) -> Value {
    let mut definitions = Map::new();
    for table in &ir.tables {
        definitions.insert(table.name.clone(), table_definition(table, mappings));
    }
    json!({
        "$schema": JSON_SCHEMA_DRAFT,
        "title": "ChittyChain Schema",
        "description": format!("{} tables compiled from {}", ir.tables.len(), ir.metadata.source_locator),
        "metadata": crate::metadata_value(ir),
        "definitions": definitions,
    })
}

pub fn openapi(ir: &SchemaIR, mappings: &Mappings) -> Value {
    let mut schemas = Map::new();
    for table in &ir.tables {
        let mut properties = Map::new();
        for column in &table.columns {
            properties.insert(column.name.clone(), column_schema(column, mappings, false));
        }
        schemas.insert(
            table.name.clone(),
            json!({
                "type": "object",
                "description": table.description,
                "properties": properties,
            }),
        );
    }
    json!({
        "openapi": OPENAPI_VERSION,
        "info": {
            "title": "ChittyChain Schema API",
            "version": ir.metadata.version,
        },
        "paths": {},
        "components": { "schemas": schemas },
        "x-metadata": crate::metadata_value(ir),
    })
}

fn table_definition(table: &Table, mappings: &Mappings) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for column in &table.columns {
        properties.insert(column.name.clone(), column_schema(column, mappings, true));
        if !column.nullable && column.default.is_none() {
            required.push(Value::String(column.name.clone()));
        }
    }
    json!({
        "type": "object",
        "description": table.description,
        "x-entity-type": table.entity_type,
        "properties": properties,
        "required": required,
    })
}

fn column_schema(column: &Column, mappings: &Mappings, with_default: bool) -> Value {
    let primitive = mappings.json_type_for_sql(&column.data_type);
    let mut schema = Map::new();
    schema.insert("type".into(), primitive.as_str().into());
    match primitive {
        JsonPrimitive::Array => {
            let element = column.data_type.trim_end_matches("[]").trim();
            let item_type = mappings.json_type_for_sql(element);
            let mut items = Map::new();
            items.insert("type".into(), item_type.as_str().into());
            if let Some(format) = string_format(element) {
                items.insert("format".into(), format.into());
            }
            schema.insert("items".into(), Value::Object(items));
        }
        JsonPrimitive::String => {
            if let Some(format) = string_format(&column.data_type) {
                schema.insert("format".into(), format.into());
            }
        }
        _ => {}
    }
    if let Some(description) = &column.description {
        schema.insert("description".into(), description.clone().into());
    }
    if with_default {
        if let Some(default) = &column.default {
            schema.insert("default".into(), default_value(default));
        }
    }
    Value::Object(schema)
}

fn string_format(sql_type: &str) -> Option<&'static str> {
    let upper = sql_type.to_ascii_uppercase();
    if upper.starts_with("UUID") {
        Some("uuid")
    } else if upper.starts_with("TIMESTAMP") {
        Some("date-time")
    } else if upper.starts_with("DATE") {
        Some("date")
    } else {
        None
    }
}

/// Literal SQL defaults become JSON values; expressions stay as text.
fn default_value(raw: &str) -> Value {
    let text = raw.trim();
    if let Some((inner, rest)) = split_string_literal(text) {
        if rest.is_empty() || rest.starts_with("::") {
            return Value::String(inner.replace("''", "'"));
        }
        return Value::String(text.to_string());
    }
    match text.to_ascii_uppercase().as_str() {
        "TRUE" => return Value::Bool(true),
        "FALSE" => return Value::Bool(false),
        "NULL" => return Value::Null,
        _ => {}
    }
    if let Ok(n) = text.parse::<i64>() {
        return n.into();
    }
    if let Ok(f) = text.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(text.to_string())
}

/// `'a''b'::text` → (`a''b`, `::text`).
fn split_string_literal(text: &str) -> Option<(&str, &str)> {
    let body = text.strip_prefix('\'')?;
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '\'' {
            continue;
        }
        if chars.next_if(|&(_, n)| n == '\'').is_none() {
            return Some((&body[..i], body[i + 1..].trim_start()));
        }
    }
    None
}
