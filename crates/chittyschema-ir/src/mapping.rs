//! Entity/type mapping tables.
//!
//! Every lookup is total: unmapped input falls back to an explicit default, so
//! nothing downstream of assembly can fail on an unknown name.
//!
//! The tables are plain data. [`Mappings::default`] carries the ChittyChain
//! dictionaries; a JSON file can replace any subset of fields (fields absent
//! from the file keep their defaults).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::UNKNOWN_NAMESPACE;

pub const DEFAULT_TEMPLATE_ICON: &str = "📄";
pub const DEFAULT_PROPERTY_KIND: &str = "rich_text";

/// JSON Schema primitive a SQL column type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonPrimitive {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl JsonPrimitive {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonPrimitive::String => "string",
            JsonPrimitive::Number => "number",
            JsonPrimitive::Boolean => "boolean",
            JsonPrimitive::Object => "object",
            JsonPrimitive::Array => "array",
        }
    }
}

/// Substring rule: if the upper-cased SQL type contains `contains`, it maps to
/// `json_type`. Rules are tried in order; the first match wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlTypeRule {
    pub contains: String,
    pub json_type: JsonPrimitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mappings {
    /// Table name (lowercase) → namespace code.
    pub table_namespaces: BTreeMap<String, String>,
    /// Template name → icon.
    pub template_icons: BTreeMap<String, String>,
    pub default_icon: String,
    /// Document property label → target property kind.
    pub property_kinds: BTreeMap<String, String>,
    pub default_property_kind: String,
    pub sql_json_types: Vec<SqlTypeRule>,
    pub fixed_entity_list: Vec<String>,
    /// Tables included in `sql/core`.
    pub core_tables: Vec<String>,
    /// Tables that get their own `sql/<table>` artifact.
    pub entity_tables: Vec<String>,
}

impl Default for Mappings {
    fn default() -> Self {
        let table_namespaces = [
            ("people", "PEO"),
            ("persons", "PEO"),
            ("places", "PLACE"),
            ("locations", "PLACE"),
            ("things", "PROP"),
            ("property", "PROP"),
            ("assets", "PROP"),
            ("evidence", "PROP"),
            ("events", "EVNT"),
            ("cases", "EVNT"),
            ("atomic_facts", "EVNT"),
            ("authorities", "AUTH"),
        ];
        let template_icons = [
            ("People", "👤"),
            ("Places", "📍"),
            ("Things", "📦"),
            ("Events", "📅"),
            ("Authorities", "⚖️"),
            ("Cases", "📁"),
            ("Evidence", "🔍"),
            ("Facts", "📋"),
        ];
        let property_kinds = [
            ("Title", "title"),
            ("Text", "rich_text"),
            ("Rich Text", "rich_text"),
            ("Number", "number"),
            ("Select", "select"),
            ("Multi-select", "multi_select"),
            ("Status", "status"),
            ("Date", "date"),
            ("Person", "people"),
            ("People", "people"),
            ("Files", "files"),
            ("Files & Media", "files"),
            ("Checkbox", "checkbox"),
            ("URL", "url"),
            ("Email", "email"),
            ("Phone", "phone_number"),
            ("Phone Number", "phone_number"),
            ("Formula", "formula"),
            ("Relation", "relation"),
            ("Rollup", "rollup"),
            ("Created Time", "created_time"),
            ("Created By", "created_by"),
            ("Last Edited Time", "last_edited_time"),
            ("Last Edited By", "last_edited_by"),
        ];
        // Order matters: arrays before element types, INTERVAL before INT.
        let sql_json_types = [
            ("[]", JsonPrimitive::Array),
            ("JSON", JsonPrimitive::Object),
            ("BOOL", JsonPrimitive::Boolean),
            ("INTERVAL", JsonPrimitive::String),
            ("INT", JsonPrimitive::Number),
            ("SERIAL", JsonPrimitive::Number),
            ("NUMERIC", JsonPrimitive::Number),
            ("DECIMAL", JsonPrimitive::Number),
            ("REAL", JsonPrimitive::Number),
            ("DOUBLE", JsonPrimitive::Number),
            ("FLOAT", JsonPrimitive::Number),
            ("DATE", JsonPrimitive::String),
            ("TIME", JsonPrimitive::String),
        ]
        .into_iter()
        .map(|(contains, json_type)| SqlTypeRule {
            contains: contains.to_string(),
            json_type,
        })
        .collect();
        let entity_tables: Vec<String> = ["people", "places", "things", "events", "authorities"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Self {
            table_namespaces: to_map(&table_namespaces),
            template_icons: to_map(&template_icons),
            default_icon: DEFAULT_TEMPLATE_ICON.to_string(),
            property_kinds: to_map(&property_kinds),
            default_property_kind: DEFAULT_PROPERTY_KIND.to_string(),
            sql_json_types,
            fixed_entity_list: ["PEO", "PLACE", "PROP", "EVNT", "AUTH"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            core_tables: entity_tables.clone(),
            entity_tables,
        }
    }
}

fn to_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// `"Multi-select"`, `"multi select"` and `"MultiSelect"` all normalize alike.
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Strip a schema qualifier and quotes: `public."People"` → `people`.
fn normalize_table(name: &str) -> String {
    let unqualified = name.rsplit('.').next().unwrap_or(name);
    unqualified.trim_matches('"').to_ascii_lowercase()
}

impl Mappings {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn namespace_for_table(&self, table: &str) -> String {
        self.table_namespaces
            .get(&normalize_table(table))
            .cloned()
            .unwrap_or_else(|| UNKNOWN_NAMESPACE.to_string())
    }

    pub fn icon_for_template(&self, template: &str) -> String {
        let wanted = normalize_label(template);
        self.template_icons
            .iter()
            .find(|(name, _)| normalize_label(name) == wanted)
            .map(|(_, icon)| icon.clone())
            .unwrap_or_else(|| self.default_icon.clone())
    }

    pub fn property_kind(&self, label: &str) -> String {
        let wanted = normalize_label(label);
        self.property_kinds
            .iter()
            .find(|(name, _)| normalize_label(name) == wanted)
            .map(|(_, kind)| kind.clone())
            .unwrap_or_else(|| self.default_property_kind.clone())
    }

    pub fn json_type_for_sql(&self, sql_type: &str) -> JsonPrimitive {
        let upper = sql_type.to_ascii_uppercase();
        self.sql_json_types
            .iter()
            .find(|rule| upper.contains(&rule.contains.to_ascii_uppercase()))
            .map(|rule| rule.json_type)
            .unwrap_or(JsonPrimitive::String)
    }

    pub fn is_core_table(&self, table: &str) -> bool {
        self.core_tables.iter().any(|t| same_table(t, table))
    }
}

/// Table names compare without schema qualifier, quotes or case.
pub fn same_table(a: &str, b: &str) -> bool {
    normalize_table(a) == normalize_table(b)
}
