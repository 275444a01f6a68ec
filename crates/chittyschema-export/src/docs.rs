//! Documentation emitter: overview, ERD, API reference, migration guide.

use chittyschema_ir::{Artifact, ArtifactCategory, Constraint, Mappings, SchemaIR, Table};
use std::collections::{HashMap, HashSet};

/// Columns listed per entity block in the ERD.
pub const ERD_MAX_COLUMNS: usize = 5;

pub fn emit(ir: &SchemaIR, mappings: &Mappings) -> Vec<Artifact> {
    vec![
        Artifact::new(
            ArtifactCategory::Docs,
            "overview",
            "overview.md",
            render_overview(ir, mappings),
            "Schema overview",
        ),
        Artifact::new(
            ArtifactCategory::Docs,
            "erd",
            "erd.mmd",
            render_erd(ir),
            "Entity-relationship diagram (Mermaid)",
        ),
        Artifact::new(
            ArtifactCategory::Docs,
            "api-reference",
            "api-reference.md",
            API_REFERENCE,
            "API reference",
        ),
        Artifact::new(
            ArtifactCategory::Docs,
            "migration-guide",
            "migration-guide.md",
            MIGRATION_GUIDE,
            "Migration guide",
        ),
    ]
}

fn md_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

pub fn render_overview(ir: &SchemaIR, mappings: &Mappings) -> String {
    let m = &ir.metadata;
    let mut out = String::new();
    out.push_str("# ChittyChain Schema Overview\n\n");
    out.push_str(&format!("- Version: {}\n", m.version));
    out.push_str(&format!("- Generated: {}\n", m.generated_at));
    out.push_str(&format!("- Source: {} ({} lines)\n", m.source_locator, m.total_source_lines));
    out.push_str(&format!("- Content hash: `{}`\n", m.content_hash));
    out.push_str(&format!("- Entity types: {}\n", m.fixed_entity_list.join(", ")));

    out.push_str(&format!("\n## Tables ({})\n\n", ir.tables.len()));
    if !ir.tables.is_empty() {
        out.push_str("| Table | Entity Type | Columns | Core | Description |\n");
        out.push_str("|-------|-------------|---------|------|-------------|\n");
        for t in &ir.tables {
            out.push_str(&format!(
                "| `{}` | {} | {} | {} | {} |\n",
                t.name,
                t.entity_type,
                t.columns.len(),
                if mappings.is_core_table(&t.name) { "yes" } else { "" },
                md_cell(&t.description)
            ));
        }
    }

    out.push_str(&format!("\n## Functions ({})\n\n", ir.functions.len()));
    for f in &ir.functions {
        out.push_str(&format!(
            "- `{}({})` returns `{}` ({}): {}\n",
            f.name, f.parameters, f.return_type, f.language, f.description
        ));
    }

    out.push_str(&format!("\n## Triggers ({})\n\n", ir.triggers.len()));
    for t in &ir.triggers {
        out.push_str(&format!(
            "- `{}`: {} {} on `{}` for each {} executes `{}`\n",
            t.name,
            t.timing,
            t.events.join(" OR "),
            t.table,
            t.for_each,
            t.function
        ));
    }

    out.push_str(&format!("\n## Indexes ({})\n\n", ir.indexes.len()));
    for i in &ir.indexes {
        let unique = if i.unique { ", unique" } else { "" };
        out.push_str(&format!(
            "- `{}` on `{}` ({}) [{}{}]: {}\n",
            i.name,
            i.table,
            i.columns.join(", "),
            i.method,
            unique,
            i.description
        ));
    }

    out.push_str(&format!("\n## Templates ({})\n\n", ir.templates.len()));
    if !ir.templates.is_empty() {
        out.push_str("| # | Template | Code | Properties |\n");
        out.push_str("|---|----------|------|------------|\n");
        for t in &ir.templates {
            out.push_str(&format!(
                "| {} | {} {} | {} | {} |\n",
                t.number,
                t.icon,
                md_cell(&t.name),
                t.entity_code,
                t.properties.len()
            ));
        }
    }

    if !ir.diagnostics.is_empty() {
        out.push_str(&format!("\n## Diagnostics ({})\n\n", ir.diagnostics.len()));
        for d in &ir.diagnostics {
            out.push_str(&format!("- {d}\n"));
        }
    }

    out
}

/// Mermaid identifiers: word characters only.
fn mermaid_word(text: &str) -> String {
    let word: String = text
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    let word = word.trim_matches('_');
    if word.is_empty() {
        "unknown".to_string()
    } else {
        // Collapse runs produced by `VARCHAR(255)` / `WITH TIME ZONE`.
        word.split('_')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// One Mermaid entity name per distinct table name; names that sanitize to
/// the same word get a numeric suffix in order of first use.
#[derive(Default)]
struct EntityNames {
    by_table: HashMap<String, String>,
    taken: HashSet<String>,
}

impl EntityNames {
    fn get(&mut self, table: &str) -> String {
        if let Some(name) = self.by_table.get(table) {
            return name.clone();
        }
        let base = mermaid_word(table);
        let mut name = base.clone();
        let mut n = 1;
        while !self.taken.insert(name.clone()) {
            n += 1;
            name = format!("{base}_{n}");
        }
        self.by_table.insert(table.to_string(), name.clone());
        name
    }
}

fn is_primary_key(table: &Table, column: &str) -> bool {
    table.column(column).is_some_and(|c| c.primary_key)
        || table.constraints.iter().any(
            |c| matches!(c, Constraint::PrimaryKey { columns, .. } if columns.iter().any(|n| n == column)),
        )
}

pub fn render_erd(ir: &SchemaIR) -> String {
    let mut out = String::from("erDiagram\n");
    let mut names = EntityNames::default();

    for table in &ir.tables {
        out.push_str(&format!("    {} {{\n", names.get(&table.name)));
        for column in table.columns.iter().take(ERD_MAX_COLUMNS) {
            let mut keys = Vec::new();
            if is_primary_key(table, &column.name) {
                keys.push("PK");
            }
            if column.references.is_some() {
                keys.push("FK");
            }
            let keys = if keys.is_empty() {
                String::new()
            } else {
                format!(" {}", keys.join(", "))
            };
            out.push_str(&format!(
                "        {} {}{}\n",
                mermaid_word(&column.data_type),
                mermaid_word(&column.name),
                keys
            ));
        }
        out.push_str("    }\n");
    }

    for table in &ir.tables {
        for (column, reference) in table.foreign_key_columns() {
            out.push_str(&format!(
                "    {} }}o--|| {} : \"{}\"\n",
                names.get(&table.name),
                names.get(&reference.table),
                column.name.replace('"', "'")
            ));
        }
    }

    out
}

pub const API_REFERENCE: &str = include_str!("../assets/api-reference.md");

pub const MIGRATION_GUIDE: &str = include_str!("../assets/migration-guide.md");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[test]
    fn erd_has_one_edge_per_foreign_key_column() {
        let ir = test_support::ir();
        let erd = render_erd(&ir);
        assert!(erd.starts_with("erDiagram\n"));
        assert!(erd.contains("    orders }o--|| customers : \"customer_id\"\n"));
        assert!(erd.contains("    orders }o--|| places : \"place_id\"\n"));
        assert_eq!(erd.matches("}o--||").count(), 2);
    }

    #[test]
    fn erd_blocks_list_at_most_five_columns() {
        let ir = test_support::ir();
        let erd = render_erd(&ir);
        let people = erd
            .split("    people {\n")
            .nth(1)
            .and_then(|rest| rest.split("    }\n").next())
            .unwrap();
        assert_eq!(people.lines().count(), ERD_MAX_COLUMNS);
        assert!(people.contains("UUID id PK"));
        assert!(people.contains("VARCHAR_20 status"));
        assert!(!people.contains("verified"));
        assert!(erd.contains("UUID customer_id FK"));
    }

    #[test]
    fn mermaid_words_are_sanitized() {
        assert_eq!(mermaid_word("TIMESTAMP WITH TIME ZONE"), "TIMESTAMP_WITH_TIME_ZONE");
        assert_eq!(mermaid_word("NUMERIC(10, 2)"), "NUMERIC_10_2");
        assert_eq!(mermaid_word("TEXT[]"), "TEXT");
        assert_eq!(mermaid_word("()"), "unknown");
    }

    #[test]
    fn tables_that_sanitize_alike_stay_separate_entities() {
        let ir = test_support::ir_from(
            "CREATE TABLE \"case-files\" (id UUID);\n\
             CREATE TABLE case_files (id UUID, origin UUID REFERENCES \"case-files\"(id));",
            "",
        );
        let erd = render_erd(&ir);
        assert!(erd.contains("    case_files {\n"));
        assert!(erd.contains("    case_files_2 {\n"));
        assert!(erd.contains("    case_files_2 }o--|| case_files : \"origin\"\n"));
    }

    #[test]
    fn overview_lists_tables_indexes_and_templates() {
        let ir = test_support::ir();
        let overview = render_overview(&ir, &Mappings::default());
        assert!(overview.contains("| `people` | PEO | 6 | yes | Individuals known to the chain |"));
        assert!(overview.contains("| `orders` | UNKNOWN | 4 |  | orders table |"));
        assert!(overview.contains("- `idx_people_name` on `people` (name) [btree]"));
        assert!(overview.contains("| 1 | 👤 People | PEO | 4 |"));
        assert!(!overview.contains("## Diagnostics"));
    }

    #[test]
    fn static_documents_do_not_depend_on_the_ir() {
        let a = emit(&test_support::ir(), &Mappings::default());
        let b = emit(&test_support::ir_from("", ""), &Mappings::default());
        for key in ["api-reference", "migration-guide"] {
            let find = |v: &[Artifact]| v.iter().find(|x| x.key == key).unwrap().content.clone();
            assert_eq!(find(&a), find(&b));
        }
    }
}
