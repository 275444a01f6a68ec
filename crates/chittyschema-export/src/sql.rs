//! SQL subset emitter.
//!
//! `complete` is the source verbatim. `core` and the per-entity artifacts are
//! re-serialized from the IR: description comment, table body (columns and
//! constraints) and the table's indexes. Functions, triggers and any statement
//! the parser does not model only survive in `complete`.

use chittyschema_ir::mapping::same_table;
use chittyschema_ir::{Artifact, ArtifactCategory, Constraint, Index, Mappings, SchemaIR, Table};

pub fn emit(ir: &SchemaIR, mappings: &Mappings) -> Vec<Artifact> {
    let mut out = Vec::new();

    out.push(Artifact::new(
        ArtifactCategory::Sql,
        "complete",
        "complete.sql",
        ir.source.clone(),
        "Complete schema source",
    ));

    let core: Vec<&Table> = ir
        .tables
        .iter()
        .filter(|t| mappings.is_core_table(&t.name))
        .collect();
    out.push(Artifact::new(
        ArtifactCategory::Sql,
        "core",
        "core.sql",
        render_subset(ir, "Core entity tables", &core),
        format!("Core tables ({})", core.len()),
    ));

    for name in &mappings.entity_tables {
        let Some(table) = ir.tables.iter().find(|t| same_table(&t.name, name)) else {
            continue;
        };
        out.push(Artifact::new(
            ArtifactCategory::Sql,
            name.clone(),
            format!("{name}.sql"),
            render_subset(ir, &format!("{} ({})", table.name, table.entity_type), &[table]),
            table.description.clone(),
        ));
    }

    out
}

fn render_subset(ir: &SchemaIR, title: &str, tables: &[&Table]) -> String {
    let mut out = String::new();
    out.push_str(&format!("-- ChittyChain schema: {title}\n"));
    out.push_str(&format!("-- Version: {}\n", ir.metadata.version));
    out.push_str(&format!("-- Source hash: {}\n", ir.metadata.content_hash));
    for table in tables {
        out.push('\n');
        render_table(&mut out, table);
        for index in ir.indexes_for(&table.name) {
            render_index(&mut out, index);
        }
    }
    out
}

fn render_table(out: &mut String, table: &Table) {
    out.push_str(&format!("-- {}\n", table.description));
    out.push_str(&format!("CREATE TABLE {} (\n", quote_ident(&table.name)));

    let mut items: Vec<String> = Vec::new();
    for column in &table.columns {
        let mut line = format!("    {} {}", quote_ident(&column.name), column.data_type);
        if column.primary_key {
            line.push_str(" PRIMARY KEY");
        }
        if column.unique {
            line.push_str(" UNIQUE");
        }
        if !column.nullable {
            line.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            line.push_str(&format!(" DEFAULT {default}"));
        }
        let declared_by_constraint = table.constraints.iter().any(|c| {
            matches!(c, Constraint::ForeignKey { columns, .. } if columns.len() == 1 && columns[0] == column.name)
        });
        if let (Some(r), false) = (&column.references, declared_by_constraint) {
            line.push_str(&format!(
                " REFERENCES {}({})",
                quote_ident(&r.table),
                quote_ident(&r.column)
            ));
        }
        items.push(line);
    }
    for constraint in &table.constraints {
        items.push(format!("    {}", render_constraint(constraint)));
    }

    out.push_str(&items.join(",\n"));
    out.push_str("\n);\n");
}

fn render_constraint(constraint: &Constraint) -> String {
    let prefix = constraint
        .name()
        .map(|n| format!("CONSTRAINT {} ", quote_ident(n)))
        .unwrap_or_default();
    let body = match constraint {
        Constraint::PrimaryKey { columns, .. } => format!("PRIMARY KEY ({})", ident_list(columns)),
        Constraint::Unique { columns, .. } => format!("UNIQUE ({})", ident_list(columns)),
        Constraint::ForeignKey {
            columns,
            references,
            ..
        } => format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            ident_list(columns),
            quote_ident(&references.table),
            quote_ident(&references.column)
        ),
        Constraint::Check { condition, .. } => format!("CHECK ({condition})"),
    };
    format!("{prefix}{body}")
}

fn render_index(out: &mut String, index: &Index) {
    let unique = if index.unique { "UNIQUE " } else { "" };
    // Expression keys are kept as written; plain names get identifier quoting.
    let columns: Vec<String> = index
        .columns
        .iter()
        .map(|c| {
            if c.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
                quote_ident(c)
            } else {
                c.clone()
            }
        })
        .collect();
    out.push_str(&format!(
        "CREATE {unique}INDEX {} ON {} USING {} ({});\n",
        quote_ident(&index.name),
        quote_ident(&index.table),
        index.method,
        columns.join(", ")
    ));
}

fn ident_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote identifiers that would not survive unquoted (mixed case, spaces, ...).
fn quote_ident(name: &str) -> String {
    let plain = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '.');
    if plain {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    fn find<'a>(artifacts: &'a [Artifact], key: &str) -> &'a Artifact {
        artifacts.iter().find(|a| a.key == key).unwrap()
    }

    #[test]
    fn complete_is_the_verbatim_source() {
        let ir = test_support::ir();
        let artifacts = emit(&ir, &Mappings::default());
        assert_eq!(find(&artifacts, "complete").content, test_support::SQL);
    }

    #[test]
    fn core_only_contains_whitelisted_tables() {
        let ir = test_support::ir();
        let artifacts = emit(&ir, &Mappings::default());
        let core = &find(&artifacts, "core").content;
        assert!(core.contains("CREATE TABLE people ("));
        assert!(core.contains("CREATE TABLE places ("));
        assert!(!core.contains("CREATE TABLE orders"));
        assert!(core.contains("-- Individuals known to the chain"));
        assert!(core.contains("CREATE INDEX idx_people_name ON people USING btree (name);"));
    }

    #[test]
    fn one_artifact_per_present_entity_table() {
        let ir = test_support::ir();
        let artifacts = emit(&ir, &Mappings::default());
        let keys: Vec<&str> = artifacts.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["complete", "core", "people", "places"]);
        assert_eq!(find(&artifacts, "people").filename, "people.sql");
    }

    #[test]
    fn qualified_entity_tables_get_their_own_artifact() {
        let ir = test_support::ir_from("CREATE TABLE public.people (id UUID PRIMARY KEY);", "");
        let artifacts = emit(&ir, &Mappings::default());
        assert!(find(&artifacts, "core").content.contains("CREATE TABLE public.people ("));
        let people = find(&artifacts, "people");
        assert_eq!(people.filename, "people.sql");
        assert!(people.content.contains("CREATE TABLE public.people ("));
    }

    #[test]
    fn columns_and_constraints_are_reserialized() {
        let ir = test_support::ir();
        let mut out = String::new();
        render_table(&mut out, ir.table("orders").unwrap());
        assert!(out.contains("    id SERIAL PRIMARY KEY,\n"));
        assert!(out.contains("    customer_id UUID REFERENCES customers(id),\n"));
        // Declared by the table-level constraint, not repeated inline.
        assert!(out.contains("    place_id UUID NOT NULL,\n"));
        assert!(out.contains("    FOREIGN KEY (place_id) REFERENCES places(id)\n);"));

        let mut people = String::new();
        render_table(&mut people, ir.table("people").unwrap());
        assert!(people.contains("status VARCHAR(20) NOT NULL DEFAULT 'active'"));
    }

    #[test]
    fn awkward_identifiers_are_quoted() {
        assert_eq!(quote_ident("people"), "people");
        assert_eq!(quote_ident("public.people"), "public.people");
        assert_eq!(quote_ident("Case Files"), "\"Case Files\"");
    }
}
