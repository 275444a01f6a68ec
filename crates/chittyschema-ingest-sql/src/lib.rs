//! SQL DDL extraction for ChittySchema
//!
//! Extracts the schema structure the emitters need from hand-written DDL:
//! - `CREATE TABLE` → tables, columns, constraints
//! - `CREATE FUNCTION` → functions (signature, body, language)
//! - `CREATE TRIGGER` → triggers
//! - `CREATE INDEX` → indexes
//! - `COMMENT ON TABLE|COLUMN` → description overrides
//!
//! This is a best-effort extractor, not a validator: anything it does not
//! recognize is skipped and reported as a [`Diagnostic`].

use chittyschema_ir::{
    Column, Constraint, DdlExtraction, Diagnostic, ForeignRef, Function, Index, Table, Trigger,
    UNKNOWN_NAMESPACE,
};
use sqlparser::tokenizer::Token;
use tracing::{debug, warn};

pub mod tokens;

use tokens::{ident, is_keyword, is_trivia, line_comment, line_of, text, tokenize, Tok};

/// Words that end a column's `DEFAULT` expression.
const COLUMN_MODIFIERS: &[&str] = &[
    "NOT", "NULL", "PRIMARY", "REFERENCES", "UNIQUE", "CHECK", "CONSTRAINT", "GENERATED",
    "COLLATE", "DEFAULT",
];

/// Words that end a function's `RETURNS` clause.
const FUNCTION_CLAUSES: &[&str] = &["AS", "LANGUAGE", "IMMUTABLE", "STABLE", "VOLATILE", "STRICT"];

// ============================================================================
// Cursor
// ============================================================================

/// Walks one statement's tokens, skipping whitespace and comments.
struct Cursor<'a> {
    tokens: &'a [Tok],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Tok]) -> Self {
        let mut c = Self { tokens, pos: 0 };
        c.skip_trivia();
        c
    }

    fn skip_trivia(&mut self) {
        while self.tokens.get(self.pos).is_some_and(is_trivia) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<&'a Tok> {
        self.tokens.get(self.pos)
    }

    fn peek_nth(&self, n: usize) -> Option<&'a Tok> {
        self.tokens.get(self.pos..)?.iter().filter(|t| !is_trivia(t)).nth(n)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&'a Tok> {
        let t = self.tokens.get(self.pos)?;
        self.pos += 1;
        self.skip_trivia();
        Some(t)
    }

    fn is_kw(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| is_keyword(t, kw))
    }

    fn is_any_kw(&self, kws: &[&str]) -> bool {
        kws.iter().any(|kw| self.is_kw(kw))
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        let hit = self.is_kw(kw);
        if hit {
            self.advance();
        }
        hit
    }

    /// Consume the whole keyword sequence or nothing.
    fn eat_seq(&mut self, kws: &[&str]) -> bool {
        let hit = kws
            .iter()
            .enumerate()
            .all(|(i, kw)| self.peek_nth(i).is_some_and(|t| is_keyword(t, kw)));
        if hit {
            for _ in kws {
                self.advance();
            }
        }
        hit
    }

    fn is(&self, token: &Token) -> bool {
        self.peek().is_some_and(|t| &t.token == token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        let hit = self.is(token);
        if hit {
            self.advance();
        }
        hit
    }

    /// A possibly schema-qualified name (`public."People"` → `public.People`).
    fn name(&mut self) -> Option<String> {
        let mut parts = Vec::new();
        while let Some(part) = self.peek().and_then(ident) {
            parts.push(part);
            self.advance();
            let dotted = self.is(&Token::Period)
                && self.peek_nth(1).and_then(ident).is_some();
            if !dotted {
                break;
            }
            self.advance();
        }
        (!parts.is_empty()).then(|| parts.join("."))
    }

    /// If at `(`, consume through the matching `)` and return the inner tokens.
    /// An unbalanced group takes the rest of the statement.
    fn group(&mut self) -> Option<&'a [Tok]> {
        if !self.is(&Token::LParen) {
            return None;
        }
        let tokens = self.tokens;
        let open = self.pos;
        let mut depth = 0usize;
        for (i, t) in tokens.iter().enumerate().skip(open) {
            match t.token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos = i;
                        self.advance();
                        return Some(&tokens[open + 1..i]);
                    }
                }
                _ => {}
            }
        }
        self.pos = tokens.len();
        Some(&tokens[open + 1..])
    }

    /// Text of everything up to the first top-level keyword in `stops`.
    fn take_until(&mut self, stops: &[&str]) -> String {
        let start = self.pos;
        while !self.at_end() && !self.is_any_kw(stops) {
            if self.group().is_none() {
                self.advance();
            }
        }
        text(&self.tokens[start..self.pos])
    }
}

/// Split a token range on top-level commas.
fn split_top_level(tokens: &[Tok]) -> Vec<&[Tok]> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, t) in tokens.iter().enumerate() {
        match t.token {
            Token::LParen | Token::LBracket => depth += 1,
            Token::RParen | Token::RBracket => depth -= 1,
            Token::Comma if depth == 0 => {
                items.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&tokens[start..]);
    items
}

/// `(a, "B", c)` → `[a, B, c]`.
fn ident_list(tokens: &[Tok]) -> Vec<String> {
    split_top_level(tokens)
        .into_iter()
        .filter_map(|item| item.iter().find(|t| !is_trivia(t)).and_then(ident))
        .collect()
}

/// The first contiguous run of `--` lines above `line` (1-based), skipping
/// blank lines in between and separator-only comments, joined top-down.
fn comment_above(lines: &[&str], line: usize) -> Option<String> {
    let mut idx = line.checked_sub(1)?;
    while idx > 0 && lines[idx - 1].trim().is_empty() {
        idx -= 1;
    }
    let mut collected = Vec::new();
    while let Some(comment) = idx.checked_sub(1).and_then(|i| lines[i].trim().strip_prefix("--")) {
        let comment = comment.trim_start_matches('-').trim();
        if comment.chars().any(char::is_alphanumeric) {
            collected.push(comment.to_string());
        }
        idx -= 1;
    }
    collected.reverse();
    (!collected.is_empty()).then(|| collected.join(" "))
}

// ============================================================================
// Statement parsing
// ============================================================================

struct Parser<'a> {
    lines: Vec<&'a str>,
    out: DdlExtraction,
    /// `COMMENT ON` texts, applied once every table is known:
    /// `(line, on_column, target, text)`.
    comments: Vec<(usize, bool, String, String)>,
}

impl<'a> Parser<'a> {
    fn diag(&mut self, line: usize, construct: &str, reason: impl Into<String>) {
        self.out
            .diagnostics
            .push(Diagnostic::new(line, construct, reason));
    }

    fn statement(&mut self, tokens: &[Tok]) {
        let mut c = Cursor::new(tokens);
        let Some(first) = c.peek() else {
            return;
        };
        let line = line_of(first);

        if c.eat_kw("CREATE") {
            c.eat_seq(&["OR", "REPLACE"]);
            let unique = c.eat_kw("UNIQUE");
            if !unique {
                if c.is_any_kw(&["TEMP", "TEMPORARY", "UNLOGGED"]) {
                    c.advance();
                }
                if c.eat_kw("TABLE") {
                    return self.create_table(c, line);
                }
                if c.eat_kw("FUNCTION") {
                    return self.create_function(c, line);
                }
                if c.eat_kw("TRIGGER") || c.eat_seq(&["CONSTRAINT", "TRIGGER"]) {
                    return self.create_trigger(c, line);
                }
            }
            if c.eat_kw("INDEX") {
                return self.create_index(c, line, unique);
            }
        } else if c.eat_seq(&["COMMENT", "ON"]) {
            return self.comment_on(c, line);
        }

        let head: Vec<String> = tokens
            .iter()
            .filter(|t| !is_trivia(t))
            .take(6)
            .map(|t| t.token.to_string())
            .collect();
        self.diag(line, "statement", format!("unsupported statement `{}`", head.join(" ")));
    }

    fn create_table(&mut self, mut c: Cursor<'_>, line: usize) {
        c.eat_seq(&["IF", "NOT", "EXISTS"]);
        let Some(name) = c.name() else {
            return self.diag(line, "table", "CREATE TABLE without a name");
        };
        let Some(body) = c.group() else {
            return self.diag(line, "table", format!("table `{name}` has no column list"));
        };

        let mut table = Table {
            description: comment_above(&self.lines, line)
                .unwrap_or_else(|| format!("{name} table")),
            name,
            columns: Vec::new(),
            constraints: Vec::new(),
            entity_type: UNKNOWN_NAMESPACE.to_string(),
            line,
        };

        // Line of each column's last token, for trailing `--` descriptions.
        let mut column_ends = Vec::new();
        for item in split_top_level(body) {
            let mut ic = Cursor::new(item);
            let Some(head) = ic.peek() else {
                continue;
            };
            let item_line = line_of(head);
            if is_constraint_start(&ic) {
                match parse_constraint(&mut ic) {
                    Ok(constraint) => table.constraints.push(constraint),
                    Err(reason) => self.diag(item_line, "constraint", reason),
                }
                continue;
            }
            let mut notes = Vec::new();
            match parse_column(&mut ic, &mut table.constraints, &mut notes) {
                Ok(column) if table.column(&column.name).is_some() => {
                    let reason = format!(
                        "duplicate column `{}` in table `{}`; first definition kept",
                        column.name, table.name
                    );
                    self.diag(item_line, "column", reason);
                }
                Ok(column) => {
                    let end = item.iter().rev().find(|t| !is_trivia(t)).map(line_of);
                    column_ends.push((table.columns.len(), end));
                    table.columns.push(column);
                }
                Err(reason) => self.diag(item_line, "column", reason),
            }
            for note in notes {
                self.diag(item_line, "column", note);
            }
        }

        for t in body {
            let Some(comment) = line_comment(t) else {
                continue;
            };
            let owner = column_ends.iter().rev().find(|(_, end)| *end == Some(line_of(t)));
            if let Some(&(i, _)) = owner {
                table.columns[i].description = Some(comment.to_string());
            }
        }

        // Single-column table-level foreign keys also annotate their column.
        let fks: Vec<(String, ForeignRef)> = table
            .constraints
            .iter()
            .filter_map(|c| match c {
                Constraint::ForeignKey {
                    columns,
                    references,
                    ..
                } if columns.len() == 1 => Some((columns[0].clone(), references.clone())),
                _ => None,
            })
            .collect();
        for (column, reference) in fks {
            if let Some(col) = table.column_mut(&column) {
                col.references.get_or_insert(reference);
            }
        }

        debug!(table = %table.name, columns = table.columns.len(), "parsed table");
        self.upsert_table(table);
    }

    fn upsert_table(&mut self, table: Table) {
        match self.out.tables.iter().position(|t| t.name == table.name) {
            Some(i) => {
                warn!(table = %table.name, "table redefined; later definition wins");
                let reason = format!(
                    "table `{}` redefined (first at line {}); later definition wins",
                    table.name, self.out.tables[i].line
                );
                self.diag(table.line, "table", reason);
                self.out.tables[i] = table;
            }
            None => self.out.tables.push(table),
        }
    }

    fn create_function(&mut self, mut c: Cursor<'_>, line: usize) {
        let Some(name) = c.name() else {
            return self.diag(line, "function", "CREATE FUNCTION without a name");
        };
        let parameters = c.group().map(text).unwrap_or_default();

        let mut return_type = String::new();
        let mut body = String::new();
        let mut language = String::new();
        while !c.at_end() {
            if c.eat_kw("RETURNS") {
                return_type = c.take_until(FUNCTION_CLAUSES);
            } else if c.eat_kw("AS") {
                body = match c.advance().map(|t| &t.token) {
                    Some(Token::DollarQuotedString(s)) => s.value.trim().to_string(),
                    Some(Token::SingleQuotedString(s)) => s.trim().to_string(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
            } else if c.eat_kw("LANGUAGE") {
                language = match c.advance().map(|t| &t.token) {
                    Some(Token::Word(w)) => w.value.to_ascii_lowercase(),
                    Some(Token::SingleQuotedString(s)) => s.to_ascii_lowercase(),
                    _ => String::new(),
                };
            } else {
                c.advance();
            }
        }

        if body.is_empty() {
            self.diag(line, "function", format!("function `{name}` has no body"));
        }
        self.out.functions.push(Function {
            description: comment_above(&self.lines, line)
                .unwrap_or_else(|| format!("{name} function")),
            name,
            parameters,
            return_type,
            body,
            language,
        });
    }

    fn create_trigger(&mut self, mut c: Cursor<'_>, line: usize) {
        let Some(name) = c.name() else {
            return self.diag(line, "trigger", "CREATE TRIGGER without a name");
        };
        let timing = if c.eat_seq(&["INSTEAD", "OF"]) {
            "INSTEAD OF".to_string()
        } else if c.is_any_kw(&["BEFORE", "AFTER"]) {
            c.advance().and_then(ident).unwrap_or_default().to_ascii_uppercase()
        } else {
            return self.diag(line, "trigger", format!("trigger `{name}` has no timing"));
        };

        let mut events = Vec::new();
        let mut table = None;
        let mut for_each = "STATEMENT".to_string();
        let mut function = None;
        while !c.at_end() {
            if table.is_none() && c.is_any_kw(&["INSERT", "UPDATE", "DELETE", "TRUNCATE"]) {
                events.extend(c.advance().and_then(ident).map(|e| e.to_ascii_uppercase()));
            } else if table.is_none() && c.eat_kw("ON") {
                table = c.name();
            } else if c.eat_kw("EACH") {
                for_each = c.advance().and_then(ident).unwrap_or_default().to_ascii_uppercase();
            } else if c.eat_kw("EXECUTE") {
                c.advance(); // FUNCTION | PROCEDURE
                function = c.name();
            } else if c.group().is_none() {
                c.advance();
            }
        }

        let (Some(table), Some(function)) = (table, function) else {
            return self.diag(line, "trigger", format!("trigger `{name}` needs ON and EXECUTE"));
        };
        self.out.triggers.push(Trigger {
            name,
            timing,
            events,
            table,
            for_each,
            function,
        });
    }

    fn create_index(&mut self, mut c: Cursor<'_>, line: usize, unique: bool) {
        c.eat_kw("CONCURRENTLY");
        c.eat_seq(&["IF", "NOT", "EXISTS"]);
        let name = if c.is_kw("ON") { None } else { c.name() };
        c.eat_kw("ON");
        c.eat_kw("ONLY");
        let Some(table) = c.name() else {
            return self.diag(line, "index", "CREATE INDEX without ON table");
        };
        let method = if c.eat_kw("USING") {
            c.advance().and_then(ident).map(|m| m.to_ascii_lowercase())
        } else {
            None
        };
        let Some(group) = c.group() else {
            return self.diag(line, "index", format!("index on `{table}` has no column list"));
        };
        let columns: Vec<String> = split_top_level(group)
            .into_iter()
            .map(index_column)
            .filter(|s| !s.is_empty())
            .collect();

        self.out.indexes.push(Index {
            name: name.unwrap_or_else(|| format!("{}_{}_idx", table, columns.join("_"))),
            description: comment_above(&self.lines, line)
                .unwrap_or_else(|| format!("Index on {} ({})", table, columns.join(", "))),
            table,
            method: method.unwrap_or_else(|| "btree".to_string()),
            columns,
            unique,
        });
    }

    fn comment_on(&mut self, mut c: Cursor<'_>, line: usize) {
        let on_column = if c.eat_kw("TABLE") {
            false
        } else if c.eat_kw("COLUMN") {
            true
        } else {
            return self.diag(line, "comment", "only COMMENT ON TABLE|COLUMN is used");
        };
        let Some(target) = c.name() else {
            return self.diag(line, "comment", "COMMENT ON without a target");
        };
        match c.eat_kw("IS").then(|| c.peek()).flatten().map(|t| &t.token) {
            Some(Token::SingleQuotedString(text)) => {
                self.comments.push((line, on_column, target, text.clone()))
            }
            _ => self.diag(line, "comment", format!("COMMENT ON `{target}` has no text")),
        }
    }

    fn apply_comments(&mut self) {
        for (line, on_column, target, text) in std::mem::take(&mut self.comments) {
            let (table, column) = match target.rsplit_once('.') {
                Some((table, column)) if on_column => (table, Some(column)),
                _ if on_column => ("", Some(target.as_str())),
                _ => (target.as_str(), None),
            };
            let applied = match (self.out.tables.iter_mut().find(|t| t.name == table), column) {
                (Some(t), None) => {
                    t.description = text;
                    true
                }
                (Some(t), Some(column)) => t
                    .column_mut(column)
                    .map(|col| col.description = Some(text))
                    .is_some(),
                (None, _) => false,
            };
            if !applied {
                let kind = if on_column { "column" } else { "table" };
                self.diag(line, "comment", format!("comment on unknown {kind} `{target}`"));
            }
        }
    }
}

fn is_constraint_start(c: &Cursor<'_>) -> bool {
    let keyed = |kw: &str| c.is_kw(kw) && c.peek_nth(1).is_some_and(|t| is_keyword(t, "KEY"));
    c.is_any_kw(&["CONSTRAINT", "UNIQUE", "CHECK", "REFERENCES", "EXCLUDE"])
        || keyed("PRIMARY")
        || keyed("FOREIGN")
}

fn parse_reference(c: &mut Cursor<'_>) -> Result<ForeignRef, String> {
    let table = c.name().ok_or("REFERENCES without a table")?;
    let column = c
        .group()
        .and_then(|g| ident_list(g).into_iter().next())
        .unwrap_or_else(|| "id".to_string());
    Ok(ForeignRef { table, column })
}

fn parse_constraint(c: &mut Cursor<'_>) -> Result<Constraint, String> {
    let name = if c.eat_kw("CONSTRAINT") { c.name() } else { None };
    let columns = |c: &mut Cursor<'_>| c.group().map(ident_list).unwrap_or_default();

    if c.eat_seq(&["PRIMARY", "KEY"]) {
        return Ok(Constraint::PrimaryKey {
            name,
            columns: columns(c),
        });
    }
    if c.eat_kw("UNIQUE") {
        c.eat_seq(&["NULLS", "NOT", "DISTINCT"]);
        return Ok(Constraint::Unique {
            name,
            columns: columns(c),
        });
    }
    let fk_columns = if c.eat_seq(&["FOREIGN", "KEY"]) {
        Some(columns(c))
    } else {
        None
    };
    if c.eat_kw("REFERENCES") {
        return Ok(Constraint::ForeignKey {
            name,
            columns: fk_columns.unwrap_or_default(),
            references: parse_reference(c)?,
        });
    }
    if fk_columns.is_some() {
        return Err("FOREIGN KEY without REFERENCES".to_string());
    }
    if c.eat_kw("CHECK") {
        let condition = c.group().map(text).unwrap_or_default();
        return Ok(Constraint::Check { name, condition });
    }

    let head = c.peek().map(|t| t.token.to_string()).unwrap_or_default();
    Err(format!("unsupported table constraint `{head}`"))
}

/// Column type: base word plus arguments, array suffixes and the multi-word
/// forms Postgres allows.
fn parse_type(c: &mut Cursor<'_>) -> Option<String> {
    let start = c.pos;
    let base = c.peek().and_then(ident)?.to_ascii_uppercase();
    c.advance();
    match base.as_str() {
        "DOUBLE" => {
            c.eat_kw("PRECISION");
        }
        "CHARACTER" | "CHAR" | "BIT" => {
            c.eat_kw("VARYING");
        }
        _ => {}
    }
    c.group();
    let _ = c.eat_seq(&["WITH", "TIME", "ZONE"]) || c.eat_seq(&["WITHOUT", "TIME", "ZONE"]);
    while c.eat(&Token::LBracket) {
        while !c.at_end() && !c.eat(&Token::RBracket) {
            c.advance();
        }
    }
    // `VARCHAR (255)` and `TEXT []` read the same as their compact forms.
    let text = text(&c.tokens[start..c.pos]);
    Some(text.replace(" (", "(").replace(" [", "["))
}

/// Column declaration. Recoverable oddities go to `notes`.
fn parse_column(
    c: &mut Cursor<'_>,
    constraints: &mut Vec<Constraint>,
    notes: &mut Vec<String>,
) -> Result<Column, String> {
    let name = c
        .peek()
        .and_then(ident)
        .ok_or("column declaration does not start with a name")?;
    c.advance();
    let data_type = parse_type(c).ok_or_else(|| format!("column `{name}` has no type"))?;

    let mut column = Column {
        name,
        data_type,
        nullable: true,
        default: None,
        references: None,
        description: None,
        primary_key: false,
        unique: false,
    };

    while !c.at_end() {
        if c.eat_seq(&["NOT", "NULL"]) {
            column.nullable = false;
        } else if c.eat_kw("DEFAULT") {
            let expr = if c.eat_kw("NULL") {
                "NULL".to_string()
            } else {
                c.take_until(COLUMN_MODIFIERS)
            };
            if expr.is_empty() {
                notes.push(format!("column `{}` has DEFAULT without an expression", column.name));
            } else {
                column.default = Some(expr);
            }
        } else if c.eat_seq(&["PRIMARY", "KEY"]) {
            column.primary_key = true;
        } else if c.eat_kw("UNIQUE") {
            column.unique = true;
        } else if c.eat_kw("REFERENCES") {
            column.references = Some(parse_reference(c)?);
        } else if c.eat_kw("CHECK") {
            let condition = c.group().map(text).unwrap_or_default();
            constraints.push(Constraint::Check {
                name: None,
                condition,
            });
        } else if c.eat_kw("CONSTRAINT") {
            c.name();
        } else if c.group().is_none() {
            c.advance();
        }
    }
    Ok(column)
}

/// Index key text; plain columns drop ordering options (`name DESC` → `name`).
fn index_column(item: &[Tok]) -> String {
    let code: Vec<&Tok> = item.iter().filter(|t| !is_trivia(t)).collect();
    let ordering = ["ASC", "DESC", "NULLS", "FIRST", "LAST"];
    match code.split_first() {
        Some((first, rest))
            if rest.iter().all(|t| ordering.iter().any(|kw| is_keyword(t, kw))) =>
        {
            ident(first).unwrap_or_else(|| text(item))
        }
        _ => text(item),
    }
}

/// Parse SQL DDL and extract schema structure.
///
/// Never fails: unrecognized statements and items are skipped and reported in
/// [`DdlExtraction::diagnostics`].
pub fn parse_sql_ddl(sql: &str) -> DdlExtraction {
    let (tokens, token_diagnostic) = tokenize(sql);
    let mut parser = Parser {
        lines: sql.lines().collect(),
        out: DdlExtraction::default(),
        comments: Vec::new(),
    };
    for stmt in tokens.split(|t| t.token == Token::SemiColon) {
        parser.statement(stmt);
    }
    parser.apply_comments();
    parser.out.diagnostics.extend(token_diagnostic);

    debug!(
        tables = parser.out.tables.len(),
        functions = parser.out.functions.len(),
        triggers = parser.out.triggers.len(),
        indexes = parser.out.indexes.len(),
        diagnostics = parser.out.diagnostics.len(),
        "parsed SQL DDL"
    );
    parser.out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn people_table_scenario() {
        let ddl = parse_sql_ddl(
            "CREATE TABLE people (id UUID PRIMARY KEY, name TEXT NOT NULL, bio TEXT);",
        );
        assert_eq!(ddl.tables.len(), 1);
        let people = &ddl.tables[0];
        assert_eq!(people.name, "people");
        assert_eq!(people.columns.len(), 3);
        assert!(!people.column("name").unwrap().nullable);
        assert!(people.column("bio").unwrap().nullable);
        assert!(people.column("id").unwrap().primary_key);
        assert_eq!(people.description, "people table");
        assert!(ddl.diagnostics.is_empty());
    }

    #[test]
    fn index_scenario() {
        let ddl = parse_sql_ddl("CREATE INDEX idx_people_name ON people (name);");
        assert_eq!(
            ddl.indexes,
            vec![Index {
                name: "idx_people_name".to_string(),
                table: "people".to_string(),
                method: "btree".to_string(),
                columns: vec!["name".to_string()],
                unique: false,
                description: "Index on people (name)".to_string(),
            }]
        );
    }

    #[test]
    fn column_reference_scenario() {
        let ddl = parse_sql_ddl(
            "CREATE TABLE orders (\n  id UUID,\n  customer_id UUID REFERENCES customers(id)\n);",
        );
        let col = ddl.tables[0].column("customer_id").unwrap();
        assert_eq!(
            col.references,
            Some(ForeignRef {
                table: "customers".to_string(),
                column: "id".to_string()
            })
        );
    }

    #[test]
    fn types_and_defaults_keep_their_full_text() {
        let ddl = parse_sql_ddl(
            "CREATE TABLE t (\n\
               a VARCHAR(255) NOT NULL DEFAULT 'x',\n\
               b TIMESTAMP WITH TIME ZONE DEFAULT NOW() NOT NULL,\n\
               c TEXT[] DEFAULT '{}',\n\
               d DOUBLE PRECISION,\n\
               e NUMERIC (10, 2) DEFAULT 0 CHECK (e >= 0)\n\
             );",
        );
        let t = &ddl.tables[0];
        let a = t.column("a").unwrap();
        assert_eq!(a.data_type, "VARCHAR(255)");
        assert_eq!(a.default.as_deref(), Some("'x'"));
        let b = t.column("b").unwrap();
        assert_eq!(b.data_type, "TIMESTAMP WITH TIME ZONE");
        assert_eq!(b.default.as_deref(), Some("NOW()"));
        assert!(!b.nullable);
        assert_eq!(t.column("c").unwrap().data_type, "TEXT[]");
        assert_eq!(t.column("d").unwrap().data_type, "DOUBLE PRECISION");
        let e = t.column("e").unwrap();
        assert_eq!(e.data_type, "NUMERIC(10, 2)");
        assert_eq!(e.default.as_deref(), Some("0"));
        assert_eq!(
            t.constraints,
            vec![Constraint::Check {
                name: None,
                condition: "e >= 0".to_string()
            }]
        );
    }

    #[test]
    fn constraint_items_are_not_columns() {
        let ddl = parse_sql_ddl(
            "CREATE TABLE events (\n\
               id UUID,\n\
               place_id UUID,\n\
               code TEXT,\n\
               PRIMARY KEY (id),\n\
               CONSTRAINT events_place_fk FOREIGN KEY (place_id) REFERENCES places(id),\n\
               UNIQUE (code),\n\
               CHECK (code <> '')\n\
             );",
        );
        let t = &ddl.tables[0];
        assert_eq!(t.columns.len(), 3);
        assert_eq!(t.constraints.len(), 4);
        assert_eq!(t.constraints[1].name(), Some("events_place_fk"));
        assert_eq!(
            t.column("place_id").unwrap().references.as_ref().map(|r| r.table.as_str()),
            Some("places")
        );
    }

    #[test]
    fn descriptions_come_from_comments() {
        let sql = "\
-- ==========================
-- People: natural persons
-- ==========================

CREATE TABLE people (
    id UUID PRIMARY KEY, -- stable identifier
    name TEXT NOT NULL   -- legal name
);

CREATE TABLE places (id UUID);
COMMENT ON TABLE places IS 'Physical locations';
COMMENT ON COLUMN places.id IS 'Place id';
";
        let ddl = parse_sql_ddl(sql);
        let people = ddl.table("people").unwrap();
        assert_eq!(people.description, "People: natural persons");
        assert_eq!(
            people.column("id").unwrap().description.as_deref(),
            Some("stable identifier")
        );
        assert_eq!(
            people.column("name").unwrap().description.as_deref(),
            Some("legal name")
        );
        let places = ddl.table("places").unwrap();
        assert_eq!(places.description, "Physical locations");
        assert_eq!(places.column("id").unwrap().description.as_deref(), Some("Place id"));
    }

    #[test]
    fn functions_and_triggers() {
        let sql = "\
-- Keeps updated_at current
CREATE OR REPLACE FUNCTION touch_updated_at()
RETURNS TRIGGER AS $$
BEGIN
  NEW.updated_at = NOW();
  RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER people_touch
  BEFORE INSERT OR UPDATE ON people
  FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";
        let ddl = parse_sql_ddl(sql);
        assert!(ddl.diagnostics.is_empty(), "{:?}", ddl.diagnostics);
        let f = &ddl.functions[0];
        assert_eq!(f.name, "touch_updated_at");
        assert_eq!(f.return_type, "TRIGGER");
        assert_eq!(f.language, "plpgsql");
        assert!(f.body.starts_with("BEGIN"));
        assert_eq!(f.description, "Keeps updated_at current");

        let t = &ddl.triggers[0];
        assert_eq!(t.name, "people_touch");
        assert_eq!(t.timing, "BEFORE");
        assert_eq!(t.events, vec!["INSERT", "UPDATE"]);
        assert_eq!(t.table, "people");
        assert_eq!(t.for_each, "ROW");
        assert_eq!(t.function, "touch_updated_at");
    }

    #[test]
    fn unique_index_with_method_and_options() {
        let ddl = parse_sql_ddl(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_e ON events USING gin (tags, lower(title) DESC);",
        );
        let idx = &ddl.indexes[0];
        assert!(idx.unique);
        assert_eq!(idx.method, "gin");
        assert_eq!(idx.columns, vec!["tags", "lower(title) DESC"]);
    }

    #[test]
    fn unsupported_statements_become_diagnostics() {
        let ddl = parse_sql_ddl(
            "CREATE EXTENSION IF NOT EXISTS \"uuid-ossp\";\nCREATE TABLE a (id INT);",
        );
        assert_eq!(ddl.tables.len(), 1);
        assert_eq!(ddl.diagnostics.len(), 1);
        assert_eq!(ddl.diagnostics[0].line, 1);
        assert_eq!(ddl.diagnostics[0].construct, "statement");
    }

    #[test]
    fn redefined_table_overrides_with_diagnostic() {
        let ddl = parse_sql_ddl(
            "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\nCREATE TABLE a (id INT, x TEXT);",
        );
        assert_eq!(ddl.tables.len(), 2);
        assert_eq!(ddl.tables[0].name, "a");
        assert_eq!(ddl.tables[0].columns.len(), 2);
        assert_eq!(ddl.diagnostics.len(), 1);
        assert_eq!(ddl.diagnostics[0].line, 3);
    }

    #[test]
    fn semicolons_inside_function_bodies_do_not_split_statements() {
        let sql = "CREATE FUNCTION f() RETURNS INT LANGUAGE sql AS 'SELECT 1; SELECT 2';\n\
                   CREATE TABLE z (id INT);";
        let ddl = parse_sql_ddl(sql);
        assert_eq!(ddl.functions.len(), 1);
        assert_eq!(ddl.functions[0].body, "SELECT 1; SELECT 2");
        assert_eq!(ddl.functions[0].return_type, "INT");
        assert_eq!(ddl.tables.len(), 1);
    }

    #[test]
    fn bare_default_is_reported_and_ignored() {
        let ddl = parse_sql_ddl("CREATE TABLE t (a INT DEFAULT, b INT DEFAULT NULL NOT NULL);");
        let t = &ddl.tables[0];
        assert_eq!(t.column("a").unwrap().default, None);
        assert_eq!(t.column("b").unwrap().default.as_deref(), Some("NULL"));
        assert_eq!(ddl.diagnostics.len(), 1);
        assert_eq!(ddl.diagnostics[0].construct, "column");
        assert!(ddl.diagnostics[0].reason.contains("`a`"));
    }

    #[test]
    fn unterminated_dollar_body_is_a_diagnostic_not_a_panic() {
        let ddl = parse_sql_ddl(
            "CREATE TABLE a (id INT);\nCREATE FUNCTION f() RETURNS int AS $a$ éé",
        );
        assert_eq!(ddl.tables.len(), 1);
        assert!(ddl.functions.is_empty());
        assert!(ddl.diagnostics.iter().any(|d| d.construct == "token" && d.line == 2));
    }
}
