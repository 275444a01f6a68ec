//! Template document ingestion
//!
//! Reads the human-authored workspace template document. Expected format:
//!
//! ```text
//! ## Database 1: People (PEO)
//!
//! | Property | Type  | Description     |
//! |----------|-------|-----------------|
//! | Name     | Title | Full legal name |
//! | Role     | Select| Case role       |
//!
//! ### Select Options
//! - **Role**: Plaintiff, Defendant,
//!   Witness
//! ```
//!
//! Each `Database N` heading opens a section that runs to the next one. A
//! missing property table or options block yields empty collections.

use chittyschema_ir::{Diagnostic, TemplateDefinition, TemplateDocument};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

fn heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*#{1,6}\s*(?:\*\*)?\s*Database\s+`?(\d+)`?\s*:\s*(.+?)\s*\(\s*`?([A-Za-z0-9_-]+)`?\s*\)\s*(?:\*\*)?\s*$",
        )
        .expect("heading regex")
    })
}

fn heading_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#{1,6}\s*(?:\*\*)?\s*Database\s+`?\d").expect("prefix regex"))
}

fn select_options_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^\s*(?:#{1,6}\s*)?(?:\*\*)?\s*select\s+options\b").expect("options regex")
    })
}

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:[-*+]\s+)?\*\*(.+?)\*\*\s*(.*)$").expect("label regex")
    })
}

/// Strip inline markup from a table cell or option label.
fn clean(text: &str) -> String {
    text.replace("**", "")
        .replace('`', "")
        .trim()
        .trim_matches('"')
        .trim()
        .to_string()
}

fn table_cells(line: &str) -> Option<Vec<String>> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|')?;
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    Some(inner.split('|').map(clean).collect())
}

fn is_separator_row(cells: &[String]) -> bool {
    cells.iter().all(|c| {
        let c = c.trim_matches(':');
        !c.is_empty() && c.chars().all(|ch| ch == '-')
    })
}

fn is_property_header(cells: &[String]) -> bool {
    let lower: Vec<String> = cells.iter().map(|c| c.to_ascii_lowercase()).collect();
    lower.len() >= 3 && lower[0] == "property" && lower[1] == "type" && lower[2] == "description"
}

struct Section<'a> {
    lines: &'a [&'a str],
    /// 1-based line number of `lines[0]`.
    first_line: usize,
}

impl Section<'_> {
    fn properties(&self, diagnostics: &mut Vec<Diagnostic>) -> Vec<(String, String, String)> {
        let Some(header) = self
            .lines
            .iter()
            .position(|l| table_cells(l).is_some_and(|cells| is_property_header(&cells)))
        else {
            return Vec::new();
        };

        let mut properties: Vec<(String, String, String)> = Vec::new();
        for (offset, line) in self.lines[header + 1..].iter().enumerate() {
            let line_no = self.first_line + header + 1 + offset;
            let Some(cells) = table_cells(line) else {
                break;
            };
            if is_separator_row(&cells) {
                continue;
            }
            if cells.len() < 2 || cells[0].is_empty() {
                diagnostics.push(Diagnostic::new(
                    line_no,
                    "property",
                    "property row needs at least a name and a type",
                ));
                continue;
            }
            let name = cells[0].clone();
            if properties.iter().any(|(n, _, _)| *n == name) {
                diagnostics.push(Diagnostic::new(
                    line_no,
                    "property",
                    format!("duplicate property `{name}`; first row kept"),
                ));
                continue;
            }
            let description = cells.get(2).cloned().unwrap_or_default();
            properties.push((name, cells[1].clone(), description));
        }
        properties
    }

    fn select_options(&self) -> Vec<(String, Vec<String>)> {
        let Some(start) = self.lines.iter().position(|l| select_options_re().is_match(l)) else {
            return Vec::new();
        };

        let mut options: Vec<(String, Vec<String>)> = Vec::new();
        let mut current: Option<usize> = None;
        for line in &self.lines[start + 1..] {
            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                break;
            }
            if trimmed.is_empty() {
                continue;
            }

            let values = if let Some(caps) = label_re().captures(line) {
                let label = clean(caps[1].trim_end().trim_end_matches(':'));
                let idx = match options.iter().position(|(name, _)| *name == label) {
                    Some(idx) => idx,
                    None => {
                        options.push((label, Vec::new()));
                        options.len() - 1
                    }
                };
                current = Some(idx);
                caps[2].trim_start_matches(':').to_string()
            } else if current.is_some() {
                trimmed
                    .trim_start_matches(|c| c == '-' || c == '*' || c == '+')
                    .to_string()
            } else {
                continue;
            };

            if let Some(idx) = current {
                options[idx].1.extend(
                    values
                        .split(',')
                        .map(clean)
                        .filter(|v| !v.is_empty()),
                );
            }
        }
        options
    }
}

/// Parse a template document into template definitions, in document order.
pub fn parse_template_document(text: &str) -> TemplateDocument {
    let lines: Vec<&str> = text.lines().collect();
    let mut doc = TemplateDocument::default();

    let mut heads = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(caps) = heading_re().captures(line) {
            let number: u32 = caps[1].parse().unwrap_or(0);
            heads.push((i, number, clean(&caps[2]), caps[3].to_string()));
        } else if heading_prefix_re().is_match(line) {
            doc.diagnostics.push(Diagnostic::new(
                i + 1,
                "template",
                format!("heading `{}` lacks the `N: Name (CODE)` form", line.trim()),
            ));
        }
    }

    for (k, (i, number, name, code)) in heads.iter().enumerate() {
        let end = heads.get(k + 1).map(|h| h.0).unwrap_or(lines.len());
        let section = Section {
            lines: &lines[i + 1..end],
            first_line: i + 2,
        };
        let properties = section.properties(&mut doc.diagnostics);
        let select_options = section.select_options();
        debug!(
            template = %name,
            properties = properties.len(),
            select_options = select_options.len(),
            "parsed template section"
        );
        doc.templates.push(TemplateDefinition {
            number: *number,
            name: name.clone(),
            entity_code: code.clone(),
            properties,
            select_options,
            line: i + 1,
        });
    }

    doc
}
