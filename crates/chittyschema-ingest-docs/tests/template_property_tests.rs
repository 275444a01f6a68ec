use chittyschema_ingest_docs::parse_template_document;
use proptest::prelude::*;

fn word() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Z][a-z]{1,8}")
        .unwrap()
        .prop_filter("reserved heading words", |s| {
            !matches!(s.as_str(), "Property" | "Type" | "Description" | "Database" | "Select")
        })
}

#[derive(Debug, Clone)]
struct SectionShape {
    name: String,
    code: String,
    properties: Vec<(String, String)>,
    options: Vec<(String, Vec<String>)>,
}

fn section() -> impl Strategy<Value = SectionShape> {
    (
        word(),
        proptest::string::string_regex("[A-Z]{2,5}").unwrap(),
        proptest::collection::vec((word(), word()), 0..6),
        proptest::collection::vec((word(), proptest::collection::vec(word(), 1..4)), 0..3),
    )
        .prop_map(|(name, code, properties, options)| {
            let mut seen = std::collections::HashSet::new();
            let properties = properties
                .into_iter()
                .filter(|(p, _)| seen.insert(p.clone()))
                .collect();
            let mut seen = std::collections::HashSet::new();
            let options = options
                .into_iter()
                .filter(|(label, _)| seen.insert(label.clone()))
                .collect();
            SectionShape {
                name,
                code,
                properties,
                options,
            }
        })
}

fn render(n: usize, s: &SectionShape) -> String {
    let mut out = format!("## Database {n}: {} ({})\n\n", s.name, s.code);
    if !s.properties.is_empty() {
        out.push_str("| Property | Type | Description |\n|---|---|---|\n");
        for (name, kind) in &s.properties {
            out.push_str(&format!("| {name} | {kind} | {name} field |\n"));
        }
        out.push('\n');
    }
    if !s.options.is_empty() {
        out.push_str("### Select Options\n");
        for (label, values) in &s.options {
            // First value on the label line, the rest on continuation lines.
            out.push_str(&format!("- **{label}**: {}\n", values[0]));
            for v in &values[1..] {
                out.push_str(&format!("  {v}\n"));
            }
        }
        out.push('\n');
    }
    out
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn sections_round_out_in_document_order(sections in proptest::collection::vec(section(), 0..5)) {
        let text: String = sections
            .iter()
            .enumerate()
            .map(|(i, s)| render(i + 1, s))
            .collect();
        let doc = parse_template_document(&format!("# Templates\n\n{text}"));

        prop_assert!(doc.diagnostics.is_empty(), "{:?}", doc.diagnostics);
        prop_assert_eq!(doc.templates.len(), sections.len());
        for (i, (expected, parsed)) in sections.iter().zip(&doc.templates).enumerate() {
            prop_assert_eq!(parsed.number as usize, i + 1);
            prop_assert_eq!(&parsed.name, &expected.name);
            prop_assert_eq!(&parsed.entity_code, &expected.code);
            let props: Vec<(String, String)> = parsed
                .properties
                .iter()
                .map(|(n, k, _)| (n.clone(), k.clone()))
                .collect();
            prop_assert_eq!(&props, &expected.properties);
            prop_assert_eq!(&parsed.select_options, &expected.options);
        }
    }
}
