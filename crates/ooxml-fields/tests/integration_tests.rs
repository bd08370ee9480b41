/*
 * integration_tests.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Integration tests for ooxml-fields using test fixtures.
 */

use ooxml_fields::{
    BranchContent, BranchItem, DataContext, FieldProcessor, ProcessOptions, extract_fields,
    process_document, process_document_json, simplify_xml,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::path::{Path, PathBuf};

/// Helper to get the path to test fixtures
fn fixture_path(name: &str) -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    Path::new(manifest_dir).join("tests").join("fixtures").join(name)
}

/// Helper to load a fixture document
fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

fn lease_data() -> DataContext {
    DataContext::new(json!({
        "steplessornumber": {
            "questionlessornumber": "Non, une seule personne est bailleur du bien"
        },
        "step_info": {
            "q_companyname": {"q_companyname": "Test Company"},
            "q_contractreference": {"q_contractreference": "REF123"}
        }
    }))
}

#[test]
fn test_merge_field_substitution() {
    let xml = load_fixture("merge_field.xml");
    let output = process_document(&xml, Some(&lease_data()), &ProcessOptions::default()).unwrap();

    assert!(output.diagnostics.is_empty());
    assert!(output.xml.contains(
        r#"<w:t data-merge-field="step_info.q_companyname.q_companyname">..........</w:t>"#
    ));
    assert!(
        output
            .xml
            .contains("<!--MERGEFIELD:step_info.q_companyname.q_companyname-->")
    );
    assert!(!output.xml.contains("«"));
    // The field code itself is kept.
    assert!(output.xml.contains("MERGEFIELD step_info.q_companyname.q_companyname </w:instrText>"));
    assert!(output.xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#));
}

#[test]
fn test_substitution_records_read_back() {
    let xml = load_fixture("merge_field.xml");
    let mut processor = FieldProcessor::new(&xml, ProcessOptions::default()).unwrap();
    assert!(processor.substitution_records().is_empty());

    assert_eq!(processor.process_merge_fields(), 1);
    let records = processor.substitution_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].field, "step_info.q_companyname.q_companyname");
    assert_eq!(records[0].value, "..........");
}

#[test]
fn test_if_field_true_branch() {
    let xml = load_fixture("if_field.xml");
    let output = process_document(&xml, Some(&lease_data()), &ProcessOptions::default()).unwrap();

    assert!(output.diagnostics.is_empty());
    assert!(output.xml.contains("This is the true branch content."));
    assert!(!output.xml.contains("This is the false branch content."));
    assert!(!output.xml.contains("%else%"));
    assert!(!output.xml.contains("%end%"));
}

#[test]
fn test_if_field_missing_key_takes_false_branch() {
    let xml = load_fixture("if_field.xml");
    let output = process_document_json(&xml, Some(r#"{"steplessornumber": {}}"#), &ProcessOptions::default())
        .unwrap();

    assert!(!output.xml.contains("This is the true branch content."));
    assert!(output.xml.contains("This is the false branch content."));
    assert!(!output.xml.contains("%else%"));
    assert!(!output.xml.contains("%end%"));
}

#[test]
fn test_absent_context_behaves_as_empty_object() {
    let xml = load_fixture("if_field.xml");
    let absent = process_document(&xml, None, &ProcessOptions::default()).unwrap();
    let empty = process_document_json(&xml, Some("{}"), &ProcessOptions::default()).unwrap();
    assert_eq!(absent, empty);
}

#[test]
fn test_nested_if_pruning() {
    let xml = load_fixture("nested_if.xml");
    let options = ProcessOptions::default();

    let long = DataContext::new(json!({"lease": {"type": "furnished", "months": 24}}));
    let output = process_document(&xml, Some(&long), &options).unwrap();
    assert!(output.diagnostics.is_empty());
    for kept in ["Furnished lease.", "Long term.", "Inventory attached.", "Signed in two copies."] {
        assert!(output.xml.contains(kept), "missing {kept}");
    }
    for removed in ["Short term.", "Unfurnished lease.", "%else%", "%end%"] {
        assert!(!output.xml.contains(removed), "unexpected {removed}");
    }

    let short = DataContext::new(json!({"lease": {"type": "furnished", "months": "6"}}));
    let output = process_document(&xml, Some(&short), &options).unwrap();
    assert!(output.xml.contains("Short term."));
    assert!(!output.xml.contains("Long term."));
    assert!(output.xml.contains("Inventory attached."));

    let output = process_document(&xml, None, &options).unwrap();
    assert!(output.xml.contains("Unfurnished lease."));
    assert!(output.xml.contains("Signed in two copies."));
    for removed in ["Furnished lease.", "Long term.", "Short term.", "Inventory attached."] {
        assert!(!output.xml.contains(removed), "unexpected {removed}");
    }
    // The nested field was removed with its branch.
    assert_eq!(output.xml.matches("<w:instrText").count(), 1);
}

#[test]
fn test_nested_if_extraction() {
    let xml = load_fixture("nested_if.xml");
    let output = extract_fields(&xml).unwrap();

    assert!(output.diagnostics.is_empty());
    assert_eq!(
        serde_json::to_value(&output.fields).unwrap(),
        json!({
            "mergeFields": [],
            "ifFields": [{
                "left": "lease.type",
                "operator": "=",
                "right": "furnished",
                "ifTrue": [
                    "Furnished lease.",
                    {
                        "left": "lease.months",
                        "operator": ">=",
                        "right": "12",
                        "ifTrue": "Long term.",
                        "ifFalse": "Short term."
                    },
                    "Inventory attached."
                ],
                "ifFalse": "Unfurnished lease."
            }]
        })
    );

    let BranchContent::Items(items) = &output.fields.if_fields[0].if_true else {
        panic!("expected branch items");
    };
    assert!(matches!(&items[1], BranchItem::Field(nested) if nested.operator == ">="));
}

#[test]
fn test_incomplete_merge_field_is_left_unchanged() {
    let xml = load_fixture("incomplete_merge.xml");
    let unchanged = FieldProcessor::new(&xml, ProcessOptions::default())
        .unwrap()
        .to_xml();

    let output = process_document(&xml, Some(&lease_data()), &ProcessOptions::default()).unwrap();
    assert_eq!(output.xml, unchanged);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code.as_deref(), Some("F-1-1"));
    assert!(output.diagnostics[0].to_text().contains("`separate`"));
}

#[test]
fn test_incomplete_if_field_is_left_unchanged() {
    let xml = load_fixture("incomplete_if.xml");
    let unchanged = FieldProcessor::new(&xml, ProcessOptions::default())
        .unwrap()
        .to_xml();

    let output = process_document(&xml, Some(&lease_data()), &ProcessOptions::default()).unwrap();
    assert_eq!(output.xml, unchanged);
    assert!(output.xml.contains("Several lessors"));
    assert!(output.xml.contains("%else%"));
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(output.diagnostics[0].code.as_deref(), Some("F-2-1"));
}

#[test]
fn test_extraction_is_pure_and_repeatable() {
    let xml = load_fixture("styled.xml");
    let mut processor = FieldProcessor::new(&xml, ProcessOptions::default()).unwrap();
    let before = processor.to_xml();

    let first = processor.extract_fields();
    let second = processor.extract_fields();
    assert_eq!(first, second);
    assert_eq!(processor.to_xml(), before);

    assert_eq!(first.merge_fields, vec!["client.name"]);
    assert_eq!(first.if_fields.len(), 1);
    assert_eq!(first.if_fields[0].if_true, BranchContent::Text("Registered company.".to_string()));
    assert_eq!(first.if_fields[0].if_false, BranchContent::Text("Private person.".to_string()));

    let simplified = simplify_xml(&xml).unwrap();
    assert_eq!(extract_fields(&simplified).unwrap().fields, first);
}

#[test]
fn test_simplify_styled_document() {
    let xml = load_fixture("styled.xml");
    let simplified = simplify_xml(&xml).unwrap();

    for removed in ["w:pPr", "w:pStyle", "w:tabs", "w:rPr", "w:rFonts", "w:tblPr", "w:tblGrid", "w:tcPr", "w:br"] {
        assert!(!simplified.contains(removed), "unexpected {removed}");
    }
    assert!(simplified.contains("<w:t>Contract</w:t>"));
    assert!(simplified.contains("<w:t>Cell</w:t>"));
    assert!(simplified.contains("<w:tbl>"));
    assert!(simplified.contains("<w:tc>"));
    assert!(simplified.lines().all(|line| !line.trim().is_empty()));

    // Idempotent.
    assert_eq!(simplify_xml(&simplified).unwrap(), simplified);
}

#[test]
fn test_process_then_simplify() {
    let xml = load_fixture("styled.xml");
    let data = DataContext::new(json!({"client": {"kind": "person"}}));
    let output = process_document(&xml, Some(&data), &ProcessOptions::default()).unwrap();
    let simplified = simplify_xml(&output.xml).unwrap();

    assert!(simplified.contains(r#"<w:t data-merge-field="client.name">..........</w:t>"#));
    assert!(simplified.contains("Private person."));
    assert!(!simplified.contains("Registered company."));
}

#[test]
fn test_text_runs() {
    let xml = load_fixture("if_field.xml");
    let processor = FieldProcessor::new(&xml, ProcessOptions::default()).unwrap();
    assert_eq!(
        processor.text_runs(),
        vec![
            "{IF}",
            "This is the true branch content.",
            "%else%",
            "This is the false branch content.",
            "%end%"
        ]
    );
}
