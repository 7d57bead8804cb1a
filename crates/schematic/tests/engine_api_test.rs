//! Integration tests for the Engine API
//!
//! These tests drive whole documents through import, validation and export.

use schematic::{Engine, Format, Notation, Severity, config::AppConfig};

const PROCESS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" name="Claims">
  <bpmn:process id="claims">
    <bpmn:startEvent id="start" name="Claim filed"/>
    <bpmn:userTask id="assess" name="Assess"/>
    <bpmn:serviceTask id="pay" name="Pay out"/>
    <bpmn:sequenceFlow id="f1" sourceRef="start" targetRef="assess"/>
  </bpmn:process>
</bpmn:definitions>
"#;

const ORDERS: &str = r#"{
  "format": "schematic-package",
  "version": 1,
  "nodes": [
    {"id": "Order", "kind": "entity", "label": "Order", "attributes": [
      {"name": "id", "dataType": "INT", "primary": true},
      {"name": "notes", "dataType": "TEXT"}
    ]},
    {"id": "Item", "kind": "entity", "label": "Item", "attributes": [
      {"name": "id", "dataType": "INT", "primary": true},
      {"name": "order_ref", "dataType": "INT",
       "foreignKey": {"entityId": "Order", "entityName": "Order", "attributeName": "TARGET"}}
    ]}
  ],
  "edges": []
}"#;

#[test]
fn test_engine_with_default_config() {
    let engine = Engine::new(AppConfig::default());
    assert!(engine.config().export().json().pretty());
}

#[test]
fn test_process_reachability() {
    let engine = Engine::default();
    let imported = engine.import(Format::ProcessXml, PROCESS).unwrap();
    assert_eq!(imported.notation_guess, Some(Notation::Process));

    let result = engine.validate(&imported.graph, None);
    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0].message(), "missing end event");

    let warnings: Vec<_> = result.warnings().collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].element_id(), Some("pay"));
}

#[test]
fn test_foreign_key_literal_case() {
    let engine = Engine::default();

    let valid = engine
        .import(Format::JsonPackage, &ORDERS.replace("TARGET", "id"))
        .unwrap();
    let result = engine.validate(&valid.graph, None);
    assert!(result.is_valid(), "{:?}", result.issues());

    let invalid = engine
        .import(Format::JsonPackage, &ORDERS.replace("TARGET", "notes"))
        .unwrap();
    let result = engine.validate(&invalid.graph, Some(Notation::EntityRelationship));
    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message().contains("Item.order_ref"));
}

#[test]
fn test_external_entities_cannot_talk_directly() {
    let package = r#"{
      "nodes": [
        {"id": "bank", "kind": "external-entity", "label": "Bank"},
        {"id": "client", "kind": "external-entity", "label": "Client"}
      ],
      "edges": [
        {"id": "wire", "source": "bank", "target": "client", "kind": "data-flow", "label": "funds"}
      ]
    }"#;

    let engine = Engine::default();
    let imported = engine.import(Format::JsonPackage, package).unwrap();
    // No format marker and no version.
    assert_eq!(imported.warnings.len(), 2);

    let result = engine.validate(&imported.graph, None);
    let errors: Vec<_> = result
        .issues()
        .iter()
        .filter(|issue| issue.severity() == Severity::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].element_id(), Some("wire"));
}

#[test]
fn test_convert_process_to_json_and_back() {
    let engine = Engine::default();
    let json = engine
        .convert(Format::ProcessXml, Format::JsonPackage, PROCESS)
        .unwrap();
    let xml = engine
        .convert(Format::JsonPackage, Format::ProcessXml, &json.output)
        .unwrap();

    let back = engine.import(Format::ProcessXml, &xml.output).unwrap();
    assert_eq!(back.graph.nodes().len(), 3);
    assert_eq!(back.graph.name(), Some("Claims"));
}

#[test]
fn test_parse_invalid_document_returns_error() {
    let result = Engine::default().import(Format::ProcessXml, "<definitions><process>");
    assert!(result.is_err());
}
