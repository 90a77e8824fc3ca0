use oschema::{DiscriminatorFlattener, FilterChain, OpenApiDocument, SchemaWalker};
use serde_json::{Value, json};

const KIND_DOCUMENT: &str = r#"
openapi: 3.1.0
info:
  title: Kinds
  version: 1.0.0
paths:
  /things:
    post:
      operationId: createThing
      requestBody:
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/Base'
components:
  schemas:
    Base:
      type: object
      properties:
        kind:
          type: string
      discriminator:
        propertyName: kind
        mapping:
          a: '#/components/schemas/A'
          b: '#/components/schemas/B'
    A:
      type: object
      properties:
        kind:
          type: string
        alpha:
          type: integer
    B:
      type: object
      properties:
        kind:
          type: string
        beta:
          type: boolean
"#;

fn component(document: &OpenApiDocument, name: &str) -> Value {
    let id = document
        .schemas
        .component(name)
        .expect("component should be registered");
    document.schemas.render(id)
}

fn discriminator_count(document: &mut OpenApiDocument) -> usize {
    let mut count = 0;
    SchemaWalker::new().walk_document(document, |graph, id| {
        if graph.node(id).discriminator.is_some() {
            count += 1;
        }
    });
    count
}

#[test]
fn base_with_two_mapped_variants_becomes_two_entry_union() {
    let mut document = OpenApiDocument::parse(KIND_DOCUMENT).expect("document should parse");

    DiscriminatorFlattener::new().flatten(&mut document);

    let base = component(&document, "Base");
    assert!(base.get("discriminator").is_none());
    let one_of = base["oneOf"].as_array().expect("oneOf should be present");
    assert_eq!(one_of.len(), 2);
    assert_eq!(
        one_of[0]["properties"]["kind"],
        json!({"type": "string", "enum": ["a"], "default": "a", "description": "Always set to 'a'."})
    );
    assert_eq!(
        one_of[1]["properties"]["kind"],
        json!({"type": "string", "enum": ["b"], "default": "b", "description": "Always set to 'b'."})
    );
    assert_eq!(one_of[0]["properties"]["alpha"], json!({"type": "integer"}));
    assert_eq!(one_of[1]["properties"]["beta"], json!({"type": "boolean"}));

    assert!(document.schemas.component("A").is_some());
    assert!(document.schemas.component("B").is_some());
    assert_eq!(discriminator_count(&mut document), 0);
}

#[test]
fn discriminator_property_keeps_its_position_among_variant_properties() {
    let mut document = OpenApiDocument::parse(KIND_DOCUMENT).expect("document should parse");

    DiscriminatorFlattener::new().flatten(&mut document);

    let a = component(&document, "A");
    let names: Vec<&String> = a["properties"]
        .as_object()
        .expect("properties should be an object")
        .keys()
        .collect();
    assert_eq!(names, vec!["kind", "alpha"]);
}

#[test]
fn request_body_reference_sees_the_flattened_union() {
    let mut document = OpenApiDocument::parse(KIND_DOCUMENT).expect("document should parse");

    FilterChain::standard()
        .apply(&mut document)
        .expect("filters should succeed");

    let operation = document
        .operation("createThing")
        .expect("operation should exist");
    let body = operation
        .request_body
        .as_ref()
        .and_then(|body| body.content.get("application/json"))
        .and_then(|media| media.schema)
        .expect("body schema should exist");
    let rendered = document.schemas.render(body);

    assert_eq!(rendered["oneOf"].as_array().map(Vec::len), Some(2));
}

#[test]
fn m_of_n_resolvable_entries_produce_m_union_members_in_mapping_order() {
    let mut document = OpenApiDocument::from_value(&json!({
        "openapi": "3.0.3",
        "info": {"title": "Partial", "version": "1"},
        "components": {"schemas": {
            "Event": {"discriminator": {"propertyName": "type", "mapping": {
                "missing-1": "#/components/schemas/Nope",
                "created": "#/components/schemas/Created",
                "missing-2": "Gone",
                "deleted": "Deleted"
            }}},
            "Created": {"type": "object", "properties": {"type": {"type": "string"}}},
            "Deleted": {"type": "object", "properties": {"type": {"type": "string"}}}
        }}
    }))
    .expect("document should load");

    DiscriminatorFlattener::new().flatten(&mut document);

    let event = component(&document, "Event");
    let values: Vec<Value> = event["oneOf"]
        .as_array()
        .expect("oneOf should be present")
        .iter()
        .map(|variant| variant["properties"]["type"]["default"].clone())
        .collect();
    assert_eq!(values, vec![json!("created"), json!("deleted")]);
}

#[test]
fn flattening_twice_matches_flattening_once() {
    let mut once = OpenApiDocument::parse(KIND_DOCUMENT).expect("document should parse");
    DiscriminatorFlattener::new().flatten(&mut once);

    let mut twice = once.clone();
    DiscriminatorFlattener::new().flatten(&mut twice);

    for name in ["Base", "A", "B"] {
        assert_eq!(component(&once, name), component(&twice, name));
    }
}
