//! Rewrites `discriminator` mappings into explicit `oneOf` unions.
//!
//! Tool-argument schemas must be plain JSON Schema, and `discriminator` is an OpenAPI
//! dialect keyword. For every schema that carries one, each mapped variant gets its
//! discriminator property pinned to a single-value string enum and is appended to the
//! root's `oneOf`.
//!
//! Variants are mutated where they live. A component that is a mapping target shows the
//! pinned property everywhere it is referenced.
//!
//! ```rust
//! use oschema::{DiscriminatorFlattener, OpenApiDocument};
//! use serde_json::json;
//!
//! let mut document = OpenApiDocument::from_value(&json!({
//!     "openapi": "3.1.0",
//!     "info": {"title": "Shapes", "version": "1"},
//!     "components": {"schemas": {
//!         "Shape": {
//!             "type": "object",
//!             "properties": {"kind": {"type": "string"}},
//!             "discriminator": {"propertyName": "kind", "mapping": {"circle": "#/components/schemas/Circle"}}
//!         },
//!         "Circle": {"type": "object", "properties": {"kind": {"type": "string"}, "radius": {"type": "number"}}}
//!     }}
//! })).expect("document should load");
//!
//! DiscriminatorFlattener::new().flatten(&mut document);
//!
//! let shape = document.schemas.component("Shape").expect("Shape");
//! let rendered = document.schemas.render(shape);
//! assert_eq!(rendered["oneOf"][0]["properties"]["kind"]["enum"], json!(["circle"]));
//! assert!(rendered.get("discriminator").is_none());
//! ```

use serde_json::Value;

use crate::{OpenApiDocument, SchemaGraph, SchemaId, SchemaNode, SchemaType, SchemaWalker};

#[derive(Debug, Default, Clone, Copy)]
pub struct DiscriminatorFlattener;

impl DiscriminatorFlattener {
    pub fn new() -> Self {
        Self
    }

    /// Flattens every reachable discriminator in place and returns the same document.
    ///
    /// A pass can create nodes that an earlier part of the same pass already walked past,
    /// so passes repeat until one finds nothing left to flatten.
    pub fn flatten<'d>(&self, document: &'d mut OpenApiDocument) -> &'d mut OpenApiDocument {
        loop {
            let mut flattened = 0_usize;
            SchemaWalker::new().walk_document(document, |graph, id| {
                if graph.node(id).discriminator.is_some() {
                    flatten_root(graph, id);
                    flattened += 1;
                }
            });
            if flattened == 0 {
                break;
            }
        }
        document
    }
}

fn flatten_root(graph: &mut SchemaGraph, root: SchemaId) {
    let Some(discriminator) = graph.node_mut(root).discriminator.take() else {
        return;
    };
    let property = discriminator.property_name;

    if discriminator.mapping.is_empty() {
        tracing::warn!(
            discriminator = property.as_str(),
            "discriminator does not have mapping defined, it will be skipped"
        );
        return;
    }

    let root_description = graph.node(root).description.clone();
    let mut variants = Vec::with_capacity(discriminator.mapping.len());

    for (value, reference) in &discriminator.mapping {
        let Some(variant) = graph.resolve_reference(reference).map(|id| graph.resolve(id)) else {
            tracing::warn!(
                reference = reference.as_str(),
                discriminator = property.as_str(),
                "referenced schema not found in components for discriminator, it will be skipped"
            );
            continue;
        };

        let variant_label = crate::graph::reference_name(reference);
        pin_variant(graph, root, variant, &variant_label, &property, value);

        let variant_node = graph.node_mut(variant);
        if root_description.is_some() && variant_node.description == root_description {
            variant_node.description = Some(value.clone());
        }
        variants.push(variant);
    }

    if variants.is_empty() {
        return;
    }

    let root_node = graph.node_mut(root);
    root_node.one_of.extend(variants);
    root_node.properties.clear();
}

/// Pins the discriminator property of one variant, own properties first, then `allOf`.
///
/// `allOf` members are only searched when the variant does not declare the property
/// itself. References back to the root are replaced by a pinned copy either way.
fn pin_variant(
    graph: &mut SchemaGraph,
    root: SchemaId,
    variant: SchemaId,
    variant_label: &str,
    property: &str,
    value: &str,
) {
    let mut pinned_in: Option<String> = None;

    let declared_by_variant = graph.node(variant).properties.contains_key(property);
    if declared_by_variant {
        pin_property(graph, variant, property, value);
        pinned_in = Some(variant_label.to_string());
    }

    let members = graph.node(variant).all_of.clone();
    let mut kept = Vec::with_capacity(members.len());

    for (index, member) in members.into_iter().enumerate() {
        let target = graph.resolve(member);

        if target == root {
            // The root is about to become a union, so the variant gets a private copy of
            // the root's shape with the property pinned.
            let copy = copy_of_root(graph, root);
            if graph.node(copy).properties.contains_key(property) {
                pin_property(graph, copy, property, value);
                pinned_in.get_or_insert_with(|| member_label(graph, target, variant_label, index));
            }
            kept.push(copy);
            continue;
        }

        if declared_by_variant || !graph.node(target).properties.contains_key(property) {
            kept.push(member);
            continue;
        }

        let label = member_label(graph, target, variant_label, index);
        if let Some(source) = pinned_in.as_deref() {
            let skipped_property_count = graph.node(target).properties.len();
            tracing::warn!(
                discriminator = property,
                skipped = label.as_str(),
                adjusted_in = source,
                skipped_property_count,
                "multiple schemas define the same discriminator property, the allOf member will be skipped"
            );
            continue;
        }

        pin_property(graph, target, property, value);
        pinned_in = Some(label);
        kept.push(member);
    }

    graph.node_mut(variant).all_of = kept;
}

fn pin_property(graph: &mut SchemaGraph, owner: SchemaId, property: &str, value: &str) {
    let pinned = graph.alloc(SchemaNode {
        types: vec![SchemaType::String],
        enum_values: Some(vec![Value::String(value.to_string())]),
        default: Some(Value::String(value.to_string())),
        description: Some(format!("Always set to '{value}'.")),
        ..SchemaNode::default()
    });
    graph.node_mut(owner).properties.insert(property.to_string(), pinned);
}

fn copy_of_root(graph: &mut SchemaGraph, root: SchemaId) -> SchemaId {
    let source = graph.node(root);
    let copy = SchemaNode {
        types: source.types.clone(),
        properties: source.properties.clone(),
        required: source.required.clone(),
        description: source.description.clone(),
        additional_properties: source.additional_properties,
        extra: source.extra.clone(),
        ..SchemaNode::default()
    };
    graph.alloc(copy)
}

fn member_label(graph: &SchemaGraph, target: SchemaId, variant_label: &str, index: usize) -> String {
    match graph.component_name(target) {
        Some(name) => name.to_string(),
        None => format!("{variant_label}.allOf[{index}]"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn load(components: Value) -> OpenApiDocument {
        OpenApiDocument::from_value(&json!({
            "openapi": "3.1.0",
            "info": {"title": "Flatten", "version": "1"},
            "components": {"schemas": components}
        }))
        .expect("document should load")
    }

    fn rendered(document: &OpenApiDocument, name: &str) -> Value {
        let id = document.schemas.component(name).expect("component should exist");
        document.schemas.render(id)
    }

    #[test]
    fn unresolvable_mapping_entries_are_skipped() {
        let mut document = load(json!({
            "Base": {
                "type": "object",
                "discriminator": {"propertyName": "kind", "mapping": {
                    "a": "#/components/schemas/A",
                    "ghost": "#/components/schemas/Ghost",
                    "b": "#/components/schemas/B"
                }}
            },
            "A": {"type": "object", "properties": {"kind": {"type": "string"}}},
            "B": {"type": "object", "properties": {"kind": {"type": "string"}}}
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let base = rendered(&document, "Base");
        let one_of = base["oneOf"].as_array().expect("oneOf should exist");
        assert_eq!(one_of.len(), 2);
        assert_eq!(one_of[0]["properties"]["kind"]["enum"], json!(["a"]));
        assert_eq!(one_of[1]["properties"]["kind"]["enum"], json!(["b"]));
    }

    #[test]
    fn missing_mapping_removes_discriminator_without_union() {
        let mut document = load(json!({
            "Base": {"type": "object", "properties": {"kind": {"type": "string"}}, "discriminator": {"propertyName": "kind"}}
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let base = rendered(&document, "Base");
        assert!(base.get("discriminator").is_none());
        assert!(base.get("oneOf").is_none());
        assert_eq!(base["properties"]["kind"], json!({"type": "string"}));
    }

    #[test]
    fn property_is_found_through_referenced_all_of_member() {
        let mut document = load(json!({
            "Base": {
                "description": "A message",
                "discriminator": {"propertyName": "type", "mapping": {"text": "#/components/schemas/Text"}}
            },
            "Common": {"type": "object", "properties": {"type": {"type": "string"}, "id": {"type": "string"}}},
            "Text": {
                "description": "A message",
                "allOf": [
                    {"$ref": "#/components/schemas/Common"},
                    {"type": "object", "properties": {"text": {"type": "string"}}}
                ]
            }
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let text = rendered(&document, "Text");
        assert_eq!(text["description"], json!("text"));
        assert_eq!(
            text["allOf"][0]["properties"]["type"],
            json!({
                "type": "string",
                "enum": ["text"],
                "default": "text",
                "description": "Always set to 'text'."
            })
        );
        assert_eq!(rendered(&document, "Common")["properties"]["type"]["enum"], json!(["text"]));
    }

    #[test]
    fn duplicate_discriminator_property_keeps_first_and_drops_later_member() {
        let mut document = load(json!({
            "Base": {"discriminator": {"propertyName": "messageType", "mapping": {"TEXT": "#/components/schemas/TextMessage"}}},
            "CommonProperties": {"type": "object", "properties": {"messageType": {"type": "string"}}},
            "AdditionalProperties": {"type": "object", "properties": {"messageType": {"type": "string"}, "sender": {"type": "string"}}},
            "TextMessage": {"allOf": [
                {"$ref": "#/components/schemas/CommonProperties"},
                {"$ref": "#/components/schemas/AdditionalProperties"}
            ]}
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let text = rendered(&document, "TextMessage");
        let all_of = text["allOf"].as_array().expect("allOf should exist");
        assert_eq!(all_of.len(), 1);
        assert_eq!(all_of[0]["properties"]["messageType"]["enum"], json!(["TEXT"]));
        assert_eq!(
            rendered(&document, "AdditionalProperties")["properties"]["messageType"],
            json!({"type": "string"})
        );
    }

    #[test]
    fn own_property_leaves_all_of_members_untouched() {
        let mut document = load(json!({
            "Base": {"discriminator": {"propertyName": "kind", "mapping": {"a": "#/components/schemas/A"}}},
            "Common": {"type": "object", "properties": {
                "kind": {"type": "string"},
                "id": {"type": "string"},
                "createdAt": {"type": "string", "format": "date-time"}
            }},
            "A": {
                "type": "object",
                "properties": {"kind": {"type": "string"}, "x": {"type": "integer"}},
                "allOf": [{"$ref": "#/components/schemas/Common"}]
            }
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let a = rendered(&document, "A");
        assert_eq!(a["properties"]["kind"]["enum"], json!(["a"]));
        assert_eq!(a["properties"]["x"], json!({"type": "integer"}));
        let all_of = a["allOf"].as_array().expect("allOf should survive");
        assert_eq!(all_of.len(), 1);
        assert_eq!(all_of[0]["properties"]["id"], json!({"type": "string"}));
        assert_eq!(
            all_of[0]["properties"]["createdAt"],
            json!({"type": "string", "format": "date-time"})
        );
        assert_eq!(rendered(&document, "Common")["properties"]["kind"], json!({"type": "string"}));
    }

    #[test]
    fn variant_referencing_its_root_terminates_with_pinned_copy() {
        let mut document = load(json!({
            "Pet": {
                "type": "object",
                "required": ["petType"],
                "properties": {"petType": {"type": "string"}, "name": {"type": "string"}},
                "discriminator": {"propertyName": "petType", "mapping": {
                    "cat": "#/components/schemas/Cat",
                    "dog": "#/components/schemas/Dog"
                }}
            },
            "Cat": {"allOf": [{"$ref": "#/components/schemas/Pet"}, {"properties": {"lives": {"type": "integer"}}}]},
            "Dog": {"allOf": [{"$ref": "#/components/schemas/Pet"}, {"properties": {"bark": {"type": "boolean"}}}]}
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let pet = rendered(&document, "Pet");
        let one_of = pet["oneOf"].as_array().expect("oneOf should exist");
        assert_eq!(one_of.len(), 2);
        assert!(pet.get("properties").is_none());
        assert_eq!(pet["required"], json!(["petType"]));
        assert_eq!(one_of[0]["allOf"][0]["properties"]["petType"]["enum"], json!(["cat"]));
        assert_eq!(one_of[0]["allOf"][0]["properties"]["name"], json!({"type": "string"}));
        assert_eq!(one_of[1]["allOf"][0]["properties"]["petType"]["default"], json!("dog"));
    }

    #[test]
    fn nested_discriminators_are_flattened_transitively() {
        let mut document = load(json!({
            "Envelope": {
                "type": "object",
                "properties": {"payload": {
                    "discriminator": {"propertyName": "t", "mapping": {"x": "#/components/schemas/X"}}
                }}
            },
            "X": {
                "type": "object",
                "properties": {"t": {"type": "string"}, "inner": {"$ref": "#/components/schemas/Inner"}}
            },
            "Inner": {"discriminator": {"propertyName": "u", "mapping": {"y": "#/components/schemas/Y"}}},
            "Y": {"type": "object", "properties": {"u": {"type": "string"}}}
        }));

        DiscriminatorFlattener::new().flatten(&mut document);

        let envelope = rendered(&document, "Envelope");
        let payload = &envelope["properties"]["payload"];
        assert_eq!(payload["oneOf"][0]["properties"]["t"]["enum"], json!(["x"]));
        assert_eq!(
            payload["oneOf"][0]["properties"]["inner"]["oneOf"][0]["properties"]["u"]["enum"],
            json!(["y"])
        );
    }

    #[test]
    fn reflattening_is_a_no_op() {
        let mut document = load(json!({
            "Base": {"discriminator": {"propertyName": "kind", "mapping": {"a": "#/components/schemas/A"}}},
            "A": {"type": "object", "properties": {"kind": {"type": "string"}}}
        }));

        DiscriminatorFlattener::new().flatten(&mut document);
        let first = rendered(&document, "Base");
        let nodes = document.schemas.len();

        DiscriminatorFlattener::new().flatten(&mut document);

        assert_eq!(rendered(&document, "Base"), first);
        assert_eq!(document.schemas.len(), nodes);
    }

    #[test]
    fn operation_body_discriminators_are_flattened() {
        let mut document = OpenApiDocument::from_value(&json!({
            "openapi": "3.0.3",
            "info": {"title": "Flatten", "version": "1"},
            "components": {"schemas": {"A": {"type": "object", "properties": {"kind": {"type": "string"}}}}},
            "paths": {"/things": {"post": {"requestBody": {"content": {"application/json": {"schema": {
                "discriminator": {"propertyName": "kind", "mapping": {"a": "A"}}
            }}}}}}}
        }))
        .expect("document should load");

        DiscriminatorFlattener::new().flatten(&mut document);

        let body = document.operations[0]
            .request_body
            .as_ref()
            .and_then(|body| body.content["application/json"].schema)
            .expect("body schema");
        let rendered = document.schemas.render(body);
        assert_eq!(rendered["oneOf"][0]["properties"]["kind"]["enum"], json!(["a"]));
    }
}
