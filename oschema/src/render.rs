//! Schema graph to JSON-Schema rendering.
//!
//! References are inlined so the output needs no external resolution. A component that
//! is re-entered while it is still being rendered is emitted once under `$defs` and
//! referenced from there, which keeps cyclic graphs finite.
//!
//! ```rust
//! use oschema::SchemaGraph;
//! use serde_json::json;
//!
//! let mut graph = SchemaGraph::new();
//! let name = graph.parse_schema(&json!({"type": "string"}));
//! graph.register_component("Name", name);
//! let root = graph.parse_schema(&json!({
//!     "type": "object",
//!     "properties": {"name": {"$ref": "#/components/schemas/Name", "description": "Display name"}}
//! }));
//!
//! assert_eq!(
//!     graph.render(root),
//!     json!({
//!         "type": "object",
//!         "properties": {"name": {"type": "string", "description": "Display name"}}
//!     })
//! );
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::{AdditionalProperties, SchemaGraph, SchemaId, SchemaNode};

const DEFS_POINTER: &str = "#/$defs/";

struct RenderState<'g> {
    names: HashMap<SchemaId, &'g str>,
    path: Vec<SchemaId>,
    defs: IndexMap<String, Value>,
    pending: Vec<SchemaId>,
}

impl SchemaGraph {
    pub fn render(&self, id: SchemaId) -> Value {
        let mut state = RenderState {
            names: self.components().map(|(name, id)| (id, name)).collect(),
            path: Vec::new(),
            defs: IndexMap::new(),
            pending: Vec::new(),
        };

        let mut rendered = self.render_node(id, &mut state);

        while let Some(pending) = state.pending.pop() {
            let Some(name) = state.names.get(&pending).map(|name| name.to_string()) else {
                continue;
            };
            if state.defs.contains_key(&name) {
                continue;
            }
            state.defs.insert(name.clone(), Value::Null);
            let value = self.render_node(pending, &mut state);
            state.defs.insert(name, value);
        }

        if !state.defs.is_empty() {
            if let Value::Object(object) = &mut rendered {
                object.insert(
                    "$defs".to_string(),
                    Value::Object(state.defs.into_iter().collect()),
                );
            }
        }
        rendered
    }

    fn render_node(&self, id: SchemaId, state: &mut RenderState<'_>) -> Value {
        let node = self.node(id);
        if let Some(reference) = &node.reference {
            let target = self.resolve(id);
            if target == id || self.node(target).is_reference() {
                return json!({ "$ref": reference });
            }
            let mut rendered = self.render_node(target, state);
            if let Value::Object(object) = &mut rendered {
                if let Some(description) = &node.description {
                    object.insert("description".to_string(), json!(description));
                }
                if let Some(default) = &node.default {
                    object.insert("default".to_string(), default.clone());
                }
            }
            return rendered;
        }

        if state.path.contains(&id) {
            return match state.names.get(&id) {
                Some(name) => {
                    state.pending.push(id);
                    json!({ "$ref": format!("{DEFS_POINTER}{name}") })
                }
                None => json!({}),
            };
        }

        state.path.push(id);
        let rendered = self.render_fields(node, state);
        state.path.pop();
        Value::Object(rendered)
    }

    fn render_fields(&self, node: &SchemaNode, state: &mut RenderState<'_>) -> Map<String, Value> {
        let mut object = Map::new();

        match node.types.as_slice() {
            [] => {}
            [single] => {
                object.insert("type".to_string(), json!(single.as_str()));
            }
            many => {
                let names: Vec<&str> = many.iter().map(|schema_type| schema_type.as_str()).collect();
                object.insert("type".to_string(), json!(names));
            }
        }
        if let Some(description) = &node.description {
            object.insert("description".to_string(), json!(description));
        }
        if let Some(values) = &node.enum_values {
            object.insert("enum".to_string(), Value::Array(values.clone()));
        }
        if let Some(default) = &node.default {
            object.insert("default".to_string(), default.clone());
        }
        if !node.properties.is_empty() {
            object.insert(
                "properties".to_string(),
                self.render_map(&node.properties, state),
            );
        }
        if !node.required.is_empty() {
            object.insert("required".to_string(), json!(node.required));
        }
        self.insert_single(&mut object, "items", node.items, state);
        self.insert_list(&mut object, "prefixItems", &node.prefix_items, state);
        self.insert_single(&mut object, "contains", node.contains, state);
        self.insert_list(&mut object, "allOf", &node.all_of, state);
        self.insert_list(&mut object, "anyOf", &node.any_of, state);
        self.insert_list(&mut object, "oneOf", &node.one_of, state);
        self.insert_single(&mut object, "not", node.not, state);
        self.insert_single(&mut object, "if", node.if_schema, state);
        self.insert_single(&mut object, "then", node.then_schema, state);
        self.insert_single(&mut object, "else", node.else_schema, state);
        if !node.dependent_schemas.is_empty() {
            object.insert(
                "dependentSchemas".to_string(),
                self.render_map(&node.dependent_schemas, state),
            );
        }
        self.insert_single(&mut object, "contentSchema", node.content_schema, state);
        match node.additional_properties {
            Some(AdditionalProperties::Allowed(allowed)) => {
                object.insert("additionalProperties".to_string(), json!(allowed));
            }
            Some(AdditionalProperties::Schema(schema)) => {
                let rendered = self.render_node(schema, state);
                object.insert("additionalProperties".to_string(), rendered);
            }
            None => {}
        }
        if !node.pattern_properties.is_empty() {
            object.insert(
                "patternProperties".to_string(),
                self.render_map(&node.pattern_properties, state),
            );
        }
        if let Some(discriminator) = &node.discriminator {
            object.insert(
                "discriminator".to_string(),
                json!({
                    "propertyName": discriminator.property_name,
                    "mapping": discriminator.mapping,
                }),
            );
        }
        for (keyword, value) in &node.extra {
            object.entry(keyword.clone()).or_insert_with(|| value.clone());
        }

        object
    }

    fn render_map(&self, entries: &IndexMap<String, SchemaId>, state: &mut RenderState<'_>) -> Value {
        let mut rendered = Map::new();
        for (name, id) in entries {
            rendered.insert(name.clone(), self.render_node(*id, state));
        }
        Value::Object(rendered)
    }

    fn insert_single(
        &self,
        object: &mut Map<String, Value>,
        keyword: &str,
        id: Option<SchemaId>,
        state: &mut RenderState<'_>,
    ) {
        if let Some(id) = id {
            let rendered = self.render_node(id, state);
            object.insert(keyword.to_string(), rendered);
        }
    }

    fn insert_list(
        &self,
        object: &mut Map<String, Value>,
        keyword: &str,
        ids: &[SchemaId],
        state: &mut RenderState<'_>,
    ) {
        if ids.is_empty() {
            return;
        }
        let rendered: Vec<Value> = ids.iter().map(|id| self.render_node(*id, state)).collect();
        object.insert(keyword.to_string(), Value::Array(rendered));
    }
}
