//! Arena-backed JSON-Schema graph.
//!
//! Schemas live in a single [`SchemaGraph`] and refer to each other through copyable
//! [`SchemaId`] handles. Components are registered by name, and every `$ref` occurrence
//! becomes its own node that points at a component by name. Two parents holding the same
//! handle alias the same node, so a mutation through one is visible through the other.
//!
//! ```rust
//! use oschema::{SchemaGraph, SchemaNode, SchemaType};
//! use serde_json::json;
//!
//! let mut graph = SchemaGraph::new();
//! let pet = graph.parse_schema(&json!({"type": "object", "properties": {"name": {"type": "string"}}}));
//! graph.register_component("Pet", pet);
//!
//! let reference = graph.parse_schema(&json!({"$ref": "#/components/schemas/Pet"}));
//! assert_eq!(graph.resolve(reference), pet);
//! assert!(graph.node(pet).has_type(SchemaType::Object));
//! assert_eq!(graph.alloc(SchemaNode::object()).index(), 3);
//! ```

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::{Map, Value};

const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(usize);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl SchemaType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Null => "null",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discriminator {
    pub property_name: String,
    pub mapping: IndexMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(SchemaId),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub types: Vec<SchemaType>,
    pub properties: IndexMap<String, SchemaId>,
    pub required: Vec<String>,
    pub description: Option<String>,
    pub default: Option<Value>,
    pub enum_values: Option<Vec<Value>>,
    pub all_of: Vec<SchemaId>,
    pub any_of: Vec<SchemaId>,
    pub one_of: Vec<SchemaId>,
    pub not: Option<SchemaId>,
    pub items: Option<SchemaId>,
    pub prefix_items: Vec<SchemaId>,
    pub contains: Option<SchemaId>,
    pub dependent_schemas: IndexMap<String, SchemaId>,
    pub if_schema: Option<SchemaId>,
    pub then_schema: Option<SchemaId>,
    pub else_schema: Option<SchemaId>,
    pub content_schema: Option<SchemaId>,
    pub additional_properties: Option<AdditionalProperties>,
    pub pattern_properties: IndexMap<String, SchemaId>,
    pub discriminator: Option<Discriminator>,
    pub reference: Option<String>,
    /// Keywords without structural meaning to the bridge, rendered back verbatim.
    pub extra: Map<String, Value>,
}

impl SchemaNode {
    pub fn object() -> Self {
        Self::default().with_type(SchemaType::Object)
    }

    pub fn reference(target: impl Into<String>) -> Self {
        Self {
            reference: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, schema_type: SchemaType) -> Self {
        if !self.types.contains(&schema_type) {
            self.types.push(schema_type);
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, schema: SchemaId) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    pub fn with_required(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.required.contains(&name) {
            self.required.push(name);
        }
        self
    }

    pub fn has_type(&self, schema_type: SchemaType) -> bool {
        self.types.contains(&schema_type)
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Every schema slot of this node, in a stable keyword order.
    pub fn children(&self) -> Vec<SchemaId> {
        let mut children = Vec::new();
        children.extend(self.properties.values().copied());
        children.extend(self.items);
        children.extend(self.prefix_items.iter().copied());
        children.extend(self.contains);
        children.extend(self.all_of.iter().copied());
        children.extend(self.any_of.iter().copied());
        children.extend(self.one_of.iter().copied());
        children.extend(self.not);
        children.extend(self.if_schema);
        children.extend(self.then_schema);
        children.extend(self.else_schema);
        children.extend(self.dependent_schemas.values().copied());
        children.extend(self.content_schema);
        if let Some(AdditionalProperties::Schema(id)) = self.additional_properties {
            children.push(id);
        }
        children.extend(self.pattern_properties.values().copied());
        children
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    components: IndexMap<String, SchemaId>,
}

impl SchemaGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: SchemaNode) -> SchemaId {
        self.nodes.push(node);
        SchemaId(self.nodes.len() - 1)
    }

    /// Handles are only minted by this graph, so indexing cannot go out of bounds.
    pub fn node(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: SchemaId) -> &mut SchemaNode {
        &mut self.nodes[id.0]
    }

    /// Shallow copy: the new node shares every child handle with the original.
    pub fn duplicate(&mut self, id: SchemaId) -> SchemaId {
        let node = self.node(id).clone();
        self.alloc(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn register_component(&mut self, name: impl Into<String>, id: SchemaId) {
        self.components.insert(name.into(), id);
    }

    pub fn component(&self, name: &str) -> Option<SchemaId> {
        self.components.get(name).copied()
    }

    pub fn components(&self) -> impl Iterator<Item = (&str, SchemaId)> {
        self.components
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
    }

    pub fn component_name(&self, id: SchemaId) -> Option<&str> {
        self.components
            .iter()
            .find(|(_, candidate)| **candidate == id)
            .map(|(name, _)| name.as_str())
    }

    /// Looks up a component by `#/components/schemas/Name` or by bare `Name`.
    pub fn resolve_reference(&self, reference: &str) -> Option<SchemaId> {
        self.component(&reference_name(reference))
    }

    /// Follows `$ref` chains to the first non-reference node.
    ///
    /// Unresolvable or cyclic chains stop at the last node reached.
    pub fn resolve(&self, id: SchemaId) -> SchemaId {
        let mut current = id;
        let mut seen = HashSet::new();
        while let Some(reference) = self.node(current).reference.as_deref() {
            if !seen.insert(current) {
                break;
            }
            match self.resolve_reference(reference) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    pub fn resolved(&self, id: SchemaId) -> &SchemaNode {
        self.node(self.resolve(id))
    }

    /// Parses one JSON-Schema value into the arena and returns its root handle.
    ///
    /// Parsing never fails: unknown keywords are kept in `extra` and malformed
    /// structural keywords are dropped.
    pub fn parse_schema(&mut self, value: &Value) -> SchemaId {
        let object = match value {
            Value::Object(object) => object,
            Value::Bool(false) => {
                let nothing = self.alloc(SchemaNode::default());
                return self.alloc(SchemaNode {
                    not: Some(nothing),
                    ..SchemaNode::default()
                });
            }
            _ => return self.alloc(SchemaNode::default()),
        };

        let mut node = SchemaNode::default();
        for (keyword, value) in object {
            match keyword.as_str() {
                "type" => node.types = parse_types(value),
                "properties" => node.properties = self.parse_schema_map(value),
                "required" => {
                    node.required = value
                        .as_array()
                        .map(|names| {
                            names
                                .iter()
                                .filter_map(Value::as_str)
                                .map(ToString::to_string)
                                .collect()
                        })
                        .unwrap_or_default();
                }
                "description" => node.description = value.as_str().map(ToString::to_string),
                "default" => node.default = Some(value.clone()),
                "enum" => node.enum_values = value.as_array().cloned(),
                "allOf" => node.all_of = self.parse_schema_list(value),
                "anyOf" => node.any_of = self.parse_schema_list(value),
                "oneOf" => node.one_of = self.parse_schema_list(value),
                "not" => node.not = self.parse_optional(value),
                "items" => match value {
                    Value::Array(_) => node.prefix_items = self.parse_schema_list(value),
                    _ => node.items = self.parse_optional(value),
                },
                "prefixItems" => node.prefix_items = self.parse_schema_list(value),
                "contains" => node.contains = self.parse_optional(value),
                "dependentSchemas" => node.dependent_schemas = self.parse_schema_map(value),
                "if" => node.if_schema = self.parse_optional(value),
                "then" => node.then_schema = self.parse_optional(value),
                "else" => node.else_schema = self.parse_optional(value),
                "contentSchema" => node.content_schema = self.parse_optional(value),
                "additionalProperties" => {
                    node.additional_properties = match value {
                        Value::Bool(allowed) => Some(AdditionalProperties::Allowed(*allowed)),
                        Value::Object(_) => {
                            Some(AdditionalProperties::Schema(self.parse_schema(value)))
                        }
                        _ => None,
                    };
                }
                "patternProperties" => node.pattern_properties = self.parse_schema_map(value),
                "discriminator" => node.discriminator = parse_discriminator(value),
                "$ref" => node.reference = value.as_str().map(ToString::to_string),
                _ => {
                    node.extra.insert(keyword.clone(), value.clone());
                }
            }
        }

        self.alloc(node)
    }

    fn parse_optional(&mut self, value: &Value) -> Option<SchemaId> {
        match value {
            Value::Object(_) | Value::Bool(_) => Some(self.parse_schema(value)),
            _ => None,
        }
    }

    fn parse_schema_list(&mut self, value: &Value) -> Vec<SchemaId> {
        value
            .as_array()
            .map(|items| items.iter().filter_map(|item| self.parse_optional(item)).collect())
            .unwrap_or_default()
    }

    fn parse_schema_map(&mut self, value: &Value) -> IndexMap<String, SchemaId> {
        let mut parsed = IndexMap::new();
        if let Some(entries) = value.as_object() {
            for (name, schema) in entries {
                if let Some(id) = self.parse_optional(schema) {
                    parsed.insert(name.clone(), id);
                }
            }
        }
        parsed
    }
}

/// Extracts the component name from a local reference, decoding JSON-pointer escapes.
pub fn reference_name(reference: &str) -> String {
    let name = reference
        .strip_prefix(COMPONENT_SCHEMA_PREFIX)
        .or_else(|| reference.rsplit('/').next())
        .unwrap_or(reference);
    name.replace("~1", "/").replace("~0", "~")
}

fn parse_types(value: &Value) -> Vec<SchemaType> {
    let names: Vec<&str> = match value {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    let mut types = Vec::new();
    for name in names {
        match SchemaType::parse(name) {
            Some(schema_type) if !types.contains(&schema_type) => types.push(schema_type),
            Some(_) => {}
            None => tracing::warn!(schema_type = name, "ignoring unknown schema type"),
        }
    }
    types
}

fn parse_discriminator(value: &Value) -> Option<Discriminator> {
    let property_name = value.get("propertyName")?.as_str()?.to_string();
    let mapping = value
        .get("mapping")
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(key, target)| Some((key.clone(), target.as_str()?.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Some(Discriminator {
        property_name,
        mapping,
    })
}
