//! OpenAPI document model and loader.
//!
//! ```rust
//! use oschema::{HttpMethod, OpenApiDocument, ParameterLocation};
//!
//! let document = OpenApiDocument::parse(r#"
//! openapi: 3.1.0
//! info: {title: Users, version: "1.0"}
//! paths:
//!   /users/{userId}:
//!     get:
//!       operationId: getUser
//!       parameters:
//!         - {name: userId, in: path, required: true, schema: {type: string}}
//! "#).expect("document should parse");
//!
//! let operation = &document.operations[0];
//! assert_eq!(operation.method, HttpMethod::Get);
//! assert_eq!(operation.parameters[0].location, ParameterLocation::Path);
//! ```

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{SchemaError, SchemaGraph, SchemaId, SchemaNode};

const PARAMETER_PREFIX: &str = "#/components/parameters/";
const REQUEST_BODY_PREFIX: &str = "#/components/requestBodies/";
const RESPONSE_PREFIX: &str = "#/components/responses/";
const MAX_REFERENCE_HOPS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    V30,
    V31,
}

impl SpecVersion {
    pub fn parse(value: &str) -> Result<Self, SchemaError> {
        if value.starts_with("3.0") {
            Ok(Self::V30)
        } else if value.starts_with("3.1") {
            Ok(Self::V31)
        } else {
            Err(SchemaError::unsupported_version(format!(
                "openapi '{value}' is not supported, expected 3.0.x or 3.1.x"
            )))
        }
    }

    /// Whether sibling keywords next to `$ref` are honored, so a use-site node may be
    /// annotated without copying the shared target.
    pub fn shares_references_safely(self) -> bool {
        matches!(self, Self::V31)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
        }
    }

    fn path_item_key(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter travels. `Form` is recognized so it can be reported, never sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
    Form,
}

impl ParameterLocation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" => Some(Self::Header),
            "cookie" => Some(Self::Cookie),
            "form" | "formData" => Some(Self::Form),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
            Self::Form => "form",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    pub schema: SchemaId,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaTypeDescriptor {
    pub schema: Option<SchemaId>,
    pub example: Option<Value>,
    /// Named examples, keeping only their `value` payloads.
    pub examples: IndexMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBodyDescriptor {
    pub required: bool,
    pub description: Option<String>,
    pub content: IndexMap<String, MediaTypeDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseDescriptor {
    pub description: Option<String>,
    pub content: IndexMap<String, MediaTypeDescriptor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationDescriptor {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub path: String,
    pub method: HttpMethod,
    pub parameters: Vec<ParameterDescriptor>,
    pub request_body: Option<RequestBodyDescriptor>,
    pub responses: IndexMap<String, ResponseDescriptor>,
}

impl OperationDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation_id: None,
            summary: None,
            description: None,
            path: path.into(),
            method,
            parameters: Vec::new(),
            request_body: None,
            responses: IndexMap::new(),
        }
    }

    pub fn with_operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_request_body(mut self, request_body: RequestBodyDescriptor) -> Self {
        self.request_body = Some(request_body);
        self
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Operation id when present, otherwise `METHOD path`; used in diagnostics.
    pub fn label(&self) -> String {
        match &self.operation_id {
            Some(operation_id) => operation_id.clone(),
            None => format!("{} {}", self.method, self.path),
        }
    }

    /// Every schema handle the operation points at directly.
    pub fn schema_roots(&self) -> Vec<SchemaId> {
        let mut roots: Vec<SchemaId> = self.parameters.iter().map(|p| p.schema).collect();
        if let Some(body) = &self.request_body {
            roots.extend(body.content.values().filter_map(|media| media.schema));
        }
        for response in self.responses.values() {
            roots.extend(response.content.values().filter_map(|media| media.schema));
        }
        roots
    }
}

#[derive(Debug, Clone)]
pub struct OpenApiDocument {
    pub version: SpecVersion,
    pub info: ApiInfo,
    pub servers: Vec<ServerDescriptor>,
    pub operations: Vec<OperationDescriptor>,
    pub schemas: SchemaGraph,
}

impl OpenApiDocument {
    /// Parses JSON when the text looks like a JSON object, YAML otherwise.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        if text.trim_start().starts_with('{') {
            Self::from_json_str(text)
        } else {
            Self::from_yaml_str(text)
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let root = value
            .as_object()
            .ok_or_else(|| SchemaError::invalid_document("document root must be an object"))?;
        let version = root
            .get("openapi")
            .and_then(Value::as_str)
            .ok_or_else(|| SchemaError::invalid_document("missing 'openapi' version field"))
            .and_then(SpecVersion::parse)?;

        let mut loader = Loader {
            root,
            schemas: SchemaGraph::new(),
        };
        loader.load_components();
        let info = loader.load_info()?;
        let servers = loader.load_servers();
        let operations = loader.load_operations()?;

        Ok(Self {
            version,
            info,
            servers,
            operations,
            schemas: loader.schemas,
        })
    }

    pub fn operation(&self, operation_id: &str) -> Option<&OperationDescriptor> {
        self.operations
            .iter()
            .find(|operation| operation.operation_id.as_deref() == Some(operation_id))
    }
}

struct Loader<'a> {
    root: &'a Map<String, Value>,
    schemas: SchemaGraph,
}

impl<'a> Loader<'a> {
    fn load_components(&mut self) {
        let root = self.root;
        let Some(components) = root
            .get("components")
            .and_then(|components| components.get("schemas"))
            .and_then(Value::as_object)
        else {
            return;
        };

        for (name, schema) in components {
            let id = self.schemas.parse_schema(schema);
            self.schemas.register_component(name.clone(), id);
        }
    }

    fn load_info(&self) -> Result<ApiInfo, SchemaError> {
        let info = self
            .root
            .get("info")
            .and_then(Value::as_object)
            .ok_or_else(|| SchemaError::invalid_document("missing 'info' object"))?;

        Ok(ApiInfo {
            title: string_field(info, "title").unwrap_or_default(),
            version: match info.get("version") {
                Some(Value::String(version)) => version.clone(),
                Some(Value::Number(version)) => version.to_string(),
                _ => String::new(),
            },
            description: string_field(info, "description"),
        })
    }

    fn load_servers(&self) -> Vec<ServerDescriptor> {
        self.root
            .get("servers")
            .and_then(Value::as_array)
            .map(|servers| {
                servers
                    .iter()
                    .filter_map(Value::as_object)
                    .filter_map(|server| {
                        Some(ServerDescriptor {
                            url: string_field(server, "url")?,
                            description: string_field(server, "description"),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn load_operations(&mut self) -> Result<Vec<OperationDescriptor>, SchemaError> {
        let mut operations = Vec::new();
        let root = self.root;
        let Some(paths) = root.get("paths").and_then(Value::as_object) else {
            return Ok(operations);
        };

        for (path, item) in paths {
            let item = self.follow(item, "#/")?;
            let Some(item) = item.as_object() else {
                continue;
            };

            let shared = item
                .get("parameters")
                .map(|parameters| self.load_parameters(parameters))
                .transpose()?
                .unwrap_or_default();

            for method in HttpMethod::ALL {
                let Some(operation) = item.get(method.path_item_key()).and_then(Value::as_object)
                else {
                    continue;
                };
                operations.push(self.load_operation(path, method, operation, &shared)?);
            }
        }

        Ok(operations)
    }

    fn load_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        operation: &'a Map<String, Value>,
        shared: &[ParameterDescriptor],
    ) -> Result<OperationDescriptor, SchemaError> {
        let own = operation
            .get("parameters")
            .map(|parameters| self.load_parameters(parameters))
            .transpose()?
            .unwrap_or_default();

        let mut parameters: Vec<ParameterDescriptor> = shared
            .iter()
            .filter(|candidate| {
                !own.iter().any(|parameter| {
                    parameter.name == candidate.name && parameter.location == candidate.location
                })
            })
            .cloned()
            .collect();
        parameters.extend(own);

        let request_body = match operation.get("requestBody") {
            Some(body) => Some(self.load_request_body(body)?),
            None => None,
        };

        let mut responses = IndexMap::new();
        if let Some(entries) = operation.get("responses").and_then(Value::as_object) {
            for (status, response) in entries {
                responses.insert(status.clone(), self.load_response(response)?);
            }
        }

        Ok(OperationDescriptor {
            operation_id: string_field(operation, "operationId"),
            summary: string_field(operation, "summary"),
            description: string_field(operation, "description"),
            path: path.to_string(),
            method,
            parameters,
            request_body,
            responses,
        })
    }

    fn load_parameters(&mut self, value: &'a Value) -> Result<Vec<ParameterDescriptor>, SchemaError> {
        let Some(entries) = value.as_array() else {
            return Ok(Vec::new());
        };

        let mut parameters = Vec::with_capacity(entries.len());
        for entry in entries {
            let entry = self.follow(entry, PARAMETER_PREFIX)?;
            let Some(parameter) = entry.as_object() else {
                continue;
            };
            let name = string_field(parameter, "name")
                .ok_or_else(|| SchemaError::invalid_document("parameter is missing 'name'"))?;
            let location = parameter
                .get("in")
                .and_then(Value::as_str)
                .and_then(ParameterLocation::parse)
                .ok_or_else(|| {
                    SchemaError::invalid_document(format!(
                        "parameter '{name}' has a missing or unknown 'in' location"
                    ))
                })?;

            let schema = match parameter.get("schema") {
                Some(schema) => self.schemas.parse_schema(schema),
                None => {
                    let media_schema = parameter
                        .get("content")
                        .and_then(Value::as_object)
                        .and_then(|content| content.values().next())
                        .and_then(|media| media.get("schema"));
                    match media_schema {
                        Some(schema) => self.schemas.parse_schema(schema),
                        None => self.schemas.alloc(SchemaNode::default()),
                    }
                }
            };

            parameters.push(ParameterDescriptor {
                required: location == ParameterLocation::Path
                    || parameter.get("required").and_then(Value::as_bool).unwrap_or(false),
                description: string_field(parameter, "description"),
                name,
                location,
                schema,
            });
        }
        Ok(parameters)
    }

    fn load_request_body(&mut self, value: &'a Value) -> Result<RequestBodyDescriptor, SchemaError> {
        let value = self.follow(value, REQUEST_BODY_PREFIX)?;
        let Some(body) = value.as_object() else {
            return Ok(RequestBodyDescriptor::default());
        };

        Ok(RequestBodyDescriptor {
            required: body.get("required").and_then(Value::as_bool).unwrap_or(false),
            description: string_field(body, "description"),
            content: self.load_content(body.get("content")),
        })
    }

    fn load_response(&mut self, value: &'a Value) -> Result<ResponseDescriptor, SchemaError> {
        let value = self.follow(value, RESPONSE_PREFIX)?;
        let Some(response) = value.as_object() else {
            return Ok(ResponseDescriptor::default());
        };

        Ok(ResponseDescriptor {
            description: string_field(response, "description"),
            content: self.load_content(response.get("content")),
        })
    }

    fn load_content(&mut self, value: Option<&'a Value>) -> IndexMap<String, MediaTypeDescriptor> {
        let mut content = IndexMap::new();
        let Some(entries) = value.and_then(Value::as_object) else {
            return content;
        };

        for (media_type, media) in entries {
            let examples = media
                .get("examples")
                .and_then(Value::as_object)
                .map(|examples| {
                    examples
                        .iter()
                        .filter_map(|(name, example)| {
                            let value = self.follow(example, "#/components/examples/").ok()?;
                            Some((name.clone(), value.get("value")?.clone()))
                        })
                        .collect()
                })
                .unwrap_or_default();

            content.insert(
                media_type.clone(),
                MediaTypeDescriptor {
                    schema: media.get("schema").map(|schema| self.schemas.parse_schema(schema)),
                    example: media.get("example").cloned(),
                    examples,
                },
            );
        }
        content
    }

    /// Resolves a local `$ref` object against the raw document, following short chains.
    fn follow(&self, value: &'a Value, expected_prefix: &str) -> Result<&'a Value, SchemaError> {
        let mut current = value;
        for _ in 0..MAX_REFERENCE_HOPS {
            let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
                return Ok(current);
            };
            if !reference.starts_with(expected_prefix) {
                return Err(SchemaError::invalid_document(format!(
                    "reference '{reference}' does not point into '{expected_prefix}'"
                )));
            }
            current = self.pointer(reference)?;
        }
        Err(SchemaError::invalid_document(format!(
            "reference chain starting at {value} is too long or cyclic"
        )))
    }

    fn pointer(&self, reference: &str) -> Result<&'a Value, SchemaError> {
        let root = self.root;
        let pointer = reference.trim_start_matches('#');
        let mut current: Option<&'a Value> = None;
        for segment in pointer.split('/').skip(1) {
            let segment = segment.replace("~1", "/").replace("~0", "~");
            current = match current {
                None => root.get(&segment),
                Some(value) => value.get(&segment),
            };
            if current.is_none() {
                break;
            }
        }
        current.ok_or_else(|| {
            SchemaError::invalid_document(format!("reference '{reference}' cannot be resolved"))
        })
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::SchemaType;

    fn document(value: Value) -> OpenApiDocument {
        OpenApiDocument::from_value(&value).expect("document should load")
    }

    #[test]
    fn operations_follow_path_then_method_order() {
        let document = document(json!({
            "openapi": "3.0.3",
            "info": {"title": "Pets", "version": "2"},
            "paths": {
                "/pets": {
                    "post": {"operationId": "createPet"},
                    "get": {"operationId": "listPets"}
                },
                "/pets/{id}": {"delete": {"operationId": "deletePet"}}
            }
        }));

        let ids: Vec<_> = document
            .operations
            .iter()
            .map(|operation| operation.operation_id.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(ids, vec!["listPets", "createPet", "deletePet"]);
        assert_eq!(document.version, SpecVersion::V30);
        assert_eq!(document.info.version, "2");
    }

    #[test]
    fn path_level_parameters_are_overridden_by_operation_parameters() {
        let document = document(json!({
            "openapi": "3.1.0",
            "info": {"title": "Pets", "version": "1"},
            "paths": {
                "/pets/{id}": {
                    "parameters": [
                        {"name": "id", "in": "path", "description": "shared", "schema": {"type": "string"}},
                        {"name": "trace", "in": "header", "schema": {"type": "string"}}
                    ],
                    "get": {
                        "parameters": [
                            {"name": "id", "in": "path", "required": true, "description": "own", "schema": {"type": "integer"}}
                        ]
                    }
                }
            }
        }));

        let parameters = &document.operations[0].parameters;
        assert_eq!(parameters.len(), 2);
        assert_eq!(parameters[0].name, "trace");
        assert_eq!(parameters[1].description.as_deref(), Some("own"));
        assert!(document.schemas.node(parameters[1].schema).has_type(SchemaType::Integer));
    }

    #[test]
    fn component_parameters_and_bodies_are_resolved() {
        let document = document(json!({
            "openapi": "3.0.1",
            "info": {"title": "Pets", "version": "1"},
            "components": {
                "parameters": {"Limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}}},
                "requestBodies": {"PetBody": {"description": "A pet", "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}}},
                "schemas": {"Pet": {"type": "object", "properties": {"name": {"type": "string"}}}}
            },
            "paths": {
                "/pets": {
                    "post": {
                        "parameters": [{"$ref": "#/components/parameters/Limit"}],
                        "requestBody": {"$ref": "#/components/requestBodies/PetBody"}
                    }
                }
            }
        }));

        let operation = &document.operations[0];
        assert_eq!(operation.parameters[0].name, "limit");
        let body = operation.request_body.as_ref().expect("body should load");
        assert_eq!(body.description.as_deref(), Some("A pet"));
        let schema = body.content["application/json"].schema.expect("schema should load");
        assert_eq!(
            document.schemas.resolve(schema),
            document.schemas.component("Pet").expect("Pet component")
        );
    }

    #[test]
    fn response_examples_keep_their_values() {
        let document = document(json!({
            "openapi": "3.1.0",
            "info": {"title": "Pets", "version": "1"},
            "paths": {"/pets": {"get": {"responses": {"200": {"content": {"application/json": {
                "example": {"single": true},
                "examples": {"first": {"value": [1, 2]}, "noValue": {"summary": "skip"}}
            }}}}}}}
        }));

        let media = &document.operations[0].responses["200"].content["application/json"];
        assert_eq!(media.example, Some(json!({"single": true})));
        assert_eq!(media.examples.len(), 1);
        assert_eq!(media.examples["first"], json!([1, 2]));
    }

    #[test]
    fn unsupported_versions_and_unknown_locations_fail() {
        let error = OpenApiDocument::from_value(&json!({"openapi": "2.0", "info": {}}))
            .expect_err("swagger 2 should be rejected");
        assert_eq!(error.kind, crate::SchemaErrorKind::UnsupportedVersion);

        let error = OpenApiDocument::from_value(&json!({
            "openapi": "3.0.0",
            "info": {"title": "x", "version": "1"},
            "paths": {"/a": {"get": {"parameters": [{"name": "p", "in": "body"}]}}}
        }))
        .expect_err("unknown location should be rejected");
        assert_eq!(error.kind, crate::SchemaErrorKind::InvalidDocument);
    }

    #[test]
    fn yaml_and_json_inputs_are_both_accepted() {
        let yaml = "openapi: 3.0.0\ninfo:\n  title: t\n  version: '7'\npaths: {}\n";
        let json = r#"{"openapi":"3.0.0","info":{"title":"t","version":"7"},"paths":{}}"#;

        assert_eq!(OpenApiDocument::parse(yaml).expect("yaml").info.version, "7");
        assert_eq!(OpenApiDocument::parse(json).expect("json").info.version, "7");
    }
}
