//! Packing protocol between an operation's parameters/body and one tool input schema.
//!
//! `compose` builds the advertised schema once per operation. `decompose` maps the
//! arguments of every call back onto parameter buckets and a body. Both sides agree on
//! the two wrapper keys, so whatever shape `compose` advertises, `decompose` can read.
//!
//! ```rust
//! use otooling::InputSchemaComposer;
//! use oschema::OpenApiDocument;
//! use serde_json::json;
//!
//! let mut document = OpenApiDocument::parse(r#"
//! openapi: 3.1.0
//! info: {title: Users, version: "1"}
//! paths:
//!   /users/{userId}:
//!     get:
//!       operationId: getUser
//!       parameters:
//!         - {name: userId, in: path, required: true, schema: {type: string}}
//! "#).expect("document should parse");
//!
//! let composer = InputSchemaComposer::default();
//! let operation = document.operations[0].clone();
//! let schema = composer
//!     .compose(&mut document.schemas, &operation, document.version)
//!     .expect("parameters should compose");
//!
//! assert_eq!(document.schemas.render(schema)["required"], json!(["userId"]));
//!
//! let data = composer.decompose(&json!({"userId": "7"}), &operation);
//! assert_eq!(data.parameters.path.get("userId"), Some(&json!("7")));
//! ```

use odispatch::{DecomposedRequestData, ParametersByType, RequestBody};
use oschema::{
    OperationDescriptor, ParameterLocation, SchemaGraph, SchemaId, SchemaNode, SchemaType,
    SpecVersion,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_PARAMS_KEY: &str = "_params";
pub const DEFAULT_BODY_KEY: &str = "_body";

const JSON_MEDIA_TYPE: &str = "application/json";

/// Wrapper key names used when an operation needs both parameters and a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchemaConfig {
    pub params_key: String,
    pub body_key: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            params_key: DEFAULT_PARAMS_KEY.to_string(),
            body_key: DEFAULT_BODY_KEY.to_string(),
        }
    }
}

impl SchemaConfig {
    pub fn with_params_key(mut self, params_key: impl Into<String>) -> Self {
        self.params_key = params_key.into();
        self
    }

    pub fn with_body_key(mut self, body_key: impl Into<String>) -> Self {
        self.body_key = body_key.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputSchemaComposer {
    config: SchemaConfig,
}

impl InputSchemaComposer {
    pub fn new(config: SchemaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchemaConfig {
        &self.config
    }

    /// Builds the input schema for `operation`, or `None` when it takes no input.
    ///
    /// New nodes are allocated in `graph`; shared component nodes are never modified.
    pub fn compose(
        &self,
        graph: &mut SchemaGraph,
        operation: &OperationDescriptor,
        version: SpecVersion,
    ) -> Option<SchemaId> {
        let params = self.parameter_schema(graph, operation);
        let body = self.body_schema(graph, operation, version);

        match (params, body) {
            (None, None) => None,
            (Some(params), None) => Some(params),
            (None, Some(body)) => {
                let resolved = graph.resolved(body);
                if resolved.has_type(SchemaType::Object) && !resolved.properties.is_empty() {
                    return Some(body);
                }
                tracing::debug!(
                    operation = %operation.label(),
                    body_key = %self.config.body_key,
                    "request body is not an object with properties, wrapping it"
                );
                let mut wrapper = SchemaNode::object()
                    .with_property(self.config.body_key.clone(), body)
                    .with_required(self.config.body_key.clone());
                wrapper.description = operation
                    .request_body
                    .as_ref()
                    .and_then(|request_body| request_body.description.clone());
                Some(graph.alloc(wrapper))
            }
            (Some(params), Some(body)) => Some(
                graph.alloc(
                    SchemaNode::object()
                        .with_property(self.config.params_key.clone(), params)
                        .with_property(self.config.body_key.clone(), body)
                        .with_required(self.config.params_key.clone())
                        .with_required(self.config.body_key.clone()),
                ),
            ),
        }
    }

    fn parameter_schema(
        &self,
        graph: &mut SchemaGraph,
        operation: &OperationDescriptor,
    ) -> Option<SchemaId> {
        if !operation.has_parameters() {
            return None;
        }

        let mut schema = SchemaNode::object();
        for parameter in &operation.parameters {
            if parameter.location == ParameterLocation::Form {
                tracing::warn!(
                    operation = %operation.label(),
                    parameter = %parameter.name,
                    location = parameter.location.as_str(),
                    "unsupported parameter location, skipping"
                );
                continue;
            }

            let described = graph.node(parameter.schema).description.is_some()
                || graph.resolved(parameter.schema).description.is_some();
            let property = match (&parameter.description, described) {
                (Some(description), false) => {
                    let copy = graph.duplicate(parameter.schema);
                    graph.node_mut(copy).description = Some(description.clone());
                    copy
                }
                _ => parameter.schema,
            };

            schema.properties.insert(parameter.name.clone(), property);
            if parameter.required {
                schema = schema.with_required(parameter.name.clone());
            }
        }

        Some(graph.alloc(schema))
    }

    fn body_schema(
        &self,
        graph: &mut SchemaGraph,
        operation: &OperationDescriptor,
        version: SpecVersion,
    ) -> Option<SchemaId> {
        let request_body = operation.request_body.as_ref()?;
        let Some(source) = json_body_schema(operation) else {
            tracing::warn!(
                operation = %operation.label(),
                media_types = ?request_body.content.keys().collect::<Vec<_>>(),
                "request body has no usable JSON media type, skipping"
            );
            return None;
        };

        let Some(description) = &request_body.description else {
            return Some(source);
        };
        if graph.node(source).description.is_some() || graph.resolved(source).description.is_some()
        {
            return Some(source);
        }

        // 3.0 documents get the description on a private copy, inline or referenced.
        let target = if !version.shares_references_safely() {
            let resolved = graph.resolve(source);
            graph.duplicate(resolved)
        } else {
            source
        };
        graph.node_mut(target).description = Some(description.clone());
        Some(target)
    }

    /// Splits call arguments into parameter buckets and a body, guided by `operation`.
    ///
    /// Never fails: malformed or ambiguous shapes are logged and read as empty.
    pub fn decompose(&self, arguments: &Value, operation: &OperationDescriptor) -> DecomposedRequestData {
        let has_parameters = operation.has_parameters();
        let has_body = json_body_schema(operation).is_some();
        let label = operation.label();

        if let Some(object) = arguments.as_object().filter(|object| {
            object.contains_key(&self.config.params_key) || object.contains_key(&self.config.body_key)
        }) {
            let mut parameters = ParametersByType::new();
            if let Some(wrapped) = object.get(&self.config.params_key) {
                match (has_parameters, wrapped.as_object()) {
                    (false, _) => tracing::warn!(
                        operation = %label,
                        key = %self.config.params_key,
                        "operation declares no parameters, skipping wrapped parameters"
                    ),
                    (true, None) => tracing::warn!(
                        operation = %label,
                        key = %self.config.params_key,
                        "expected a map of parameters, skipping"
                    ),
                    (true, Some(values)) => parameters = bucket_parameters(values, operation),
                }
            }

            let mut body = None;
            if let Some(wrapped) = object.get(&self.config.body_key) {
                if has_body {
                    body = body_content(wrapped);
                } else {
                    tracing::warn!(
                        operation = %label,
                        key = %self.config.body_key,
                        "operation declares no JSON request body, skipping wrapped body"
                    );
                }
            }

            return DecomposedRequestData::new(parameters, body);
        }

        match (has_parameters, has_body) {
            (true, false) => match arguments.as_object() {
                Some(values) => {
                    DecomposedRequestData::new(bucket_parameters(values, operation), None)
                }
                None => {
                    tracing::warn!(operation = %label, "expected a map of parameters, skipping");
                    DecomposedRequestData::empty()
                }
            },
            (false, true) => DecomposedRequestData::new(ParametersByType::new(), body_content(arguments)),
            _ => {
                tracing::warn!(
                    operation = %label,
                    has_parameters,
                    has_body,
                    "arguments are not wrapped and cannot be assigned unambiguously, sending no input"
                );
                DecomposedRequestData::empty()
            }
        }
    }
}

/// Schema of the first `application/json` media type on the request body, if any.
pub fn json_body_schema(operation: &OperationDescriptor) -> Option<SchemaId> {
    operation
        .request_body
        .as_ref()?
        .content
        .iter()
        .find(|(media_type, _)| is_json_media_type(media_type))
        .and_then(|(_, media)| media.schema)
}

fn is_json_media_type(media_type: &str) -> bool {
    media_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(JSON_MEDIA_TYPE))
}

fn bucket_parameters(values: &Map<String, Value>, operation: &OperationDescriptor) -> ParametersByType {
    let mut parameters = ParametersByType::new();
    for parameter in &operation.parameters {
        let Some(value) = values.get(&parameter.name).filter(|value| !value.is_null()) else {
            continue;
        };
        if !parameters.insert(parameter.location, parameter.name.clone(), value.clone()) {
            tracing::warn!(
                operation = %operation.label(),
                parameter = %parameter.name,
                location = parameter.location.as_str(),
                "unsupported parameter location, skipping"
            );
        }
    }
    parameters
}

fn body_content(value: &Value) -> Option<RequestBody> {
    match value {
        Value::Null => None,
        other => Some(RequestBody::json(other.clone())),
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use oschema::{
        HttpMethod, MediaTypeDescriptor, OpenApiDocument, ParameterDescriptor,
        RequestBodyDescriptor,
    };
    use serde_json::json;

    use super::*;

    const USERS: &str = r#"
openapi: 3.0.3
info: {title: Users, version: "1"}
paths:
  /users/{userId}:
    get:
      operationId: getUser
      parameters:
        - {name: userId, in: path, required: true, description: User identifier, schema: {type: string}}
        - {name: verbose, in: query, schema: {type: boolean, description: Include everything}}
    put:
      operationId: updateUser
      parameters:
        - {name: userId, in: path, required: true, schema: {type: string}}
      requestBody:
        required: true
        description: Replacement user
        content:
          application/json:
            schema: {$ref: '#/components/schemas/User'}
  /users:
    post:
      operationId: createUser
      requestBody:
        description: New user
        content:
          application/json; charset=utf-8:
            schema: {$ref: '#/components/schemas/User'}
  /tags:
    post:
      operationId: addTags
      requestBody:
        description: Tags to add
        content:
          application/json:
            schema: {type: array, items: {type: string}}
  /avatars:
    post:
      operationId: uploadAvatar
      requestBody:
        content:
          image/png:
            schema: {type: string, format: binary}
  /ping:
    get:
      operationId: ping
components:
  schemas:
    User:
      type: object
      properties:
        name: {type: string}
"#;

    fn users() -> OpenApiDocument {
        OpenApiDocument::parse(USERS).expect("users document should parse")
    }

    fn compose(document: &mut OpenApiDocument, operation_id: &str) -> Option<Value> {
        let operation = document
            .operation(operation_id)
            .cloned()
            .expect("operation should exist");
        InputSchemaComposer::default()
            .compose(&mut document.schemas, &operation, document.version)
            .map(|id| document.schemas.render(id))
    }

    #[test]
    fn single_path_parameter_composes_a_flat_object() {
        let mut document = users();
        let schema = compose(&mut document, "getUser").expect("schema should compose");

        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "userId": {"type": "string", "description": "User identifier"},
                    "verbose": {"type": "boolean", "description": "Include everything"}
                },
                "required": ["userId"]
            })
        );
    }

    #[test]
    fn parameter_description_is_injected_into_a_copy() {
        let mut document = users();
        let operation = document.operation("getUser").cloned().expect("operation should exist");
        let original = operation.parameters[0].schema;

        InputSchemaComposer::default().compose(&mut document.schemas, &operation, document.version);

        assert_eq!(document.schemas.node(original).description, None);
    }

    #[test]
    fn parameters_and_body_are_wrapped_under_both_keys() {
        let mut document = users();
        let schema = compose(&mut document, "updateUser").expect("schema should compose");

        assert_eq!(schema["required"], json!(["_params", "_body"]));
        assert_eq!(schema["properties"]["_params"]["required"], json!(["userId"]));
        assert_eq!(
            schema["properties"]["_body"],
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "description": "Replacement user"
            })
        );
        assert_eq!(
            document
                .schemas
                .node(document.schemas.component("User").expect("User should exist"))
                .description,
            None
        );
    }

    #[test]
    fn inline_body_description_is_injected_into_a_copy() {
        let mut document = users();
        let operation = document.operation("addTags").cloned().expect("operation should exist");
        let body = json_body_schema(&operation).expect("body schema should exist");

        let schema = compose(&mut document, "addTags").expect("schema should compose");

        assert_eq!(schema["properties"]["_body"]["description"], json!("Tags to add"));
        assert_eq!(document.schemas.node(body).description, None);
    }

    #[test]
    fn object_body_with_properties_is_promoted() {
        let mut document = users();
        let schema = compose(&mut document, "createUser").expect("schema should compose");

        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {"name": {"type": "string"}},
                "description": "New user"
            })
        );
    }

    #[test]
    fn non_object_body_is_wrapped_under_the_body_key() {
        let mut document = users();
        let schema = compose(&mut document, "addTags").expect("schema should compose");

        assert_eq!(
            schema,
            json!({
                "type": "object",
                "properties": {
                    "_body": {
                        "type": "array",
                        "items": {"type": "string"},
                        "description": "Tags to add"
                    }
                },
                "required": ["_body"],
                "description": "Tags to add"
            })
        );
    }

    #[test]
    fn non_json_body_and_no_input_compose_to_nothing() {
        let mut document = users();
        assert_eq!(compose(&mut document, "uploadAvatar"), None);
        assert_eq!(compose(&mut document, "ping"), None);
    }

    #[test]
    fn form_parameters_are_left_out_of_the_schema() {
        let mut graph = SchemaGraph::new();
        let string = graph.parse_schema(&json!({"type": "string"}));
        let operation = OperationDescriptor::new(HttpMethod::Post, "/upload")
            .with_parameter(ParameterDescriptor {
                name: "file".to_string(),
                location: ParameterLocation::Form,
                required: true,
                description: None,
                schema: string,
            });

        let id = InputSchemaComposer::default()
            .compose(&mut graph, &operation, SpecVersion::V30)
            .expect("parameter schema should exist");

        assert_eq!(graph.render(id), json!({"type": "object"}));
    }

    #[test]
    fn custom_wrapper_keys_are_used() {
        let mut document = users();
        let operation = document.operation("updateUser").cloned().expect("operation should exist");
        let composer = InputSchemaComposer::new(
            SchemaConfig::default().with_params_key("params").with_body_key("body"),
        );

        let id = composer
            .compose(&mut document.schemas, &operation, document.version)
            .expect("schema should compose");
        assert_eq!(document.schemas.render(id)["required"], json!(["params", "body"]));

        let data = composer.decompose(
            &json!({"params": {"userId": "1"}, "body": {"name": "x"}}),
            &operation,
        );
        assert_eq!(data.parameters.path.get("userId"), Some(&json!("1")));
        assert_eq!(data.body.map(|body| body.content), Some(json!({"name": "x"})));
    }

    #[test]
    fn wrapped_arguments_are_decomposed() {
        let document = users();
        let operation = document.operation("updateUser").expect("operation should exist");

        let data = InputSchemaComposer::default().decompose(
            &json!({"_params": {"userId": "1"}, "_body": {"name": "x"}}),
            operation,
        );

        assert_eq!(data.parameters.path.get("userId"), Some(&json!("1")));
        assert_eq!(data.parameters.path.len(), 1);
        assert!(data.parameters.query.is_empty());
        assert_eq!(data.body, Some(RequestBody::json(json!({"name": "x"}))));
    }

    #[test]
    fn wrapped_parameters_of_the_wrong_shape_are_ignored() {
        let document = users();
        let operation = document.operation("updateUser").expect("operation should exist");

        let data = InputSchemaComposer::default()
            .decompose(&json!({"_params": "userId=1", "_body": null}), operation);

        assert!(data.parameters.is_empty());
        assert_eq!(data.body, None);
    }

    #[test]
    fn wrapped_parts_the_operation_does_not_declare_are_skipped() {
        let document = users();
        let operation = document.operation("getUser").expect("operation should exist");

        let data = InputSchemaComposer::default().decompose(
            &json!({"_params": {"userId": "1"}, "_body": {"name": "x"}}),
            operation,
        );

        assert_eq!(data.parameters.path.get("userId"), Some(&json!("1")));
        assert_eq!(data.body, None);
    }

    #[test]
    fn flat_parameters_are_bucketed_by_location() {
        let document = users();
        let operation = document.operation("getUser").expect("operation should exist");

        let data = InputSchemaComposer::default().decompose(
            &json!({"userId": "1", "verbose": true, "unknown": 3}),
            operation,
        );

        assert_eq!(data.parameters.path.get("userId"), Some(&json!("1")));
        assert_eq!(data.parameters.query.get("verbose"), Some(&json!(true)));
        assert_eq!(data.parameters.path.len() + data.parameters.query.len(), 2);
        assert_eq!(data.body, None);
    }

    #[test]
    fn body_only_operations_take_the_whole_argument_value() {
        let document = users();
        let tags = document.operation("addTags").expect("operation should exist");

        let data = InputSchemaComposer::default().decompose(&json!(["a", "b"]), tags);

        assert!(data.parameters.is_empty());
        assert_eq!(data.body, Some(RequestBody::json(json!(["a", "b"]))));
    }

    #[test]
    fn unwrapped_arguments_for_mixed_operations_are_ambiguous() {
        let document = users();
        let operation = document.operation("updateUser").expect("operation should exist");

        let data = InputSchemaComposer::default()
            .decompose(&json!({"userId": "1", "name": "x"}), operation);

        assert_eq!(data, DecomposedRequestData::empty());
    }

    #[test]
    fn composed_shapes_round_trip_through_decompose() {
        let mut graph = SchemaGraph::new();
        let string = graph.parse_schema(&json!({"type": "string"}));
        let body = graph.parse_schema(&json!({"type": "object", "properties": {"name": {"type": "string"}}}));
        let mut content = IndexMap::new();
        content.insert(
            "application/json".to_string(),
            MediaTypeDescriptor {
                schema: Some(body),
                ..MediaTypeDescriptor::default()
            },
        );
        let parameter = |name: &str, location| ParameterDescriptor {
            name: name.to_string(),
            location,
            required: false,
            description: None,
            schema: string,
        };
        let operation = OperationDescriptor::new(HttpMethod::Post, "/orgs/{org}/members")
            .with_parameter(parameter("org", ParameterLocation::Path))
            .with_parameter(parameter("dryRun", ParameterLocation::Query))
            .with_parameter(parameter("X-Request-Id", ParameterLocation::Header))
            .with_parameter(parameter("session", ParameterLocation::Cookie))
            .with_request_body(RequestBodyDescriptor {
                required: true,
                description: None,
                content,
            });
        let composer = InputSchemaComposer::default();

        let data = composer.decompose(
            &json!({
                "_params": {"org": "acme", "dryRun": "yes", "X-Request-Id": "r1", "session": "s1"},
                "_body": {"name": "x"}
            }),
            &operation,
        );

        let expected = ParametersByType::new()
            .with(ParameterLocation::Path, "org", json!("acme"))
            .with(ParameterLocation::Query, "dryRun", json!("yes"))
            .with(ParameterLocation::Header, "X-Request-Id", json!("r1"))
            .with(ParameterLocation::Cookie, "session", json!("s1"));
        assert_eq!(data.parameters, expected);
        assert_eq!(data.body, Some(RequestBody::json(json!({"name": "x"}))));
    }
}
