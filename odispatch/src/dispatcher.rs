//! Turns decomposed tool arguments into one upstream HTTP call and classifies the outcome.
//!
//! Every path ends in a [`ToolResult`]. Upstream errors pass through verbatim, transport
//! failures collapse into a fixed Bad Gateway body, and a `400` answer to a request whose
//! body carried stringified JSON is retried once with the body repaired.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ocommon::RequestContext;
use oschema::OperationDescriptor;
use serde_json::{Map, Value, json};

use crate::{
    DecomposedRequestData, DefaultErrorModelProvider, DispatchHooks, DoubleSerializationCorrector,
    EnricherChain, ErrorModelProvider, HttpRequest, HttpResponse, HttpTransport,
    JSON_CONTENT_TYPE, NoopDispatchHooks, TransportError,
};

pub const COMPLETED_MESSAGE: &str = "Tool call completed successfully";

/// Outcome of one tool invocation, as handed back to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }

    /// Canned success for upstream answers without a body.
    pub fn completed() -> Self {
        Self::success(json!({ "message": COMPLETED_MESSAGE }).to_string())
    }

    pub fn content_json(&self) -> Option<Value> {
        serde_json::from_str(&self.content).ok()
    }
}

pub struct Dispatcher {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    enrichers: EnricherChain,
    hooks: Arc<dyn DispatchHooks>,
    error_model: Arc<dyn ErrorModelProvider>,
    double_serialization_mitigation: bool,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            enrichers: EnricherChain::new(),
            hooks: Arc::new(NoopDispatchHooks),
            error_model: Arc::new(DefaultErrorModelProvider),
            double_serialization_mitigation: true,
        }
    }

    pub fn with_enrichers(mut self, enrichers: EnricherChain) -> Self {
        self.enrichers = enrichers;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn DispatchHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_error_model(mut self, error_model: Arc<dyn ErrorModelProvider>) -> Self {
        self.error_model = error_model;
        self
    }

    pub fn with_double_serialization_mitigation(mut self, enabled: bool) -> Self {
        self.double_serialization_mitigation = enabled;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn handle(
        &self,
        operation: &OperationDescriptor,
        data: DecomposedRequestData,
        context: &RequestContext,
    ) -> ToolResult {
        let started = Instant::now();
        let label = operation.label();
        let result = self.dispatch(&label, operation, &data, context).await;
        self.hooks
            .on_dispatch_complete(&label, result.is_error, started.elapsed());
        result
    }

    async fn dispatch(
        &self,
        label: &str,
        operation: &OperationDescriptor,
        data: &DecomposedRequestData,
        context: &RequestContext,
    ) -> ToolResult {
        let request = match self.build_request(operation, data, context) {
            Ok(request) => request,
            Err(err) => {
                tracing::warn!(operation = label, error = %err, "could not build upstream request");
                return self.bad_gateway();
            }
        };

        let response = match self.send(label, 1, request.clone()).await {
            Ok(response) => response,
            Err(_) => return self.bad_gateway(),
        };
        if response.is_success() {
            return success_result(response);
        }
        if response.status != 400 || !self.double_serialization_mitigation {
            return ToolResult::error(response.body);
        }

        let Some(body) = &data.body else {
            return ToolResult::error(response.body);
        };
        let Some(corrected) = DoubleSerializationCorrector::corrected(&body.content) else {
            return ToolResult::error(response.body);
        };

        tracing::info!(
            operation = label,
            "upstream rejected a double-serialized body, retrying once with the corrected body"
        );
        self.hooks.on_correction_retry(label);

        let retry = match encode_body(&corrected) {
            Ok(bytes) => request.with_body(bytes),
            Err(err) => {
                tracing::warn!(operation = label, error = %err, "could not encode corrected body");
                return ToolResult::error(response.body);
            }
        };
        match self.send(label, 2, retry).await {
            Ok(response) if response.is_success() => success_result(response),
            Ok(response) => ToolResult::error(response.body),
            Err(_) => self.bad_gateway(),
        }
    }

    async fn send(
        &self,
        label: &str,
        attempt: u32,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        self.hooks.on_attempt_start(label, attempt);
        let started = Instant::now();
        match self.transport.send(request).await {
            Ok(response) => {
                let elapsed: Duration = started.elapsed();
                tracing::debug!(
                    operation = label,
                    attempt,
                    status = response.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "upstream call completed"
                );
                self.hooks
                    .on_attempt_complete(label, attempt, response.status, elapsed);
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(operation = label, attempt, error = %err, "upstream call failed");
                self.hooks.on_transport_failure(label, attempt, &err);
                Err(err)
            }
        }
    }

    fn bad_gateway(&self) -> ToolResult {
        ToolResult::error(self.error_model.error_json(502).to_string())
    }

    /// Assembles the outbound request: URL, parameter headers, forwarded credentials,
    /// enrichment, default `Accept`, then the body.
    pub fn build_request(
        &self,
        operation: &OperationDescriptor,
        data: &DecomposedRequestData,
        context: &RequestContext,
    ) -> Result<HttpRequest, TransportError> {
        let parameters = &data.parameters;
        let path = expand_path(&operation.path, &parameters.path);
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let query = query_string(&parameters.query);
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        let mut request = HttpRequest::new(operation.method, url);
        let headers = &mut request.headers;

        for (name, value) in &parameters.header {
            let values = scalar_values(value);
            if !values.is_empty() {
                headers.append(name.clone(), values.join(","));
            }
        }

        let cookies: Vec<String> = parameters
            .cookie
            .iter()
            .flat_map(|(name, value)| {
                scalar_values(value)
                    .into_iter()
                    .map(move |value| format!("{name}={value}"))
            })
            .collect();
        if !cookies.is_empty() {
            headers.append("Cookie", cookies.join("; "));
        }

        if let Some(authorization) = context
            .inbound_header("Authorization")
            .filter(|value| !value.trim().is_empty())
        {
            headers.set("Authorization", authorization);
        }

        self.enrichers.apply(headers, context);
        headers.set_if_absent("Accept", JSON_CONTENT_TYPE);

        if let Some(body) = &data.body {
            request.headers.set("Content-Type", body.content_type.clone());
            request.body = Some(encode_body(&body.content)?);
        }

        Ok(request)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url)
            .field("enrichers", &self.enrichers)
            .field(
                "double_serialization_mitigation",
                &self.double_serialization_mitigation,
            )
            .finish()
    }
}

fn success_result(response: HttpResponse) -> ToolResult {
    if response.body.is_empty() {
        ToolResult::completed()
    } else {
        ToolResult::success(response.body)
    }
}

/// Strings travel as their raw bytes, everything else as JSON text.
fn encode_body(content: &Value) -> Result<Vec<u8>, TransportError> {
    match content {
        Value::String(text) => Ok(text.as_bytes().to_vec()),
        other => serde_json::to_vec(other)
            .map_err(|err| TransportError::invalid_request(format!("body is not encodable: {err}"))),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn scalar_values(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

fn expand_path(template: &str, values: &Map<String, Value>) -> String {
    let mut path = template.to_string();
    for (name, value) in values {
        let encoded: Vec<String> = scalar_values(value)
            .iter()
            .map(|value| urlencoding::encode(value).into_owned())
            .collect();
        path = path.replace(&format!("{{{name}}}"), &encoded.join(","));
    }
    path
}

fn query_string(values: &Map<String, Value>) -> String {
    let mut pairs = Vec::new();
    for (name, value) in values {
        for value in scalar_values(value) {
            pairs.push(format!(
                "{}={}",
                urlencoding::encode(name),
                urlencoding::encode(&value)
            ));
        }
    }
    pairs.join("&")
}
