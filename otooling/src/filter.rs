//! Ordered interception of tool calls.
//!
//! Filters run in ascending [`ToolCallFilter::order`]. Each one either answers the call
//! itself or hands it on through [`Next`]; the stage after the last filter invokes the tool.

use std::sync::Arc;

use ocommon::RequestContext;
use odispatch::ToolResult;
use oschema::OperationDescriptor;

use crate::{Tool, ToolCall, ToolError, ToolFuture};

pub const MISSING_EXAMPLE_MESSAGE: &str = "Missing OpenAPI example for mocking";

const MOCKED_MEDIA_TYPE: &str = "application/json";

pub trait ToolCallFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn order(&self) -> i32 {
        0
    }

    fn call<'a>(
        &'a self,
        call: ToolCall,
        context: &'a RequestContext,
        next: Next<'a>,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>>;
}

/// The remainder of the chain, ending in the tool itself.
pub struct Next<'a> {
    filters: &'a [Arc<dyn ToolCallFilter>],
    tool: &'a dyn Tool,
}

impl<'a> Next<'a> {
    pub fn new(filters: &'a [Arc<dyn ToolCallFilter>], tool: &'a dyn Tool) -> Self {
        Self { filters, tool }
    }

    pub fn tool(&self) -> &'a dyn Tool {
        self.tool
    }

    pub fn run(
        self,
        call: ToolCall,
        context: &'a RequestContext,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
        match self.filters.split_first() {
            Some((filter, rest)) => filter.call(
                call,
                context,
                Next {
                    filters: rest,
                    tool: self.tool,
                },
            ),
            None => self.tool.invoke(call.arguments, context),
        }
    }
}

/// Answers calls from the operation's documented response examples instead of calling
/// the upstream API. Registered as the last filter so every other filter still runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolResultMocker;

impl ToolResultMocker {
    pub const ORDER: i32 = i32::MAX;

    /// JSON text of the first documented success example, if the operation has one.
    ///
    /// Responses are searched `default`, `2xx`, then `200` to `299`. Within a response
    /// the first JSON media type counts, and its named examples win over `example`.
    pub fn pick_example(operation: &OperationDescriptor) -> Option<String> {
        let statuses = ["default".to_string(), "2xx".to_string()]
            .into_iter()
            .chain((200..300).map(|status: u16| status.to_string()));

        statuses
            .filter_map(|status| operation.responses.get(&status))
            .filter_map(|response| {
                response
                    .content
                    .iter()
                    .find(|(media_type, _)| media_type.contains(MOCKED_MEDIA_TYPE))
                    .map(|(_, media)| media)
            })
            .find_map(|media| {
                media
                    .examples
                    .values()
                    .find(|value| !value.is_null())
                    .or(media.example.as_ref().filter(|value| !value.is_null()))
                    .map(|value| value.to_string())
            })
    }
}

impl ToolCallFilter for ToolResultMocker {
    fn name(&self) -> &'static str {
        "ToolResultMocker"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn call<'a>(
        &'a self,
        call: ToolCall,
        _context: &'a RequestContext,
        next: Next<'a>,
    ) -> ToolFuture<'a, Result<ToolResult, ToolError>> {
        Box::pin(async move {
            tracing::trace!(tool = %call.name, "mocking tool call");
            let Some(operation) = next.tool().operation() else {
                tracing::error!(tool = %call.name, "tool has no OpenAPI operation to mock from");
                return Ok(ToolResult::error(MISSING_EXAMPLE_MESSAGE));
            };

            match Self::pick_example(operation) {
                Some(example) => Ok(ToolResult::success(example)),
                None => {
                    tracing::error!(
                        tool = %call.name,
                        method = %operation.method,
                        path = %operation.path,
                        "operation documents no JSON success example"
                    );
                    Ok(ToolResult::error(MISSING_EXAMPLE_MESSAGE))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use oschema::OpenApiDocument;
    use serde_json::json;

    use super::*;

    const RESPONSES: &str = r#"
openapi: 3.1.0
info: {title: Mock, version: "1"}
paths:
  /preferred:
    get:
      operationId: preferred
      responses:
        "201":
          description: created
          content:
            application/json: {example: {"from": "201"}}
        "2xx":
          description: any success
          content:
            text/plain: {example: "plain"}
            application/json; charset=utf-8:
              example: {"from": "2xx"}
  /named:
    get:
      operationId: named
      responses:
        "200":
          description: ok
          content:
            application/json:
              example: {"from": "example"}
              examples:
                first: {value: {"from": "examples"}}
  /errors:
    get:
      operationId: errors
      responses:
        "404":
          description: missing
          content:
            application/json: {example: {"error": "nope"}}
"#;

    fn operation(operation_id: &str) -> OperationDescriptor {
        OpenApiDocument::parse(RESPONSES)
            .expect("document should parse")
            .operation(operation_id)
            .cloned()
            .expect("operation should exist")
    }

    #[test]
    fn wildcard_status_wins_over_explicit_codes() {
        assert_eq!(
            ToolResultMocker::pick_example(&operation("preferred")),
            Some(json!({"from": "2xx"}).to_string())
        );
    }

    #[test]
    fn named_examples_win_over_the_single_example() {
        assert_eq!(
            ToolResultMocker::pick_example(&operation("named")),
            Some(json!({"from": "examples"}).to_string())
        );
    }

    #[test]
    fn error_responses_are_never_mocked() {
        assert_eq!(ToolResultMocker::pick_example(&operation("errors")), None);
    }
}
