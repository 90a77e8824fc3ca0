//! Raw tool-call argument parsing.
//!
//! ```rust
//! use otooling::parse_arguments;
//! use serde_json::json;
//!
//! let args = parse_arguments(r#"{"userId":"42"}"#).expect("object should parse");
//! assert_eq!(args, json!({"userId": "42"}));
//!
//! let empty = parse_arguments("  ").expect("blank arguments should parse");
//! assert_eq!(empty, json!({}));
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

/// Parses the argument text of a tool call. Blank text means "no arguments".
pub fn parse_arguments(args_json: &str) -> Result<Value, ToolError> {
    if args_json.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(args_json)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}
