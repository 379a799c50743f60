//! JSON-RPC 2.0 message types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

/// A navigation request was understood but the session rejected it.
pub const NAVIGATION_FAILED: i32 = -32001;

/// An incoming request.
#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// An outgoing response. Exactly one of `result` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub jsonrpc: &'static str,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn success<T: Serialize>(id: Option<Value>, result: T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self {
                jsonrpc: "2.0",
                id,
                result: Some(value),
                error: None,
            },
            Err(e) => {
                warn!("Failed to serialize result: {}", e);
                Self::error(id, INTERNAL_ERROR, e.to_string())
            }
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// An error that still carries a payload, such as the session state after a failure.
    pub fn error_with_data<T: Serialize>(
        id: Option<Value>,
        code: i32,
        message: impl Into<String>,
        data: T,
    ) -> Self {
        let mut response = Self::error(id, code, message);
        if let Some(error) = response.error.as_mut() {
            error.data = serde_json::to_value(data).ok();
        }
        response
    }

    pub fn parse_error() -> Self {
        Self::error(None, PARSE_ERROR, "Parse error")
    }

    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, INVALID_REQUEST, "Invalid request")
    }

    pub fn method_not_found(id: Option<Value>, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, message)
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Params for methods that take a word.
#[derive(Debug, Clone, Deserialize)]
pub struct WordParams {
    pub word: String,
}

/// Params for the numeric settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitParams {
    pub value: usize,
}

/// Params for `settings.toggle_physics`. Without `enabled` the flag flips.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhysicsParams {
    #[serde(default)]
    pub enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request: Request =
            serde_json::from_str(r#"{"method":"navigate.back","id":7}"#).unwrap();
        assert_eq!(request.method, "navigate.back");
        assert_eq!(request.id, Some(json!(7)));
        assert!(request.params.is_null());
    }

    #[test]
    fn test_success_omits_error() {
        let response = Response::success(Some(json!(1)), json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["result"]["ok"], true);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(Response::parse_error().error.unwrap().code, PARSE_ERROR);

        let response = Response::method_not_found(Some(json!("a")), "nope");
        let error = response.error.unwrap();
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert!(error.message.contains("nope"));

        let response = Response::error_with_data(None, NAVIGATION_FAILED, "boom", json!([1]));
        assert_eq!(response.error.unwrap().data, Some(json!([1])));
    }

    #[test]
    fn test_physics_params_optional() {
        let params: PhysicsParams = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params.enabled, None);
    }
}
