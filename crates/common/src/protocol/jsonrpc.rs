// JSON-RPC 2.0 request/response types for the line-oriented RPC transport.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ErrorClass, KbError};

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    pub id: RequestId,
}

/// A JSON-RPC 2.0 response (success or error).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: RequestId,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Request ID: integer, string, or null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

// Standard JSON-RPC error codes.
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Application error codes, one per error class.
pub const FORBIDDEN: i32 = -32001;
pub const NOT_FOUND: i32 = -32002;
pub const BAD_REQUEST: i32 = -32003;

impl Request {
    pub fn new(method: impl Into<String>, params: Option<Value>, id: RequestId) -> Self {
        Self { jsonrpc: "2.0".to_string(), method: method.into(), params, id }
    }
}

impl Response {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: Some(result), error: None, id }
    }

    pub fn error(id: RequestId, error: RpcError) -> Self {
        Self { jsonrpc: "2.0".to_string(), result: None, error: Some(error), id }
    }
}

impl From<&KbError> for RpcError {
    fn from(error: &KbError) -> Self {
        let code = match error.class() {
            ErrorClass::Forbidden => FORBIDDEN,
            ErrorClass::NotFound => NOT_FOUND,
            ErrorClass::BadRequest => BAD_REQUEST,
            ErrorClass::Internal => INTERNAL_ERROR,
        };
        Self { code, message: error.to_string(), data: Some(json!({ "code": error.code() })) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_accept_numbers_strings_and_null() {
        let request: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"rpc.ping","id":"abc"}"#).unwrap();
        assert_eq!(request.id, RequestId::String("abc".into()));
        assert!(request.params.is_none());

        let request: Request =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"rpc.ping","id":null}"#).unwrap();
        assert_eq!(request.id, RequestId::Null);
    }

    #[test]
    fn success_response_omits_error_field() {
        let value =
            serde_json::to_value(Response::success(RequestId::Number(7), json!({"ok": true}))).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "result": {"ok": true}, "id": 7}));
    }

    #[test]
    fn kb_errors_map_to_application_codes() {
        let error = RpcError::from(&KbError::PathTraversal("../x".into()));
        assert_eq!(error.code, FORBIDDEN);
        assert_eq!(error.data, Some(json!({"code": "PATH_TRAVERSAL"})));

        assert_eq!(RpcError::from(&KbError::HeaderNotFound("x".into())).code, NOT_FOUND);
        assert_eq!(RpcError::from(&KbError::InvalidQuery("x".into())).code, BAD_REQUEST);
        assert_eq!(RpcError::from(&KbError::IndexFailure("x".into())).code, INTERNAL_ERROR);
    }
}
