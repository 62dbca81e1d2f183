use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::types::RequestId;

/// JSON-RPC error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    PermissionDenied,
    /// Any other code chosen by a resolver or procedure
    Application(i64),
}

impl JsonRpcErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            JsonRpcErrorCode::ParseError => -32700,
            JsonRpcErrorCode::InvalidRequest => -32600,
            JsonRpcErrorCode::MethodNotFound => -32601,
            JsonRpcErrorCode::InvalidParams => -32602,
            JsonRpcErrorCode::InternalError => -32603,
            JsonRpcErrorCode::PermissionDenied => -32000,
            JsonRpcErrorCode::Application(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            JsonRpcErrorCode::ParseError => "Parse error",
            JsonRpcErrorCode::InvalidRequest => "Invalid Request",
            JsonRpcErrorCode::MethodNotFound => "Method not found",
            JsonRpcErrorCode::InvalidParams => "Invalid params",
            JsonRpcErrorCode::InternalError => "Internal error",
            JsonRpcErrorCode::PermissionDenied => "Permission denied",
            JsonRpcErrorCode::Application(_) => "Application error",
        }
    }

    /// Map a numeric wire code back to its named variant
    pub fn from_code(code: i64) -> Self {
        match code {
            -32700 => JsonRpcErrorCode::ParseError,
            -32600 => JsonRpcErrorCode::InvalidRequest,
            -32601 => JsonRpcErrorCode::MethodNotFound,
            -32602 => JsonRpcErrorCode::InvalidParams,
            -32603 => JsonRpcErrorCode::InternalError,
            -32000 => JsonRpcErrorCode::PermissionDenied,
            other => JsonRpcErrorCode::Application(other),
        }
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

impl From<JsonRpcErrorCode> for i64 {
    fn from(code: JsonRpcErrorCode) -> Self {
        code.code()
    }
}

/// JSON-RPC Error object
///
/// Resolvers and procedures receive one of these as a mutable builder and may
/// set the code, message and data before handing it back. `data` is only
/// emitted on the wire when it holds a non-null value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorObject {
    pub fn new(code: JsonRpcErrorCode, message: Option<String>, data: Option<Value>) -> Self {
        Self {
            code: code.code(),
            message: message.unwrap_or_else(|| code.message().to_string()),
            data: data.filter(|d| !d.is_null()),
        }
    }

    /// The blank builder handed to a procedure before it runs
    pub fn unspecified() -> Self {
        Self::new(
            JsonRpcErrorCode::InternalError,
            Some("Unspecified error".to_string()),
            None,
        )
    }

    pub fn parse_error(message: &str) -> Self {
        Self::new(JsonRpcErrorCode::ParseError, Some(message.to_string()), None)
    }

    pub fn invalid_request(message: &str, data: Option<Value>) -> Self {
        Self::new(
            JsonRpcErrorCode::InvalidRequest,
            Some(message.to_string()),
            data,
        )
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound,
            Some(format!("Method '{}' not found", method)),
            None,
        )
    }

    pub fn invalid_params(message: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::InvalidParams,
            Some(message.to_string()),
            None,
        )
    }

    pub fn internal_error(message: Option<String>) -> Self {
        Self::new(JsonRpcErrorCode::InternalError, message, None)
    }

    pub fn permission_denied(message: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::PermissionDenied,
            Some(message.to_string()),
            None,
        )
    }

    pub fn error_code(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from_code(self.code)
    }

    pub fn set_code(&mut self, code: impl Into<i64>) -> &mut Self {
        self.code = code.into();
        self
    }

    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.message = message.into();
        self
    }

    /// Setting `Value::Null` clears the data member
    pub fn set_data(&mut self, data: Value) -> &mut Self {
        self.data = if data.is_null() { None } else { Some(data) };
        self
    }

    pub fn with_code(mut self, code: impl Into<i64>) -> Self {
        self.set_code(code);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.set_message(message);
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.set_data(data);
        self
    }
}

impl fmt::Display for JsonRpcErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcErrorObject {}

/// JSON-RPC Error response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(rename = "jsonrpc")]
    pub version: String,
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

impl JsonRpcError {
    pub fn new(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self {
            version: crate::JSONRPC_VERSION.to_string(),
            id,
            error,
        }
    }

    pub fn parse_error() -> Self {
        Self::new(
            RequestId::Null,
            JsonRpcErrorObject::parse_error("Could not parse request"),
        )
    }

    pub fn invalid_request(id: RequestId, message: &str, data: Option<Value>) -> Self {
        Self::new(id, JsonRpcErrorObject::invalid_request(message, data))
    }

    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(id, JsonRpcErrorObject::method_not_found(method))
    }

    pub fn internal_error(id: RequestId, message: Option<String>) -> Self {
        Self::new(id, JsonRpcErrorObject::internal_error(message))
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JSON-RPC Error {}: {}",
            self.error.code, self.error.message
        )
    }
}

impl std::error::Error for JsonRpcError {}

/// Errors raised while assembling an engine (never while processing input)
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a method resolver is required to build the engine")]
    MissingResolver,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_codes() {
        assert_eq!(JsonRpcErrorCode::ParseError.code(), -32700);
        assert_eq!(JsonRpcErrorCode::InvalidRequest.code(), -32600);
        assert_eq!(JsonRpcErrorCode::MethodNotFound.code(), -32601);
        assert_eq!(JsonRpcErrorCode::InvalidParams.code(), -32602);
        assert_eq!(JsonRpcErrorCode::InternalError.code(), -32603);
        assert_eq!(JsonRpcErrorCode::PermissionDenied.code(), -32000);
    }

    #[test]
    fn test_code_lookup() {
        assert_eq!(
            JsonRpcErrorCode::from_code(-32601),
            JsonRpcErrorCode::MethodNotFound
        );
        assert_eq!(
            JsonRpcErrorCode::from_code(42),
            JsonRpcErrorCode::Application(42)
        );
    }

    #[test]
    fn test_data_omitted_when_absent_or_null() {
        let error = JsonRpcErrorObject::invalid_params("bad");
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json, json!({"code": -32602, "message": "bad"}));

        let mut error = JsonRpcErrorObject::unspecified();
        error.set_data(json!({"hint": 1}));
        error.set_data(Value::Null);
        let json = serde_json::to_value(&error).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_builder_updates() {
        let mut error = JsonRpcErrorObject::unspecified();
        error
            .set_code(JsonRpcErrorCode::PermissionDenied)
            .set_message("not yours")
            .set_data(json!("token expired"));

        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(
            json,
            json!({"code": -32000, "message": "not yours", "data": "token expired"})
        );
        assert_eq!(error.error_code(), JsonRpcErrorCode::PermissionDenied);
    }

    #[test]
    fn test_error_serialization() {
        let error = JsonRpcError::method_not_found(RequestId::Number(1.into()), "test");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("Method 'test' not found"));
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
    }

    #[test]
    fn test_parse_error_has_null_id() {
        let json = serde_json::to_value(JsonRpcError::parse_error()).unwrap();
        assert_eq!(json["id"], Value::Null);
        assert_eq!(json["error"]["code"], -32700);
    }
}
