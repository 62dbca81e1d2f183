//! Envelope validation for a single decoded request.
//!
//! Checks run in a fixed order and the first failure wins. Naming-syntax
//! violations are reported as `MethodNotFound`, not `InvalidRequest`, which
//! existing clients depend on.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value, json};

use crate::error::{JsonRpcErrorCode, JsonRpcErrorObject};
use crate::request::{JsonRpcRequest, RequestParams};
use crate::types::RequestId;

static METHOD_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").expect("method name pattern is valid")
});

/// A request that failed validation, with the id its error response carries
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub id: RequestId,
    pub error: JsonRpcErrorObject,
}

impl Rejection {
    fn new(id: RequestId, error: JsonRpcErrorObject) -> Self {
        Self { id, error }
    }
}

/// Validate one decoded value as a JSON-RPC 2.0 request envelope.
pub fn validate_request(value: Value) -> Result<JsonRpcRequest, Rejection> {
    let Value::Object(mut object) = value else {
        return Err(Rejection::new(
            RequestId::Null,
            JsonRpcErrorObject::invalid_request(
                "Unrecognized request",
                Some(json!("Expected an object")),
            ),
        ));
    };

    let id = best_effort_id(&object);

    match object.get("jsonrpc") {
        Some(Value::String(version)) if version == crate::JSONRPC_VERSION => {}
        Some(Value::String(version)) => {
            return Err(Rejection::new(
                id,
                JsonRpcErrorObject::invalid_request(
                    "'jsonrpc' member must be \"2.0\".",
                    Some(json!(format!("Found value {} in 'jsonrpc'.", version))),
                ),
            ));
        }
        _ => {
            return Err(Rejection::new(
                id,
                JsonRpcErrorObject::invalid_request(
                    "JSON-RPC protocol version is missing.",
                    Some(json!("Expected 'jsonrpc:\"2.0\"'")),
                ),
            ));
        }
    }

    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err(Rejection::new(
                id,
                JsonRpcErrorObject::invalid_request(
                    "JSON-RPC method name is missing or incorrect type",
                    Some(json!("Method name must be a string.")),
                ),
            ));
        }
    };

    let params = match object.remove("params") {
        None => None,
        Some(raw) => match RequestParams::from_value(raw) {
            Some(params) => Some(params),
            None => {
                return Err(Rejection::new(
                    id,
                    JsonRpcErrorObject::invalid_request(
                        "JSON-RPC params is missing or incorrect type",
                        Some(json!("params must be undefined, an object, or an array.")),
                    ),
                ));
            }
        },
    };

    if let Err(error) = check_method_name(&method) {
        return Err(Rejection::new(id, error));
    }

    let request_id = match object.get("id") {
        None => None,
        Some(raw) => match RequestId::from_value(raw) {
            Some(request_id) => Some(request_id),
            None => {
                return Err(Rejection::new(
                    RequestId::Null,
                    JsonRpcErrorObject::invalid_request(
                        "JSON-RPC id has an incorrect type",
                        Some(json!("id must be a string, a number, or null.")),
                    ),
                ));
            }
        },
    };

    Ok(JsonRpcRequest::new(request_id, method, params))
}

/// Method names are dot-separated identifiers with no empty segments in between.
pub fn check_method_name(method: &str) -> Result<(), JsonRpcErrorObject> {
    if !METHOD_NAME.is_match(method) {
        return Err(JsonRpcErrorObject::new(
            JsonRpcErrorCode::MethodNotFound,
            Some("Illegal character found in service name.".to_string()),
            None,
        ));
    }
    if method.contains("..") {
        return Err(JsonRpcErrorObject::new(
            JsonRpcErrorCode::MethodNotFound,
            Some("Illegal use of two consecutive dots in service name.".to_string()),
            None,
        ));
    }
    Ok(())
}

fn best_effort_id(object: &Map<String, Value>) -> RequestId {
    object
        .get("id")
        .and_then(RequestId::from_value)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(value: Value) -> Rejection {
        validate_request(value).expect_err("request should be rejected")
    }

    #[test]
    fn test_valid_call() {
        let request = validate_request(json!({
            "jsonrpc": "2.0", "method": "subtract", "params": [42, 23], "id": 1
        }))
        .unwrap();
        assert_eq!(request.method, "subtract");
        assert_eq!(request.id, Some(RequestId::from(1i64)));
        assert_eq!(request.params, Some(RequestParams::Array(vec![json!(42), json!(23)])));
    }

    #[test]
    fn test_valid_notification() {
        let request = validate_request(json!({"jsonrpc": "2.0", "method": "update"})).unwrap();
        assert!(request.is_notification());
        assert!(request.params.is_none());
    }

    #[test]
    fn test_non_object_rejected_with_null_id() {
        for value in [json!(1), json!("x"), json!([1]), Value::Null] {
            let rejection = rejected(value);
            assert_eq!(rejection.id, RequestId::Null);
            assert_eq!(rejection.error.error_code(), JsonRpcErrorCode::InvalidRequest);
        }
    }

    #[test]
    fn test_missing_version() {
        let rejection = rejected(json!({"foo": "boo"}));
        assert_eq!(rejection.error.code, -32600);
        assert_eq!(rejection.error.message, "JSON-RPC protocol version is missing.");

        let rejection = rejected(json!({"jsonrpc": 2.0, "method": "a", "id": 4}));
        assert_eq!(rejection.error.message, "JSON-RPC protocol version is missing.");
        assert_eq!(rejection.id, RequestId::from(4i64));
    }

    #[test]
    fn test_wrong_version() {
        let rejection = rejected(json!({"jsonrpc": "1.0", "method": "a", "id": "x"}));
        assert_eq!(rejection.error.code, -32600);
        assert_eq!(rejection.id, RequestId::from("x"));
    }

    #[test]
    fn test_method_must_be_string() {
        let rejection = rejected(json!({"jsonrpc": "2.0", "method": 1, "params": "bar"}));
        assert_eq!(rejection.error.code, -32600);
        assert_eq!(rejection.id, RequestId::Null);
    }

    #[test]
    fn test_params_must_be_structured() {
        let rejection = rejected(json!({"jsonrpc": "2.0", "method": "a", "params": 7, "id": 2}));
        assert_eq!(rejection.error.code, -32600);
        assert_eq!(rejection.id, RequestId::from(2i64));

        let rejection = rejected(json!({"jsonrpc": "2.0", "method": "a", "params": null}));
        assert_eq!(rejection.error.code, -32600);
    }

    #[test]
    fn test_illegal_method_characters_are_method_not_found() {
        for method in ["1abc", "_private", "has space", "dash-ed", "", ".lead"] {
            let rejection = rejected(json!({"jsonrpc": "2.0", "method": method, "id": 1}));
            assert_eq!(rejection.error.code, -32601, "method {:?}", method);
            assert_eq!(rejection.error.message, "Illegal character found in service name.");
        }
    }

    #[test]
    fn test_double_dot_is_method_not_found() {
        let rejection = rejected(json!({"jsonrpc": "2.0", "method": "foo..bar", "id": 1}));
        assert_eq!(rejection.error.code, -32601);
        assert!(rejection.error.message.contains("two consecutive dots"));
    }

    #[test]
    fn test_dotted_names_accepted() {
        for method in ["foo.get", "a.b_c.D9", "x.", "Echo"] {
            assert!(check_method_name(method).is_ok(), "method {:?}", method);
        }
    }

    #[test]
    fn test_first_failure_wins() {
        // bad version and bad method: the version check runs first
        let rejection = rejected(json!({"jsonrpc": "3.0", "method": "foo..bar"}));
        assert_eq!(rejection.error.code, -32600);

        // bad params and bad method name: params are checked before the name
        let rejection = rejected(json!({"jsonrpc": "2.0", "method": "9", "params": true}));
        assert_eq!(rejection.error.code, -32600);
    }

    #[test]
    fn test_structured_id_rejected() {
        let rejection = rejected(json!({"jsonrpc": "2.0", "method": "a", "id": {"n": 1}}));
        assert_eq!(rejection.error.code, -32600);
        assert_eq!(rejection.id, RequestId::Null);
    }
}
