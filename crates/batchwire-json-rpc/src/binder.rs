//! Turns request `params` into the positional argument list a procedure takes.

use crate::error::JsonRpcErrorObject;
use crate::request::RequestParams;
use crate::resolver::Arguments;

/// Bind `params` against the procedure's declared parameter names.
///
/// - Arrays are positional; short lists are padded with missing slots up to
///   the declared count, extra values pass through.
/// - Objects are looked up name by name in declared order; undeclared keys are
///   ignored. A procedure without declared names cannot take an object.
/// - Absent params behave like an empty array.
pub fn bind_params(
    params: Option<RequestParams>,
    param_names: &[String],
) -> Result<Arguments, JsonRpcErrorObject> {
    match params {
        Some(RequestParams::Array(values)) => Ok(pad(values, param_names.len())),
        Some(RequestParams::Object(mut map)) => {
            if param_names.is_empty() {
                return Err(JsonRpcErrorObject::invalid_params(
                    "Service does not allow a parameter map",
                ));
            }
            Ok(Arguments::new(
                param_names.iter().map(|name| map.remove(name)).collect(),
            ))
        }
        None => Ok(pad(Vec::new(), param_names.len())),
    }
}

fn pad(values: Vec<serde_json::Value>, declared: usize) -> Arguments {
    let mut slots: Vec<_> = values.into_iter().map(Some).collect();
    if slots.len() < declared {
        slots.resize(declared, None);
    }
    Arguments::new(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonRpcErrorCode;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn params(value: serde_json::Value) -> Option<RequestParams> {
        RequestParams::from_value(value)
    }

    #[test]
    fn test_positional_passthrough() {
        let args = bind_params(params(json!([42, 23])), &names(&["minuend", "subtrahend"])).unwrap();
        assert_eq!(args, Arguments::from_values(vec![json!(42), json!(23)]));
    }

    #[test]
    fn test_positional_padding() {
        let args = bind_params(params(json!([1])), &names(&["a", "b", "c"])).unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args.get(0), Some(&json!(1)));
        assert!(args.is_missing(1));
        assert!(args.is_missing(2));
    }

    #[test]
    fn test_positional_extra_values_kept() {
        let args = bind_params(params(json!([1, 2, 3, 4])), &names(&["a"])).unwrap();
        assert_eq!(args.len(), 4);

        let args = bind_params(params(json!([1, 2, 4])), &[]).unwrap();
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_named_binding_is_order_independent() {
        let declared = names(&["minuend", "subtrahend"]);
        let a = bind_params(params(json!({"subtrahend": 23, "minuend": 42})), &declared).unwrap();
        let b = bind_params(params(json!({"minuend": 42, "subtrahend": 23})), &declared).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Arguments::from_values(vec![json!(42), json!(23)]));
    }

    #[test]
    fn test_named_binding_missing_and_unknown_keys() {
        let args = bind_params(
            params(json!({"b": 2, "zzz": true})),
            &names(&["a", "b"]),
        )
        .unwrap();
        assert_eq!(args.len(), 2);
        assert!(args.is_missing(0));
        assert_eq!(args.get(1), Some(&json!(2)));
    }

    #[test]
    fn test_named_null_is_not_missing() {
        let args = bind_params(params(json!({"a": null})), &names(&["a"])).unwrap();
        assert_eq!(args.into_slots(), vec![Some(json!(null))]);
    }

    #[test]
    fn test_object_rejected_for_positional_only() {
        let err = bind_params(params(json!({"name": "myself"})), &[]).unwrap_err();
        assert_eq!(err.error_code(), JsonRpcErrorCode::InvalidParams);
        assert_eq!(err.message, "Service does not allow a parameter map");
    }

    #[test]
    fn test_absent_params() {
        assert!(bind_params(None, &[]).unwrap().is_empty());

        let args = bind_params(None, &names(&["p1", "p2"])).unwrap();
        assert_eq!(args.len(), 2);
        assert!(args.is_missing(0) && args.is_missing(1));
    }
}
