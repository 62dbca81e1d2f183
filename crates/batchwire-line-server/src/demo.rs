//! Sample procedures served by `batchwire-serve`.

use batchwire_json_rpc::prelude::*;
use serde_json::{Value, json};

/// Registry with `echo`, `subtract`, `sum` and `math.divide`
pub fn demo_registry() -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();

    registry
        .register_fn("echo", Vec::<String>::new(), |args, _| async move {
            Ok(args.to_value())
        })
        .register_fn("subtract", ["minuend", "subtrahend"], |args, _| async move {
            let minuend: f64 = args.required(0, "minuend")?;
            let subtrahend: f64 = args.required(1, "subtrahend")?;
            Ok(number(minuend - subtrahend))
        })
        .register_fn("sum", Vec::<String>::new(), |args, _| async move {
            let mut total = 0.0;
            for value in args.present() {
                total += value.as_f64().ok_or_else(|| {
                    JsonRpcErrorObject::invalid_params(&format!("Not a number: {}", value))
                })?;
            }
            Ok(number(total))
        })
        .register_fn(
            "math.divide",
            ["dividend", "divisor"],
            |args, mut error| async move {
                let dividend: f64 = args.required(0, "dividend")?;
                let divisor: f64 = args.required(1, "divisor")?;
                if divisor == 0.0 {
                    error
                        .set_code(JsonRpcErrorCode::InvalidParams)
                        .set_message("Division by zero")
                        .set_data(json!({"dividend": dividend}));
                    return Err(error.into());
                }
                Ok(number(dividend / divisor))
            },
        );

    registry
}

// Whole results stay integers on the wire
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn call(raw: &str) -> Value {
        let engine = JsonRpcEngine::builder()
            .resolver(demo_registry())
            .notification_mode(NotificationMode::Inline)
            .build()
            .unwrap();
        let text = engine.process_request(raw).await.unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn test_registered_names() {
        assert_eq!(
            demo_registry().method_names(),
            vec!["echo", "math.divide", "subtract", "sum"]
        );
    }

    #[tokio::test]
    async fn test_echo() {
        let response = call(r#"{"jsonrpc":"2.0","method":"echo","params":["a",{"b":1}],"id":1}"#).await;
        assert_eq!(response["result"], json!(["a", {"b": 1}]));
    }

    #[tokio::test]
    async fn test_sum_and_subtract() {
        let response = call(r#"{"jsonrpc":"2.0","method":"sum","params":[1,2.5,3],"id":1}"#).await;
        assert_eq!(response["result"], json!(6.5));

        let response = call(
            r#"{"jsonrpc":"2.0","method":"subtract","params":{"subtrahend":23,"minuend":42},"id":2}"#,
        )
        .await;
        assert_eq!(response["result"], json!(19));
    }

    #[tokio::test]
    async fn test_sum_rejects_non_numbers() {
        let response = call(r#"{"jsonrpc":"2.0","method":"sum","params":[1,"x"],"id":1}"#).await;
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_divide() {
        let response = call(r#"{"jsonrpc":"2.0","method":"math.divide","params":[9,2],"id":1}"#).await;
        assert_eq!(response["result"], json!(4.5));

        let response = call(r#"{"jsonrpc":"2.0","method":"math.divide","params":[1,0],"id":2}"#).await;
        assert_eq!(response["id"], 2);
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);
        assert_eq!(response["error"]["message"], "Division by zero");
        assert_eq!(response["error"]["data"], json!({"dividend": 1.0}));
    }
}
