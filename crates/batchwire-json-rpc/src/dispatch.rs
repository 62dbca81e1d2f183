use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::JsonRpcErrorObject;
use crate::resolver::{Arguments, ProcedureDescriptor, ProcedureError};

/// Everything needed to run one request, captured by value when the request
/// is processed. Deferred notifications own their snapshot, so later requests
/// in the same batch cannot leak into them.
#[derive(Debug)]
pub struct BoundCall {
    pub method: String,
    pub descriptor: ProcedureDescriptor,
    pub args: Arguments,
    pub error: JsonRpcErrorObject,
}

impl BoundCall {
    pub fn new(method: String, descriptor: ProcedureDescriptor, args: Arguments) -> Self {
        Self {
            method,
            descriptor,
            args,
            error: JsonRpcErrorObject::unspecified(),
        }
    }
}

/// Run a bound procedure, containing every failure it can produce.
///
/// Thrown errors and panics both become `InternalError` carrying the original
/// description; an explicit application error is passed through untouched.
pub async fn invoke(call: BoundCall) -> Result<Value, JsonRpcErrorObject> {
    let BoundCall {
        method,
        descriptor,
        args,
        error,
    } = call;

    debug!(method = %method, args = args.len(), "invoking procedure");

    let outcome = AssertUnwindSafe(descriptor.procedure().invoke(args, error))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(ProcedureError::Rpc(error))) => {
            debug!(method = %method, code = error.code, "procedure returned an error");
            Err(error)
        }
        Ok(Err(ProcedureError::Failed(source))) => {
            warn!(method = %method, error = %source, "procedure failed");
            Err(threw(&source.to_string()))
        }
        Err(payload) => {
            let description = panic_description(payload.as_ref());
            warn!(method = %method, panic = %description, "procedure panicked");
            Err(threw(&description))
        }
    }
}

fn threw(description: &str) -> JsonRpcErrorObject {
    JsonRpcErrorObject::internal_error(Some(format!("Method threw an error: {}", description)))
}

fn panic_description(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
