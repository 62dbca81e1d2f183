//! The entry point: raw JSON text in, serialized response (or nothing) out.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error, trace};

use crate::binder::bind_params;
use crate::dispatch::{BoundCall, invoke};
use crate::error::{EngineError, JsonRpcError, JsonRpcErrorObject};
use crate::notification::{NotificationMode, NotificationQueue};
use crate::resolver::Resolver;
use crate::response::{JsonRpcMessage, ResponseBody};
use crate::types::RequestId;
use crate::validate::validate_request;

// Only used if serializing a response fails, which plain JSON values cannot do.
const SERIALIZATION_FAILURE: &str = r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"Could not serialize response"}}"#;

/// A JSON-RPC 2.0 request processor.
///
/// The engine keeps no state between calls besides its resolver. Within one
/// call, requests are validated, bound and (for calls) executed strictly in
/// input order; notifications are deferred until the response is assembled.
#[derive(Clone)]
pub struct JsonRpcEngine {
    resolver: Arc<dyn Resolver>,
    notification_mode: NotificationMode,
}

impl JsonRpcEngine {
    pub fn new(resolver: impl Resolver + 'static) -> Self {
        Self {
            resolver: Arc::new(resolver),
            notification_mode: NotificationMode::default(),
        }
    }

    pub fn builder() -> JsonRpcEngineBuilder {
        JsonRpcEngineBuilder::new()
    }

    pub fn notification_mode(&self) -> NotificationMode {
        self.notification_mode
    }

    /// Process one input text.
    ///
    /// Returns `None` when nothing must be sent back, i.e. every request was
    /// a notification.
    pub async fn process_request(&self, raw: &str) -> Option<String> {
        let body = match serde_json::from_str::<Value>(raw) {
            Ok(decoded) => self.process_value(decoded).await,
            Err(e) => {
                debug!(error = %e, "request is not valid JSON");
                Some(ResponseBody::Single(JsonRpcError::parse_error().into()))
            }
        };
        body.map(|body| render(&body))
    }

    /// Process an already decoded input value
    pub async fn process_value(&self, decoded: Value) -> Option<ResponseBody> {
        let (body, queue) = self.process_decoded(decoded).await;
        queue.schedule(self.notification_mode).await;
        body
    }

    async fn process_decoded(&self, decoded: Value) -> (Option<ResponseBody>, NotificationQueue) {
        let mut queue = NotificationQueue::new();

        let (requests, batch) = match decoded {
            Value::Array(requests) if requests.is_empty() => {
                let error = JsonRpcErrorObject::invalid_request("Empty batch array", None);
                return (Some(single_error(error)), queue);
            }
            Value::Array(requests) => (requests, true),
            Value::Object(_) => (vec![decoded], false),
            _ => {
                let error = JsonRpcErrorObject::invalid_request(
                    "Unrecognized request type",
                    Some(json!("Expected an array or an object")),
                );
                return (Some(single_error(error)), queue);
            }
        };

        trace!(count = requests.len(), batch, "processing requests");

        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            if let Some(message) = self.process_one(request, &mut queue).await {
                responses.push(message);
            }
        }

        let body = if responses.is_empty() {
            None
        } else if batch {
            Some(ResponseBody::Batch(responses))
        } else {
            responses.into_iter().next().map(ResponseBody::Single)
        };
        (body, queue)
    }

    /// Validate, resolve, bind and run (or defer) one request.
    /// `None` means the request contributes no response entry.
    async fn process_one(&self, raw: Value, queue: &mut NotificationQueue) -> Option<JsonRpcMessage> {
        let request = match validate_request(raw) {
            Ok(request) => request,
            Err(rejection) => {
                debug!(code = rejection.error.code, message = %rejection.error.message, "invalid request");
                return Some(JsonRpcMessage::error(rejection.id, rejection.error));
            }
        };

        let mut error = JsonRpcErrorObject::method_not_found(&request.method);
        let Some(descriptor) = self.resolver.resolve(&request.method, &mut error) else {
            debug!(method = %request.method, code = error.code, "method did not resolve");
            return request.id.map(|id| JsonRpcMessage::error(id, error));
        };

        let args = match bind_params(request.params, descriptor.param_names()) {
            Ok(args) => args,
            Err(error) => {
                debug!(method = %request.method, message = %error.message, "parameters did not bind");
                return request.id.map(|id| JsonRpcMessage::error(id, error));
            }
        };

        let call = BoundCall::new(request.method, descriptor, args);
        match request.id {
            Some(id) => Some(JsonRpcMessage::from_outcome(id, invoke(call).await)),
            None => {
                queue.push(call);
                None
            }
        }
    }
}

impl std::fmt::Debug for JsonRpcEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcEngine")
            .field("notification_mode", &self.notification_mode)
            .finish_non_exhaustive()
    }
}

fn single_error(error: JsonRpcErrorObject) -> ResponseBody {
    ResponseBody::Single(JsonRpcMessage::error(RequestId::Null, error))
}

fn render(body: &ResponseBody) -> String {
    serde_json::to_string(body).unwrap_or_else(|e| {
        error!(error = %e, "failed to serialize response");
        SERIALIZATION_FAILURE.to_string()
    })
}

/// Builder for [`JsonRpcEngine`]
#[derive(Default)]
pub struct JsonRpcEngineBuilder {
    resolver: Option<Arc<dyn Resolver>>,
    notification_mode: NotificationMode,
}

impl JsonRpcEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the method resolver (required)
    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Use a resolver that is shared with other owners
    pub fn shared_resolver(mut self, resolver: Arc<dyn Resolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn notification_mode(mut self, mode: NotificationMode) -> Self {
        self.notification_mode = mode;
        self
    }

    pub fn build(self) -> Result<JsonRpcEngine, EngineError> {
        let resolver = self.resolver.ok_or(EngineError::MissingResolver)?;
        Ok(JsonRpcEngine {
            resolver,
            notification_mode: self.notification_mode,
        })
    }
}
