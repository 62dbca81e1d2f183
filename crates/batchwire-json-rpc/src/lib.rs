//! # JSON-RPC 2.0 Request Engine
//!
//! A transport-agnostic JSON-RPC 2.0 request processor. Feed it the raw text
//! of one request or a batch and it returns the serialized response, or
//! `None` when only notifications were received and nothing must be sent.
//!
//! ## Features
//! - Strict, ordered envelope validation with the standard error codes
//! - Pluggable method resolution through the [`Resolver`] trait
//! - Positional and named parameter binding against declared parameter names
//! - Procedure failures and panics contained as `InternalError`
//! - Notifications deferred until after the response, in batch order
//!
//! ```rust
//! use batchwire_json_rpc::prelude::*;
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let mut registry = ServiceRegistry::new();
//! registry.register_fn("subtract", ["minuend", "subtrahend"], |args, _| async move {
//!     let minuend: i64 = args.required(0, "minuend")?;
//!     let subtrahend: i64 = args.required(1, "subtrahend")?;
//!     Ok(json!(minuend - subtrahend))
//! });
//!
//! let engine = JsonRpcEngine::new(registry);
//! let response = engine
//!     .process_request(r#"{"jsonrpc":"2.0","method":"subtract","params":{"subtrahend":23,"minuend":42},"id":3}"#)
//!     .await;
//! assert_eq!(response.as_deref(), Some(r#"{"jsonrpc":"2.0","id":3,"result":19}"#));
//! # });
//! ```

pub mod binder;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod notification;
pub mod prelude;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod response;
pub mod types;
pub mod validate;

// Re-export main types
pub use engine::{JsonRpcEngine, JsonRpcEngineBuilder};
pub use error::{EngineError, JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use notification::NotificationMode;
pub use registry::ServiceRegistry;
pub use request::{JsonRpcRequest, RequestParams};
pub use resolver::{
    Arguments, BoxError, Procedure, ProcedureDescriptor, ProcedureError, ProcedureResult,
    Resolver, procedure_fn,
};
pub use response::{JsonRpcMessage, JsonRpcResponse, ResponseBody};
pub use types::{JsonRpcVersion, RequestId};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    // Server error range: -32099 to -32000
    pub const PERMISSION_DENIED: i64 = -32000;
    pub const SERVER_ERROR_START: i64 = -32099;
    pub const SERVER_ERROR_END: i64 = -32000;
}
