//! # JSON-RPC Engine Prelude
//!
//! Convenient re-exports of the types needed to embed the engine.
//!
//! ```rust
//! use batchwire_json_rpc::prelude::*;
//! ```

pub use crate::engine::{JsonRpcEngine, JsonRpcEngineBuilder};
pub use crate::error::{EngineError, JsonRpcError, JsonRpcErrorCode, JsonRpcErrorObject};
pub use crate::notification::NotificationMode;
pub use crate::registry::ServiceRegistry;
pub use crate::request::{JsonRpcRequest, RequestParams};
pub use crate::resolver::{
    Arguments, Procedure, ProcedureDescriptor, ProcedureError, ProcedureResult, Resolver,
    procedure_fn,
};
pub use crate::response::{JsonRpcMessage, JsonRpcResponse, ResponseBody};
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::{self, *};
