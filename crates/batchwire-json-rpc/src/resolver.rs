//! The seam between the engine and the application's procedures.
//!
//! The engine never interprets a method name beyond envelope validation; a
//! [`Resolver`] decides whether a name exists and hands back a
//! [`ProcedureDescriptor`] for it.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::error::JsonRpcErrorObject;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of one procedure invocation
pub type ProcedureResult = Result<Value, ProcedureError>;

/// Ways a procedure can fail
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// Explicit application error, usually the builder the procedure was given
    #[error(transparent)]
    Rpc(#[from] JsonRpcErrorObject),

    /// The procedure itself broke; reported to the caller as an internal error
    #[error("{0}")]
    Failed(BoxError),
}

impl ProcedureError {
    pub fn failed(error: impl Into<BoxError>) -> Self {
        ProcedureError::Failed(error.into())
    }
}

/// Bound positional arguments. A slot may be missing when the caller did not
/// supply a declared parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Vec<Option<Value>>);

impl Arguments {
    pub fn new(slots: Vec<Option<Value>>) -> Self {
        Self(slots)
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self(values.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The value at `index`, or `None` when the slot is missing or out of range
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index).and_then(Option::as_ref)
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.get(index).is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&Value>> {
        self.0.iter().map(Option::as_ref)
    }

    /// Supplied values only, skipping missing slots
    pub fn present(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().flatten()
    }

    /// Deserialize a mandatory argument, failing with `InvalidParams`
    pub fn required<T: DeserializeOwned>(&self, index: usize, name: &str) -> Result<T, ProcedureError> {
        self.optional(index, name)?.ok_or_else(|| {
            JsonRpcErrorObject::invalid_params(&format!("Missing argument '{}'", name)).into()
        })
    }

    /// Deserialize an argument that may be missing
    pub fn optional<T: DeserializeOwned>(
        &self,
        index: usize,
        name: &str,
    ) -> Result<Option<T>, ProcedureError> {
        match self.get(index) {
            None => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|e| {
                JsonRpcErrorObject::invalid_params(&format!("Argument '{}': {}", name, e)).into()
            }),
        }
    }

    /// Missing slots become `null`
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|slot| slot.clone().unwrap_or(Value::Null))
                .collect(),
        )
    }

    pub fn into_slots(self) -> Vec<Option<Value>> {
        self.0
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Self::from_values(values)
    }
}

/// An invocable unit of application logic.
///
/// Besides its bound arguments a procedure receives a fresh error builder; it
/// may fill it in and return it as `ProcedureError::Rpc` to report an
/// application error without failing.
#[async_trait]
pub trait Procedure: Send + Sync {
    async fn invoke(&self, args: Arguments, error: JsonRpcErrorObject) -> ProcedureResult;
}

/// A closure-backed procedure
pub struct FnProcedure<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Procedure for FnProcedure<F>
where
    F: Fn(Arguments, JsonRpcErrorObject) -> Fut + Send + Sync,
    Fut: Future<Output = ProcedureResult> + Send + 'static,
{
    async fn invoke(&self, args: Arguments, error: JsonRpcErrorObject) -> ProcedureResult {
        (self.f)(args, error).await
    }
}

pub fn procedure_fn<F, Fut>(f: F) -> FnProcedure<F>
where
    F: Fn(Arguments, JsonRpcErrorObject) -> Fut + Send + Sync,
    Fut: Future<Output = ProcedureResult> + Send + 'static,
{
    FnProcedure { f }
}

/// A resolved procedure plus its formal parameter names.
///
/// An empty name list means positional-only with unconstrained arity.
#[derive(Clone)]
pub struct ProcedureDescriptor {
    procedure: Arc<dyn Procedure>,
    param_names: Arc<[String]>,
}

impl ProcedureDescriptor {
    pub fn new<I, S>(procedure: impl Procedure + 'static, param_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_arc(Arc::new(procedure), param_names)
    }

    pub fn positional(procedure: impl Procedure + 'static) -> Self {
        Self::from_arc(Arc::new(procedure), Vec::<String>::new())
    }

    pub fn from_arc<I, S>(procedure: Arc<dyn Procedure>, param_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            procedure,
            param_names: param_names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_positional_only(&self) -> bool {
        self.param_names.is_empty()
    }

    pub(crate) fn procedure(&self) -> &Arc<dyn Procedure> {
        &self.procedure
    }
}

impl fmt::Debug for ProcedureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureDescriptor")
            .field("param_names", &self.param_names)
            .finish_non_exhaustive()
    }
}

/// Turns a validated method name into a procedure.
///
/// Returning `None` means the name did not resolve; the resolver describes why
/// through `error`, which arrives pre-filled with `MethodNotFound`.
pub trait Resolver: Send + Sync {
    fn resolve(&self, method: &str, error: &mut JsonRpcErrorObject) -> Option<ProcedureDescriptor>;
}

impl<F> Resolver for F
where
    F: Fn(&str, &mut JsonRpcErrorObject) -> Option<ProcedureDescriptor> + Send + Sync,
{
    fn resolve(&self, method: &str, error: &mut JsonRpcErrorObject) -> Option<ProcedureDescriptor> {
        self(method, error)
    }
}
