use std::collections::HashMap;
use std::future::Future;

use tracing::warn;

use crate::error::JsonRpcErrorObject;
use crate::resolver::{
    Arguments, Procedure, ProcedureDescriptor, ProcedureResult, Resolver, procedure_fn,
};
use crate::validate::check_method_name;

/// A name-keyed resolver for applications with a fixed set of procedures.
///
/// Names are matched exactly, dots included, so `math.add` and `add` are
/// unrelated entries.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ProcedureDescriptor>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a procedure under `name` with its formal parameter names.
    /// An empty name list registers it as positional-only.
    pub fn register<I, S>(
        &mut self,
        name: impl Into<String>,
        param_names: I,
        procedure: impl Procedure + 'static,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(name.into(), ProcedureDescriptor::new(procedure, param_names))
    }

    pub fn register_fn<I, S, F, Fut>(
        &mut self,
        name: impl Into<String>,
        param_names: I,
        f: F,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(Arguments, JsonRpcErrorObject) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ProcedureResult> + Send + 'static,
    {
        self.register(name, param_names, procedure_fn(f))
    }

    pub fn insert(&mut self, name: String, descriptor: ProcedureDescriptor) -> &mut Self {
        if let Err(error) = check_method_name(&name) {
            warn!(method = %name, reason = %error.message, "registered name can never be called");
        }
        self.services.insert(name, descriptor);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ProcedureDescriptor> {
        self.services.get(name)
    }

    /// Registered names, sorted
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Resolver for ServiceRegistry {
    fn resolve(&self, method: &str, error: &mut JsonRpcErrorObject) -> Option<ProcedureDescriptor> {
        let found = self.services.get(method).cloned();
        if found.is_none() {
            *error = JsonRpcErrorObject::method_not_found(method);
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JsonRpcErrorCode;
    use serde_json::{Value, json};

    fn registry() -> ServiceRegistry {
        let mut registry = ServiceRegistry::new();
        registry
            .register_fn("subtract", ["minuend", "subtrahend"], |args, _| async move {
                let minuend: i64 = args.required(0, "minuend")?;
                let subtrahend: i64 = args.required(1, "subtrahend")?;
                Ok(json!(minuend - subtrahend))
            })
            .register_fn("math.noop", Vec::<String>::new(), |_, _| async {
                Ok(Value::Null)
            });
        registry
    }

    #[test]
    fn test_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("math.noop"));
        assert!(!registry.contains("noop"));
        assert_eq!(registry.method_names(), vec!["math.noop", "subtract"]);
        assert_eq!(
            registry.get("subtract").unwrap().param_names(),
            ["minuend", "subtrahend"]
        );
        assert!(registry.get("math.noop").unwrap().is_positional_only());
    }

    #[test]
    fn test_unknown_name_fills_method_not_found() {
        let registry = registry();
        let mut error = JsonRpcErrorObject::unspecified();
        assert!(registry.resolve("foo.get", &mut error).is_none());
        assert_eq!(error.error_code(), JsonRpcErrorCode::MethodNotFound);
        assert!(error.message.contains("foo.get"));
    }

    #[tokio::test]
    async fn test_resolved_procedure_runs() {
        let registry = registry();
        let mut error = JsonRpcErrorObject::unspecified();
        let descriptor = registry.resolve("subtract", &mut error).unwrap();
        let result = descriptor
            .procedure()
            .invoke(
                Arguments::from_values(vec![json!(42), json!(23)]),
                JsonRpcErrorObject::unspecified(),
            )
            .await
            .unwrap();
        assert_eq!(result, json!(19));
    }
}
