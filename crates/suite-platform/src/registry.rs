//! Handler registry.
//!
//! Maps request-type strings to handler capabilities. Registration fails
//! closed: a duplicate type is a configuration error and the original
//! handler stays registered. The map is read-mostly; resolution takes a
//! shared lock and never blocks other readers.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use suite_common::{ConfigError, Identity};

/// Pluggable logic fulfilling one declared request type.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(
        &self,
        identity: &Identity,
        parameters: &Map<String, Value>,
    ) -> Result<Value, anyhow::Error>;
}

/// Registry of request handlers, at most one per type.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<String, Arc<dyn RequestHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a request type.
    pub fn register(
        &self,
        request_type: &str,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<(), ConfigError> {
        let mut handlers = self.handlers.write();
        if handlers.contains_key(request_type) {
            return Err(ConfigError::DuplicateType(request_type.to_string()));
        }
        handlers.insert(request_type.to_string(), handler);
        Ok(())
    }

    /// Resolve the handler for a request type.
    pub fn resolve(&self, request_type: &str) -> Option<Arc<dyn RequestHandler>> {
        self.handlers.read().get(request_type).cloned()
    }

    /// Registered request types, sorted.
    pub fn types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.handlers.read().keys().cloned().collect();
        types.sort();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler(&'static str);

    #[async_trait]
    impl RequestHandler for EchoHandler {
        async fn handle(
            &self,
            _identity: &Identity,
            _parameters: &Map<String, Value>,
        ) -> Result<Value, anyhow::Error> {
            Ok(Value::String(self.0.to_string()))
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = HandlerRegistry::new();
        registry
            .register("echo", Arc::new(EchoHandler("first")))
            .expect("first registration");
        assert!(registry.resolve("echo").is_some());
        assert!(registry.resolve("other").is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails_closed() {
        let registry = HandlerRegistry::new();
        registry
            .register("echo", Arc::new(EchoHandler("first")))
            .expect("first registration");

        let err = registry
            .register("echo", Arc::new(EchoHandler("second")))
            .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateType("echo".into()));

        // the original handler remains resolvable
        let handler = registry.resolve("echo").expect("still registered");
        let identity = Identity {
            user_id: "u1".into(),
            suite: suite_common::SuiteType::Personal,
            attributes: Default::default(),
            verified_at: chrono::Utc::now(),
        };
        let result = handler
            .handle(&identity, &Map::new())
            .await
            .expect("handler runs");
        assert_eq!(result, Value::String("first".into()));
    }

    #[test]
    fn test_types_sorted() {
        let registry = HandlerRegistry::new();
        registry
            .register("zeta", Arc::new(EchoHandler("z")))
            .expect("register");
        registry
            .register("alpha", Arc::new(EchoHandler("a")))
            .expect("register");
        assert_eq!(registry.types(), vec!["alpha".to_string(), "zeta".to_string()]);
    }
}
