//! Registry of provider clients keyed by interface type.
//!
//! The server registers `Arc<dyn Trait>` implementations once at startup;
//! modules fetch them by the same trait object type: `hub.get::<dyn AuthProvider>()`.

use parking_lot::RwLock;
use std::{any::Any, collections::HashMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ClientHubError {
    #[error("client not registered: {0}")]
    NotFound(&'static str),
}

type Boxed = Box<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ClientHub {
    map: RwLock<HashMap<&'static str, Boxed>>,
}

impl ClientHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the client for interface `T`.
    pub fn register<T>(&self, client: Arc<T>)
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.map
            .write()
            .insert(std::any::type_name::<T>(), Box::new(client));
    }

    pub fn get<T>(&self) -> Result<Arc<T>, ClientHubError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = std::any::type_name::<T>();
        self.map
            .read()
            .get(key)
            .and_then(|boxed| boxed.downcast_ref::<Arc<T>>())
            .cloned()
            .ok_or(ClientHubError::NotFound(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    struct En;
    impl Greeter for En {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    struct Fr;
    impl Greeter for Fr {
        fn greet(&self) -> String {
            "bonjour".into()
        }
    }

    #[test]
    fn register_and_get_by_trait_object() {
        let hub = ClientHub::new();
        hub.register::<dyn Greeter>(Arc::new(En));
        assert_eq!(hub.get::<dyn Greeter>().unwrap().greet(), "hello");
    }

    #[test]
    fn re_register_replaces() {
        let hub = ClientHub::new();
        hub.register::<dyn Greeter>(Arc::new(En));
        let old = hub.get::<dyn Greeter>().unwrap();
        hub.register::<dyn Greeter>(Arc::new(Fr));

        assert_eq!(hub.get::<dyn Greeter>().unwrap().greet(), "bonjour");
        assert_eq!(old.greet(), "hello");
    }

    #[test]
    fn missing_client_is_an_error() {
        let hub = ClientHub::new();
        let err = hub.get::<dyn Greeter>().err().unwrap();
        assert!(err.to_string().contains("Greeter"));
    }
}
