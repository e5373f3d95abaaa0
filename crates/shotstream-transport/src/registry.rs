use crate::transport_trait::AnnotationTransport;
use shotstream_core::TransportError;
use std::collections::HashMap;

pub struct TransportRegistry {
    factories: HashMap<String, fn() -> Box<dyn AnnotationTransport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("null", || {
            Box::new(crate::null_transport::NullTransport::new())
        });
        registry.register("grpc", || {
            Box::new(crate::grpc_transport::GrpcTransport::new())
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn AnnotationTransport>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn AnnotationTransport>, TransportError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| TransportError::NotFound(name.to_string()))
    }

    pub fn list_transports(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new()
    }
}
