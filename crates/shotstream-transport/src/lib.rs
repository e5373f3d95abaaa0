pub mod grpc_transport;
pub mod null_transport;
pub mod proto;
pub mod registry;
pub mod transport_trait;

pub use grpc_transport::GrpcTransport;
pub use null_transport::{NullTransport, RecordedRequest};
pub use registry::TransportRegistry;
pub use transport_trait::{AnnotationTransport, RequestStream, ResponseStream};
