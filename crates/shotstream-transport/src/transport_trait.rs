use async_trait::async_trait;
use shotstream_core::{AnnotateRequest, AnnotationResponse, TransportError};
use std::pin::Pin;
use tokio_stream::Stream;

/// Outbound half of a streaming call: one `Config` request, then chunks.
pub type RequestStream = Pin<Box<dyn Stream<Item = AnnotateRequest> + Send + 'static>>;

/// Inbound half of a streaming call, in the order the service sent it.
pub type ResponseStream =
    Pin<Box<dyn Stream<Item = Result<AnnotationResponse, TransportError>> + Send + 'static>>;

/// Client side of a bidirectional streaming annotation service.
///
/// Implementations are registered via [`TransportRegistry`](crate::TransportRegistry)
/// and configured once through [`initialize`](Self::initialize) before any
/// call is opened.
#[async_trait]
pub trait AnnotationTransport: Send + Sync {
    /// Returns the transport's registry name (e.g. `"grpc"`, `"null"`).
    fn name(&self) -> &str;
    /// One-time initialisation with transport-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), TransportError>;
    /// Open one streaming call. The call ends its outbound half when
    /// `requests` ends; the returned stream ends when the service closes.
    async fn streaming_annotate(
        &self,
        requests: RequestStream,
    ) -> Result<ResponseStream, TransportError>;
    /// Release any connection held by the transport.
    async fn shutdown(&self) -> Result<(), TransportError>;
}
