use crate::proto::{self, StreamingAnnotateVideoRequest, StreamingAnnotateVideoResponse};
use crate::transport_trait::{AnnotationTransport, RequestStream, ResponseStream};
use async_trait::async_trait;
use shotstream_core::TransportError;
use std::sync::Mutex;
use std::time::Duration;
use tokio_stream::StreamExt;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

pub const DEFAULT_ENDPOINT: &str = "https://videointelligence.googleapis.com";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Streaming annotate client for the video intelligence gRPC endpoint.
///
/// Credentials are not acquired here; an `access_token` from the config is
/// forwarded as a bearer token on every call.
pub struct GrpcTransport {
    endpoint: String,
    authorization: Option<AsciiMetadataValue>,
    channel: Mutex<Option<Channel>>,
}

impl GrpcTransport {
    pub fn new() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            authorization: None,
            channel: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.channel
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn connected_channel(&self) -> Result<Channel, TransportError> {
        self.channel
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(TransportError::NotInitialized)
    }
}

impl Default for GrpcTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn status_to_error(status: tonic::Status) -> TransportError {
    match status.code() {
        tonic::Code::DeadlineExceeded => {
            TransportError::DeadlineExceeded(status.message().to_string())
        }
        code => TransportError::Rpc {
            code: format!("{code:?}"),
            message: status.message().to_string(),
        },
    }
}

#[async_trait]
impl AnnotationTransport for GrpcTransport {
    fn name(&self) -> &str {
        "grpc"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), TransportError> {
        if let Some(token) = config.get("access_token").and_then(|v| v.as_str()) {
            let value = format!("Bearer {token}")
                .parse::<AsciiMetadataValue>()
                .map_err(|e| {
                    TransportError::InitializationFailed(format!("invalid 'access_token': {e}"))
                })?;
            self.authorization = Some(value);
        }

        let connect_timeout = config
            .get("connect_timeout_secs")
            .and_then(|v| v.as_integer())
            .map(|secs| Duration::from_secs(secs.max(1) as u64))
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT);

        self.endpoint = config
            .get("endpoint")
            .and_then(|v| v.as_str())
            .unwrap_or(DEFAULT_ENDPOINT)
            .to_string();

        let mut endpoint = Endpoint::from_shared(self.endpoint.clone())
            .map_err(|e| {
                TransportError::InitializationFailed(format!(
                    "invalid 'endpoint' {:?}: {e}",
                    self.endpoint
                ))
            })?
            .connect_timeout(connect_timeout);

        if endpoint.uri().scheme_str() == Some("https") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new().with_native_roots())
                .map_err(|e| {
                    TransportError::InitializationFailed(format!("TLS setup failed: {e}"))
                })?;
        }

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| TransportError::Connect {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            })?;

        *self
            .channel
            .lock()
            .map_err(|_| TransportError::InitializationFailed("channel lock poisoned".into()))? =
            Some(channel);

        tracing::info!(
            endpoint = %self.endpoint,
            authorized = self.authorization.is_some(),
            "connected to annotation service"
        );
        Ok(())
    }

    async fn streaming_annotate(
        &self,
        requests: RequestStream,
    ) -> Result<ResponseStream, TransportError> {
        let channel = self.connected_channel()?;
        let mut grpc = tonic::client::Grpc::new(channel);
        grpc.ready().await.map_err(|e| TransportError::Connect {
            endpoint: self.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let outbound = requests.map(StreamingAnnotateVideoRequest::from);
        let mut request = tonic::Request::new(outbound);
        if let Some(authorization) = &self.authorization {
            request
                .metadata_mut()
                .insert("authorization", authorization.clone());
        }

        let codec =
            ProstCodec::<StreamingAnnotateVideoRequest, StreamingAnnotateVideoResponse>::default();
        let path = PathAndQuery::from_static(proto::STREAMING_ANNOTATE_VIDEO_PATH);

        let response = grpc
            .streaming(request, path, codec)
            .await
            .map_err(status_to_error)?;
        tracing::debug!(endpoint = %self.endpoint, "streaming call established");

        let inbound = response.into_inner().map(|item| {
            item.map_err(status_to_error)
                .and_then(StreamingAnnotateVideoResponse::into_annotation_response)
        });
        Ok(Box::pin(inbound))
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        if let Ok(mut guard) = self.channel.lock() {
            if guard.take().is_some() {
                tracing::debug!(endpoint = %self.endpoint, "closed annotation channel");
            }
        }
        Ok(())
    }
}
