use crate::transport_trait::{AnnotationTransport, RequestStream, ResponseStream};
use async_trait::async_trait;
use shotstream_core::{
    AnnotateRequest, AnnotationResponse, ShotAnnotation, StreamingFeature, TimeOffset,
    TransportError,
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedRequest {
    Config(StreamingFeature),
    Chunk(usize),
}

/// In-process loopback. Answers every chunk with one response holding one
/// shot `[i s, i+1 s)`, where `i` is the chunk index.
pub struct NullTransport {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl NullTransport {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every request received so far, across all calls, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Shared handle to the request log, usable after the transport is boxed.
    pub fn request_log(&self) -> Arc<Mutex<Vec<RecordedRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl Default for NullTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn record(log: &Mutex<Vec<RecordedRequest>>, request: RecordedRequest) {
    if let Ok(mut log) = log.lock() {
        log.push(request);
    }
}

#[async_trait]
impl AnnotationTransport for NullTransport {
    fn name(&self) -> &str {
        "null"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), TransportError> {
        Ok(())
    }

    async fn streaming_annotate(
        &self,
        mut requests: RequestStream,
    ) -> Result<ResponseStream, TransportError> {
        let log = Arc::clone(&self.requests);
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut configured = false;
            let mut index: i64 = 0;

            while let Some(request) = requests.next().await {
                match request {
                    AnnotateRequest::Config(config) => {
                        record(&log, RecordedRequest::Config(config.feature));
                        configured = true;
                    }
                    AnnotateRequest::Chunk(chunk) => {
                        record(&log, RecordedRequest::Chunk(chunk.len()));
                        if !configured {
                            let _ = tx.send(Err(TransportError::Rpc {
                                code: "InvalidArgument".to_string(),
                                message: "first request must carry the video config".into(),
                            }));
                            break;
                        }
                        let response = AnnotationResponse {
                            shots: vec![ShotAnnotation {
                                start: TimeOffset::new(index, 0),
                                end: TimeOffset::new(index + 1, 0),
                            }],
                        };
                        tracing::trace!(
                            "NullTransport answered chunk #{index}, {} bytes",
                            chunk.len()
                        );
                        index += 1;
                        if tx.send(Ok(response)).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shotstream_core::{Chunk, StreamingConfig};

    fn chunk(len: usize) -> AnnotateRequest {
        AnnotateRequest::Chunk(Chunk {
            data: vec![0u8; len],
        })
    }

    fn config() -> AnnotateRequest {
        AnnotateRequest::Config(StreamingConfig::default())
    }

    #[test]
    fn test_null_transport_name() {
        let transport = NullTransport::new();
        assert_eq!(transport.name(), "null");
    }

    #[tokio::test]
    async fn test_null_transport_initialize_succeeds() {
        let mut transport = NullTransport::new();
        let result = transport
            .initialize(toml::Value::Table(Default::default()))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_null_transport_answers_each_chunk() {
        let transport = NullTransport::new();
        let requests: RequestStream = Box::pin(tokio_stream::iter(vec![
            config(),
            chunk(10),
            chunk(4),
        ]));

        let responses: Vec<_> = transport
            .streaming_annotate(requests)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(responses.len(), 2);
        let first = responses[0].as_ref().unwrap();
        assert_eq!(first.shots[0].to_string(), "Shot: 0.0s to 1.0s");
        let second = responses[1].as_ref().unwrap();
        assert_eq!(second.shots[0].to_string(), "Shot: 1.0s to 2.0s");
    }

    #[tokio::test]
    async fn test_null_transport_records_requests_in_order() {
        let transport = NullTransport::new();
        let requests: RequestStream = Box::pin(tokio_stream::iter(vec![
            config(),
            chunk(5),
            chunk(3),
        ]));

        let _: Vec<_> = transport
            .streaming_annotate(requests)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(
            transport.requests(),
            vec![
                RecordedRequest::Config(StreamingFeature::ShotChangeDetection),
                RecordedRequest::Chunk(5),
                RecordedRequest::Chunk(3),
            ]
        );
    }

    #[tokio::test]
    async fn test_null_transport_config_only_yields_no_responses() {
        let transport = NullTransport::new();
        let requests: RequestStream = Box::pin(tokio_stream::iter(vec![config()]));

        let responses: Vec<_> = transport
            .streaming_annotate(requests)
            .await
            .unwrap()
            .collect()
            .await;

        assert!(responses.is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_null_transport_rejects_chunk_before_config() {
        let transport = NullTransport::new();
        let requests: RequestStream = Box::pin(tokio_stream::iter(vec![chunk(8), config()]));

        let responses: Vec<_> = transport
            .streaming_annotate(requests)
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(responses.len(), 1);
        match &responses[0] {
            Err(TransportError::Rpc { code, .. }) => assert_eq!(code, "InvalidArgument"),
            other => panic!("expected Rpc error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_null_transport_shutdown_succeeds() {
        let transport = NullTransport::new();
        assert!(transport.shutdown().await.is_ok());
    }

    #[test]
    fn test_null_transport_implements_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NullTransport>();
    }
}
