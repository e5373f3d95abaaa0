use shotstream_core::{AnnotateRequest, Chunk, StreamingConfig, StreamingFeature};
use shotstream_transport::{
    AnnotationTransport, NullTransport, RecordedRequest, RequestStream, TransportRegistry,
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

#[tokio::test]
async fn test_registry_null_transport_round_trip() {
    let registry = TransportRegistry::new();
    let mut transport = registry.create("null").unwrap();
    transport
        .initialize(toml::Value::Table(Default::default()))
        .await
        .unwrap();

    let requests: RequestStream = Box::pin(tokio_stream::iter(vec![
        AnnotateRequest::Config(StreamingConfig::default()),
        AnnotateRequest::Chunk(Chunk { data: vec![1; 32] }),
    ]));
    let mut responses = transport.streaming_annotate(requests).await.unwrap();

    let first = tokio::time::timeout(std::time::Duration::from_secs(2), responses.next())
        .await
        .expect("timed out")
        .expect("stream ended")
        .expect("transport error");
    assert_eq!(first.shots.len(), 1);
    assert!(responses.next().await.is_none());

    transport.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_null_transport_streams_while_requests_arrive() {
    let transport = NullTransport::new();
    let (tx, rx) = mpsc::channel(1);
    let requests: RequestStream = Box::pin(ReceiverStream::new(rx));

    let mut responses = transport.streaming_annotate(requests).await.unwrap();

    tx.send(AnnotateRequest::Config(StreamingConfig {
        feature: StreamingFeature::ShotChangeDetection,
    }))
    .await
    .unwrap();
    tx.send(AnnotateRequest::Chunk(Chunk { data: vec![0; 8] }))
        .await
        .unwrap();

    // A response arrives before the outbound half is closed.
    let response = tokio::time::timeout(std::time::Duration::from_secs(2), responses.next())
        .await
        .expect("timed out")
        .expect("stream ended")
        .expect("transport error");
    assert_eq!(response.shots[0].to_string(), "Shot: 0.0s to 1.0s");

    drop(tx);
    assert!(responses.next().await.is_none());
    assert_eq!(
        transport.requests(),
        vec![
            RecordedRequest::Config(StreamingFeature::ShotChangeDetection),
            RecordedRequest::Chunk(8),
        ]
    );
}

#[tokio::test]
async fn test_grpc_transport_unreachable_endpoint_fails_to_connect() {
    let registry = TransportRegistry::new();
    let mut transport = registry.create("grpc").unwrap();

    let mut table = toml::map::Map::new();
    // Port 9 on loopback has nothing listening.
    table.insert(
        "endpoint".to_string(),
        toml::Value::String("http://127.0.0.1:9".to_string()),
    );
    table.insert("connect_timeout_secs".to_string(), toml::Value::Integer(2));

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        transport.initialize(toml::Value::Table(table)),
    )
    .await
    .expect("initialize timed out");

    match result {
        Err(shotstream_core::TransportError::Connect { endpoint, .. }) => {
            assert_eq!(endpoint, "http://127.0.0.1:9");
        }
        other => panic!("expected Connect error, got {other:?}"),
    }
}
