pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, GrpcConfig, StreamConfig, TransportConfig, DEFAULT_CHUNK_SIZE,
    DEFAULT_IDLE_TIMEOUT_SECS, RECOMMENDED_MAX_CHUNK_SIZE,
};
pub use error::{ConfigError, OutputError, SessionError, SourceError, TransportError};
pub use types::{
    AnnotateRequest, AnnotationResponse, Chunk, SessionSummary, ShotAnnotation, StreamingConfig,
    StreamingFeature, TimeOffset,
};
