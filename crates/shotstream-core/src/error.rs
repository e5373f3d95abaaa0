use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read chunk #{index}: {source}")]
    Read {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("transport not found: {0}")]
    NotFound(String),

    #[error("transport initialization failed: {0}")]
    InitializationFailed(String),

    #[error("transport used before initialization")]
    NotInitialized,

    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("streaming call failed ({code}): {message}")]
    Rpc { code: String, message: String },

    #[error("service reported error {code}: {message}")]
    Service { code: i32, message: String },

    #[error("remote deadline exceeded: {0}")]
    DeadlineExceeded(String),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write annotations: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("file not readable: {0}")]
    FileNotReadable(#[from] SourceError),

    #[error("transport failure: {0}")]
    TransportFailure(TransportError),

    #[error("deadline exceeded: {0}")]
    DeadlineExceeded(String),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("chunk producer failed: {0}")]
    Producer(String),
}

impl SessionError {
    pub fn idle_timeout(idle: Duration) -> Self {
        SessionError::DeadlineExceeded(format!("no response within {idle:?}"))
    }
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::DeadlineExceeded(msg) => SessionError::DeadlineExceeded(msg),
            other => SessionError::TransportFailure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_deadline_maps_to_session_deadline() {
        let err: SessionError = TransportError::DeadlineExceeded("3h elapsed".to_string()).into();
        match err {
            SessionError::DeadlineExceeded(msg) => assert_eq!(msg, "3h elapsed"),
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_rpc_error_maps_to_transport_failure() {
        let err: SessionError = TransportError::Rpc {
            code: "Unavailable".to_string(),
            message: "connection reset".to_string(),
        }
        .into();
        assert!(matches!(err, SessionError::TransportFailure(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn test_idle_timeout_message_names_duration() {
        let err = SessionError::idle_timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "deadline exceeded: no response within 5s");
    }

    #[test]
    fn test_source_open_error_mentions_path() {
        let err = SourceError::Open {
            path: PathBuf::from("/videos/missing.mp4"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/videos/missing.mp4"));
    }
}
