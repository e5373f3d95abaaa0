use crate::handler::ResponseHandler;
use shotstream_core::{
    AnnotateRequest, Chunk, SessionError, SessionSummary, SourceError, StreamingConfig,
    DEFAULT_IDLE_TIMEOUT_SECS,
};
use shotstream_transport::{AnnotationTransport, RequestStream};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

/// How long to wait for the producer after the service closed the call.
const PRODUCER_GRACE: Duration = Duration::from_secs(1);

/// Stand-in for "never" when an idle timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Longest tolerated silence after the last queued request or the last
    /// received response.
    pub idle_timeout: Duration,
    /// Chunks buffered between the producer and the transport.
    pub queue_depth: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            queue_depth: 2,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Progress {
    last_sent: Instant,
    chunks: usize,
    bytes: u64,
}

/// One bidirectional streaming call: a config message, the chunks of one
/// file, and the responses the service sends back.
pub struct StreamingSession {
    transport: Box<dyn AnnotationTransport>,
    config: StreamingConfig,
    options: SessionOptions,
}

impl StreamingSession {
    pub fn new(
        transport: Box<dyn AnnotationTransport>,
        config: StreamingConfig,
        options: SessionOptions,
    ) -> Self {
        Self {
            transport,
            config,
            options,
        }
    }

    pub fn config(&self) -> StreamingConfig {
        self.config
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    /// Stream `chunks` to the service and pass every response to `handler`.
    ///
    /// The chunk iterator runs on a blocking worker and is dropped (closing
    /// any file it owns) when it is exhausted, fails, or the session ends.
    /// Responses already handled when an error occurs stay handled.
    pub async fn run<I, H>(
        &self,
        chunks: I,
        handler: &mut H,
    ) -> Result<SessionSummary, SessionError>
    where
        I: IntoIterator<Item = Result<Chunk, SourceError>>,
        I::IntoIter: Send + 'static,
        H: ResponseHandler + ?Sized,
    {
        let idle = self.options.idle_timeout;
        let (queue_tx, queue_rx) = mpsc::channel(self.options.queue_depth.max(1));

        // The queue is empty, so the config always goes out first.
        queue_tx
            .try_send(AnnotateRequest::Config(self.config))
            .map_err(|e| SessionError::Producer(format!("failed to queue config: {e}")))?;

        let (progress_tx, progress_rx) = watch::channel(Progress {
            last_sent: Instant::now(),
            chunks: 0,
            bytes: 0,
        });
        let mut producer = spawn_producer(chunks.into_iter(), queue_tx, progress_tx);

        let mut producer_done = false;
        let requests: RequestStream = Box::pin(ReceiverStream::new(queue_rx));
        let mut opening = self.transport.streaming_annotate(requests);

        // Some services answer the call only after reading the upload, so
        // opening is bounded by the same idle gap as the response loop.
        let mut responses = loop {
            let deadline = idle_deadline(progress_rx.borrow().last_sent, idle);

            tokio::select! {
                opened = &mut opening => break opened?,
                joined = &mut producer, if !producer_done => {
                    producer_done = true;
                    producer_outcome(joined)?;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let refreshed = idle_deadline(progress_rx.borrow().last_sent, idle);
                    if Instant::now() >= refreshed {
                        tracing::warn!(
                            idle_timeout = ?idle,
                            "call not established within idle timeout"
                        );
                        return Err(SessionError::idle_timeout(idle));
                    }
                }
            }
        };
        drop(opening);

        tracing::info!(
            transport = self.transport.name(),
            feature = %self.config.feature,
            idle_timeout = ?idle,
            "streaming session opened"
        );
        handler.on_open()?;

        let mut summary = SessionSummary::default();
        let mut last_response = Instant::now();

        loop {
            let deadline = idle_deadline(progress_rx.borrow().last_sent.max(last_response), idle);

            tokio::select! {
                item = responses.next() => match item {
                    Some(Ok(response)) => {
                        last_response = Instant::now();
                        summary.responses += 1;
                        summary.annotations += response.shots.len();
                        for shot in response.shots.iter().filter(|s| !s.is_well_ordered()) {
                            tracing::warn!(%shot, "annotation ends before it starts");
                        }
                        tracing::debug!(
                            response = summary.responses,
                            shots = response.shots.len(),
                            "received response"
                        );
                        handler.handle(&response)?;
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                },
                joined = &mut producer, if !producer_done => {
                    producer_done = true;
                    producer_outcome(joined)?;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let refreshed =
                        idle_deadline(progress_rx.borrow().last_sent.max(last_response), idle);
                    if Instant::now() >= refreshed {
                        tracing::warn!(idle_timeout = ?idle, "no response within idle timeout");
                        return Err(SessionError::idle_timeout(idle));
                    }
                }
            }
        }

        if !producer_done {
            match tokio::time::timeout(PRODUCER_GRACE, &mut producer).await {
                Ok(joined) => producer_outcome(joined)?,
                Err(_) => {
                    tracing::warn!("service closed the call before the whole file was sent");
                    // Releasing the call drops the request queue; the producer
                    // stops at its next send.
                    drop(responses);
                }
            }
        }

        let progress = *progress_rx.borrow();
        summary.chunks_sent = progress.chunks;
        summary.bytes_sent = progress.bytes;

        tracing::info!(
            chunks_sent = summary.chunks_sent,
            bytes_sent = summary.bytes_sent,
            responses = summary.responses,
            annotations = summary.annotations,
            "streaming session finished"
        );
        Ok(summary)
    }

    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.transport.shutdown().await?;
        Ok(())
    }
}

/// `from + idle`, saturating to a far-future instant instead of overflowing.
fn idle_deadline(from: Instant, idle: Duration) -> Instant {
    from.checked_add(idle).unwrap_or_else(|| Instant::now() + FAR_FUTURE)
}

fn spawn_producer<I>(
    chunks: I,
    queue: mpsc::Sender<AnnotateRequest>,
    progress: watch::Sender<Progress>,
) -> JoinHandle<Result<(), SourceError>>
where
    I: Iterator<Item = Result<Chunk, SourceError>> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        for item in chunks {
            let chunk = item?;
            let len = chunk.len() as u64;
            if queue.blocking_send(AnnotateRequest::Chunk(chunk)).is_err() {
                tracing::debug!("request queue closed, stopping producer");
                return Ok(());
            }
            progress.send_modify(|p| {
                p.last_sent = Instant::now();
                p.chunks += 1;
                p.bytes += len;
            });
        }
        tracing::debug!("all chunks queued");
        Ok(())
    })
}

fn producer_outcome(
    joined: Result<Result<(), SourceError>, tokio::task::JoinError>,
) -> Result<(), SessionError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(SessionError::FileNotReadable(e)),
        Err(e) => Err(SessionError::Producer(e.to_string())),
    }
}
