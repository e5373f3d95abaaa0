use anyhow::{Context, Result};
use clap::Parser;
use shotstream_core::{AppConfig, StreamingConfig, StreamingFeature};
use shotstream_session::{SessionOptions, ShotPrinter, StreamingSession};
use shotstream_source::ChunkReader;
use shotstream_transport::TransportRegistry;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "SHOTSTREAM_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "shotstream.toml";

#[derive(Parser)]
#[command(
    name = "shotstream",
    about = "Stream a local video file to the annotation service and print detected shot changes"
)]
struct Cli {
    /// Local file location for streaming video annotation.
    file_path: PathBuf,
}

fn load_config() -> Result<AppConfig> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        let path = PathBuf::from(path);
        return AppConfig::load_from_file(&path)
            .with_context(|| format!("failed to load config from {path:?}"));
    }

    let local = Path::new(DEFAULT_CONFIG_FILE);
    if local.is_file() {
        return AppConfig::load_from_file(local)
            .with_context(|| format!("failed to load config from {local:?}"));
    }

    Ok(AppConfig::default())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config()?;

    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let stream = &config.stream;
    tracing::info!(
        file = %cli.file_path.display(),
        chunk_size = stream.chunk_size,
        transport = %config.transport.name,
        "shotstream starting"
    );

    // Open before contacting the service so a bad path never starts a call.
    let chunks = ChunkReader::open(&cli.file_path, stream.chunk_size)
        .with_context(|| format!("cannot stream {:?}", cli.file_path))?;

    if stream.feature != StreamingFeature::ShotChangeDetection {
        tracing::warn!(
            feature = %stream.feature,
            "only shot annotations are printed for this feature"
        );
    }

    let registry = TransportRegistry::new();
    let mut transport = registry
        .create(&config.transport.name)
        .with_context(|| format!("unknown transport '{}'", config.transport.name))?;

    let transport_config = match config.transport.grpc {
        Some(ref grpc_cfg) if config.transport.name == "grpc" => {
            toml::Value::try_from(grpc_cfg).context("failed to serialize grpc config")?
        }
        _ => toml::Value::Table(Default::default()),
    };

    transport
        .initialize(transport_config)
        .await
        .with_context(|| format!("failed to initialize transport '{}'", config.transport.name))?;

    let session = StreamingSession::new(
        transport,
        StreamingConfig {
            feature: stream.feature,
        },
        SessionOptions {
            idle_timeout: stream.idle_timeout(),
            queue_depth: stream.queue_depth,
        },
    );

    let mut printer = ShotPrinter::stdout();
    let outcome = session.run(chunks, &mut printer).await;

    if let Err(e) = session.shutdown().await {
        tracing::warn!("transport shutdown failed: {e}");
    }

    let summary = outcome
        .with_context(|| format!("streaming annotation of {:?} failed", cli.file_path))?;

    tracing::info!(
        chunks_sent = summary.chunks_sent,
        bytes_sent = summary.bytes_sent,
        responses = summary.responses,
        shots = printer.shots_printed(),
        "done"
    );

    Ok(())
}
