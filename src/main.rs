use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use emotion_cam::capture::encode_jpeg;
use emotion_cam::{
    create_router, AppState, CameraBackendFactory, CameraSource, Config, EmotionClient,
    HttpInferenceClient, InferenceClient,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "emotion-cam", version, about = "Webcam emotion readout backed by a remote model")]
struct Cli {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/emotion-cam")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture and classify frames until interrupted (default)
    Run {
        /// Inference endpoint, overrides inference.endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// Camera source: synthetic, file:<path> or device:<index>
        #[arg(long)]
        camera: Option<CameraSource>,
    },
    /// Send a single image to the endpoint and print the response
    Predict {
        image: PathBuf,

        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    match cli.command.unwrap_or(Command::Run {
        endpoint: None,
        camera: None,
    }) {
        Command::Run { endpoint, camera } => run(cfg, endpoint, camera).await,
        Command::Predict { image, endpoint } => predict(cfg, image, endpoint).await,
    }
}

async fn run(cfg: Config, endpoint: Option<String>, camera: Option<CameraSource>) -> Result<()> {
    let endpoint = endpoint.unwrap_or_else(|| cfg.inference.endpoint.clone());
    let source = match camera {
        Some(source) => source,
        None => cfg.camera_source()?,
    };

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Camera source: {:?}", source);
    info!("Inference endpoint: {}", endpoint);

    let backend = CameraBackendFactory::create(source)?;
    let inference: Arc<dyn InferenceClient> = Arc::new(HttpInferenceClient::new(endpoint));
    let client = Arc::new(EmotionClient::new(cfg.client_config(), backend, inference));

    let state = AppState::new(Arc::clone(&client)).with_snapshot_dir(cfg.snapshot_dir());
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;
    info!("HTTP server listening on http://{}", addr);

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await
    });

    let phase = client.start().await;
    info!("Client phase after startup: {:?}", phase);

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    info!("Shutting down");

    client.teardown().await;

    match server.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("HTTP server error: {}", e),
        Err(e) => warn!("HTTP server task failed: {}", e),
    }

    let stats = client.stats().await;
    info!(
        "Ticks: {} fired, {} dropped; requests: {} sent, {} failed; {} updates",
        stats.ticks_fired,
        stats.ticks_dropped,
        stats.requests_sent,
        stats.requests_failed,
        stats.updates_applied
    );

    Ok(())
}

async fn predict(cfg: Config, path: PathBuf, endpoint: Option<String>) -> Result<()> {
    let endpoint = endpoint.unwrap_or_else(|| cfg.inference.endpoint.clone());

    let raster = image::open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .to_rgb8();
    let encoded = encode_jpeg(&raster, cfg.sampler.jpeg_quality)?;

    info!(
        "Sending {} ({}x{}, {} bytes) to {}",
        path.display(),
        encoded.width,
        encoded.height,
        encoded.bytes.len(),
        endpoint
    );

    let client = HttpInferenceClient::new(endpoint);
    let response = client.predict(&encoded).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
