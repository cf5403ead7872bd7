//! facetag-id - identify the people in a captured image
//!
//! Sends an image through a remote Face API (detect → identify → person
//! lookup) and prints each resolved name.

use anyhow::Result;
use clap::{Parser, Subcommand};
use facetag_common::config::{self as common_config, LoggingConfig};
use facetag_id::collaborators::{ConsoleSink, FileImageSource, ResultSink};
use facetag_id::config::{self, CliOverrides, ResolvedConfig};
use facetag_id::{FaceApiClient, HttpClient, HttpOutcome, IdentificationPipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "facetag-id", version, about = "Identify faces through a remote Face API")]
struct Cli {
    /// Config file (default: $FACETAG_CONFIG or ~/.config/facetag/facetag.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Face API base endpoint
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Face API subscription key
    #[arg(long, global = true)]
    subscription_key: Option<String>,

    /// Person group used for identification
    #[arg(long, global = true)]
    person_group: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Minimum seconds between person lookups
    #[arg(long, global = true)]
    lookup_interval: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Identify the faces in an image file
    Identify {
        /// Image file (JPEG/PNG bytes are sent as-is)
        image: PathBuf,
    },
    /// Show the configured person group
    Group,
    /// GET a URL and print the body or the formatted error
    Probe { url: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(common_config::config_file_path);
    let toml_config = common_config::load_or_default(config_path.as_deref());

    init_tracing(&toml_config.logging)?;

    info!(
        "Starting facetag-id v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let http = HttpClient::new()?;

    let overrides = CliOverrides {
        base_url: cli.base_url.clone(),
        subscription_key: cli.subscription_key.clone(),
        person_group_id: cli.person_group.clone(),
        request_timeout_secs: cli.timeout,
        lookup_interval_secs: cli.lookup_interval,
    };

    match cli.command {
        Command::Probe { url } => {
            let timeout = config::resolve_request_timeout(cli.timeout, &toml_config)?;
            Ok(probe(&http, &url, timeout, ConsoleSink).await)
        }
        Command::Identify { image } => {
            let resolved = config::resolve(&overrides, &toml_config)?;
            let lookup_interval = resolved.lookup_interval;
            let client = face_client(http, resolved);

            let pipeline = IdentificationPipeline::new(client, ConsoleSink, lookup_interval);
            let source = FileImageSource::new(&image);

            match pipeline.run_from_source(&source).await {
                Ok(summary) => {
                    if summary.identified.is_empty() {
                        info!(image = %image.display(), "No one identified");
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Identification aborted: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Group => {
            let resolved = config::resolve(&overrides, &toml_config)?;
            let client = face_client(http, resolved);

            match client.get_person_group().await {
                Ok(group) => {
                    println!("{} ({})", group.name, group.person_group_id);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    error!("Person group lookup failed: {}", e);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn face_client(http: HttpClient, resolved: ResolvedConfig) -> FaceApiClient {
    info!(
        base_url = %resolved.face_api.base_url,
        person_group = %resolved.face_api.person_group_id,
        "Face API configured"
    );
    FaceApiClient::new(http, resolved.face_api)
}

/// Fetch `url` through the callback API and present the result
async fn probe<K: ResultSink + 'static>(
    http: &HttpClient,
    url: &str,
    timeout: Duration,
    sink: K,
) -> ExitCode {
    let (done_tx, done_rx) = oneshot::channel();

    http.get_with(url, timeout, move |outcome| {
        let succeeded = outcome.is_success();
        match outcome {
            HttpOutcome::Success(body) => sink.present(&body),
            HttpOutcome::Failure(e) => sink.present(&format!("Error: {}", e)),
        }
        let _ = done_tx.send(succeeded);
    });

    match done_rx.await {
        Ok(true) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &logging.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
