use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moodboard_server::board::MoodBoardService;
use moodboard_server::config::{self, parse_origins, AppConfig};
use moodboard_server::imagery::generator::DEFAULT_IMAGE_MODEL;
use moodboard_server::imagery::placeholder::DEFAULT_PLACEHOLDER_BASE_URL;
use moodboard_server::imagery::{
    DiffusionClient, ImageCompositor, ImageGenerator, ImageModelHandle, PlaceholderProvider,
};
use moodboard_server::llm::{LlmProvider, OllamaProvider};
use moodboard_server::mood::MoodClassifier;
use moodboard_server::random::RandomSource;
use moodboard_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(s);
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(path))
}

#[derive(Parser, Debug)]
#[clap(version)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9092)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Base URL of the Ollama service used for mood classification.
    #[clap(long, default_value = "http://localhost:11434")]
    pub classifier_url: String,

    /// Model used for mood classification.
    #[clap(long, default_value = "qwen2.5:7b")]
    pub classifier_model: String,

    /// Timeout in seconds for a classification request.
    #[clap(long, default_value_t = 30)]
    pub classifier_timeout_sec: u64,

    /// Skip the external classifier and always use the keyword heuristic.
    #[clap(long)]
    pub disable_classifier: bool,

    /// Base URL of the Stable Diffusion web API. Without it every image is a placeholder.
    #[clap(long)]
    pub image_model_url: Option<String>,

    /// Checkpoint requested from the diffusion service.
    #[clap(long, default_value = DEFAULT_IMAGE_MODEL)]
    pub image_model: String,

    /// Base URL of the placeholder image service.
    #[clap(long, default_value = DEFAULT_PLACEHOLDER_BASE_URL)]
    pub placeholder_base_url: String,

    /// Comma-separated list of origins allowed to call the API.
    #[clap(long, default_value = "http://localhost:3000")]
    pub allowed_origins: String,

    /// Seed for all random choices, for reproducible runs.
    #[clap(long)]
    pub rng_seed: Option<u64>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            classifier_url: args.classifier_url.clone(),
            classifier_model: args.classifier_model.clone(),
            classifier_timeout_sec: args.classifier_timeout_sec,
            disable_classifier: args.disable_classifier,
            image_model_url: args.image_model_url.clone(),
            image_model: args.image_model.clone(),
            placeholder_base_url: args.placeholder_base_url.clone(),
            allowed_origins: parse_origins(&args.allowed_origins),
            rng_seed: args.rng_seed,
        }
    }
}

fn make_classifier(app_config: &AppConfig) -> MoodClassifier {
    let Some(settings) = &app_config.classifier else {
        info!("Mood classifier disabled, using keyword heuristic only");
        return MoodClassifier::heuristic_only();
    };

    info!(
        "Mood classifier: {} at {} (timeout {:?})",
        settings.model, settings.url, settings.timeout
    );
    let provider = Arc::new(OllamaProvider::new(&settings.url, &settings.model));

    // Startup probe, a failure only logs.
    let probe = provider.clone();
    tokio::spawn(async move {
        if let Err(e) = probe.health_check().await {
            warn!(error = %e, "Mood classifier not reachable, heuristic will be used until it is");
        }
    });

    MoodClassifier::new(provider, settings.timeout)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration:");
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!("  logging_level: {}", app_config.logging_level);
    info!("  allowed_origins: {:?}", app_config.allowed_origins);
    info!("  placeholder: {}", app_config.placeholder.base_url);
    info!(
        "  board: {} images, at most {} per request",
        app_config.board.images_per_board, app_config.board.max_images_per_request
    );
    if app_config.rng_seed.is_some() {
        info!("  rng_seed: {:?}", app_config.rng_seed);
    }

    info!("Initializing metrics...");
    metrics::init_metrics();

    let random = Arc::new(RandomSource::from_optional_seed(app_config.rng_seed));
    let classifier = make_classifier(&app_config);

    // The model loads in the background; until it is ready boards use placeholders.
    let image_model = Arc::new(ImageModelHandle::new());
    match app_config.image_model.clone() {
        Some(settings) => {
            info!(
                "Image model: {} at {} ({} steps)",
                settings.model, settings.base_url, settings.steps
            );
            let handle = image_model.clone();
            tokio::spawn(async move {
                handle
                    .initialize(async move {
                        DiffusionClient::connect(settings)
                            .await
                            .map(|client| Arc::new(client) as Arc<dyn ImageGenerator>)
                    })
                    .await;
            });
        }
        None => info!("No image model configured, images will be placeholders"),
    }

    let placeholders = PlaceholderProvider::new(
        app_config.placeholder.base_url.clone(),
        app_config.placeholder.width,
        app_config.placeholder.height,
    );
    let compositor = ImageCompositor::new(image_model.clone(), placeholders, random.clone());
    let board = Arc::new(MoodBoardService::new(
        classifier,
        compositor,
        random,
        app_config.board,
    ));

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level.clone(),
        port: app_config.port,
        metrics_port: app_config.metrics_port,
        allowed_origins: app_config.allowed_origins.clone(),
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutting down...");
    };

    let result = run_server(server_config, board, shutdown).await;
    image_model.shutdown();
    result
}
