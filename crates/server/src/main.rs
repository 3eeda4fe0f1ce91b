use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plotguess_core::{
    create_searcher, load_config, validate_config, DisabledFeedback, EvaluationService,
    FeedbackService, HttpEvaluationService, HttpFeedbackClient, SessionServices,
};
use plotguess_server::api::create_router;
use plotguess_server::registry::SessionRegistry;
use plotguess_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How often idle sessions are swept
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("PLOTGUESS_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );

    // Series search provider
    let searcher = create_searcher(&config.search).context("Failed to create series searcher")?;
    info!("Using series search provider: {}", searcher.name());

    // Plot evaluation service
    let evaluator: Arc<dyn EvaluationService> = Arc::new(
        HttpEvaluationService::new(config.evaluation.clone())
            .context("Failed to create evaluation client")?,
    );
    info!("Evaluation service at {}", config.evaluation.url);

    // Feedback sink
    let feedback: Arc<dyn FeedbackService> = match &config.feedback {
        Some(feedback_config) => {
            info!("Feedback endpoint at {}", feedback_config.url);
            Arc::new(
                HttpFeedbackClient::new(feedback_config.clone())
                    .context("Failed to create feedback client")?,
            )
        }
        None => {
            info!("No feedback endpoint configured");
            Arc::new(DisabledFeedback)
        }
    };

    let services = SessionServices {
        searcher,
        evaluator,
        feedback,
    };

    let registry = Arc::new(SessionRegistry::new(config.session.clone(), services));
    let sweeper = registry.spawn_sweeper(SWEEP_INTERVAL);

    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&registry)));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    sweeper.abort();
    info!("Dropping {} live session(s)", registry.len().await);

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
