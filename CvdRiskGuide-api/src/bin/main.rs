use anyhow::Context;
use dotenv::dotenv;
use tokio::signal;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use cvd_risk_guide_api::api::create_application;
use cvd_risk_guide_api::api::handlers::health::initialize_server_start_time;
use cvd_risk_guide_api::config::AppConfig;

/// The main entry point for the CvdRiskGuide API server
///
/// This function:
/// 1. Initializes environment variables from .env file
/// 2. Loads the server configuration
/// 3. Sets up tracing for logging
/// 4. Creates and starts the Axum web application
/// 5. Handles graceful shutdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    let dotenv_loaded = dotenv().is_ok();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    // RUST_LOG wins over LOG_LEVEL
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(false)
            .with_ansi(true)
            .with_timer(fmt::time::uptime())
            .with_writer(std::io::stdout))
        .with(env_filter)
        .init();

    if !dotenv_loaded {
        warn!(".env file not found or couldn't be read. Using environment variables.");
    }

    info!("Starting CvdRiskGuide API server ({})", config.environment);

    // Initialize server start time for uptime reporting in health checks
    initialize_server_start_time();

    // Create the Axum application with all routes and middleware
    let app = create_application(&config);

    let addr = config.socket_addr();
    info!("Listening on {}", addr);

    // Create a TCP listener and bind to the address
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    // Serve the application with graceful shutdown support
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Sets up a signal handler for graceful shutdown
///
/// This function creates an async task that waits for either:
/// - CTRL+C signal
/// - SIGTERM (on Unix systems)
///
/// When either signal is received, the function returns and triggers
/// the graceful shutdown process.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutting down server...");
}
