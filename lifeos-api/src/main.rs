//! LifeOS API server - Main entry point
//!
//! Personal life-management backend: budget, calendar, meal planning, workouts,
//! projects and habits behind a JSON REST API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lifeos_common::config::{load_toml_config, ConfigOverrides, ServerConfig};
use lifeos_common::db::init_database;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lifeos_api::services::ai::{DisabledModel, GeminiClient, GenerativeModel};
use lifeos_api::{build_router, AppState};

/// Command-line arguments for lifeos-api
#[derive(Parser, Debug)]
#[command(name = "lifeos-api")]
#[command(about = "LifeOS personal life-management API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "LIFEOS_DATABASE")]
    database: Option<PathBuf>,

    /// Runtime environment (development, production)
    #[arg(long, env = "LIFEOS_ENV")]
    environment: Option<String>,

    /// Secret used to sign session tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Session lifetime in days
    #[arg(long, env = "JWT_EXPIRE_DAYS")]
    jwt_expire_days: Option<i64>,

    /// Extra origin allowed by CORS
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Option<String>,

    /// Built single-page client to serve outside /api
    #[arg(long, env = "LIFEOS_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Public base URL used in password reset links
    #[arg(long, env = "LIFEOS_PUBLIC_URL")]
    public_url: Option<String>,

    /// Gemini API key; AI features are disabled without one
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "GEMINI_MODEL")]
    gemini_model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LIFEOS_LOG_LEVEL")]
    log_level: Option<String>,

    /// TOML configuration file
    #[arg(short, long, env = "LIFEOS_CONFIG")]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            database_path: self.database.clone(),
            environment: self.environment.clone(),
            jwt_secret: self.jwt_secret.clone(),
            jwt_expire_days: self.jwt_expire_days,
            frontend_url: self.frontend_url.clone(),
            static_dir: self.static_dir.clone(),
            public_url: self.public_url.clone(),
            ai_api_key: self.gemini_api_key.clone(),
            ai_model: self.gemini_model.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read before the subscriber exists so its log level can apply
    let toml = load_toml_config(args.config.as_deref()).context("Failed to load configuration file")?;

    let level = args
        .log_level
        .clone()
        .or_else(|| toml.as_ref().map(|t| t.logging.level.clone()))
        .unwrap_or_else(|| "info".to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "lifeos_api={level},lifeos_common={level},tower_http={level}",
                    level = level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting LifeOS API v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    if toml.is_none() {
        info!("No configuration file, using environment and defaults");
    }

    let config = ServerConfig::resolve(args.overrides(), toml).context("Invalid configuration")?;
    info!(
        environment = %config.environment,
        database = %config.database_path.display(),
        "Configuration resolved"
    );

    let db = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let ai: Arc<dyn GenerativeModel> = match &config.ai.api_key {
        Some(key) => {
            let client = GeminiClient::new(key.clone(), config.ai.model.clone(), config.ai.base_url.clone())
                .context("Failed to create Gemini client")?;
            info!(model = %config.ai.model, "Generative model enabled");
            Arc::new(client)
        }
        None => {
            warn!("GEMINI_API_KEY not set, AI features are disabled");
            Arc::new(DisabledModel)
        }
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = build_router(AppState::new(db, config, ai));

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
