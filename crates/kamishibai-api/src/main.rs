//! Kamishibai API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use kamishibai_api::error::AppError;
use kamishibai_api::state::{AppState, DEFAULT_IDLE_TTL};
use kamishibai_core::clock::SystemClock;
use kamishibai_core::config::{ConfigOverrides, PlayerConfig};
use kamishibai_scenario::application::loader::FsScenarioSource;
use tracing_subscriber::EnvFilter;

/// Builds the player configuration: defaults, then the `GAME_CONFIG` JSON
/// file if set, then individual environment variables.
fn load_config() -> Result<PlayerConfig, AppError> {
    let mut overrides = match std::env::var("GAME_CONFIG") {
        Ok(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| AppError::Config(format!("GAME_CONFIG {path}: {e}")))?;
            ConfigOverrides::from_json(&raw)
                .map_err(|e| AppError::Config(format!("GAME_CONFIG {path}: {e}")))?
        }
        Err(_) => ConfigOverrides::default(),
    };

    if let Ok(packs_root) = std::env::var("PACKS_ROOT") {
        overrides.packs_root = Some(packs_root);
    }
    if let Ok(scenario) = std::env::var("SCENARIO") {
        overrides.scenario = Some(scenario);
    }
    if let Ok(prefix) = std::env::var("SAVE_KEY_PREFIX") {
        overrides.save_key_prefix = Some(prefix);
    }

    Ok(PlayerConfig::default().with_overrides(&overrides))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Kamishibai API server");

    // Read configuration from environment.
    let config = load_config()?;
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;

    tracing::info!(
        packs_root = %config.packs_root,
        scenario = %config.scenario,
        "player configuration loaded"
    );

    let idle_ttl = match std::env::var("SESSION_IDLE_SECS") {
        Ok(raw) => Duration::from_secs(raw.parse().map_err(|e| {
            AppError::Config(format!("SESSION_IDLE_SECS must be a whole number of seconds: {e}"))
        })?),
        Err(_) => DEFAULT_IDLE_TTL,
    };

    // Build application state and router.
    let app_state = AppState::new(config, Arc::new(SystemClock), Arc::new(FsScenarioSource))
        .with_idle_ttl(idle_ttl);

    // Sweep abandoned sessions in the background.
    let sweeper = app_state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(idle_ttl.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            sweeper.sweep_idle().await;
        }
    });

    let app = kamishibai_api::app(app_state);

    // Start server.
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(AppError::from)?;

    axum::serve(listener, app).await.map_err(AppError::from)?;

    Ok(())
}
