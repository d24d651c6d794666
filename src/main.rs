mod config;
mod error;
mod routes;
mod state;
mod translate;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::{Config, SystemConfig};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("translation_gateway=debug,tower_http=debug")),
        )
        .init();

    let config = load_config()?;

    if !config.provider_config.has_api_key() {
        warn!("No translation provider API key configured; translate requests will fail");
    }

    let app_state = AppState::new(config.clone()).await?;

    let app = Router::new()
        .merge(routes::create_routes())
        .layer(cors_layer(&config.system_config))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let system = &config.system_config;
    let listener = tokio::net::TcpListener::bind((system.host.as_str(), system.port)).await?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Try the usual config locations, falling back to built-in defaults.
fn load_config() -> Result<Config> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let names = ["conf.yaml", "conf.yml", "conf.json"];
    let config_paths: Vec<String> = std::env::var("CONFIG_PATH")
        .ok()
        .into_iter()
        .chain(names.iter().map(|n| n.to_string()))
        .chain(names.iter().map(|n| exe_dir.join(n).to_string_lossy().to_string()))
        .collect();

    for path in &config_paths {
        if !std::path::Path::new(path).exists() {
            continue;
        }
        let config = Config::load(path)?;
        info!("Loaded configuration from: {}", path);
        return Ok(config);
    }

    warn!("No config file found (tried {:?}); using defaults", config_paths);
    let config = Config::default();
    config.validate()?;
    Ok(config)
}

fn cors_layer(system: &SystemConfig) -> CorsLayer {
    if system.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = system
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
