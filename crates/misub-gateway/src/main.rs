//! MiSub Gateway - HTTP JSON API for the admin dashboard
//!
//! This is the main entry point for the gateway service.
//!
//! # Storage
//!
//! Set `MISUB_DATA_DIR` to persist data in RocksDB. Without it the gateway
//! runs on an in-memory store and everything is lost on exit.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use misub_auth::{AuthConfig, SignedSessions};
use misub_control::AdminService;
use misub_gateway::{create_router, GatewayConfig, GatewayState};
use misub_store::{KvStore, MemoryStore, RocksStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,misub=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MiSub Gateway");

    // Load configuration from environment
    let config = GatewayConfig::from_env();
    let data_dir = non_empty_env("MISUB_DATA_DIR");
    let auth_config = AuthConfig {
        admin_password: non_empty_env("MISUB_ADMIN_PASSWORD"),
        session_secret: non_empty_env("MISUB_SESSION_SECRET"),
        ..AuthConfig::default()
    };

    tracing::info!(
        listen_addr = %config.listen_addr,
        cors_origin = %config.cors_origin,
        data_dir = ?data_dir,
        expose_error_details = config.expose_error_details,
        legacy_fallback = config.legacy_fallback,
        "Gateway configuration loaded"
    );

    if auth_config.admin_password.is_none() {
        tracing::warn!("No MISUB_ADMIN_PASSWORD set - every login will be rejected");
    }

    let sessions = Arc::new(SignedSessions::new(auth_config));

    match data_dir {
        Some(path) => {
            tracing::info!(path = %path, "Opening RocksDB store");
            let store = Arc::new(RocksStore::open(&path)?);
            serve(store, sessions, config, Some(path)).await
        }
        None => {
            tracing::warn!("No MISUB_DATA_DIR set - using in-memory store");
            serve(Arc::new(MemoryStore::new()), sessions, config, None).await
        }
    }
}

async fn serve<S: KvStore + 'static>(
    store: Arc<S>,
    sessions: Arc<SignedSessions>,
    config: GatewayConfig,
    kv_binding: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let control = Arc::new(AdminService::with_defaults(store));
    tracing::info!(backend = control.store().backend(), "Control plane initialized");

    let listen_addr = config.listen_addr.clone();
    let mut state = GatewayState::new(control, sessions, config);
    if let Some(binding) = kv_binding {
        state = state.with_kv_binding(binding);
    }

    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
