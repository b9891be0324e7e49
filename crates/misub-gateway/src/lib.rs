//! HTTP JSON gateway for the MiSub console server.
//!
//! This crate provides the API the admin dashboard talks to. It handles:
//!
//! - Cookie sessions for the single administrator
//! - Subscription data and node group endpoints
//! - A fixed CORS envelope on every response
//! - One error envelope for every failure, panics included
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Admin dashboard                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       misub-gateway                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │   CORS      │ │   Router    │ │    AdminSession     │   │
//! │  │  Envelope   │ │  + Handlers │ │    Extractor        │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                     ┌────────┴────────┐
//!                     ▼                 ▼
//!              ┌────────────┐    ┌────────────┐
//!              │  Control   │    │  Sessions  │
//!              │  Plane     │    │  (JWT)     │
//!              └────────────┘    └────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use misub_auth::{AuthConfig, SignedSessions};
//! use misub_control::AdminService;
//! use misub_gateway::{create_router, GatewayConfig, GatewayState};
//! use misub_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let control = Arc::new(AdminService::with_defaults(Arc::new(MemoryStore::new())));
//! let sessions = Arc::new(SignedSessions::new(AuthConfig::default()));
//!
//! let config = GatewayConfig::default();
//! let state = GatewayState::new(control, sessions, config);
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8787").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::AdminSession;
pub use config::GatewayConfig;
pub use error::{ApiError, ErrorEnvelope};
pub use extract::ApiJson;
pub use routes::create_router;
pub use state::GatewayState;
