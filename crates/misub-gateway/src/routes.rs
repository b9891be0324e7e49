//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::routing::{any, get, post, MethodRouter};
use axum::{middleware, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use misub_auth::SessionAuthority;
use misub_control::AdminPlane;

use crate::envelope;
use crate::handlers::{data, health, node_groups, session};
use crate::state::GatewayState;

type Shared<C, A> = Arc<GatewayState<C, A>>;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `POST /api/login` - Exchange the admin password for a session cookie
/// - `ANY /api/logout` - Clear the session cookie
/// - `GET /api/debug` - Configuration diagnostics
/// - `GET /health` - Health check
/// - `GET /` - Endpoint listing
///
/// ## Admin (session cookie required)
/// - `GET /api/data` - Subscriptions, profiles and settings
/// - `POST /api/misubs` - Replace subscriptions and profiles
/// - `GET /api/node-groups` - List node groups
/// - `POST /api/node-groups` - Create or update a node group
/// - `DELETE /api/node-groups?id=` - Delete a node group
///
/// Any other path, or a known path with an unsupported method, gets 404
/// unless `legacy_fallback` is set.
pub fn create_router<C, A>(state: GatewayState<C, A>) -> Router
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    // Extract config values before moving state
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout = state.config.request_timeout();

    let state = Arc::new(state);

    Router::new()
        .route("/", with_fallback(get(health::index)))
        .route("/health", with_fallback(get(health::health)))
        .route("/api/debug", with_fallback(get(health::debug::<C, A>)))
        // Session
        .route("/api/login", with_fallback(post(session::login::<C, A>)))
        .route("/api/logout", any(session::logout::<C, A>))
        // Subscription data
        .route("/api/data", with_fallback(get(data::get_data::<C, A>)))
        .route(
            "/api/misubs",
            with_fallback(post(data::save_misubs::<C, A>)),
        )
        // Node groups
        .route(
            "/api/node-groups",
            with_fallback(
                get(node_groups::list_node_groups::<C, A>)
                    .post(node_groups::upsert_node_group::<C, A>)
                    .delete(node_groups::delete_node_group::<C, A>),
            ),
        )
        .fallback(health::fallback::<C, A>)
        // Middleware
        .layer(TimeoutLayer::new(request_timeout))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CatchPanicLayer::custom(envelope::panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            envelope::cors_envelope::<C, A>,
        ))
        .with_state(state)
}

/// Route unsupported methods on a known path to the shared fallback.
fn with_fallback<C, A>(router: MethodRouter<Shared<C, A>>) -> MethodRouter<Shared<C, A>>
where
    C: AdminPlane + 'static,
    A: SessionAuthority + 'static,
{
    router.fallback(health::fallback::<C, A>)
}
