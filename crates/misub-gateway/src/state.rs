//! Gateway application state.
//!
//! This module defines the shared state that is available to all request handlers.

use std::sync::Arc;

use misub_auth::SessionAuthority;
use misub_control::AdminPlane;

use crate::config::GatewayConfig;

/// Shared application state for the gateway.
///
/// This struct holds references to all services needed by the HTTP handlers.
pub struct GatewayState<C, A>
where
    C: AdminPlane,
    A: SessionAuthority,
{
    /// The control plane for subscription data and node groups.
    pub control: Arc<C>,
    /// Issues and checks admin sessions.
    pub sessions: Arc<A>,
    /// Gateway configuration.
    pub config: GatewayConfig,
    /// Where persistent data lives, if anywhere.
    pub kv_binding: Option<String>,
}

impl<C, A> GatewayState<C, A>
where
    C: AdminPlane,
    A: SessionAuthority,
{
    /// Create a new gateway state without a persistent key-value binding.
    #[must_use]
    pub fn new(control: Arc<C>, sessions: Arc<A>, config: GatewayConfig) -> Self {
        Self {
            control,
            sessions,
            config,
            kv_binding: None,
        }
    }

    /// Record the persistent storage location reported by the debug endpoint.
    #[must_use]
    pub fn with_kv_binding(mut self, binding: impl Into<String>) -> Self {
        self.kv_binding = Some(binding.into());
        self
    }
}

impl<C, A> Clone for GatewayState<C, A>
where
    C: AdminPlane,
    A: SessionAuthority,
{
    fn clone(&self) -> Self {
        Self {
            control: Arc::clone(&self.control),
            sessions: Arc::clone(&self.sessions),
            config: self.config.clone(),
            kv_binding: self.kv_binding.clone(),
        }
    }
}
