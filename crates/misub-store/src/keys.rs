//! Key names used in the key-value store.
//!
//! Each collection lives under a single key and is rewritten whole on every
//! write.

/// Ordered sequence of subscription records.
pub const SUBSCRIPTIONS: &str = "misub_subscriptions_v1";

/// Ordered sequence of profile records.
pub const PROFILES: &str = "misub_profiles_v1";

/// Worker settings mapping.
pub const WORKER_CONFIG: &str = "worker_config_v1";

/// Ordered sequence of node groups.
pub const NODE_GROUPS: &str = "misub_node_groups_v1";
