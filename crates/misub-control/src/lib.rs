//! Control plane for the MiSub console server.
//!
//! This crate holds the business logic behind the admin API: loading and
//! saving subscription data, and the node group create/update/delete rules.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Gateway (HTTP)                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        AdminService                         │
//! │  ┌─────────────────────┐        ┌─────────────────────────┐ │
//! │  │  Subscription data  │        │  Node groups            │ │
//! │  │  (blind replace)    │        │  (validate + CAS retry) │ │
//! │  └─────────────────────┘        └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                     ┌─────────────────┐
//!                     │  KvStore        │
//!                     │  (RocksDB/mem)  │
//!                     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use misub_control::{AdminPlane, AdminService, NodeGroupInput};
//! use misub_store::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let control = AdminService::with_defaults(Arc::new(MemoryStore::new()));
//!
//! let input: NodeGroupInput = serde_json::from_value(serde_json::json!({
//!     "name": "Hong Kong",
//!     "nodeIds": ["node-1", "node-2"],
//! }))?;
//! let result = control.upsert_node_group(input).await?;
//!
//! println!("{}: {}", result.kind.message(), result.group.id);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Node group mutations read the collection with its version, apply the
//! change, and write back with compare-and-swap. A lost race reruns the
//! whole cycle on fresh data, up to [`ControlConfig::max_write_attempts`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod node_groups;
pub mod service;
pub mod types;

pub use error::{ControlError, Result};
pub use service::{AdminPlane, AdminService};
pub use types::{
    ControlConfig, DashboardData, NodeGroupDraft, NodeGroupInput, SaveMisubsRequest, UpsertKind,
    UpsertResult,
};

pub use misub_core::NodeGroupId;
pub use misub_store::NodeGroup;
