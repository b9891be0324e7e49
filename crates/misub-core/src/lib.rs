//! Core types for the MiSub console server.
//!
//! This crate provides the identifiers shared by the storage, control and
//! gateway crates.
//!
//! # Example
//!
//! ```
//! use misub_core::NodeGroupId;
//!
//! let generated = NodeGroupId::generate();
//! let parsed: NodeGroupId = "legacy-1718000000000".parse().unwrap();
//! assert_ne!(generated, parsed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{IdError, NodeGroupId};
