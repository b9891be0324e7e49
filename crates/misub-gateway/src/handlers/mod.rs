//! HTTP request handlers.
//!
//! This module contains all the endpoint handlers for the gateway API.

pub mod data;
pub mod health;
pub mod node_groups;
pub mod session;
