//! Kitsu API client implementation.
//!
//! This module provides the transport client for the Kitsu JSON:API endpoints
//! and the wire types it returns.

pub mod client;
pub mod types;

pub use client::{KitsuClient, TransportError, TransportResponse};
pub use types::*;
