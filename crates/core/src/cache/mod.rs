//! SQLite-backed cache for resolved VIDs.
//!
//! This module provides a persistent lookup cache using SQLite with async
//! access via tokio-rusqlite. It supports:
//!
//! - Partial-match lookup on vehicle selection attributes
//! - Idempotent insert keyed on the catalog's VID
//! - Recency tracking on every cache hit
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod migrations;
pub mod records;
pub mod selection;

pub use crate::Error;

pub use connection::CacheDb;
pub use records::{CacheStats, VidRecord};
pub use selection::VehicleSelection;
