//! Core types and shared functionality for vid-lookup.
//!
//! This crate provides:
//! - VID cache implementation with SQLite backend
//! - Vehicle selection model and lookup-key derivation
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheDb, CacheStats, VehicleSelection, VidRecord};
pub use config::AppConfig;
pub use error::Error;
