//! Client code for vid-lookup.
//!
//! This crate provides the shared headless-browser session and the VID
//! resolver that drives it against the catalog's selection page.

pub mod error;
pub mod resolve;
pub mod session;

pub use error::ResolveError;
pub use resolve::{CatalogResolver, VidResolver};
pub use session::{SessionConfig, SessionGuard, SessionManager};
