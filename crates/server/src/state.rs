//! Shared state for the HTTP handlers.

use std::sync::Arc;

use vidlookup_client::VidResolver;
use vidlookup_core::CacheDb;

/// State injected into every route handler.
///
/// The resolver is held as a trait object so tests can substitute a fake
/// that never touches a browser.
#[derive(Clone)]
pub struct AppState {
    pub db: CacheDb,
    pub resolver: Arc<dyn VidResolver>,
}
