//! Errors that can occur while resolving a VID.
//!
//! Every variant here is transient: the caller may retry the lookup and
//! expect a fresh browser session. A selection the catalog has no vehicle
//! for is not an error; the resolver reports it as `Ok(None)`.

use thiserror::Error;

/// Errors from the browser session and resolution pipeline.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Failed to launch or connect to the browser.
    #[error("browser launch failed: {0}")]
    BrowserLaunch(String),

    /// Failed to navigate to the selection page.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Failed to read the identifier from the page.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The browser connection died mid-operation; the session has been
    /// dropped and the next acquire relaunches.
    #[error("browser connection lost: {0}")]
    ConnectionLost(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ResolveError::ConnectionLost("ws closed".to_string());
        assert!(err.to_string().contains("connection lost"));
        assert!(err.to_string().contains("ws closed"));
    }
}
