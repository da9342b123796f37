//! Shared headless-browser session management.
//!
//! The process owns at most one live browser at a time. `SessionManager`
//! holds it behind a mutex whose guard doubles as the navigation critical
//! section: whoever holds a `SessionGuard` is the only caller that can
//! navigate and read pages, so concurrent resolutions never observe each
//! other's page state.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use futures_util::StreamExt;
use tokio::sync::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::error::ResolveError;

/// Fixed Chromium launch arguments.
///
/// Stability flags for running unattended in containers; headless is the
/// builder default and sandboxing is disabled explicitly below.
const LAUNCH_ARGS: &[&str] = &[
    "--disable-background-networking",
    "--disable-background-timer-throttling",
    "--disable-breakpad",
    "--disable-default-apps",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--disable-hang-monitor",
    "--disable-popup-blocking",
    "--disable-sync",
    "--no-first-run",
    "--no-default-browser-check",
    "--mute-audio",
];

/// Launch configuration for the shared browser session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Ceiling for the browser process launch.
    pub launch_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { launch_timeout: Duration::from_secs(20) }
    }
}

/// A launched browser plus the task draining its CDP event stream.
struct LiveSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl LiveSession {
    async fn launch(config: &SessionConfig) -> Result<Self, ResolveError> {
        let browser_config = BrowserConfig::builder()
            .no_sandbox()
            .launch_timeout(config.launch_timeout)
            .args(LAUNCH_ARGS.iter().copied())
            .build()
            .map_err(ResolveError::BrowserLaunch)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ResolveError::BrowserLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler event error: {e}");
                    break;
                }
            }
        });

        Ok(Self { browser, handler_task })
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("browser close failed: {e}");
        }
        self.handler_task.abort();
    }
}

/// Owner of the process-wide browser session.
///
/// Two states: Disconnected (empty slot) and Connected (live session).
/// `acquire` transitions Disconnected to Connected by launching;
/// `SessionGuard::invalidate` and `release` transition back.
pub struct SessionManager {
    session: Mutex<Option<LiveSession>>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self { session: Mutex::new(None), config }
    }

    /// Acquire exclusive access to the shared browser, launching one when
    /// no live session exists.
    ///
    /// The returned guard holds the session lock for its lifetime; the
    /// holder performs navigation and extraction while no other caller
    /// can touch the browser.
    pub async fn acquire(&self) -> Result<SessionGuard<'_>, ResolveError> {
        let mut slot = self.session.lock().await;
        if slot.is_none() {
            tracing::info!("launching headless browser session");
            *slot = Some(LiveSession::launch(&self.config).await?);
        }
        Ok(SessionGuard { slot })
    }

    /// Whether a live session is currently held.
    pub async fn is_connected(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Terminate the session if one is live. Idempotent; the shutdown
    /// path calls this once the server stops accepting requests.
    pub async fn release(&self) {
        if let Some(live) = self.session.lock().await.take() {
            tracing::info!("closing headless browser session");
            live.close().await;
        }
    }
}

/// Exclusive handle to the live browser session.
///
/// Holding the guard is the navigation critical section; drop it as soon
/// as extraction is done.
pub struct SessionGuard<'a> {
    slot: MutexGuard<'a, Option<LiveSession>>,
}

impl SessionGuard<'_> {
    /// The live browser handle.
    pub fn browser(&self) -> &Browser {
        // acquire() never hands out a guard over an empty slot, and only
        // the consuming invalidate() empties it
        match self.slot.as_ref() {
            Some(live) => &live.browser,
            None => unreachable!("session guard over empty slot"),
        }
    }

    /// Drop the held session after a connection-class failure so the next
    /// `acquire` relaunches instead of reusing a dead browser.
    pub async fn invalidate(mut self) {
        if let Some(live) = self.slot.take() {
            tracing::warn!("dropping browser session after connection failure");
            live.close().await;
        }
    }
}

/// Whether a CDP error means the browser connection itself is gone, as
/// opposed to a page-level failure on a healthy session.
pub(crate) fn is_connection_error(err: &CdpError) -> bool {
    matches!(
        err,
        CdpError::Ws(_)
            | CdpError::Io(_)
            | CdpError::ChannelSendError(_)
            | CdpError::NoResponse
            | CdpError::LaunchExit(_, _)
            | CdpError::LaunchTimeout(_)
            | CdpError::LaunchIo(_, _)
    )
}
