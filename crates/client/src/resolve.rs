//! VID resolution against the catalog's selection page.
//!
//! A resolution navigates the shared browser to the selection URL built
//! from the vehicle attributes, waits for the hidden input that carries
//! the VID, and reads its value. The wait is an element-presence wait
//! with a timeout ceiling, never a fixed sleep; running out the ceiling
//! means the catalog has no matching vehicle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::error::CdpError;
use url::Url;

use vidlookup_core::{VehicleSelection, VidRecord};

use crate::error::ResolveError;
use crate::session::{SessionGuard, SessionManager, is_connection_error};

/// The hidden input on the selection page whose value is the VID.
const VID_INPUT_SELECTOR: &str = "input[type=hidden]";

/// Poll interval for the element-presence wait.
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Resolves a vehicle selection to a VID record.
#[async_trait]
pub trait VidResolver: Send + Sync {
    /// Resolve a selection against the catalog.
    ///
    /// `Ok(None)` means the catalog has no matching vehicle, a definitive
    /// outcome the caller must not retry. Errors are transient and worth
    /// retrying later.
    async fn resolve(&self, selection: &VehicleSelection) -> Result<Option<VidRecord>, ResolveError>;
}

/// Resolver that drives the shared headless browser against the catalog
/// site.
pub struct CatalogResolver {
    sessions: Arc<SessionManager>,
    base_url: String,
    wait_timeout: Duration,
}

impl CatalogResolver {
    pub fn new(sessions: Arc<SessionManager>, base_url: impl Into<String>, wait_timeout: Duration) -> Self {
        let base_url = base_url.into();
        Self { sessions, base_url: base_url.trim_end_matches('/').to_string(), wait_timeout }
    }

    /// Build the catalog selection URL: fixed product/archive parameters,
    /// the mandatory series, then each present optional attribute in
    /// fixed order (body, model, market, prod, engine, steering).
    pub fn selection_url(&self, selection: &VehicleSelection) -> Result<Url, ResolveError> {
        let mut url = Url::parse(&format!("{}/bmw/enUS/select", self.base_url))
            .map_err(|e| ResolveError::Navigation(format!("invalid catalog base url: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("product", "P");
            query.append_pair("archive", "0");
            query.append_pair("series", &selection.series);
            if let Some(body) = &selection.body {
                query.append_pair("body", body);
            }
            if let Some(model) = &selection.model {
                query.append_pair("model", model);
            }
            if let Some(market) = &selection.market {
                query.append_pair("market", market);
            }
            if let Some(production) = &selection.production {
                query.append_pair("prod", production);
            }
            if let Some(engine) = &selection.engine {
                query.append_pair("engine", engine);
            }
            if let Some(steering) = &selection.steering {
                query.append_pair("steering", steering);
            }
        }

        Ok(url)
    }

    /// Deep link into the catalog's part-group view for a resolved VID.
    pub(crate) fn partgrp_url(&self, vid: &str) -> String {
        format!("{}/bmw/enUS/partgrp?id={vid}", self.base_url)
    }

    /// Wait for the VID input to appear and read its value attribute.
    ///
    /// Polls element presence under the configured ceiling. Running out
    /// the ceiling yields `Ok(None)`; only CDP failures propagate.
    async fn wait_for_vid_input(&self, page: &Page) -> Result<Option<String>, CdpError> {
        let waited = tokio::time::timeout(self.wait_timeout, async {
            loop {
                match page.find_element(VID_INPUT_SELECTOR).await {
                    Ok(element) => return element.attribute("value").await,
                    Err(err) if is_connection_error(&err) => return Err(err),
                    // not present yet
                    Err(_) => {}
                }
                tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
            }
        })
        .await;

        match waited {
            Ok(result) => result,
            Err(_) => Ok(None),
        }
    }

    /// Translate a CDP failure, dropping the session when the connection
    /// itself is gone so the next acquire relaunches.
    async fn fail(
        &self, guard: SessionGuard<'_>, err: CdpError, wrap: fn(String) -> ResolveError,
    ) -> ResolveError {
        if is_connection_error(&err) {
            tracing::warn!(error = %err, "browser connection lost during resolution");
            guard.invalidate().await;
            return ResolveError::ConnectionLost(err.to_string());
        }
        wrap(err.to_string())
    }
}

#[async_trait]
impl VidResolver for CatalogResolver {
    async fn resolve(&self, selection: &VehicleSelection) -> Result<Option<VidRecord>, ResolveError> {
        let url = self.selection_url(selection)?;
        let guard = self.sessions.acquire().await?;

        tracing::info!(url = %url, "navigating catalog selection page");
        let page = match guard.browser().new_page(url.as_str()).await {
            Ok(page) => page,
            Err(err) => return Err(self.fail(guard, err, ResolveError::Navigation).await),
        };

        let vid = match self.wait_for_vid_input(&page).await {
            Ok(value) => value,
            Err(err) => {
                page.close().await.ok();
                return Err(self.fail(guard, err, ResolveError::Extraction).await);
            }
        };

        page.close().await.ok();
        drop(guard);

        let Some(vid) = vid.filter(|v| !v.is_empty()) else {
            tracing::info!(series = %selection.series, "no vid on selection page");
            return Ok(None);
        };

        tracing::info!(vid = %vid, series = %selection.series, "resolved vid");
        let now = chrono::Utc::now().to_rfc3339();
        Ok(Some(VidRecord {
            vid: vid.clone(),
            series: selection.series.clone(),
            body: selection.body.clone(),
            model: selection.model.clone(),
            market: selection.market.clone(),
            production: selection.production.clone(),
            engine: selection.engine.clone(),
            steering: selection.steering.clone(),
            url: self.partgrp_url(&vid),
            created_at: now.clone(),
            last_accessed: now,
        }))
    }
}
