//! lookup-vid endpoint: the end-to-end resolution policy.
//!
//! Cache first; on miss drive the resolver, persist what it found, and
//! report provenance so callers can tell a cached answer from a fresh
//! scrape.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use vidlookup_client::VidResolver;
use vidlookup_core::{CacheDb, VehicleSelection};

use crate::error::ApiError;
use crate::state::AppState;

/// Response payload for a resolved VID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidInfo {
    /// Complete VID string.
    pub vid: String,
    /// Series the VID was resolved for.
    pub series: String,
    /// Catalog deep link for the VID.
    pub url: String,
    /// Whether this came from the cache or a fresh resolution.
    pub cached: bool,
}

pub async fn lookup_handler(
    State(state): State<AppState>, Json(selection): Json<VehicleSelection>,
) -> Result<Json<VidInfo>, ApiError> {
    let info = lookup_impl(&state.db, state.resolver.as_ref(), &selection).await?;
    Ok(Json(info))
}

/// The resolution policy: cache, else resolver, else not-found.
pub async fn lookup_impl(
    db: &CacheDb, resolver: &dyn VidResolver, selection: &VehicleSelection,
) -> Result<VidInfo, ApiError> {
    if selection.series.trim().is_empty() {
        return Err(ApiError::Validation("series must not be empty".into()));
    }

    if let Some(record) = db.find_vid(selection).await {
        tracing::debug!(series = %selection.series, vid = %record.vid, "cache hit");
        return Ok(VidInfo { vid: record.vid, series: record.series, url: record.url, cached: true });
    }

    tracing::info!(series = %selection.series, "cache miss, resolving against catalog");
    let record = resolver.resolve(selection).await?.ok_or(ApiError::NotFound)?;

    // Persistence failure never fails the request; the answer is already
    // in hand.
    if let Err(err) = db.insert_vid(&record).await {
        tracing::warn!(error = %err, vid = %record.vid, "failed to persist resolved vid");
    }

    Ok(VidInfo { vid: record.vid, series: record.series, url: record.url, cached: false })
}
