//! cache-stats endpoint.
//!
//! Reports how many VIDs are cached in total and per series.

use axum::Json;
use axum::extract::State;
use vidlookup_core::CacheStats;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<CacheStats>, ApiError> {
    let stats = state.db.stats().await?;
    Ok(Json(stats))
}

#[cfg(test)]
mod tests {
    use vidlookup_core::CacheDb;

    #[tokio::test]
    async fn test_stats_empty_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_cached, 0);
        assert!(stats.by_series.is_empty());
    }
}
