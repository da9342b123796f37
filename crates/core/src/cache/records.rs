//! VID record CRUD operations.
//!
//! Provides partial-match lookup, idempotent insert, and cache statistics
//! for resolved VID records.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::selection::VehicleSelection;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A resolved VID together with the selection attributes it was resolved
/// from and the deep link derived from it.
///
/// Records are created once per distinct `vid` and never updated except
/// for `last_accessed`, which is bumped on every cache hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidRecord {
    pub vid: String,
    pub series: String,
    pub body: Option<String>,
    pub model: Option<String>,
    pub market: Option<String>,
    pub production: Option<String>,
    pub engine: Option<String>,
    pub steering: Option<String>,
    pub url: String,
    pub created_at: String,
    pub last_accessed: String,
}

/// Aggregate cache counts for the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_cached: i64,
    pub by_series: BTreeMap<String, i64>,
}

const RECORD_COLUMNS: &str = "id, vid, series, body, model, market, production_month, \
     engine_code, steering, url, created_at, last_accessed";

fn record_from_row(row: &rusqlite::Row<'_>) -> Result<(i64, VidRecord), rusqlite::Error> {
    Ok((
        row.get(0)?,
        VidRecord {
            vid: row.get(1)?,
            series: row.get(2)?,
            body: row.get(3)?,
            model: row.get(4)?,
            market: row.get(5)?,
            production: row.get(6)?,
            engine: row.get(7)?,
            steering: row.get(8)?,
            url: row.get(9)?,
            created_at: row.get(10)?,
            last_accessed: row.get(11)?,
        },
    ))
}

impl CacheDb {
    /// Look up a cached record matching the selection.
    ///
    /// Matches `series` exactly plus every present optional attribute;
    /// absent attributes don't constrain the lookup. An under-constrained
    /// selection that matches several rows returns an arbitrary one of
    /// them (first match wins). On hit, `last_accessed` is bumped to now.
    ///
    /// Storage errors are logged and degrade to a miss.
    pub async fn find_vid(&self, selection: &VehicleSelection) -> Option<VidRecord> {
        match self.try_find_vid(selection).await {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(error = %err, series = %selection.series, "cache lookup failed, treating as miss");
                None
            }
        }
    }

    async fn try_find_vid(&self, selection: &VehicleSelection) -> Result<Option<VidRecord>, Error> {
        let selection = selection.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<Option<VidRecord>, Error> {
                let mut sql = format!("SELECT {RECORD_COLUMNS} FROM vid_cache WHERE series = ?1");
                let mut values: Vec<String> = vec![selection.series.clone()];
                for (column, value) in selection.constraints() {
                    sql.push_str(&format!(" AND {column} = ?{}", values.len() + 1));
                    values.push(value.to_string());
                }
                sql.push_str(" LIMIT 1");

                let mut stmt = conn.prepare(&sql)?;
                let result = stmt.query_row(rusqlite::params_from_iter(values), record_from_row);

                match result {
                    Ok((id, mut record)) => {
                        conn.execute(
                            "UPDATE vid_cache SET last_accessed = ?1 WHERE id = ?2",
                            params![now, id],
                        )?;
                        record.last_accessed = now;
                        Ok(Some(record))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert a record keyed on `vid`, skipping when one already exists.
    ///
    /// Returns `true` when a new row was written. A duplicate `vid` is a
    /// no-op returning `Ok(false)`; the UNIQUE constraint backstops the
    /// pre-check if two inserts race. `created_at` and `last_accessed`
    /// are stamped at persistence time.
    pub async fn insert_vid(&self, record: &VidRecord) -> Result<bool, Error> {
        let record = record.clone();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM vid_cache WHERE vid = ?1)",
                    params![record.vid],
                    |row| row.get(0),
                )?;
                if exists {
                    tracing::debug!(vid = %record.vid, "vid already cached, skipping insert");
                    return Ok(false);
                }

                conn.execute(
                    "INSERT INTO vid_cache (
                        vid, series, body, model, market,
                        production_month, engine_code, steering, url,
                        created_at, last_accessed
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                    params![
                        record.vid,
                        record.series,
                        record.body,
                        record.model,
                        record.market,
                        record.production,
                        record.engine,
                        record.steering,
                        record.url,
                        now,
                        now,
                    ],
                )?;
                Ok(true)
            })
            .await
            .map_err(Error::from)
    }

    /// Aggregate counts: total cached records and a per-series breakdown.
    pub async fn stats(&self) -> Result<CacheStats, Error> {
        self.conn
            .call(|conn| -> Result<CacheStats, Error> {
                let total_cached: i64 =
                    conn.query_row("SELECT COUNT(*) FROM vid_cache", [], |row| row.get(0))?;

                let mut stmt = conn.prepare("SELECT series, COUNT(*) FROM vid_cache GROUP BY series")?;
                let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?;

                let mut by_series = BTreeMap::new();
                for row in rows {
                    let (series, count) = row?;
                    by_series.insert(series, count);
                }

                Ok(CacheStats { total_cached, by_series })
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn make_record(vid: &str, selection: &VehicleSelection) -> VidRecord {
        let now = chrono::Utc::now().to_rfc3339();
        VidRecord {
            vid: vid.to_string(),
            series: selection.series.clone(),
            body: selection.body.clone(),
            model: selection.model.clone(),
            market: selection.market.clone(),
            production: selection.production.clone(),
            engine: selection.engine.clone(),
            steering: selection.steering.clone(),
            url: format!("https://www.realoem.com/bmw/enUS/partgrp?id={vid}"),
            created_at: now.clone(),
            last_accessed: now,
        }
    }

    fn f22n_selection() -> VehicleSelection {
        VehicleSelection {
            series: "F22N".into(),
            body: Some("Cou".into()),
            model: Some("M240i".into()),
            production: Some("20181100".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_exact() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let selection = f22n_selection();
        let inserted = db.insert_vid(&make_record("V1", &selection)).await.unwrap();
        assert!(inserted);

        let found = db.find_vid(&selection).await.unwrap();
        assert_eq!(found.vid, "V1");
        assert_eq!(found.series, "F22N");
    }

    #[tokio::test]
    async fn test_insert_idempotent_on_vid() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let selection = f22n_selection();

        assert!(db.insert_vid(&make_record("V1", &selection)).await.unwrap());
        assert!(!db.insert_vid(&make_record("V1", &selection)).await.unwrap());

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_cached, 1);
    }

    #[tokio::test]
    async fn test_partial_match_ignores_absent_fields() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.insert_vid(&make_record("V1", &f22n_selection())).await.unwrap();

        // Omitting body/production must still match the stored record.
        let partial = VehicleSelection {
            series: "F22N".into(),
            model: Some("M240i".into()),
            ..Default::default()
        };
        let found = db.find_vid(&partial).await.unwrap();
        assert_eq!(found.vid, "V1");

        // A present attribute that disagrees must not match.
        let mismatched = VehicleSelection {
            series: "F22N".into(),
            model: Some("X".into()),
            ..Default::default()
        };
        assert!(db.find_vid(&mismatched).await.is_none());
    }

    #[tokio::test]
    async fn test_find_misses_other_series() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.insert_vid(&make_record("V1", &f22n_selection())).await.unwrap();

        let other = VehicleSelection { series: "F32N".into(), ..Default::default() };
        assert!(db.find_vid(&other).await.is_none());
    }

    #[tokio::test]
    async fn test_find_bumps_last_accessed() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.insert_vid(&make_record("V1", &f22n_selection())).await.unwrap();

        let first = db.find_vid(&f22n_selection()).await.unwrap();
        let second = db.find_vid(&f22n_selection()).await.unwrap();

        let t1 = DateTime::parse_from_rfc3339(&first.last_accessed).unwrap();
        let t2 = DateTime::parse_from_rfc3339(&second.last_accessed).unwrap();
        assert!(t2 >= t1);

        let created = DateTime::parse_from_rfc3339(&second.created_at).unwrap();
        assert!(t2 >= created);
    }

    #[tokio::test]
    async fn test_stats_by_series() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.insert_vid(&make_record("V1", &f22n_selection())).await.unwrap();

        let f32n = VehicleSelection {
            series: "F32N".into(),
            model: Some("440i".into()),
            ..Default::default()
        };
        db.insert_vid(&make_record("V2", &f32n)).await.unwrap();
        db.insert_vid(&make_record("V3", &VehicleSelection { series: "F32N".into(), ..Default::default() }))
            .await
            .unwrap();

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total_cached, 3);
        assert_eq!(stats.by_series.get("F22N"), Some(&1));
        assert_eq!(stats.by_series.get("F32N"), Some(&2));
    }
}
