//! Cache schema migrations.
//!
//! Applied versions are recorded in a `_migrations` table; on open, every
//! migration newer than the recorded maximum runs in order. The SQL lives
//! under `migrations/` and is embedded at compile time. Statements use
//! CREATE IF NOT EXISTS so replaying against an existing schema is safe.

use tokio_rusqlite::{Connection, params};

use super::Error;

const MIGRATIONS: &[(i64, &str)] = &[(1, include_str!("../../migrations/001_vid_cache.sql"))];

/// Bring the schema up to the latest version.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` when a migration's SQL fails to
/// execute, naming the version that broke.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let applied: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        for (version, sql) in MIGRATIONS.iter().copied().filter(|(v, _)| *v > applied) {
            tracing::debug!(version, "applying cache migration");
            conn.execute_batch(sql)
                .map_err(|e| Error::MigrationFailed(format!("version {version}: {e}")))?;
            conn.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![version, chrono::Utc::now().to_rfc3339()],
            )?;
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn table_exists(conn: &Connection, name: &str) -> bool {
        let name = name.to_string();
        conn.call(move |conn| {
            conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                params![name],
                |row| row.get(0),
            )
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_run_creates_schema() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        assert!(table_exists(&conn, "vid_cache").await);
        assert!(table_exists(&conn, "_migrations").await);
    }

    #[tokio::test]
    async fn test_rerun_applies_nothing_new() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let recorded: i64 = conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM _migrations", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(recorded, MIGRATIONS.len() as i64);
    }
}
