//! Persistent hall of fame using SQLite (rusqlite)
//!
//! The database lives in the OS-standard data directory. A missing or broken
//! database never stops a game: the caller falls back to an in-memory table,
//! which simply starts with an empty history.

use rusqlite::{params, Connection};
use thiserror::Error;

/// Current schema version. Bump this when making schema changes.
const SCHEMA_VERSION: u32 = 1;

/// Entries shown on the hall of fame screen
pub const HALL_SIZE: usize = 10;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("could not determine data directory")]
    NoDataDirectory,
    #[error("database schema version {found} is newer than supported version {supported}")]
    FutureSchemaVersion { found: u32, supported: u32 },
    #[error("failed to create data directory: {0}")]
    CreateDirFailed(std::io::Error),
}

/// One line of the hall of fame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighScore {
    pub name: String,
    pub score: i64,
}

pub struct HallOfFame {
    conn: Connection,
}

impl HallOfFame {
    /// Open or create the database under the data directory
    pub fn open() -> Result<Self, StorageError> {
        let data_dir = crate::data_dir().ok_or(StorageError::NoDataDirectory)?;
        std::fs::create_dir_all(&data_dir).map_err(StorageError::CreateDirFailed)?;

        let conn = Connection::open(data_dir.join("buzzboard.db"))?;
        let hall = HallOfFame { conn };
        hall.initialize_schema()?;
        Ok(hall)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let hall = HallOfFame {
            conn: Connection::open_in_memory()?,
        };
        hall.initialize_schema()?;
        Ok(hall)
    }

    /// The on-disk table, or an empty in-memory one if that fails
    pub fn open_or_memory() -> Result<Self, StorageError> {
        match Self::open() {
            Ok(hall) => Ok(hall),
            Err(e) => {
                tracing::warn!(error = %e, "hall of fame unavailable, scores will not persist");
                Self::open_in_memory()
            }
        }
    }

    /// Best `limit` scores, highest first; ties keep insertion order
    pub fn top(&self, limit: usize) -> Result<Vec<HighScore>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, score FROM hall_of_fame ORDER BY score DESC, id ASC LIMIT ?1")?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(HighScore {
                name: row.get(0)?,
                score: row.get(1)?,
            })
        })?;

        let mut scores = Vec::new();
        for row in rows {
            scores.push(row?);
        }
        Ok(scores)
    }

    /// Append an entry and return its zero-based place in the sorted list
    pub fn record(&self, name: &str, score: i64) -> Result<usize, StorageError> {
        let created_at = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        self.conn.execute(
            "INSERT INTO hall_of_fame (name, score, created_at) VALUES (?1, ?2, ?3)",
            params![name, score, created_at],
        )?;
        let id = self.conn.last_insert_rowid();

        // Earlier entries with an equal score stay ahead
        let place: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM hall_of_fame WHERE score > ?1 OR (score = ?1 AND id < ?2)",
            params![score, id],
            |row| row.get(0),
        )?;
        tracing::info!(%name, score, place, "hall of fame entry");
        Ok(place as usize)
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM hall_of_fame", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        let current_version = self.get_schema_version()?;

        if current_version == 0 {
            self.create_schema()?;
        } else if current_version > SCHEMA_VERSION {
            return Err(StorageError::FutureSchemaVersion {
                found: current_version,
                supported: SCHEMA_VERSION,
            });
        }

        Ok(())
    }

    fn get_schema_version(&self) -> Result<u32, StorageError> {
        let table_exists: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='meta'",
            [],
            |row| row.get(0),
        )?;

        if !table_exists {
            return Ok(0);
        }

        let version: u32 = self
            .conn
            .query_row("SELECT schema_version FROM meta LIMIT 1", [], |row| row.get(0))
            .unwrap_or(0);

        Ok(version)
    }

    fn create_schema(&self) -> Result<(), StorageError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS meta (
                schema_version INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS hall_of_fame (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                score INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_hall_score ON hall_of_fame (score DESC);
            "#,
        )?;

        self.conn.execute("DELETE FROM meta", [])?;
        self.conn
            .execute("INSERT INTO meta (schema_version) VALUES (?1)", params![SCHEMA_VERSION])?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let hall = HallOfFame::open_in_memory().unwrap();
        assert!(hall.is_empty().unwrap());
        assert!(hall.top(HALL_SIZE).unwrap().is_empty());
    }

    #[test]
    fn test_record_keeps_list_sorted() {
        let hall = HallOfFame::open_in_memory().unwrap();
        assert_eq!(hall.record("Ken", 12000).unwrap(), 0);
        assert_eq!(hall.record("Brad", 18400).unwrap(), 0);
        assert_eq!(hall.record("James", 9600).unwrap(), 2);

        let top = hall.top(HALL_SIZE).unwrap();
        let names: Vec<&str> = top.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Brad", "Ken", "James"]);
    }

    #[test]
    fn test_equal_score_goes_after_existing() {
        let hall = HallOfFame::open_in_memory().unwrap();
        hall.record("Amy", 5000).unwrap();
        assert_eq!(hall.record("Matt", 5000).unwrap(), 1);
        assert_eq!(hall.top(1).unwrap()[0].name, "Amy");
    }

    #[test]
    fn test_top_respects_limit() {
        let hall = HallOfFame::open_in_memory().unwrap();
        for i in 0..15 {
            hall.record(&format!("P{}", i), i * 100).unwrap();
        }
        assert_eq!(hall.len().unwrap(), 15);
        let top = hall.top(HALL_SIZE).unwrap();
        assert_eq!(top.len(), HALL_SIZE);
        assert_eq!(top[0].score, 1400);
    }

    #[test]
    fn test_schema_version_is_current() {
        let hall = HallOfFame::open_in_memory().unwrap();
        assert_eq!(hall.get_schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_future_schema_rejected() {
        let hall = HallOfFame::open_in_memory().unwrap();
        hall.conn
            .execute("UPDATE meta SET schema_version = ?1", params![SCHEMA_VERSION + 1])
            .unwrap();
        assert!(matches!(
            hall.initialize_schema(),
            Err(StorageError::FutureSchemaVersion { .. })
        ));
    }
}
