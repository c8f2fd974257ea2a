use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

use common::Result;
use common::model::{LogEvent, SongRecord};
use common::time::CalendarParts;

use crate::schema;

/// Row-wise access to the star schema over a single SQLite connection.
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        Ok(Self { conn })
    }

    /// Drops and recreates all five tables. Every run is a full rebuild.
    pub fn recreate_schema(&self) -> Result<()> {
        for stmt in schema::DROP_TABLES {
            self.conn.execute(stmt, [])?;
        }
        for stmt in schema::CREATE_TABLES {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Opens a transaction spanning one source file. There is no rollback
    /// beyond the current file; a crash mid-run leaves earlier files
    /// committed.
    pub fn begin(&self) -> Result<()> {
        self.conn.execute_batch("BEGIN;")?;
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    pub fn insert_song(&self, song: &SongRecord) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(schema::SONG_INSERT)?;
        stmt.execute(params![
            song.song_id,
            song.title,
            song.artist_id,
            song.year,
            song.duration,
        ])?;
        Ok(())
    }

    pub fn insert_artist(&self, song: &SongRecord) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(schema::ARTIST_INSERT)?;
        stmt.execute(params![
            song.artist_id,
            song.artist_name,
            song.artist_location,
            song.artist_latitude,
            song.artist_longitude,
        ])?;
        Ok(())
    }

    pub fn insert_time_row(&self, ts: i64) -> Result<()> {
        let parts = CalendarParts::from_epoch_ms(ts)?;
        let mut stmt = self.conn.prepare_cached(schema::TIME_INSERT)?;
        stmt.execute(params![
            ts,
            parts.hour,
            parts.day,
            parts.week,
            parts.month,
            parts.year,
            parts.weekday,
        ])?;
        Ok(())
    }

    pub fn upsert_user(&self, event: &LogEvent) -> Result<()> {
        let mut stmt = self.conn.prepare_cached(schema::USER_UPSERT)?;
        stmt.execute(params![
            event.user_id,
            event.first_name,
            event.last_name,
            event.gender,
            event.level,
            event.ts,
        ])?;
        Ok(())
    }

    /// Resolves a play event against the catalog. Returns the pair of
    /// dimension keys on an exact (title, artist name, duration) match,
    /// `None` otherwise.
    pub fn match_catalog(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<(String, String)>> {
        let mut stmt = self.conn.prepare_cached(schema::CATALOG_SELECT)?;
        let found = stmt
            .query_row(params![title, artist_name, duration], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()?;
        Ok(found)
    }

    /// Appends one fact row and returns its sequential surrogate id.
    pub fn insert_songplay(
        &self,
        event: &LogEvent,
        catalog_keys: Option<(String, String)>,
    ) -> Result<i64> {
        let (song_id, artist_id) = match catalog_keys {
            Some((s, a)) => (Some(s), Some(a)),
            None => (None, None),
        };
        let mut stmt = self.conn.prepare_cached(schema::SONGPLAY_INSERT)?;
        stmt.execute(params![
            event.ts,
            event.user_id,
            event.level,
            song_id,
            artist_id,
            event.session_id,
            event.location,
            event.user_agent,
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        // Table names come from our own schema constants, never user input.
        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
