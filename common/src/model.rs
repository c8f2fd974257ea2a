use serde::Deserialize;
use std::io::BufRead;

use crate::Result;

/// One song-metadata record, one per source file.
///
/// All catalog identity fields are required; a record missing any of them
/// fails deserialization and aborts the row-wise load.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
    pub year: i32,
    pub duration: f64,
}

/// One raw user-action record from the activity logs.
///
/// Only `NextSong` events carry song/artist/length; navigation and auth
/// events leave them null and are filtered out before any table is touched.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub ts: i64,
    pub page: String,
    #[serde(default)]
    pub user_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    pub session_id: i64,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl LogEvent {
    /// The play filter: only song-playback events reach the star schema.
    pub fn is_next_song(&self) -> bool {
        self.page == "NextSong"
    }
}

/// Parses newline-delimited JSON, one record per line, skipping blanks.
/// Any malformed line is a hard error.
pub fn read_ndjson<T, R>(reader: R) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
    R: BufRead,
{
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}
