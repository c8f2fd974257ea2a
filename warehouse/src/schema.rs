//! DDL and statement text for the five star-schema tables.
//!
//! Every run is a full rebuild: tables are dropped and recreated before any
//! file is processed.

pub const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS songplays;",
    "DROP TABLE IF EXISTS users;",
    "DROP TABLE IF EXISTS time;",
    "DROP TABLE IF EXISTS songs;",
    "DROP TABLE IF EXISTS artists;",
];

pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE songs (
        song_id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        artist_id TEXT NOT NULL,
        year INTEGER NOT NULL,
        duration REAL NOT NULL
    );",
    "CREATE TABLE artists (
        artist_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        location TEXT,
        latitude REAL,
        longitude REAL
    );",
    // last_event_ts backs the timestamp-max resolution of `level` across
    // per-file commits; it is not part of the dimensional surface.
    "CREATE TABLE users (
        user_id TEXT PRIMARY KEY,
        first_name TEXT,
        last_name TEXT,
        gender TEXT,
        level TEXT NOT NULL,
        last_event_ts INTEGER NOT NULL
    );",
    "CREATE TABLE time (
        start_time INTEGER PRIMARY KEY,
        hour INTEGER NOT NULL,
        day INTEGER NOT NULL,
        week INTEGER NOT NULL,
        month INTEGER NOT NULL,
        year INTEGER NOT NULL,
        weekday INTEGER NOT NULL
    );",
    "CREATE TABLE songplays (
        songplay_id INTEGER PRIMARY KEY AUTOINCREMENT,
        start_time INTEGER NOT NULL REFERENCES time (start_time),
        user_id TEXT NOT NULL,
        level TEXT NOT NULL,
        song_id TEXT REFERENCES songs (song_id),
        artist_id TEXT REFERENCES artists (artist_id),
        session_id INTEGER NOT NULL,
        location TEXT,
        user_agent TEXT
    );",
];

pub const SONG_INSERT: &str = "INSERT INTO songs (song_id, title, artist_id, year, duration)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (song_id) DO NOTHING;";

pub const ARTIST_INSERT: &str = "INSERT INTO artists (artist_id, name, location, latitude, longitude)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT (artist_id) DO NOTHING;";

pub const TIME_INSERT: &str = "INSERT INTO time (start_time, hour, day, week, month, year, weekday)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    ON CONFLICT (start_time) DO NOTHING;";

// Latest event wins, resolved by timestamp rather than insert order.
pub const USER_UPSERT: &str = "INSERT INTO users (user_id, first_name, last_name, gender, level, last_event_ts)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT (user_id) DO UPDATE SET
        first_name = excluded.first_name,
        last_name = excluded.last_name,
        gender = excluded.gender,
        level = excluded.level,
        last_event_ts = excluded.last_event_ts
    WHERE excluded.last_event_ts >= users.last_event_ts;";

pub const SONGPLAY_INSERT: &str = "INSERT INTO songplays
    (start_time, user_id, level, song_id, artist_id, session_id, location, user_agent)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);";

// Canonical catalog match: title, artist name and duration must all agree.
pub const CATALOG_SELECT: &str = "SELECT s.song_id, a.artist_id
    FROM songs s
    JOIN artists a ON s.artist_id = a.artist_id
    WHERE s.title = ?1 AND a.name = ?2 AND s.duration = ?3;";
