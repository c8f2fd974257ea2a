use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::info;

use common::model::{LogEvent, SongRecord, read_ndjson};
use common::{Error, Result};

use crate::db::Warehouse;

/// Recursively collects every `*.json` file under `root`, sorted for a
/// deterministic processing order.
pub fn find_json_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_json_files(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_json_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "Source path '{}' is not a directory",
            dir.display()
        )));
    }
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_json_files(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    Ok(())
}

/// Loads one song-metadata file into the songs and artists dimensions.
pub fn process_song_file(db: &Warehouse, path: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    let songs: Vec<SongRecord> = read_ndjson(reader)?;

    for song in &songs {
        db.insert_song(song)?;
        db.insert_artist(song)?;
    }
    Ok(())
}

/// Loads one activity-log file into the time and users dimensions and the
/// songplays fact table. Only `NextSong` events are kept.
pub fn process_log_file(db: &Warehouse, path: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    let events: Vec<LogEvent> = read_ndjson(reader)?;

    for event in events.iter().filter(|e| e.is_next_song()) {
        db.insert_time_row(event.ts)?;
        db.upsert_user(event)?;

        let catalog_keys = match (&event.song, &event.artist, event.length) {
            (Some(song), Some(artist), Some(length)) => {
                db.match_catalog(song, artist, length)?
            }
            _ => None,
        };
        db.insert_songplay(event, catalog_keys)?;
    }
    Ok(())
}

/// Walks a source directory and processes each file inside its own
/// transaction, committing file by file. A malformed record aborts the run
/// with everything up to the previous file already committed.
pub fn process_data<F>(db: &Warehouse, root: &Path, process_file: F) -> Result<()>
where
    F: Fn(&Warehouse, &Path) -> Result<()>,
{
    let files = find_json_files(root)?;
    let num_files = files.len();
    info!("{} files found in {}", num_files, root.display());

    for (i, file) in files.iter().enumerate() {
        db.begin()?;
        process_file(db, file)?;
        db.commit()?;
        info!("{}/{} files processed.", i + 1, num_files);
    }

    Ok(())
}
