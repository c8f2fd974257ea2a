pub mod db;
pub mod loader;
pub mod schema;

use std::path::Path;

use tracing::info;

use common::Result;
use common::config::Settings;
use db::Warehouse;

/// Runs the complete row-wise pipeline: rebuilds the schema, then loads the
/// song catalog followed by the activity logs. The catalog must be in place
/// before the logs so songplays can resolve their dimension keys.
pub fn run_warehouse_pipeline(config_path: &str) -> Result<()> {
    let settings = Settings::new(config_path)?;
    let config = settings.warehouse;

    if let Some(parent) = Path::new(&config.db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Warehouse::open(&config.db_path)?;
    db.recreate_schema()?;
    info!("Rebuilt star schema at {}", config.db_path);

    loader::process_data(&db, Path::new(&config.song_data), loader::process_song_file)?;
    loader::process_data(&db, Path::new(&config.log_data), loader::process_log_file)?;

    info!(
        songs = db.count_rows("songs")?,
        artists = db.count_rows("artists")?,
        users = db.count_rows("users")?,
        time = db.count_rows("time")?,
        songplays = db.count_rows("songplays")?,
        "Warehouse load complete"
    );

    Ok(())
}
