pub mod catalog;
pub mod output;
pub mod plays;
pub mod session;
pub mod udf;

use tracing::info;

use common::Result;
use common::config::Settings;

/// Runs the complete columnar pipeline: songs and artists first, then users,
/// time and songplays. The songplay join reads the catalog back from the
/// Parquet output, so the ordering is a hard dependency.
pub async fn run_lake_pipeline(config_path: &str) -> Result<()> {
    let settings = Settings::new(config_path)?;
    let config = settings.lake;

    let ctx = session::build_session(&config)?;

    catalog::process_song_data(&ctx, &config.input_path, &config.output_path).await?;
    plays::process_log_data(&ctx, &config.input_path, &config.output_path).await?;

    info!(
        input = %config.input_path,
        output = %config.output_path,
        "Lake pipeline complete"
    );

    Ok(())
}
