use datafusion::dataframe::DataFrameWriteOptions;
use datafusion::prelude::*;
use tracing::info;

use common::Result;

use crate::output::{data_glob, prepare_output_dir};

/// Song metadata layout: one record per file, three levels of sharding dirs.
pub const SONG_DATA_GLOB: &str = "song_data/*/*/*/*.json";

/// Builds the songs and artists dimensions from the song-metadata files and
/// writes them as Parquet, songs partitioned by (year, artist_id).
pub async fn process_song_data(
    ctx: &SessionContext,
    input_path: &str,
    output_path: &str,
) -> Result<()> {
    let source = data_glob(input_path, SONG_DATA_GLOB);
    info!("Reading song metadata from {}", source);
    let df = ctx
        .read_json(source.as_str(), NdJsonReadOptions::default())
        .await?;

    // Straight projection, unique by song_id.
    let songs = df.clone().distinct_on(
        vec![col("song_id")],
        vec![
            col("song_id"),
            col("title"),
            col("artist_id"),
            col("year"),
            col("duration"),
        ],
        None,
    )?;
    let songs_dir = prepare_output_dir(output_path, "songs")?;
    songs
        .write_parquet(
            &songs_dir,
            DataFrameWriteOptions::new()
                .with_partition_by(vec!["year".to_string(), "artist_id".to_string()]),
            None,
        )
        .await?;
    info!("(1/2) songs written to {}", songs_dir);

    // Straight projection, unique by artist_id.
    let artists = df.distinct_on(
        vec![col("artist_id")],
        vec![
            col("artist_id"),
            col("artist_name").alias("name"),
            col("artist_location").alias("location"),
            col("artist_latitude").alias("latitude"),
            col("artist_longitude").alias("longitude"),
        ],
        None,
    )?;
    let artists_dir = prepare_output_dir(output_path, "artists")?;
    artists
        .write_parquet(&artists_dir, DataFrameWriteOptions::new(), None)
        .await?;
    info!("(2/2) artists written to {}", artists_dir);

    Ok(())
}
