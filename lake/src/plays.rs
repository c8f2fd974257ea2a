use datafusion::arrow::datatypes::DataType;
use datafusion::dataframe::DataFrameWriteOptions;
use datafusion::prelude::*;
use tracing::info;

use common::Result;

use crate::output::{data_glob, prepare_output_dir};

/// Activity-log layout: newline-delimited events sharded by year/month dirs.
pub const LOG_DATA_GLOB: &str = "log_data/*/*/*.json";

/// One row per user; the event with the greatest timestamp decides the
/// subscription level.
const USERS_QUERY: &str = r#"
SELECT user_id, first_name, last_name, gender, level
FROM (
    SELECT "userId" AS user_id,
           "firstName" AS first_name,
           "lastName" AS last_name,
           gender,
           level,
           row_number() OVER (PARTITION BY "userId" ORDER BY ts DESC) AS rn
    FROM play_events
) ranked
WHERE rn = 1
"#;

/// One row per distinct timestamp with its calendar components.
const TIME_QUERY: &str = r#"
SELECT DISTINCT
       event_start_time(ts) AS start_time,
       event_hour(ts) AS "hour",
       event_day(ts) AS "day",
       event_week(ts) AS "week",
       event_month(ts) AS "month",
       event_year(ts) AS "year",
       event_weekday(ts) AS "weekday"
FROM play_events
"#;

/// The fact table: play events resolved against the catalog by the
/// canonical (title, artist name, duration) predicate. Unmatched plays keep
/// null dimension keys on both sides.
const SONGPLAYS_QUERY: &str = r#"
SELECT row_number() OVER (ORDER BY e.ts) AS songplay_id,
       event_start_time(e.ts) AS start_time,
       e."userId" AS user_id,
       e.level,
       c.song_id,
       c.artist_id,
       e."sessionId" AS session_id,
       e.location,
       e."userAgent" AS user_agent,
       event_year(e.ts) AS "year",
       event_month(e.ts) AS "month"
FROM play_events e
LEFT JOIN (
    SELECT s.song_id, s.title, s.duration, a.artist_id, a.name AS artist_name
    FROM songs s
    JOIN artists a ON s.artist_id = a.artist_id
) c
ON e.song = c.title AND e.artist = c.artist_name AND e.length = c.duration
"#;

/// Builds the users and time dimensions and the songplays fact table from
/// the activity logs. Requires the songs and artists output of
/// [`crate::catalog::process_song_data`] to already be on disk: the catalog
/// is read back from Parquet for the songplay join.
pub async fn process_log_data(
    ctx: &SessionContext,
    input_path: &str,
    output_path: &str,
) -> Result<()> {
    let source = data_glob(input_path, LOG_DATA_GLOB);
    info!("Reading activity logs from {}", source);
    let df = ctx
        .read_json(source.as_str(), NdJsonReadOptions::default())
        .await?
        .filter(col("page").eq(lit("NextSong")))?;

    let _ = ctx.deregister_table("play_events");
    ctx.register_table("play_events", df.into_view())?;

    let users = ctx.sql(USERS_QUERY).await?;
    let users_dir = prepare_output_dir(output_path, "users")?;
    users
        .write_parquet(&users_dir, DataFrameWriteOptions::new(), None)
        .await?;
    info!("(1/3) users written to {}", users_dir);

    let time = ctx.sql(TIME_QUERY).await?;
    let time_dir = prepare_output_dir(output_path, "time")?;
    time.write_parquet(
        &time_dir,
        DataFrameWriteOptions::new()
            .with_partition_by(vec!["year".to_string(), "month".to_string()]),
        None,
    )
    .await?;
    info!("(2/3) time written to {}", time_dir);

    register_catalog_tables(ctx, output_path).await?;

    let songplays = ctx.sql(SONGPLAYS_QUERY).await?;
    let songplays_dir = prepare_output_dir(output_path, "songplays")?;
    songplays
        .write_parquet(
            &songplays_dir,
            DataFrameWriteOptions::new()
                .with_partition_by(vec!["year".to_string(), "month".to_string()]),
            None,
        )
        .await?;
    info!("(3/3) songplays written to {}", songplays_dir);

    Ok(())
}

/// Registers the persisted songs and artists Parquet output for the
/// songplay join. Partition columns are declared explicitly since hive-style
/// partition values live in the directory names, not the files.
async fn register_catalog_tables(ctx: &SessionContext, output_path: &str) -> Result<()> {
    let songs_path = format!("{}/songs", output_path.trim_end_matches('/'));
    let artists_path = format!("{}/artists", output_path.trim_end_matches('/'));

    let _ = ctx.deregister_table("songs");
    ctx.register_parquet(
        "songs",
        &songs_path,
        ParquetReadOptions::default().table_partition_cols(vec![
            ("year".to_string(), DataType::Int64),
            ("artist_id".to_string(), DataType::Utf8),
        ]),
    )
    .await?;

    let _ = ctx.deregister_table("artists");
    ctx.register_parquet("artists", &artists_path, ParquetReadOptions::default())
        .await?;

    Ok(())
}
