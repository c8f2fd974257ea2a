use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use datafusion::arrow::array::Array;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::util::display::array_value_to_string;
use datafusion::prelude::*;
use tempfile::TempDir;

use common::config::LakeConfig;
use lake::{catalog, plays, session};

const SONG_S1: &str = r#"{"song_id":"S1","title":"Test","artist_id":"A1","artist_name":"Band","artist_location":"Memphis, TN","artist_latitude":35.14968,"artist_longitude":-90.04892,"year":2000,"duration":180.0}"#;

const SONG_S2: &str = r#"{"song_id":"S2","title":"Other","artist_id":"A2","artist_name":"Solo","artist_location":null,"artist_latitude":null,"artist_longitude":null,"year":2005,"duration":95.5}"#;

const PLAY_MATCHING: &str = r#"{"artist":"Band","firstName":"Kaylee","gender":"F","lastName":"Summers","length":180.0,"level":"free","location":"X","page":"NextSong","sessionId":1,"song":"Test","ts":1541121934796,"userAgent":"Y","userId":"7"}"#;

const PLAY_UNMATCHED: &str = r#"{"artist":"Nobody","firstName":"Kaylee","gender":"F","lastName":"Summers","length":42.0,"level":"paid","location":"X","page":"NextSong","sessionId":2,"song":"Unknown","ts":1541300000000,"userAgent":"Y","userId":"7"}"#;

const NAVIGATION: &str = r#"{"artist":null,"firstName":"Kaylee","gender":"F","lastName":"Summers","length":null,"level":"paid","location":"X","page":"Home","sessionId":3,"song":null,"ts":1541300000001,"userAgent":"Y","userId":"7"}"#;

fn write_fixture(dir: &Path, rel: &str, contents: &str) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    writeln!(f, "{}", contents).unwrap();
}

async fn run_pipeline(tmp: &TempDir) -> LakeConfig {
    // One duplicated song file exercises the dedup rules.
    write_fixture(tmp.path(), "song_data/A/B/C/s1.json", SONG_S1);
    write_fixture(tmp.path(), "song_data/A/B/D/s1_dup.json", SONG_S1);
    write_fixture(tmp.path(), "song_data/D/E/F/s2.json", SONG_S2);
    write_fixture(
        tmp.path(),
        "log_data/2018/11/events.json",
        &format!("{}\n{}\n{}", PLAY_MATCHING, PLAY_UNMATCHED, NAVIGATION),
    );

    let config = LakeConfig {
        input_path: tmp.path().display().to_string(),
        output_path: tmp.path().join("results").display().to_string(),
        s3: None,
    };

    let ctx = session::build_session(&config).unwrap();
    catalog::process_song_data(&ctx, &config.input_path, &config.output_path)
        .await
        .unwrap();
    plays::process_log_data(&ctx, &config.input_path, &config.output_path)
        .await
        .unwrap();

    config
}

/// Registers the written Parquet output in a fresh session, declaring the
/// hive-style partition columns where relations are partitioned.
async fn verification_session(output: &str) -> SessionContext {
    let ctx = SessionContext::new();
    ctx.register_parquet(
        "songs",
        &format!("{}/songs", output),
        ParquetReadOptions::default().table_partition_cols(vec![
            ("year".to_string(), DataType::Int64),
            ("artist_id".to_string(), DataType::Utf8),
        ]),
    )
    .await
    .unwrap();
    ctx.register_parquet(
        "artists",
        &format!("{}/artists", output),
        ParquetReadOptions::default(),
    )
    .await
    .unwrap();
    ctx.register_parquet(
        "users",
        &format!("{}/users", output),
        ParquetReadOptions::default(),
    )
    .await
    .unwrap();
    ctx.register_parquet(
        "time_dim",
        &format!("{}/time", output),
        ParquetReadOptions::default().table_partition_cols(vec![
            ("year".to_string(), DataType::Int64),
            ("month".to_string(), DataType::Int64),
        ]),
    )
    .await
    .unwrap();
    ctx.register_parquet(
        "songplays",
        &format!("{}/songplays", output),
        ParquetReadOptions::default().table_partition_cols(vec![
            ("year".to_string(), DataType::Int64),
            ("month".to_string(), DataType::Int64),
        ]),
    )
    .await
    .unwrap();
    ctx
}

/// Collects a query result as displayable strings, `None` for nulls.
async fn query_rows(ctx: &SessionContext, sql: &str) -> Vec<Vec<Option<String>>> {
    let batches = ctx.sql(sql).await.unwrap().collect().await.unwrap();
    let mut rows = Vec::new();
    for batch in batches {
        for r in 0..batch.num_rows() {
            let mut row = Vec::new();
            for c in 0..batch.num_columns() {
                let column = batch.column(c);
                if column.is_null(r) {
                    row.push(None);
                } else {
                    row.push(Some(array_value_to_string(column, r).unwrap()));
                }
            }
            rows.push(row);
        }
    }
    rows
}

#[tokio::test]
async fn test_end_to_end_lake_build() {
    let tmp = TempDir::new().unwrap();
    let config = run_pipeline(&tmp).await;
    let ctx = verification_session(&config.output_path).await;

    // Dimensions are unique by their keys despite the duplicated source file.
    for (table, expected) in [
        ("songs", "2"),
        ("artists", "2"),
        ("users", "1"),
        ("time_dim", "2"),
        ("songplays", "2"),
    ] {
        let rows = query_rows(&ctx, &format!("SELECT COUNT(*) FROM {}", table)).await;
        assert_eq!(rows[0], vec![Some(expected.to_string())], "{}", table);
    }

    // The matched play carries the catalog keys, the unmatched one nulls.
    let rows = query_rows(
        &ctx,
        "SELECT song_id, artist_id FROM songplays ORDER BY session_id",
    )
    .await;
    assert_eq!(rows[0], vec![Some("S1".to_string()), Some("A1".to_string())]);
    assert_eq!(rows[1], vec![None, None]);

    // The later event's level wins for the user dimension.
    let rows = query_rows(&ctx, "SELECT user_id, level FROM users").await;
    assert_eq!(rows[0], vec![Some("7".to_string()), Some("paid".to_string())]);

    // Calendar fields of the matched play's timestamp.
    let rows = query_rows(
        &ctx,
        "SELECT \"hour\", \"day\", \"week\", \"month\", \"year\", \"weekday\"
         FROM time_dim WHERE \"day\" = 2",
    )
    .await;
    assert_eq!(
        rows[0],
        vec![
            Some("1".to_string()),
            Some("2".to_string()),
            Some("44".to_string()),
            Some("11".to_string()),
            Some("2018".to_string()),
            Some("4".to_string()),
        ]
    );

    // Songplay ids are assigned deterministically in timestamp order.
    let rows = query_rows(
        &ctx,
        "SELECT songplay_id FROM songplays ORDER BY session_id",
    )
    .await;
    assert_eq!(rows[0], vec![Some("1".to_string())]);
    assert_eq!(rows[1], vec![Some("2".to_string())]);

    // Every songplay timestamp exists in the time dimension.
    let rows = query_rows(
        &ctx,
        "SELECT COUNT(*) FROM songplays p LEFT JOIN time_dim t
         ON p.start_time = t.start_time WHERE t.start_time IS NULL",
    )
    .await;
    assert_eq!(rows[0], vec![Some("0".to_string())]);
}

#[tokio::test]
async fn test_rerun_overwrites_previous_output() {
    let tmp = TempDir::new().unwrap();
    let config = run_pipeline(&tmp).await;

    // Run again over the same input; the output must be replaced, not grown.
    let ctx = session::build_session(&config).unwrap();
    catalog::process_song_data(&ctx, &config.input_path, &config.output_path)
        .await
        .unwrap();
    plays::process_log_data(&ctx, &config.input_path, &config.output_path)
        .await
        .unwrap();

    let verify = verification_session(&config.output_path).await;
    let rows = query_rows(&verify, "SELECT COUNT(*) FROM songplays").await;
    assert_eq!(rows[0], vec![Some("2".to_string())]);
    let rows = query_rows(&verify, "SELECT COUNT(*) FROM songs").await;
    assert_eq!(rows[0], vec![Some("2".to_string())]);
}
