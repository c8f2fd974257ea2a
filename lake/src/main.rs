use clap::{Arg, Command};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let matches = Command::new("Lake Pipeline")
        .version("1.0")
        .about("Builds partitioned Parquet star-schema tables from raw JSON")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom config file"),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/pipeline.toml");
    println!("Starting lake pipeline with config: {}", config_path);

    if let Err(e) = lake::run_lake_pipeline(config_path).await {
        eprintln!("Lake pipeline error: {}", e);
        process::exit(1);
    }
}
