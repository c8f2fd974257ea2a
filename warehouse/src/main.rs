use clap::{Arg, Command};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let matches = Command::new("Warehouse Pipeline")
        .version("1.0")
        .about("Loads song and activity-log JSON files into the star schema")
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
    println!("Starting warehouse pipeline with config: {}", config_path);

    if let Err(e) = warehouse::run_warehouse_pipeline(config_path) {
        eprintln!("Warehouse pipeline error: {}", e);
        process::exit(1);
    }
}
