use config::{Config, ConfigError};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_warehouse_config")]
    pub warehouse: WarehouseConfig,
    #[serde(default = "default_lake_config")]
    pub lake: LakeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WarehouseConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_song_data")]
    pub song_data: String,
    #[serde(default = "default_log_data")]
    pub log_data: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LakeConfig {
    #[serde(default = "default_input_path")]
    pub input_path: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    pub s3: Option<S3Credentials>,
}

/// Explicit object-store credentials, injected into the DataFusion
/// session rather than read from ambient environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Credentials {
    pub access_key: String,
    pub secret_key: String,
    #[serde(default = "default_s3_region")]
    pub region: String,
    #[serde(default)]
    pub endpoint: String,
}

fn default_warehouse_config() -> WarehouseConfig {
    WarehouseConfig {
        db_path: default_db_path(),
        song_data: default_song_data(),
        log_data: default_log_data(),
    }
}

fn default_lake_config() -> LakeConfig {
    LakeConfig {
        input_path: default_input_path(),
        output_path: default_output_path(),
        s3: None,
    }
}

fn default_db_path() -> String {
    "data/warehouse.db".to_string()
}

fn default_song_data() -> String {
    "data/song_data".to_string()
}

fn default_log_data() -> String {
    "data/log_data".to_string()
}

fn default_input_path() -> String {
    "data".to_string()
}

fn default_output_path() -> String {
    "results".to_string()
}

fn default_s3_region() -> String {
    "us-east-1".to_string()
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        // Build the configuration
        let config = builder.build()?;

        // Try to deserialize the entire configuration
        let settings: Settings = config.try_deserialize()?;

        debug!(
            warehouse = ?settings.warehouse,
            lake_input = %settings.lake.input_path,
            lake_output = %settings.lake.output_path,
            "Loaded pipeline settings"
        );

        Ok(settings)
    }
}
