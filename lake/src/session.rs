use datafusion::execution::context::SessionContext;
use object_store::aws::AmazonS3Builder;
use std::sync::Arc;
use url::Url;

use common::config::LakeConfig;
use common::{Error, Result};

use crate::udf::register_udfs;

/// Builds the DataFusion session for one pipeline run.
///
/// When the input location is an `s3://` URL, the object store is built from
/// credentials passed in explicitly through the configuration and registered
/// on the runtime env. Nothing is read from ambient environment variables.
pub fn build_session(config: &LakeConfig) -> Result<SessionContext> {
    let ctx = SessionContext::new();
    register_udfs(&ctx)?;

    if config.input_path.starts_with("s3://") {
        let url = Url::parse(&config.input_path)?;
        let bucket = url
            .host_str()
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "S3 input path '{}' has no bucket name",
                    config.input_path
                ))
            })?
            .to_string();

        let credentials = config.s3.as_ref().ok_or_else(|| {
            Error::InvalidInput(format!(
                "Input path '{}' requires [lake.s3] credentials in the configuration",
                config.input_path
            ))
        })?;

        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&bucket)
            .with_region(&credentials.region)
            .with_access_key_id(&credentials.access_key)
            .with_secret_access_key(&credentials.secret_key);
        if !credentials.endpoint.is_empty() {
            builder = builder.with_endpoint(&credentials.endpoint).with_allow_http(true);
        }
        let store = Arc::new(builder.build()?);

        let store_url = Url::parse(&format!("s3://{}", bucket))?;
        ctx.runtime_env().register_object_store(&store_url, store);
    }

    Ok(ctx)
}
