use aws_config::timeout::TimeoutConfig;
use tracing::{debug, info};

use crate::config::S3Config;

/// Build an AWS SDK configuration from an [`S3Config`].
///
/// Uses the standard environment credential chain. Applies the endpoint
/// override and per-operation timeout, and assumes `role_arn` via STS when
/// one is configured.
pub async fn build_sdk_config(config: &S3Config) -> aws_config::SdkConfig {
    let region = aws_config::Region::new(config.region.clone());
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(config.operation_timeout())
        .build();

    let mut loader = aws_config::from_env()
        .region(region.clone())
        .timeout_config(timeouts.clone());
    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom S3 endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    let Some(role_arn) = &config.role_arn else {
        return loader.load().await;
    };

    let session_name = config
        .session_name
        .as_deref()
        .unwrap_or("blobvault-s3-backend");
    info!(role_arn = %role_arn, session_name = %session_name, "assuming IAM role via STS");

    // The assume-role provider needs the base config for its own STS calls.
    let base_config = loader.load().await;
    let provider = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(region.clone())
        .configure(&base_config)
        .build()
        .await;

    let mut final_loader = aws_config::from_env()
        .region(region)
        .timeout_config(timeouts)
        .credentials_provider(provider);
    if let Some(endpoint) = &config.endpoint_url {
        final_loader = final_loader.endpoint_url(endpoint);
    }
    final_loader.load().await
}
