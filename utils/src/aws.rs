use crate::constants::{
    ASSUME_ROLE_SESSION_NAME, DEFAULT_ASSUME_ROLE_SESSION_DURATION, DEFAULT_REGION,
    MAX_RETRY_ATTEMPTS,
};
use crate::error::{self, Result};
use aws_config::default_provider::credentials::default_provider;
use aws_config::meta::region::RegionProviderChain;
use aws_config::sts::AssumeRoleProvider;
use aws_smithy_types::retry::{RetryConfig, RetryMode};
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::info;
use snafu::{OptionExt, ResultExt};
use std::time::Duration;

/// Set up the config for aws calls. The region is taken from `region` if provided, otherwise from
/// the environment, falling back to `DEFAULT_REGION`. If a role arn is provided, credentials from
/// the default chain are used to assume it.
pub async fn aws_config(
    region: &Option<String>,
    assume_role: &Option<String>,
    assume_role_session_duration: &Option<u64>,
) -> SdkConfig {
    let region = resolve_region(region).await;
    info!("Using region '{}' for the aws config.", region);

    let mut config_loader = aws_config::from_env().retry_config(
        RetryConfig::standard()
            .with_retry_mode(RetryMode::Adaptive)
            .with_max_attempts(MAX_RETRY_ATTEMPTS),
    );

    if let Some(role_arn) = assume_role {
        info!("Assuming role '{}'.", role_arn);
        let base_provider = default_provider().await;
        config_loader = config_loader.credentials_provider(
            AssumeRoleProvider::builder(role_arn)
                .region(region.clone())
                .session_name(ASSUME_ROLE_SESSION_NAME)
                .session_length(Duration::from_secs(
                    assume_role_session_duration.unwrap_or(DEFAULT_ASSUME_ROLE_SESSION_DURATION),
                ))
                .build(base_provider),
        );
    }

    config_loader.region(region).load().await
}

async fn resolve_region(region: &Option<String>) -> Region {
    RegionProviderChain::first_try(region.clone().map(Region::new))
        .or_default_provider()
        .region()
        .await
        .unwrap_or_else(|| Region::from_static(DEFAULT_REGION))
}

/// Returns the account id the config's credentials belong to. Used to log which account is about
/// to be cleaned before anything destructive happens.
pub async fn caller_account(config: &SdkConfig) -> Result<String> {
    let sts_client = aws_sdk_sts::Client::new(config);
    let identity = sts_client
        .get_caller_identity()
        .send()
        .await
        .context(error::CallerIdentitySnafu)?;
    identity
        .account()
        .map(String::from)
        .context(error::MissingSnafu {
            what: "account",
            from: "caller identity",
        })
}
