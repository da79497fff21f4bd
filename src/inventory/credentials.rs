//! Per-region AWS SDK configuration.
//!
//! Configs come from the default provider chain (environment, shared
//! config/credentials files, IMDS) and are built once per API region, then
//! reused for every client in the run.

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_sts as sts;
use aws_types::region::Region;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::regions;

pub struct CredentialCoordinator {
    profile: Option<String>,
    configs: Mutex<HashMap<String, aws_config::SdkConfig>>,
}

impl CredentialCoordinator {
    pub fn new(profile: Option<String>) -> Self {
        Self {
            profile,
            configs: Mutex::new(HashMap::new()),
        }
    }

    /// SDK config for a report region. The global pseudo-region maps to its
    /// fixed API region.
    pub async fn create_aws_config_for_region(&self, region: &str) -> Result<aws_config::SdkConfig> {
        let api_region = regions::api_region(region);

        if let Some(config) = self.configs.lock().await.get(api_region) {
            return Ok(config.clone());
        }

        debug!("loading AWS config for region {}", api_region);
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(api_region.to_string()));
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        self.configs
            .lock()
            .await
            .insert(api_region.to_string(), config.clone());
        Ok(config)
    }

    /// Validate credentials before any collection is scheduled. Returns the
    /// caller's account ID.
    pub async fn preflight(&self) -> Result<String> {
        let config = self
            .create_aws_config_for_region(regions::GLOBAL_REGION)
            .await?;
        let client = sts::Client::new(&config);

        let identity = client
            .get_caller_identity()
            .send()
            .await
            .context("unable to validate AWS credentials")?;

        let account_id = identity.account().unwrap_or("unknown").to_string();
        info!(
            "collecting as {} (account {})",
            identity.arn().unwrap_or("unknown"),
            account_id
        );
        Ok(account_id)
    }
}
