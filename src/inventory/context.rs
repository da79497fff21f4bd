//! Shared state threaded into every collection task.

use anyhow::{bail, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::credentials::CredentialCoordinator;
use super::names::NameResolutionCache;

/// Everything a collector needs besides its region: credentials, the name
/// cache, and the run's cancellation token.
pub struct CollectionContext {
    credentials: Arc<CredentialCoordinator>,
    names: NameResolutionCache,
    token: CancellationToken,
}

impl CollectionContext {
    pub fn new(
        credentials: Arc<CredentialCoordinator>,
        names: NameResolutionCache,
        token: CancellationToken,
    ) -> Self {
        Self {
            credentials,
            names,
            token,
        }
    }

    /// SDK config for a report region.
    pub async fn sdk_config(&self, region: &str) -> Result<aws_config::SdkConfig> {
        self.credentials.create_aws_config_for_region(region).await
    }

    pub fn names(&self) -> &NameResolutionCache {
        &self.names
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancellation checkpoint. Collectors call this between pagination
    /// pages; the scheduler forwards the token but never polls it.
    pub fn ensure_active(&self) -> Result<()> {
        if self.token.is_cancelled() {
            bail!("collection cancelled");
        }
        Ok(())
    }
}
