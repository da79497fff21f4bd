//! Identifier to display-name resolution with per-run bulk caching.
//!
//! Looking up one name per identifier would cost one provider round-trip
//! per row. Instead, the first lookup for a (region, kind) pair triggers a
//! single bulk list call whose result is cached for the rest of the run;
//! every later lookup for that pair is served from memory. Concurrent
//! misses for the same pair are coalesced into one fetch, and a failed
//! fetch is not cached, so the next lookup retries.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use aws_sdk_ec2 as ec2;
use aws_sdk_iam as iam;
use aws_sdk_kms as kms;
use moka::future::Cache;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::arn::Arn;
use super::credentials::CredentialCoordinator;
use super::regions::GLOBAL_REGION;

/// Sentinel returned for empty identifiers.
pub const NOT_AVAILABLE: &str = "N/A";

/// Resource kinds with a bulk-listable identifier namespace per region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Vpc,
    Subnet,
    SecurityGroup,
    Image,
    KmsKey,
}

impl NameKind {
    /// Whether `id` has the shape this kind's identifiers take. Anything
    /// else is treated as already-resolved or foreign-format input.
    pub fn matches(&self, id: &str) -> bool {
        match self {
            NameKind::Vpc => id.starts_with("vpc-"),
            NameKind::Subnet => id.starts_with("subnet-"),
            NameKind::SecurityGroup => id.starts_with("sg-"),
            NameKind::Image => id.starts_with("ami-"),
            NameKind::KmsKey => {
                is_kms_key_id(id)
                    || id.starts_with("alias/")
                    || (id.starts_with("arn:") && id.contains(":kms:"))
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NameKind::Vpc => "vpc",
            NameKind::Subnet => "subnet",
            NameKind::SecurityGroup => "security-group",
            NameKind::Image => "image",
            NameKind::KmsKey => "kms-key",
        }
    }
}

/// Bare KMS key IDs are UUIDs.
fn is_kms_key_id(id: &str) -> bool {
    id.len() == 36
        && id.bytes().filter(|b| *b == b'-').count() == 4
        && id.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

/// Extract the `Name` tag value from an EC2-style tag list.
pub(crate) fn name_tag(tags: Option<&[ec2::types::Tag]>) -> Option<String> {
    tags?
        .iter()
        .find(|tag| tag.key.as_deref() == Some("Name"))
        .and_then(|tag| tag.value.clone())
}

/// Provider backend for the cache. Production uses [`SdkNameSource`];
/// tests inject counting fakes.
#[async_trait]
pub trait NameSource: Send + Sync {
    /// One bulk list call: every identifier of `kind` in `region`, mapped
    /// to its display name.
    async fn list_names(&self, region: &str, kind: NameKind) -> Result<HashMap<String, String>>;

    /// Single-identifier lookup for globally-scoped kinds that have no
    /// bulk-list endpoint.
    async fn lookup_global(&self, kind: &str, id: &str) -> Result<String>;
}

/// Per-run identifier -> display-name cache.
///
/// Regional kinds are cached as one map per (region, kind), populated by a
/// single bulk fetch. Globally-scoped kinds are cached one entry at a time
/// under a `kind:id` composite key.
pub struct NameResolutionCache {
    source: Arc<dyn NameSource>,
    regional: Cache<(String, NameKind), Arc<HashMap<String, String>>>,
    global: Cache<String, String>,
}

impl NameResolutionCache {
    pub fn new(source: Arc<dyn NameSource>) -> Self {
        Self {
            source,
            regional: Cache::new(1024),
            global: Cache::new(16_384),
        }
    }

    /// Resolve an identifier to its display name.
    ///
    /// Empty input resolves to [`NOT_AVAILABLE`]; input that does not match
    /// the kind's identifier shape, or is absent from the bulk result, is
    /// returned unchanged. A failed bulk fetch also falls back to the raw
    /// identifier and leaves the cache unpopulated.
    pub async fn resolve(&self, region: &str, kind: NameKind, id: Option<&str>) -> String {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return NOT_AVAILABLE.to_string(),
        };

        if !kind.matches(id) {
            return id.to_string();
        }

        let source = self.source.clone();
        let fetch_region = region.to_string();
        let lookup = self
            .regional
            .try_get_with((region.to_string(), kind), async move {
                debug!("bulk-listing {} names in {}", kind.label(), fetch_region);
                source.list_names(&fetch_region, kind).await.map(Arc::new)
            })
            .await;

        match lookup {
            Ok(names) => names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            Err(e) => {
                warn!("{} name lookup in {} failed: {}", kind.label(), region, e);
                id.to_string()
            }
        }
    }

    /// Resolve a globally-scoped identifier, fetching and caching one entry
    /// at a time.
    pub async fn resolve_global(&self, kind: &str, id: &str) -> String {
        if id.is_empty() {
            return NOT_AVAILABLE.to_string();
        }

        let source = self.source.clone();
        let fetch_kind = kind.to_string();
        let fetch_id = id.to_string();
        let lookup = self
            .global
            .try_get_with(format!("{}:{}", kind, id), async move {
                source.lookup_global(&fetch_kind, &fetch_id).await
            })
            .await;

        match lookup {
            Ok(name) => name,
            Err(e) => {
                warn!("global {} name lookup for {} failed: {}", kind, id, e);
                id.to_string()
            }
        }
    }
}

/// AWS-backed [`NameSource`].
pub struct SdkNameSource {
    credentials: Arc<CredentialCoordinator>,
}

impl SdkNameSource {
    pub fn new(credentials: Arc<CredentialCoordinator>) -> Self {
        Self { credentials }
    }
}

#[async_trait]
impl NameSource for SdkNameSource {
    async fn list_names(&self, region: &str, kind: NameKind) -> Result<HashMap<String, String>> {
        let config = self
            .credentials
            .create_aws_config_for_region(region)
            .await
            .with_context(|| format!("failed to create AWS config for region {}", region))?;

        match kind {
            NameKind::Vpc => vpc_names(&config).await,
            NameKind::Subnet => subnet_names(&config).await,
            NameKind::SecurityGroup => security_group_names(&config).await,
            NameKind::Image => image_names(&config).await,
            NameKind::KmsKey => kms_alias_names(&config).await,
        }
    }

    async fn lookup_global(&self, kind: &str, id: &str) -> Result<String> {
        let config = self
            .credentials
            .create_aws_config_for_region(GLOBAL_REGION)
            .await?;
        let client = iam::Client::new(&config);

        match kind {
            "iam-role" => {
                let role_name = short_iam_name(id)?;
                let response = client.get_role().role_name(&role_name).send().await?;
                let role = response.role.context("get_role returned no role")?;
                Ok(role.role_name)
            }
            "instance-profile" => {
                let profile_name = short_iam_name(id)?;
                let response = client
                    .get_instance_profile()
                    .instance_profile_name(&profile_name)
                    .send()
                    .await?;
                let profile = response
                    .instance_profile
                    .context("get_instance_profile returned no profile")?;
                Ok(profile.instance_profile_name)
            }
            other => bail!("unknown global name kind: {}", other),
        }
    }
}

/// IAM identifiers arrive as either a bare name or a full ARN whose
/// resource may carry a path (`role/path/Name`).
fn short_iam_name(id: &str) -> Result<String> {
    let name = if id.starts_with("arn:") {
        Arn::parse(id)?.resource
    } else {
        id.to_string()
    };
    Ok(name.rsplit('/').next().unwrap_or(&name).to_string())
}

async fn vpc_names(config: &aws_config::SdkConfig) -> Result<HashMap<String, String>> {
    let client = ec2::Client::new(config);
    let mut names = HashMap::new();

    let mut paginator = client.describe_vpcs().into_paginator().send();
    while let Some(page) = paginator.try_next().await? {
        for vpc in page.vpcs.unwrap_or_default() {
            if let Some(id) = &vpc.vpc_id {
                let name = name_tag(vpc.tags.as_deref()).unwrap_or_else(|| id.clone());
                names.insert(id.clone(), name);
            }
        }
    }

    Ok(names)
}

async fn subnet_names(config: &aws_config::SdkConfig) -> Result<HashMap<String, String>> {
    let client = ec2::Client::new(config);
    let mut names = HashMap::new();

    let mut paginator = client.describe_subnets().into_paginator().send();
    while let Some(page) = paginator.try_next().await? {
        for subnet in page.subnets.unwrap_or_default() {
            if let Some(id) = &subnet.subnet_id {
                let name = name_tag(subnet.tags.as_deref()).unwrap_or_else(|| id.clone());
                names.insert(id.clone(), name);
            }
        }
    }

    Ok(names)
}

async fn security_group_names(config: &aws_config::SdkConfig) -> Result<HashMap<String, String>> {
    let client = ec2::Client::new(config);
    let mut names = HashMap::new();

    let mut paginator = client.describe_security_groups().into_paginator().send();
    while let Some(page) = paginator.try_next().await? {
        for group in page.security_groups.unwrap_or_default() {
            if let (Some(id), Some(name)) = (group.group_id, group.group_name) {
                names.insert(id, name);
            }
        }
    }

    Ok(names)
}

async fn image_names(config: &aws_config::SdkConfig) -> Result<HashMap<String, String>> {
    let client = ec2::Client::new(config);
    let response = client.describe_images().owners("self").send().await?;

    let mut names = HashMap::new();
    for image in response.images.unwrap_or_default() {
        if let Some(id) = image.image_id {
            let name = image.name.unwrap_or_else(|| id.clone());
            names.insert(id, name);
        }
    }

    Ok(names)
}

/// KMS names are multi-keyed: one alias is cached under the key's short ID,
/// the key ARN, and the alias name itself, so any representation a caller
/// holds resolves identically.
async fn kms_alias_names(config: &aws_config::SdkConfig) -> Result<HashMap<String, String>> {
    let client = kms::Client::new(config);

    let mut key_arns: HashMap<String, String> = HashMap::new();
    let mut paginator = client.list_keys().into_paginator().send();
    while let Some(page) = paginator.try_next().await? {
        for key in page.keys.unwrap_or_default() {
            if let (Some(id), Some(arn)) = (key.key_id, key.key_arn) {
                key_arns.insert(id, arn);
            }
        }
    }

    let mut names = HashMap::new();
    let mut paginator = client.list_aliases().into_paginator().send();
    while let Some(page) = paginator.try_next().await? {
        for alias in page.aliases.unwrap_or_default() {
            let Some(alias_name) = alias.alias_name else {
                continue;
            };
            if let Some(key_id) = alias.target_key_id {
                if let Some(key_arn) = key_arns.get(&key_id) {
                    names.insert(key_arn.clone(), alias_name.clone());
                }
                names.insert(key_id, alias_name.clone());
            }
            names.insert(alias_name.clone(), alias_name);
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_shapes() {
        assert!(NameKind::Vpc.matches("vpc-0a1b2c3d"));
        assert!(!NameKind::Vpc.matches("subnet-0a1b2c3d"));
        assert!(NameKind::Subnet.matches("subnet-0a1b2c3d"));
        assert!(NameKind::SecurityGroup.matches("sg-0a1b2c3d"));
        assert!(NameKind::Image.matches("ami-0a1b2c3d"));
        assert!(!NameKind::Image.matches("my-golden-image"));
    }

    #[test]
    fn test_kms_identifier_shapes() {
        assert!(NameKind::KmsKey.matches("1234abcd-12ab-34cd-56ef-1234567890ab"));
        assert!(NameKind::KmsKey.matches("alias/my-key"));
        assert!(NameKind::KmsKey.matches(
            "arn:aws:kms:us-east-1:123456789012:key/1234abcd-12ab-34cd-56ef-1234567890ab"
        ));
        assert!(!NameKind::KmsKey.matches("not-a-key"));
        assert!(!NameKind::KmsKey.matches("1234abcd-12ab-34cd-56ef-1234567890az"));
    }

    #[test]
    fn test_short_iam_name() {
        assert_eq!(short_iam_name("deploy").unwrap(), "deploy");
        assert_eq!(
            short_iam_name("arn:aws:iam::123456789012:role/deploy").unwrap(),
            "deploy"
        );
        assert_eq!(
            short_iam_name("arn:aws:iam::123456789012:role/service/api/deploy").unwrap(),
            "deploy"
        );
    }

    #[test]
    fn test_name_tag_extraction() {
        let tags = vec![
            ec2::types::Tag::builder().key("env").value("prod").build(),
            ec2::types::Tag::builder().key("Name").value("core-vpc").build(),
        ];

        assert_eq!(name_tag(Some(&tags)), Some("core-vpc".to_string()));
        assert_eq!(name_tag(Some(&[])), None);
        assert_eq!(name_tag(None), None);
    }
}
