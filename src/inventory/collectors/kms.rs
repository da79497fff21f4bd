//! KMS key collector.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_kms as kms;
use tracing::debug;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::names::NameKind;
use super::super::regions::GLOBAL_REGION;

pub struct KmsKeyCollector;

#[async_trait]
impl Collector for KmsKeyCollector {
    fn name(&self) -> &'static str {
        "kms-key"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("KeyId", ColumnField::Attr("KeyId")),
            Column::new("State", ColumnField::Attr("State")),
            Column::new("Usage", ColumnField::Attr("Usage")),
            Column::new("Created", ColumnField::Attr("Created")),
            Column::new("Description", ColumnField::Attr("Description")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = kms::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.list_keys().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("list_keys failed in {}", region))?
        {
            ctx.ensure_active()?;
            for key in page.keys.unwrap_or_default() {
                let Some(key_id) = key.key_id else {
                    continue;
                };

                // The alias doubles as the display name; keys without one
                // fall back to the raw key ID.
                let display_name = ctx
                    .names()
                    .resolve(region, NameKind::KmsKey, Some(&key_id))
                    .await;

                let mut resource = Resource::new(self.name(), display_name, region)
                    .with_attr("KeyId", key_id.clone());

                if let Some(arn) = key.key_arn {
                    resource = resource.with_arn(arn);
                }

                match client.describe_key().key_id(&key_id).send().await {
                    Ok(response) => {
                        if let Some(metadata) = response.key_metadata {
                            if let Some(state) = metadata.key_state {
                                resource = resource.with_attr("State", state.as_str());
                            }
                            if let Some(usage) = metadata.key_usage {
                                resource = resource.with_attr("Usage", usage.as_str());
                            }
                            if let Some(created) = metadata.creation_date {
                                resource = resource.with_attr("Created", created.to_string());
                            }
                            if let Some(description) = metadata.description {
                                resource = resource.with_attr("Description", description);
                            }
                        }
                    }
                    Err(e) => {
                        debug!("describe_key failed for {} in {}: {}", key_id, region, e);
                    }
                }

                resources.push(resource);
            }
        }

        Ok(resources)
    }
}
