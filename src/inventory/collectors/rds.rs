//! RDS database instance collector.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_rds as rds;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::names::NameKind;
use super::super::regions::GLOBAL_REGION;

pub struct RdsInstanceCollector;

#[async_trait]
impl Collector for RdsInstanceCollector {
    fn name(&self) -> &'static str {
        "rds-instance"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Engine", ColumnField::Attr("Engine")),
            Column::new("EngineVersion", ColumnField::Attr("EngineVersion")),
            Column::new("Class", ColumnField::Attr("Class")),
            Column::new("Status", ColumnField::Attr("Status")),
            Column::new("StorageGiB", ColumnField::Attr("StorageGiB")),
            Column::new("Vpc", ColumnField::Attr("Vpc")),
            Column::new("SecurityGroups", ColumnField::Attr("SecurityGroups")),
            Column::new("KmsKey", ColumnField::Attr("KmsKey")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = rds::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.describe_db_instances().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("describe_db_instances failed in {}", region))?
        {
            ctx.ensure_active()?;
            for instance in page.db_instances.unwrap_or_default() {
                let name = instance.db_instance_identifier.clone().unwrap_or_default();

                let vpc_id = instance
                    .db_subnet_group
                    .as_ref()
                    .and_then(|g| g.vpc_id.as_deref());
                let vpc = ctx.names().resolve(region, NameKind::Vpc, vpc_id).await;

                let mut group_names = Vec::new();
                for membership in instance.vpc_security_groups.unwrap_or_default() {
                    let resolved = ctx
                        .names()
                        .resolve(
                            region,
                            NameKind::SecurityGroup,
                            membership.vpc_security_group_id.as_deref(),
                        )
                        .await;
                    group_names.push(resolved);
                }

                let kms_key = ctx
                    .names()
                    .resolve(region, NameKind::KmsKey, instance.kms_key_id.as_deref())
                    .await;

                let mut resource = Resource::new(self.name(), name, region)
                    .with_attr("Vpc", vpc)
                    .with_attr("SecurityGroups", group_names.join(", "))
                    .with_attr("KmsKey", kms_key);

                if let Some(arn) = instance.db_instance_arn {
                    resource = resource.with_arn(arn);
                }
                if let Some(engine) = instance.engine {
                    resource = resource.with_attr("Engine", engine);
                }
                if let Some(version) = instance.engine_version {
                    resource = resource.with_attr("EngineVersion", version);
                }
                if let Some(class) = instance.db_instance_class {
                    resource = resource.with_attr("Class", class);
                }
                if let Some(status) = instance.db_instance_status {
                    resource = resource.with_attr("Status", status);
                }
                if let Some(storage) = instance.allocated_storage {
                    resource = resource.with_attr("StorageGiB", storage.to_string());
                }

                resources.push(resource);
            }
        }

        Ok(resources)
    }
}
