//! DynamoDB table collector.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb as dynamodb;
use tracing::debug;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::regions::GLOBAL_REGION;

pub struct DynamoDbTableCollector;

#[async_trait]
impl Collector for DynamoDbTableCollector {
    fn name(&self) -> &'static str {
        "dynamodb-table"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Status", ColumnField::Attr("Status")),
            Column::new("ItemCount", ColumnField::Attr("ItemCount")),
            Column::new("SizeBytes", ColumnField::Attr("SizeBytes")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = dynamodb::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.list_tables().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("list_tables failed in {}", region))?
        {
            ctx.ensure_active()?;
            for table_name in page.table_names.unwrap_or_default() {
                let mut resource = Resource::new(self.name(), table_name.clone(), region);

                // Table size and status only come from describe_table; a
                // failure there degrades to a name-only row.
                match client.describe_table().table_name(&table_name).send().await {
                    Ok(response) => {
                        if let Some(table) = response.table {
                            if let Some(arn) = table.table_arn {
                                resource = resource.with_arn(arn);
                            }
                            if let Some(status) = table.table_status {
                                resource = resource.with_attr("Status", status.as_str());
                            }
                            if let Some(item_count) = table.item_count {
                                resource = resource.with_attr("ItemCount", item_count.to_string());
                            }
                            if let Some(size) = table.table_size_bytes {
                                resource = resource.with_attr("SizeBytes", size.to_string());
                            }
                        }
                    }
                    Err(e) => {
                        debug!("describe_table failed for {} in {}: {}", table_name, region, e);
                    }
                }

                resources.push(resource);
            }
        }

        Ok(resources)
    }
}
