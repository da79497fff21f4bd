//! SQS queue collector.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_sqs as sqs;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::regions::GLOBAL_REGION;

pub struct SqsQueueCollector;

#[async_trait]
impl Collector for SqsQueueCollector {
    fn name(&self) -> &'static str {
        "sqs-queue"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("QueueUrl", ColumnField::Attr("QueueUrl")),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = sqs::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.list_queues().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("list_queues failed in {}", region))?
        {
            ctx.ensure_active()?;
            for queue_url in page.queue_urls.unwrap_or_default() {
                let name = queue_url
                    .rsplit('/')
                    .next()
                    .unwrap_or(&queue_url)
                    .to_string();

                resources.push(
                    Resource::new(self.name(), name, region).with_attr("QueueUrl", queue_url),
                );
            }
        }

        Ok(resources)
    }
}
