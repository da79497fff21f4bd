//! SNS topic collector.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_sns as sns;

use super::super::arn;
use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::regions::GLOBAL_REGION;

pub struct SnsTopicCollector;

#[async_trait]
impl Collector for SnsTopicCollector {
    fn name(&self) -> &'static str {
        "sns-topic"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = sns::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.list_topics().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("list_topics failed in {}", region))?
        {
            ctx.ensure_active()?;
            for topic in page.topics.unwrap_or_default() {
                let Some(topic_arn) = topic.topic_arn else {
                    continue;
                };

                let name = arn::resource_name(&topic_arn).unwrap_or_else(|_| topic_arn.clone());
                resources.push(Resource::new(self.name(), name, region).with_arn(topic_arn));
            }
        }

        Ok(resources)
    }
}
