//! S3 bucket collector. Buckets are account-wide, so this is a global
//! category.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3 as s3;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::regions::GLOBAL_REGION;

pub struct S3BucketCollector;

#[async_trait]
impl Collector for S3BucketCollector {
    fn name(&self) -> &'static str {
        "s3-bucket"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Arn", ColumnField::Arn),
            Column::new("CreationDate", ColumnField::Attr("CreationDate")),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region != GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = s3::Client::new(&config);
        let response = client
            .list_buckets()
            .send()
            .await
            .context("list_buckets failed")?;

        let mut resources = Vec::new();
        for bucket in response.buckets.unwrap_or_default() {
            let Some(bucket_name) = bucket.name else {
                continue;
            };

            let mut resource = Resource::new(self.name(), bucket_name.clone(), region)
                .with_arn(format!("arn:aws:s3:::{}", bucket_name));

            if let Some(creation_date) = bucket.creation_date {
                resource = resource.with_attr("CreationDate", creation_date.to_string());
            }

            resources.push(resource);
        }

        Ok(resources)
    }
}
