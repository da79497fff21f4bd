//! Lambda function collector.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_lambda as lambda;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::names::NameKind;
use super::super::regions::GLOBAL_REGION;

pub struct LambdaFunctionCollector;

#[async_trait]
impl Collector for LambdaFunctionCollector {
    fn name(&self) -> &'static str {
        "lambda-function"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Runtime", ColumnField::Attr("Runtime")),
            Column::new("MemoryMB", ColumnField::Attr("MemoryMB")),
            Column::new("TimeoutSec", ColumnField::Attr("TimeoutSec")),
            Column::new("Role", ColumnField::Attr("Role")),
            Column::new("Vpc", ColumnField::Attr("Vpc")),
            Column::new("LastModified", ColumnField::Attr("LastModified")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = lambda::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.list_functions().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("list_functions failed in {}", region))?
        {
            ctx.ensure_active()?;
            for function in page.functions.unwrap_or_default() {
                let name = function.function_name.clone().unwrap_or_default();

                let role = match function.role.as_deref() {
                    Some(role_arn) => ctx.names().resolve_global("iam-role", role_arn).await,
                    None => String::new(),
                };
                let vpc_id = function.vpc_config.as_ref().and_then(|v| v.vpc_id.as_deref());
                let vpc = ctx.names().resolve(region, NameKind::Vpc, vpc_id).await;

                let mut resource = Resource::new(self.name(), name, region)
                    .with_attr("Role", role)
                    .with_attr("Vpc", vpc);

                if let Some(arn) = function.function_arn {
                    resource = resource.with_arn(arn);
                }
                if let Some(runtime) = function.runtime {
                    resource = resource.with_attr("Runtime", runtime.as_str());
                }
                if let Some(memory) = function.memory_size {
                    resource = resource.with_attr("MemoryMB", memory.to_string());
                }
                if let Some(timeout) = function.timeout {
                    resource = resource.with_attr("TimeoutSec", timeout.to_string());
                }
                if let Some(last_modified) = function.last_modified {
                    resource = resource.with_attr("LastModified", last_modified);
                }

                resources.push(resource);
            }
        }

        Ok(resources)
    }
}
