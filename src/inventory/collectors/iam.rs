//! IAM collectors: roles and users. Both are global categories.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_iam as iam;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::regions::GLOBAL_REGION;

pub struct IamRoleCollector;

#[async_trait]
impl Collector for IamRoleCollector {
    fn name(&self) -> &'static str {
        "iam-role"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Path", ColumnField::Attr("Path")),
            Column::new("Created", ColumnField::Attr("Created")),
            Column::new("MaxSessionSec", ColumnField::Attr("MaxSessionSec")),
            Column::new("Description", ColumnField::Attr("Description")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region != GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = iam::Client::new(&config);
        let mut resources = Vec::new();

        // IAM pagination is marker-based.
        let mut marker: Option<String> = None;
        loop {
            ctx.ensure_active()?;

            let mut request = client.list_roles().max_items(100);
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await.context("list_roles failed")?;

            for role in response.roles {
                let mut resource = Resource::new(self.name(), role.role_name, region)
                    .with_arn(role.arn)
                    .with_attr("Path", role.path)
                    .with_attr("Created", role.create_date.to_string());

                if let Some(max_session) = role.max_session_duration {
                    resource = resource.with_attr("MaxSessionSec", max_session.to_string());
                }
                if let Some(description) = role.description {
                    resource = resource.with_attr("Description", description);
                }

                resources.push(resource);
            }

            if response.is_truncated {
                marker = response.marker;
            } else {
                break;
            }
        }

        Ok(resources)
    }
}

pub struct IamUserCollector;

#[async_trait]
impl Collector for IamUserCollector {
    fn name(&self) -> &'static str {
        "iam-user"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("Path", ColumnField::Attr("Path")),
            Column::new("Created", ColumnField::Attr("Created")),
            Column::new("PasswordLastUsed", ColumnField::Attr("PasswordLastUsed")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region != GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = iam::Client::new(&config);
        let mut resources = Vec::new();

        let mut marker: Option<String> = None;
        loop {
            ctx.ensure_active()?;

            let mut request = client.list_users().max_items(100);
            if let Some(m) = &marker {
                request = request.marker(m);
            }
            let response = request.send().await.context("list_users failed")?;

            for user in response.users {
                let mut resource = Resource::new(self.name(), user.user_name, region)
                    .with_arn(user.arn)
                    .with_attr("Path", user.path)
                    .with_attr("Created", user.create_date.to_string());

                if let Some(last_used) = user.password_last_used {
                    resource = resource.with_attr("PasswordLastUsed", last_used.to_string());
                }

                resources.push(resource);
            }

            if response.is_truncated {
                marker = response.marker;
            } else {
                break;
            }
        }

        Ok(resources)
    }
}
