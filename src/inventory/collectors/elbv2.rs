//! Load balancer collector.
//!
//! Emits one parent row per load balancer followed by one child row per
//! listener, using the first sub-category label to mark the hierarchy.
//! Provider ordering keeps parent and child rows adjacent, so this
//! category opts out of aggregator sorting.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_elasticloadbalancingv2 as elbv2;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::names::NameKind;
use super::super::regions::GLOBAL_REGION;

pub struct LoadBalancerCollector;

#[async_trait]
impl Collector for LoadBalancerCollector {
    fn name(&self) -> &'static str {
        "load-balancer"
    }

    fn should_sort(&self) -> bool {
        false
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Kind", ColumnField::SubCategory(0)),
            Column::new("Region", ColumnField::Region),
            Column::new("Type", ColumnField::Attr("Type")),
            Column::new("Scheme", ColumnField::Attr("Scheme")),
            Column::new("State", ColumnField::Attr("State")),
            Column::new("Vpc", ColumnField::Attr("Vpc")),
            Column::new("SecurityGroups", ColumnField::Attr("SecurityGroups")),
            Column::new("DnsName", ColumnField::Attr("DnsName")),
            Column::new("Arn", ColumnField::Arn),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = elbv2::Client::new(&config);
        let response = client
            .describe_load_balancers()
            .send()
            .await
            .with_context(|| format!("describe_load_balancers failed in {}", region))?;

        let mut resources = Vec::new();
        for lb in response.load_balancers.unwrap_or_default() {
            ctx.ensure_active()?;

            let lb_name = lb.load_balancer_name.clone().unwrap_or_default();

            let vpc = ctx
                .names()
                .resolve(region, NameKind::Vpc, lb.vpc_id.as_deref())
                .await;
            let mut group_names = Vec::new();
            for group_id in lb.security_groups.unwrap_or_default() {
                let resolved = ctx
                    .names()
                    .resolve(region, NameKind::SecurityGroup, Some(&group_id))
                    .await;
                group_names.push(resolved);
            }

            let mut parent = Resource::new(self.name(), lb_name.clone(), region)
                .with_attr("Vpc", vpc)
                .with_attr("SecurityGroups", group_names.join(", "));

            if let Some(arn) = &lb.load_balancer_arn {
                parent = parent.with_arn(arn.clone());
            }
            if let Some(lb_type) = lb.r#type {
                parent = parent.with_attr("Type", lb_type.as_str());
            }
            if let Some(scheme) = lb.scheme {
                parent = parent.with_attr("Scheme", scheme.as_str());
            }
            if let Some(state) = lb.state.and_then(|s| s.code) {
                parent = parent.with_attr("State", state.as_str());
            }
            if let Some(dns_name) = lb.dns_name {
                parent = parent.with_attr("DnsName", dns_name);
            }

            resources.push(parent);

            let Some(lb_arn) = lb.load_balancer_arn else {
                continue;
            };
            let listeners = client
                .describe_listeners()
                .load_balancer_arn(&lb_arn)
                .send()
                .await
                .with_context(|| format!("describe_listeners failed for {}", lb_name))?;

            for listener in listeners.listeners.unwrap_or_default() {
                let protocol = listener
                    .protocol
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_default();
                let port = listener.port.map(|p| p.to_string()).unwrap_or_default();

                let mut child =
                    Resource::new(self.name(), format!("{}:{}", protocol, port), region)
                        .with_sub_category(0, "listener");

                if let Some(arn) = listener.listener_arn {
                    child = child.with_arn(arn);
                }

                resources.push(child);
            }
        }

        Ok(resources)
    }
}
