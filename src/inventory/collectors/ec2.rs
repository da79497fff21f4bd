//! EC2 collectors: instances and EBS volumes.

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_ec2 as ec2;

use super::super::collector::{Collector, Column, ColumnField, Resource};
use super::super::context::CollectionContext;
use super::super::names::{name_tag, NameKind};
use super::super::regions::GLOBAL_REGION;

pub struct Ec2InstanceCollector;

#[async_trait]
impl Collector for Ec2InstanceCollector {
    fn name(&self) -> &'static str {
        "ec2-instance"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("InstanceId", ColumnField::Attr("InstanceId")),
            Column::new("State", ColumnField::Attr("State")),
            Column::new("InstanceType", ColumnField::Attr("InstanceType")),
            Column::new("Vpc", ColumnField::Attr("Vpc")),
            Column::new("Subnet", ColumnField::Attr("Subnet")),
            Column::new("Image", ColumnField::Attr("Image")),
            Column::new("SecurityGroups", ColumnField::Attr("SecurityGroups")),
            Column::new("InstanceProfile", ColumnField::Attr("InstanceProfile")),
            Column::new("PrivateIp", ColumnField::Attr("PrivateIp")),
            Column::new("PublicIp", ColumnField::Attr("PublicIp")),
            Column::new("LaunchTime", ColumnField::Attr("LaunchTime")),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = ec2::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.describe_instances().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("describe_instances failed in {}", region))?
        {
            ctx.ensure_active()?;
            for reservation in page.reservations.unwrap_or_default() {
                for instance in reservation.instances.unwrap_or_default() {
                    resources.push(instance_to_resource(self.name(), ctx, region, instance).await);
                }
            }
        }

        Ok(resources)
    }
}

async fn instance_to_resource(
    category: &str,
    ctx: &CollectionContext,
    region: &str,
    instance: ec2::types::Instance,
) -> Resource {
    let instance_id = instance.instance_id.clone().unwrap_or_default();
    let name = name_tag(instance.tags.as_deref()).unwrap_or_else(|| instance_id.clone());

    let vpc = ctx
        .names()
        .resolve(region, NameKind::Vpc, instance.vpc_id.as_deref())
        .await;
    let subnet = ctx
        .names()
        .resolve(region, NameKind::Subnet, instance.subnet_id.as_deref())
        .await;
    let image = ctx
        .names()
        .resolve(region, NameKind::Image, instance.image_id.as_deref())
        .await;

    // Instance metadata already carries group names alongside the IDs.
    let security_groups = instance
        .security_groups
        .unwrap_or_default()
        .into_iter()
        .filter_map(|sg| sg.group_name)
        .collect::<Vec<_>>()
        .join(", ");

    let instance_profile = match instance
        .iam_instance_profile
        .as_ref()
        .and_then(|p| p.arn.as_deref())
    {
        Some(profile_arn) => {
            ctx.names()
                .resolve_global("instance-profile", profile_arn)
                .await
        }
        None => String::new(),
    };

    let mut resource = Resource::new(category, name, region)
        .with_attr("InstanceId", instance_id)
        .with_attr("Vpc", vpc)
        .with_attr("Subnet", subnet)
        .with_attr("Image", image)
        .with_attr("SecurityGroups", security_groups)
        .with_attr("InstanceProfile", instance_profile);

    if let Some(state) = instance.state.and_then(|s| s.name) {
        resource = resource.with_attr("State", state.as_str());
    }
    if let Some(instance_type) = instance.instance_type {
        resource = resource.with_attr("InstanceType", instance_type.as_str());
    }
    if let Some(private_ip) = instance.private_ip_address {
        resource = resource.with_attr("PrivateIp", private_ip);
    }
    if let Some(public_ip) = instance.public_ip_address {
        resource = resource.with_attr("PublicIp", public_ip);
    }
    if let Some(launch_time) = instance.launch_time {
        resource = resource.with_attr("LaunchTime", launch_time.to_string());
    }

    resource
}

pub struct EbsVolumeCollector;

#[async_trait]
impl Collector for EbsVolumeCollector {
    fn name(&self) -> &'static str {
        "ebs-volume"
    }

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("Name", ColumnField::Name),
            Column::new("Region", ColumnField::Region),
            Column::new("VolumeId", ColumnField::Attr("VolumeId")),
            Column::new("State", ColumnField::Attr("State")),
            Column::new("SizeGiB", ColumnField::Attr("SizeGiB")),
            Column::new("VolumeType", ColumnField::Attr("VolumeType")),
            Column::new("AvailabilityZone", ColumnField::Attr("AvailabilityZone")),
            Column::new("AttachedTo", ColumnField::Attr("AttachedTo")),
            Column::new("Encrypted", ColumnField::Attr("Encrypted")),
            Column::new("KmsKey", ColumnField::Attr("KmsKey")),
        ]
    }

    async fn collect(&self, ctx: &CollectionContext, region: &str) -> Result<Vec<Resource>> {
        if region == GLOBAL_REGION {
            return Ok(Vec::new());
        }

        let config = ctx.sdk_config(region).await?;
        let client = ec2::Client::new(&config);
        let mut resources = Vec::new();

        let mut paginator = client.describe_volumes().into_paginator().send();
        while let Some(page) = paginator
            .try_next()
            .await
            .with_context(|| format!("describe_volumes failed in {}", region))?
        {
            ctx.ensure_active()?;
            for volume in page.volumes.unwrap_or_default() {
                let volume_id = volume.volume_id.clone().unwrap_or_default();
                let name = name_tag(volume.tags.as_deref()).unwrap_or_else(|| volume_id.clone());

                let kms_key = ctx
                    .names()
                    .resolve(region, NameKind::KmsKey, volume.kms_key_id.as_deref())
                    .await;

                let attached_to = volume
                    .attachments
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|a| a.instance_id)
                    .collect::<Vec<_>>()
                    .join(", ");

                let mut resource = Resource::new(self.name(), name, region)
                    .with_attr("VolumeId", volume_id)
                    .with_attr("AttachedTo", attached_to)
                    .with_attr("KmsKey", kms_key);

                if let Some(state) = volume.state {
                    resource = resource.with_attr("State", state.as_str());
                }
                if let Some(size) = volume.size {
                    resource = resource.with_attr("SizeGiB", size.to_string());
                }
                if let Some(volume_type) = volume.volume_type {
                    resource = resource.with_attr("VolumeType", volume_type.as_str());
                }
                if let Some(zone) = volume.availability_zone {
                    resource = resource.with_attr("AvailabilityZone", zone);
                }
                if let Some(encrypted) = volume.encrypted {
                    resource = resource.with_attr("Encrypted", encrypted.to_string());
                }

                resources.push(resource);
            }
        }

        Ok(resources)
    }
}
