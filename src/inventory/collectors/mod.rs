//! Per-category collectors. Each maps one provider listing API into
//! normalized resource rows.
//!
//! The scheduler dispatches every collector to every resolved region;
//! regional collectors yield no rows for the global pseudo-region and
//! global collectors yield no rows elsewhere, so each category is
//! enumerated exactly once per applicable region.

mod dynamodb;
mod ec2;
mod elbv2;
mod iam;
mod kms;
mod lambda;
mod rds;
mod s3;
mod sns;
mod sqs;

pub use dynamodb::DynamoDbTableCollector;
pub use ec2::{EbsVolumeCollector, Ec2InstanceCollector};
pub use elbv2::LoadBalancerCollector;
pub use iam::{IamRoleCollector, IamUserCollector};
pub use kms::KmsKeyCollector;
pub use lambda::LambdaFunctionCollector;
pub use rds::RdsInstanceCollector;
pub use s3::S3BucketCollector;
pub use sns::SnsTopicCollector;
pub use sqs::SqsQueueCollector;

use std::sync::Arc;

use super::registry::CollectorRegistry;

/// Registry with every built-in collector registered.
pub fn default_registry() -> CollectorRegistry {
    let mut registry = CollectorRegistry::new();
    registry.register(Arc::new(Ec2InstanceCollector));
    registry.register(Arc::new(EbsVolumeCollector));
    registry.register(Arc::new(S3BucketCollector));
    registry.register(Arc::new(LambdaFunctionCollector));
    registry.register(Arc::new(RdsInstanceCollector));
    registry.register(Arc::new(DynamoDbTableCollector));
    registry.register(Arc::new(IamRoleCollector));
    registry.register(Arc::new(IamUserCollector));
    registry.register(Arc::new(KmsKeyCollector));
    registry.register(Arc::new(SnsTopicCollector));
    registry.register(Arc::new(SqsQueueCollector));
    registry.register(Arc::new(LoadBalancerCollector));
    registry
}
