//! ARN parsing.

use anyhow::{bail, Result};

/// Parsed Amazon Resource Name.
///
/// `resource_type` is empty for ARNs whose resource field carries no
/// `/` or `:` delimiter (e.g. S3 buckets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource_type: String,
    pub resource: String,
}

impl Arn {
    /// Parse a colon-delimited ARN string.
    ///
    /// The input must start with `arn:` and split into at least six
    /// segments. The resource field is split into resource-type and
    /// resource at the first `/` or `:`.
    pub fn parse(input: &str) -> Result<Arn> {
        if !input.starts_with("arn:") {
            bail!("invalid ARN format: {}", input);
        }

        let parts: Vec<&str> = input.splitn(6, ':').collect();
        if parts.len() < 6 {
            bail!("invalid ARN format: {}", input);
        }

        let (resource_type, resource) = split_resource(parts[5]);

        Ok(Arn {
            partition: parts[1].to_string(),
            service: parts[2].to_string(),
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            resource_type,
            resource,
        })
    }
}

fn split_resource(field: &str) -> (String, String) {
    match field.find(['/', ':']) {
        Some(idx) => (field[..idx].to_string(), field[idx + 1..].to_string()),
        None => (String::new(), field.to_string()),
    }
}

/// Extract just the resource name from an ARN.
pub fn resource_name(input: &str) -> Result<String> {
    Ok(Arn::parse(input)?.resource)
}
