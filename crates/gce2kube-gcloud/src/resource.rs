//! Compute Engine resources as described by gcloud
//!
//! Only the fields the migration reads are modelled. Everything else in the
//! gcloud output is ignored.

use crate::error::ResourcePathError;
use serde::{Deserialize, Serialize};

/// Managed instance group
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceGroup {
    #[serde(default)]
    pub name: String,

    /// Absent when the group has no autoscaler attached
    #[serde(default)]
    pub autoscaler: Option<Autoscaler>,

    /// Name or self-link of the instance template
    #[serde(default)]
    pub instance_template: String,

    /// Self-links of the target pools the group belongs to
    #[serde(default)]
    pub target_pools: Vec<String>,
}

impl InstanceGroup {
    /// Autoscaling policy, or the zero policy when no autoscaler is attached
    pub fn autoscaling_policy(&self) -> AutoscalingPolicy {
        self.autoscaler
            .as_ref()
            .map(|a| a.autoscaling_policy.clone())
            .unwrap_or_default()
    }

    /// Name of the first target pool
    ///
    /// `None` when the group has no target pools or the first self-link has
    /// no usable final segment.
    pub fn pool_name(&self) -> Option<&str> {
        let pool = self.target_pools.first()?;
        match resource_name(pool) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::warn!("Ignoring target pool of {}: {}", self.name, e);
                None
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Autoscaler {
    #[serde(default)]
    pub autoscaling_policy: AutoscalingPolicy,
}

/// CPU based autoscaling policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoscalingPolicy {
    #[serde(default)]
    pub cpu_utilization: CpuUtilization,

    #[serde(default)]
    pub max_num_replicas: i64,

    #[serde(default)]
    pub min_num_replicas: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUtilization {
    /// Target fraction between 0.0 and 1.0
    #[serde(default)]
    pub utilization_target: f64,
}

/// Instance template, reduced to its metadata items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceTemplate {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub properties: TemplateProperties,
}

impl InstanceTemplate {
    /// Metadata items in template order
    pub fn metadata_items(&self) -> &[MetadataItem] {
        &self.properties.metadata.items
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateProperties {
    #[serde(default)]
    pub metadata: TemplateMetadata,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub items: Vec<MetadataItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataItem {
    pub key: String,

    #[serde(default)]
    pub value: String,
}

impl MetadataItem {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Forwarding rule returned by a filtered list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardingRule {
    /// gcloud prints ids as quoted strings, but older output used bare integers
    #[serde(default)]
    pub id: Option<serde_yaml::Value>,

    #[serde(default)]
    pub name: Option<String>,
}

impl ForwardingRule {
    /// Rule id as text, `None` when absent or empty
    pub fn id_str(&self) -> Option<String> {
        let id = match self.id.as_ref()? {
            serde_yaml::Value::String(s) => s.trim().to_string(),
            serde_yaml::Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if id.is_empty() { None } else { Some(id) }
    }
}

/// Last `/`-separated segment of a resource path or self-link
///
/// A bare name without slashes is returned as is.
pub fn resource_name(path: &str) -> std::result::Result<&str, ResourcePathError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(ResourcePathError::Empty);
    }
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(ResourcePathError::TrailingSlash(path.to_string())),
    }
}
