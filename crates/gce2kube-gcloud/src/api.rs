//! Compute Engine read API trait definition

use crate::error::Result;
use crate::resource::{ForwardingRule, InstanceGroup, InstanceTemplate};
use async_trait::async_trait;

/// Read-only view of the Compute Engine resources a migration needs
///
/// [`crate::Gcloud`] implements this by shelling out to the gcloud CLI.
/// Tests implement it in memory.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Describe a managed instance group by name
    async fn describe_instance_group(&self, name: &str) -> Result<InstanceGroup>;

    /// Describe an instance template by name or self-link
    async fn describe_instance_template(&self, reference: &str) -> Result<InstanceTemplate>;

    /// Find a forwarding rule whose target is the given target pool
    ///
    /// Returns `None` when no rule points at the pool.
    async fn find_forwarding_rule(&self, pool: &str) -> Result<Option<ForwardingRule>>;
}
