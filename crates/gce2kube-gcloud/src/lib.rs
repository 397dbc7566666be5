//! gcloud CLI wrapper for gce2kube
//!
//! This crate reads the Compute Engine resources that gce2kube translates:
//! managed instance groups, instance templates and forwarding rules.
//!
//! # Requirements
//!
//! - `gcloud` CLI must be installed and configured
//! - Authentication and the default project are managed through gcloud configuration
//!
//! # Example
//!
//! ```ignore
//! use gce2kube_gcloud::{ComputeApi, Gcloud};
//!
//! let gcloud = Gcloud::new("gcloud").with_zone("us-central1-a");
//!
//! let group = gcloud.describe_instance_group("web-group").await?;
//! let template = gcloud.describe_instance_template(&group.instance_template).await?;
//! ```

pub mod api;
pub mod error;
pub mod gcloud;
pub mod resource;

pub use api::ComputeApi;
pub use error::{GcloudError, ResourcePathError, Result};
pub use gcloud::{Gcloud, Location};
pub use resource::{
    AutoscalingPolicy, Autoscaler, CpuUtilization, ForwardingRule, InstanceGroup,
    InstanceTemplate, MetadataItem, resource_name,
};
