//! gce2kube core
//!
//! Turns a Compute Engine managed instance group into Kubernetes manifests.
//!
//! ```text
//! instance group ──► instance template ──► user-data (cloud-config)
//!                                               │
//!                                        write_files[*].content
//!                                               │
//!                                           pod spec ──► Deployment
//!                                                       HorizontalPodAutoscaler
//!                    target pool ──► forwarding rule ──► Service (LoadBalancer)
//! ```
//!
//! [`Migrator`] drives the whole run against any [`gce2kube_gcloud::ComputeApi`].

pub mod cloud_init;
pub mod converter;
pub mod emit;
pub mod error;
pub mod manifest;
pub mod migrate;
pub mod pod;

pub use cloud_init::{CloudConfig, USER_DATA_KEY, WriteFile, cloud_config, pod_templates};
pub use converter::{convert, target_percentage};
pub use emit::ManifestWriter;
pub use error::{ExtractError, MigrateError, Result};
pub use manifest::{Deployment, HorizontalPodAutoscaler, ManifestSet, Service};
pub use migrate::{InvalidPodSpec, MigrateOptions, Migrator, Summary};
pub use pod::{Container, PodSpec, PodTemplate};
