//! Pod manifests embedded in cloud-init write_files entries

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A container workload definition as written to the VM
///
/// Only `metadata.name` and the pod spec are read. Other top level keys
/// (`apiVersion`, `kind`, ...) are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodTemplate {
    pub metadata: PodMetadata,
    pub spec: PodSpec,
}

impl PodTemplate {
    pub fn name(&self) -> &str {
        &self.metadata.name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PodMetadata {
    pub name: String,
}

/// Pod spec, carried into the Deployment unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSpec {
    pub containers: Vec<Container>,

    /// Pod level fields other than `containers` (volumes, restartPolicy, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
    pub name: String,

    /// Container fields other than image and name (ports, env, command, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Container {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }
}
