//! Run configuration, built once from the command line

use crate::Cli;
use gce2kube_core::{InvalidPodSpec, MigrateOptions};
use gce2kube_gcloud::{Gcloud, Location};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub instance_group: String,
    pub gcloud: PathBuf,
    pub project: Option<String>,
    pub location: Option<Location>,
    pub invalid_pod_spec: InvalidPodSpec,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let location = match (&cli.zone, &cli.region) {
            (Some(zone), _) => Some(Location::Zone(zone.clone())),
            (None, Some(region)) => Some(Location::Region(region.clone())),
            (None, None) => None,
        };

        Self {
            instance_group: cli.instance_group.clone(),
            gcloud: cli.gcloud.clone(),
            project: cli.project.clone(),
            location,
            invalid_pod_spec: if cli.skip_invalid_pod_specs {
                InvalidPodSpec::Skip
            } else {
                InvalidPodSpec::Fail
            },
        }
    }

    pub fn gcloud(&self) -> Gcloud {
        let mut gcloud = Gcloud::new(&self.gcloud);
        if let Some(ref project) = self.project {
            gcloud = gcloud.with_project(project);
        }
        match &self.location {
            Some(Location::Zone(zone)) => gcloud.with_zone(zone),
            Some(Location::Region(region)) => gcloud.with_region(region),
            None => gcloud,
        }
    }

    pub fn migrate_options(&self) -> MigrateOptions {
        MigrateOptions {
            invalid_pod_spec: self.invalid_pod_spec,
        }
    }
}
