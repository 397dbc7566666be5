//! Instance group to Kubernetes manifests, end to end

use crate::cloud_init::{cloud_config, pod_templates};
use crate::converter::convert;
use crate::emit::ManifestWriter;
use crate::error::{ExtractError, Result};
use crate::pod::PodTemplate;
use gce2kube_gcloud::{ComputeApi, InstanceGroup};
use std::io::Write;
use tracing::{debug, info, warn};

/// What to do with a write_files entry that is not a valid pod spec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidPodSpec {
    /// Abort the run before anything is written
    #[default]
    Fail,
    /// Log a warning and leave the entry out
    Skip,
}

#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub invalid_pod_spec: InvalidPodSpec,
}

/// Counts of what a run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub deployments: usize,
    pub autoscalers: usize,
    pub services: usize,
    pub skipped: usize,
}

/// Reads a managed instance group and writes its Kubernetes equivalent
pub struct Migrator<A: ComputeApi> {
    api: A,
    options: MigrateOptions,
}

impl<A: ComputeApi> Migrator<A> {
    pub fn new(api: A, options: MigrateOptions) -> Self {
        Self { api, options }
    }

    /// Run the migration for one instance group, writing YAML to `out`
    pub async fn run<W: Write>(&self, group_name: &str, out: W) -> Result<Summary> {
        let group = self.api.describe_instance_group(group_name).await?;
        debug!(
            "Instance group {} uses template {}",
            group_name, group.instance_template
        );
        if group.autoscaler.is_none() {
            warn!(
                "Instance group {} has no autoscaler, HPA replica bounds will be 0",
                group_name
            );
        }

        let template = self
            .api
            .describe_instance_template(&group.instance_template)
            .await?;
        let config = cloud_config(&template)?;

        let mut summary = Summary::default();
        let pods = self.valid_pods(pod_templates(&config), &mut summary)?;

        let policy = group.autoscaling_policy();
        let mut load_balanced = None;
        let mut writer = ManifestWriter::new(out);

        for pod in &pods {
            let has_lb = match load_balanced {
                Some(found) => found,
                None => {
                    let found = self.probe_load_balancer(&group).await?;
                    load_balanced = Some(found);
                    found
                }
            };

            let set = convert(pod, &policy, has_lb);
            writer.write_set(&set)?;

            info!("Generated Deployment and HorizontalPodAutoscaler {}", pod.name());
            summary.deployments += 1;
            summary.autoscalers += 1;
            if set.service.is_some() {
                info!("Generated LoadBalancer Service {}", pod.name());
                summary.services += 1;
            }
        }

        writer.into_inner()?;
        info!(
            "{}: {} deployments, {} autoscalers, {} services, {} skipped",
            group_name,
            summary.deployments,
            summary.autoscalers,
            summary.services,
            summary.skipped
        );
        Ok(summary)
    }

    /// Apply the invalid pod spec policy to every entry before writing anything
    fn valid_pods(
        &self,
        results: Vec<std::result::Result<PodTemplate, ExtractError>>,
        summary: &mut Summary,
    ) -> Result<Vec<PodTemplate>> {
        let mut pods = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(pod) => pods.push(pod),
                Err(e) => match self.options.invalid_pod_spec {
                    InvalidPodSpec::Fail => return Err(e.into()),
                    InvalidPodSpec::Skip => {
                        warn!("Skipping write_files entry: {}", e);
                        summary.skipped += 1;
                    }
                },
            }
        }
        Ok(pods)
    }

    /// Whether a forwarding rule targets the group's first target pool
    async fn probe_load_balancer(&self, group: &InstanceGroup) -> Result<bool> {
        let Some(pool) = group.pool_name() else {
            debug!("Instance group {} has no target pool", group.name);
            return Ok(false);
        };

        let rule = self.api.find_forwarding_rule(pool).await?;
        match rule {
            Some(rule) => {
                debug!(
                    "Target pool {} is behind forwarding rule {}",
                    pool,
                    rule.name.as_deref().unwrap_or("(unnamed)")
                );
                Ok(true)
            }
            None => {
                debug!("No forwarding rule targets pool {}", pool);
                Ok(false)
            }
        }
    }
}
