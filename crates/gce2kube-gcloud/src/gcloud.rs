//! gcloud CLI wrapper
//!
//! Wraps the `gcloud compute` commands used to read a managed instance group,
//! its instance template and the forwarding rules in front of it.

use crate::api::ComputeApi;
use crate::error::{GcloudError, Result};
use crate::resource::{ForwardingRule, InstanceGroup, InstanceTemplate};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Where a managed instance group lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Zone(String),
    Region(String),
}

/// gcloud CLI wrapper
#[derive(Debug, Clone)]
pub struct Gcloud {
    program: PathBuf,
    project: Option<String>,
    location: Option<Location>,
}

impl Gcloud {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            project: None,
            location: None,
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.location = Some(Location::Zone(zone.into()));
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.location = Some(Location::Region(region.into()));
        self
    }

    /// Run a gcloud command and return stdout
    async fn run_command(&self, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(ref project) = self.project {
            cmd.arg("--project").arg(project);
        }
        cmd.arg("--format").arg("yaml");
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let command_line = format!("{} {}", self.program.display(), args.join(" "));
        tracing::debug!("Running: {}", command_line);

        let output = match cmd.output().await {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GcloudError::GcloudNotFound(self.program.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GcloudError::CommandFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn location_args(&self) -> Vec<&str> {
        match &self.location {
            Some(Location::Zone(zone)) => vec!["--zone", zone.as_str()],
            Some(Location::Region(region)) => vec!["--region", region.as_str()],
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl ComputeApi for Gcloud {
    async fn describe_instance_group(&self, name: &str) -> Result<InstanceGroup> {
        let mut args = vec!["compute", "instance-groups", "managed", "describe", name];
        args.extend(self.location_args());

        let output = self.run_command(&args).await?;
        parse_document(&output, "instance group")
    }

    async fn describe_instance_template(&self, reference: &str) -> Result<InstanceTemplate> {
        let output = self
            .run_command(&["compute", "instance-templates", "describe", reference])
            .await?;
        parse_document(&output, "instance template")
    }

    async fn find_forwarding_rule(&self, pool: &str) -> Result<Option<ForwardingRule>> {
        let filter = format!("target={}", pool);
        let output = self
            .run_command(&["compute", "forwarding-rules", "list", "--filter", &filter])
            .await?;
        parse_forwarding_rules(&output)
    }
}

fn parse_document<T: DeserializeOwned>(output: &str, what: &'static str) -> Result<T> {
    serde_yaml::from_str(output).map_err(|source| GcloudError::Parse { what, source })
}

/// A list with `--format yaml` prints one document per rule
fn parse_forwarding_rules(output: &str) -> Result<Option<ForwardingRule>> {
    if output.trim().is_empty() {
        return Ok(None);
    }

    for document in serde_yaml::Deserializer::from_str(output) {
        let rule = Option::<ForwardingRule>::deserialize(document).map_err(|source| {
            GcloudError::Parse {
                what: "forwarding rule",
                source,
            }
        })?;
        if let Some(rule) = rule.filter(|r| r.id_str().is_some()) {
            return Ok(Some(rule));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forwarding_rules_empty() {
        assert!(parse_forwarding_rules("").unwrap().is_none());
        assert!(parse_forwarding_rules("\n  \n").unwrap().is_none());
    }

    #[test]
    fn test_parse_forwarding_rules_single() {
        let output = "IPAddress: 203.0.113.10\nid: '5550001'\nname: web-lb\ntarget: pool-a\n";
        let rule = parse_forwarding_rules(output).unwrap().unwrap();
        assert_eq!(rule.id_str(), Some("5550001".to_string()));
        assert_eq!(rule.name.as_deref(), Some("web-lb"));
    }

    #[test]
    fn test_parse_forwarding_rules_multiple_documents() {
        let output = "---\nid: ''\nname: stale\n---\nid: '42'\nname: web-lb\n---\nid: '43'\nname: other\n";
        let rule = parse_forwarding_rules(output).unwrap().unwrap();
        assert_eq!(rule.name.as_deref(), Some("web-lb"));
    }

    #[test]
    fn test_parse_forwarding_rules_without_id() {
        assert!(parse_forwarding_rules("name: web-lb\n").unwrap().is_none());
    }

    #[test]
    fn test_parse_document_error() {
        let result: Result<InstanceGroup> = parse_document("- not\n- a map\n", "instance group");
        match result {
            Err(GcloudError::Parse { what, .. }) => assert_eq!(what, "instance group"),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_location_args() {
        let gcloud = Gcloud::new("gcloud");
        assert!(gcloud.location_args().is_empty());

        let zoned = Gcloud::new("gcloud").with_zone("us-central1-a");
        assert_eq!(zoned.location_args(), vec!["--zone", "us-central1-a"]);

        let regional = Gcloud::new("gcloud").with_region("us-central1");
        assert_eq!(regional.location_args(), vec!["--region", "us-central1"]);
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Writes an executable shell script standing in for gcloud
        fn fake_gcloud(dir: &tempfile::TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("gcloud");
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[tokio::test]
        async fn test_describe_instance_group_passes_arguments() {
            let dir = tempfile::tempdir().unwrap();
            let args_file = dir.path().join("args");
            let script = format!(
                "echo \"$@\" > {}\necho 'name: web-group'\necho 'instanceTemplate: web-template'",
                args_file.display()
            );
            let gcloud = Gcloud::new(fake_gcloud(&dir, &script))
                .with_project("demo")
                .with_zone("us-central1-a");

            let group = gcloud.describe_instance_group("web-group").await.unwrap();
            assert_eq!(group.name, "web-group");
            assert_eq!(group.instance_template, "web-template");

            let args = std::fs::read_to_string(args_file).unwrap();
            assert_eq!(
                args.trim(),
                "compute instance-groups managed describe web-group --zone us-central1-a --project demo --format yaml"
            );
        }

        #[tokio::test]
        async fn test_forwarding_rule_filter() {
            let dir = tempfile::tempdir().unwrap();
            let args_file = dir.path().join("args");
            let script = format!("echo \"$@\" > {}\necho \"id: '7'\"", args_file.display());
            let gcloud = Gcloud::new(fake_gcloud(&dir, &script));

            let rule = gcloud.find_forwarding_rule("pool-a").await.unwrap();
            assert!(rule.is_some());

            let args = std::fs::read_to_string(args_file).unwrap();
            assert!(args.contains("--filter target=pool-a"));
        }

        #[tokio::test]
        async fn test_command_failure() {
            let dir = tempfile::tempdir().unwrap();
            let gcloud = Gcloud::new(fake_gcloud(
                &dir,
                "echo 'ERROR: (gcloud) resource not found' >&2\nexit 1",
            ));

            match gcloud.describe_instance_template("missing").await {
                Err(GcloudError::CommandFailed { command, stderr, .. }) => {
                    assert!(command.contains("instance-templates describe missing"));
                    assert!(stderr.contains("resource not found"));
                }
                other => panic!("Expected CommandFailed, got {:?}", other),
            }
        }

        #[tokio::test]
        async fn test_gcloud_not_found() {
            let dir = tempfile::tempdir().unwrap();
            let gcloud = Gcloud::new(dir.path().join("no-such-gcloud"));

            match gcloud.describe_instance_group("web-group").await {
                Err(GcloudError::GcloudNotFound(path)) => {
                    assert!(path.ends_with("no-such-gcloud"));
                }
                other => panic!("Expected GcloudNotFound, got {:?}", other),
            }
        }
    }
}
