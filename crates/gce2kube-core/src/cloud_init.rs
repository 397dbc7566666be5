//! Pod specs from instance template metadata
//!
//! Instances are expected to boot Container-Optimized OS with a cloud-config
//! in the `user-data` metadata item. Each `write_files` entry of that
//! cloud-config holds one pod manifest for the kubelet on the VM.

use crate::error::ExtractError;
use crate::pod::PodTemplate;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::GzDecoder;
use gce2kube_gcloud::InstanceTemplate;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use tracing::debug;

/// Metadata key carrying the cloud-config document
pub const USER_DATA_KEY: &str = "user-data";

/// The parts of a cloud-config document that carry workloads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    #[serde(default)]
    pub write_files: Vec<WriteFile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteFile {
    #[serde(default)]
    pub path: PathBuf,

    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

impl WriteFile {
    /// File content with the cloud-init `encoding` undone
    pub fn decoded_content(&self) -> Result<String, ExtractError> {
        let encoding = self
            .encoding
            .as_deref()
            .map(|e| e.trim().to_ascii_lowercase())
            .unwrap_or_default();

        match encoding.as_str() {
            "" | "text/plain" => Ok(self.content.clone()),
            "b64" | "base64" => self.utf8(self.base64()?),
            "gz+b64" | "gzip+b64" | "gz+base64" | "gzip+base64" => {
                let compressed = self.base64()?;
                let mut decompressed = Vec::new();
                GzDecoder::new(compressed.as_slice())
                    .read_to_end(&mut decompressed)
                    .map_err(|source| ExtractError::Gzip {
                        path: self.path.clone(),
                        source,
                    })?;
                self.utf8(decompressed)
            }
            _ => Err(ExtractError::UnsupportedEncoding {
                path: self.path.clone(),
                encoding,
            }),
        }
    }

    fn base64(&self) -> Result<Vec<u8>, ExtractError> {
        // cloud-init tolerates folded base64, so drop the whitespace first
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map_err(|source| ExtractError::Base64 {
                path: self.path.clone(),
                source,
            })
    }

    fn utf8(&self, bytes: Vec<u8>) -> Result<String, ExtractError> {
        String::from_utf8(bytes).map_err(|source| ExtractError::Utf8 {
            path: self.path.clone(),
            source,
        })
    }

    /// Parse the file content as a pod manifest
    pub fn pod_template(&self) -> Result<PodTemplate, ExtractError> {
        let content = self.decoded_content()?;
        let pod: PodTemplate =
            serde_yaml::from_str(&content).map_err(|source| ExtractError::PodSpec {
                path: self.path.clone(),
                source,
            })?;

        if pod.name().trim().is_empty() {
            return Err(ExtractError::MissingName {
                path: self.path.clone(),
            });
        }
        Ok(pod)
    }
}

/// Parse a `user-data` value as a cloud-config document
///
/// A value made only of blank and comment lines (a bare `#cloud-config`
/// header) is an empty cloud-config.
pub fn parse_cloud_config(value: &str) -> Result<CloudConfig, ExtractError> {
    let has_content = value.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !has_content {
        return Ok(CloudConfig::default());
    }

    serde_yaml::from_str(value).map_err(ExtractError::UserData)
}

/// The cloud-config of an instance template
///
/// Every `user-data` item is parsed and the last one wins. Without any
/// `user-data` item the result is an empty cloud-config.
pub fn cloud_config(template: &InstanceTemplate) -> Result<CloudConfig, ExtractError> {
    let mut config = None;

    for item in template.metadata_items() {
        if item.key == USER_DATA_KEY {
            if config.is_some() {
                debug!("Multiple {} items in {}, using the last", USER_DATA_KEY, template.name);
            }
            config = Some(parse_cloud_config(&item.value)?);
        }
    }

    Ok(config.unwrap_or_else(|| {
        debug!("No {} item in instance template {}", USER_DATA_KEY, template.name);
        CloudConfig::default()
    }))
}

/// One parse result per write_files entry, in file order
pub fn pod_templates(config: &CloudConfig) -> Vec<Result<PodTemplate, ExtractError>> {
    config
        .write_files
        .iter()
        .map(|file| {
            debug!("Reading pod spec from {}", file.path.display());
            file.pod_template()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use gce2kube_gcloud::MetadataItem;
    use gce2kube_gcloud::resource::{TemplateMetadata, TemplateProperties};
    use std::io::Write;

    const WEB_POD: &str = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\nspec:\n  containers:\n  - name: web\n    image: nginx:latest\n";

    fn template(items: Vec<MetadataItem>) -> InstanceTemplate {
        InstanceTemplate {
            name: "web-template".to_string(),
            properties: TemplateProperties {
                metadata: TemplateMetadata { items },
            },
        }
    }

    fn write_file(path: &str, content: &str, encoding: Option<&str>) -> WriteFile {
        WriteFile {
            path: PathBuf::from(path),
            content: content.to_string(),
            encoding: encoding.map(String::from),
        }
    }

    #[test]
    fn test_cloud_config_from_user_data() {
        let user_data = r#"#cloud-config
write_files:
- path: /etc/kubernetes/manifests/web.yaml
  permissions: '0644'
  content: |
    metadata:
      name: web
    spec:
      containers:
      - name: web
        image: nginx:latest
runcmd:
- systemctl restart kubelet
"#;
        let template = template(vec![
            MetadataItem::new("startup-script", "echo ignored"),
            MetadataItem::new(USER_DATA_KEY, user_data),
        ]);

        let config = cloud_config(&template).unwrap();
        assert_eq!(config.write_files.len(), 1);
        assert_eq!(
            config.write_files[0].path,
            PathBuf::from("/etc/kubernetes/manifests/web.yaml")
        );

        let pods = pod_templates(&config);
        let pod = pods[0].as_ref().unwrap();
        assert_eq!(pod.name(), "web");
        assert_eq!(pod.spec.containers[0].image, "nginx:latest");
    }

    #[test]
    fn test_cloud_config_last_user_data_wins() {
        let first = "write_files:\n- path: /a.yaml\n  content: x\n";
        let second = "write_files:\n- path: /b.yaml\n  content: y\n- path: /c.yaml\n  content: z\n";
        let template = template(vec![
            MetadataItem::new(USER_DATA_KEY, first),
            MetadataItem::new(USER_DATA_KEY, second),
        ]);

        let config = cloud_config(&template).unwrap();
        let paths: Vec<_> = config.write_files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(paths, vec![PathBuf::from("/b.yaml"), PathBuf::from("/c.yaml")]);
    }

    #[test]
    fn test_cloud_config_without_user_data() {
        let template = template(vec![MetadataItem::new("startup-script", "echo hi")]);
        let config = cloud_config(&template).unwrap();
        assert!(config.write_files.is_empty());
        assert!(pod_templates(&config).is_empty());
    }

    #[test]
    fn test_cloud_config_header_only() {
        let config = parse_cloud_config("#cloud-config\n\n").unwrap();
        assert_eq!(config, CloudConfig::default());
    }

    #[test]
    fn test_cloud_config_invalid_user_data() {
        let template = template(vec![MetadataItem::new(
            USER_DATA_KEY,
            "write_files: {path: [unterminated",
        )]);
        assert!(matches!(
            cloud_config(&template),
            Err(ExtractError::UserData(_))
        ));
    }

    #[test]
    fn test_pod_templates_keep_order_and_errors() {
        let config = CloudConfig {
            write_files: vec![
                write_file("/web.yaml", WEB_POD, None),
                write_file("/notes.txt", "just some text", None),
                write_file(
                    "/api.yaml",
                    &WEB_POD.replace("name: web", "name: api"),
                    None,
                ),
            ],
        };

        let pods = pod_templates(&config);
        assert_eq!(pods.len(), 3);
        assert_eq!(pods[0].as_ref().unwrap().name(), "web");
        match &pods[1] {
            Err(e @ ExtractError::PodSpec { .. }) => {
                assert_eq!(e.path(), Some(&PathBuf::from("/notes.txt")));
            }
            other => panic!("Expected PodSpec error, got {:?}", other),
        }
        assert_eq!(pods[2].as_ref().unwrap().name(), "api");
    }

    #[test]
    fn test_pod_template_requires_name() {
        let file = write_file(
            "/anon.yaml",
            "metadata:\n  name: ''\nspec:\n  containers: []\n",
            None,
        );
        assert!(matches!(
            file.pod_template(),
            Err(ExtractError::MissingName { .. })
        ));

        let file = write_file("/anon.yaml", "spec:\n  containers: []\n", None);
        assert!(matches!(
            file.pod_template(),
            Err(ExtractError::PodSpec { .. })
        ));
    }

    #[test]
    fn test_pod_template_keeps_extra_fields() {
        let content = r#"
metadata:
  name: web
spec:
  restartPolicy: Always
  containers:
  - name: web
    image: nginx:latest
    ports:
    - containerPort: 80
      hostPort: 80
"#;
        let pod = write_file("/web.yaml", content, None).pod_template().unwrap();
        assert!(pod.spec.extra.contains_key("restartPolicy"));
        assert!(pod.spec.containers[0].extra.contains_key("ports"));
    }

    #[test]
    fn test_decoded_content_base64() {
        let encoded = STANDARD.encode(WEB_POD);
        let folded = format!("{}\n{}", &encoded[..20], &encoded[20..]);
        let file = write_file("/web.yaml", &folded, Some("b64"));

        assert_eq!(file.decoded_content().unwrap(), WEB_POD);
        assert_eq!(file.pod_template().unwrap().name(), "web");
    }

    #[test]
    fn test_decoded_content_gzip_base64() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(WEB_POD.as_bytes()).unwrap();
        let encoded = STANDARD.encode(encoder.finish().unwrap());
        let file = write_file("/web.yaml", &encoded, Some("gzip+base64"));

        assert_eq!(file.decoded_content().unwrap(), WEB_POD);
    }

    #[test]
    fn test_decoded_content_errors() {
        let file = write_file("/web.yaml", "!!not base64!!", Some("base64"));
        assert!(matches!(
            file.decoded_content(),
            Err(ExtractError::Base64 { .. })
        ));

        let file = write_file("/web.yaml", "H4sI", Some("zstd"));
        match file.decoded_content() {
            Err(ExtractError::UnsupportedEncoding { encoding, .. }) => {
                assert_eq!(encoding, "zstd")
            }
            other => panic!("Expected UnsupportedEncoding, got {:?}", other),
        }

        let file = write_file("/web.yaml", &STANDARD.encode(WEB_POD), Some("gz+b64"));
        assert!(matches!(
            file.decoded_content(),
            Err(ExtractError::Gzip { .. })
        ));
    }
}
