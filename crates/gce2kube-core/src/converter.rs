//! Pod specs and autoscaling policies to Kubernetes manifests

use crate::manifest::{
    CORE_V1, CpuTargetUtilization, Deployment, DeploymentSpec, EXTENSIONS_V1BETA1,
    HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec, ManifestSet, Metadata, PodTemplateSpec,
    Service, ServicePort, ServiceSpec, SubresourceReference,
};
use crate::pod::PodTemplate;
use gce2kube_gcloud::AutoscalingPolicy;
use std::collections::BTreeMap;

/// Label selecting the pods of a workload
pub const APP_LABEL: &str = "app";
pub const NAME_LABEL: &str = "name";

/// Port exposed by the generated load balancer Service
pub const HTTP_PORT: i64 = 80;

/// CPU utilization fraction to an HPA target percentage
///
/// Kubernetes rejects a zero percent target, so anything below 1 becomes 1.
pub fn target_percentage(utilization_target: f64) -> i64 {
    let percentage = (utilization_target * 100.0).round() as i64;
    percentage.max(1)
}

/// Deployment running one replica of the pod spec
pub fn deployment(pod: &PodTemplate) -> Deployment {
    let name = pod.name();
    let labels = BTreeMap::from([
        (NAME_LABEL.to_string(), name.to_string()),
        (APP_LABEL.to_string(), name.to_string()),
    ]);

    Deployment {
        api_version: EXTENSIONS_V1BETA1.to_string(),
        kind: "Deployment".to_string(),
        metadata: Metadata::named(name),
        spec: DeploymentSpec {
            replicas: 1,
            template: PodTemplateSpec {
                metadata: Metadata {
                    name: None,
                    labels,
                },
                spec: pod.spec.clone(),
            },
        },
    }
}

/// HorizontalPodAutoscaler scaling the Deployment of the pod spec
pub fn horizontal_pod_autoscaler(
    pod: &PodTemplate,
    policy: &AutoscalingPolicy,
) -> HorizontalPodAutoscaler {
    let name = pod.name();

    HorizontalPodAutoscaler {
        api_version: EXTENSIONS_V1BETA1.to_string(),
        kind: "HorizontalPodAutoscaler".to_string(),
        metadata: Metadata::named(name),
        spec: HorizontalPodAutoscalerSpec {
            min_replicas: policy.min_num_replicas,
            max_replicas: policy.max_num_replicas,
            cpu_utilization: CpuTargetUtilization {
                target_percentage: target_percentage(policy.cpu_utilization.utilization_target),
            },
            scale_ref: SubresourceReference {
                kind: "Deployment".to_string(),
                name: name.to_string(),
                subresource: "scale".to_string(),
            },
        },
    }
}

/// LoadBalancer Service exposing port 80 of the pod spec's Deployment
pub fn service(pod: &PodTemplate) -> Service {
    let name = pod.name();

    Service {
        api_version: CORE_V1.to_string(),
        kind: "Service".to_string(),
        metadata: Metadata::named(name),
        spec: ServiceSpec {
            service_type: "LoadBalancer".to_string(),
            ports: vec![ServicePort {
                name: "http".to_string(),
                protocol: "TCP".to_string(),
                port: HTTP_PORT,
                target_port: HTTP_PORT,
            }],
            selector: BTreeMap::from([(APP_LABEL.to_string(), name.to_string())]),
        },
    }
}

/// All manifests for one pod spec
///
/// The Service is only generated when the group sits behind a load balancer.
pub fn convert(pod: &PodTemplate, policy: &AutoscalingPolicy, load_balanced: bool) -> ManifestSet {
    ManifestSet {
        deployment: deployment(pod),
        autoscaler: horizontal_pod_autoscaler(pod, policy),
        service: load_balanced.then(|| service(pod)),
    }
}
