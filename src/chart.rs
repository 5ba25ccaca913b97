//! Spin WASM chart
//!
//! Compiles a [`ChartConfig`] into a Deployment running the Spin container
//! and a ClusterIP Service in front of it.
//!
//! # Usage
//!
//! ```rust,ignore
//! let manifests = SpinChart::compile(&ChartConfig::local_dev())?;
//! Synthesizer::new("dist").synth("spin-wasm-local", &manifests)?;
//! ```
//!
//! The container runs with a read-only root filesystem, so every path Spin
//! writes to is backed by an emptyDir volume.

use std::collections::BTreeMap;

use crate::config::{ChartConfig, ChartParams};
use crate::k8s::{
    Container, ContainerPort, Cpu, ImagePullPolicy, K8sSecurityContext, LabelSelector, Labels,
    Memory, ObjectMeta, PodSecurityContext, ProbeSpec, ResourceQuantity, ResourceRequirements,
    Volume, VolumeMount,
};
use crate::workload::{
    Deployment, DeploymentSpec, DeploymentStrategy, ManifestSet, PodMeta, PodSpec,
    PodTemplateSpec, Service, ServicePort, ServiceSpec,
};
use crate::Result;

/// Name of the Spin container in the pod
pub const CONTAINER_NAME: &str = "spin";

/// Path served by Spin for liveness and readiness checks
pub const HEALTH_PATH: &str = "/healthz";

/// UID and GID of the nonroot user in distroless-style images
pub const NONROOT_ID: i64 = 65532;

/// Writable scratch directories: (volume name, mount path), in mount order
pub const SCRATCH_VOLUMES: [(&str, &str); 3] = [
    ("tmp", "/tmp"),
    ("spin-cache", "/home/spin/.cache"),
    ("spin-dir", "/app/.spin"),
];

const CPU_REQUEST: Cpu = Cpu::millis(100);
const CPU_LIMIT: Cpu = Cpu::millis(500);
const MEMORY_REQUEST: Memory = Memory::mebibytes(64);
const MEMORY_LIMIT: Memory = Memory::mebibytes(256);

/// Compiler for the Spin chart.
pub struct SpinChart;

impl SpinChart {
    /// Validate a configuration and compile it into manifests.
    ///
    /// Validation is the only failure mode; nothing is built for a rejected
    /// configuration.
    pub fn compile(config: &ChartConfig) -> Result<ManifestSet> {
        let params = config.validate()?;
        Ok(Self::build(&params))
    }

    /// Build manifests from already validated parameters.
    pub fn build(params: &ChartParams) -> ManifestSet {
        // One label set, shared by the Deployment selector, the pod template
        // and the Service selector.
        let labels = Self::labels();

        let deployment = Self::build_deployment(params, &labels);
        let service = Self::build_service(params, &labels);

        tracing::debug!(
            chart = params.name(),
            deployment = %deployment.metadata.name,
            service = %service.metadata.name,
            replicas = params.replicas(),
            "compiled chart"
        );

        ManifestSet {
            deployment,
            service,
        }
    }

    /// Identity labels for the Spin backend
    pub fn labels() -> Labels {
        BTreeMap::from([
            ("app".to_string(), "spin-wasm".to_string()),
            ("component".to_string(), "backend".to_string()),
        ])
    }

    /// Name of the Deployment generated for a chart
    pub fn deployment_name(chart: &str) -> String {
        format!("{}-deployment", chart)
    }

    fn build_deployment(params: &ChartParams, labels: &Labels) -> Deployment {
        let (volumes, volume_mounts): (Vec<_>, Vec<_>) = SCRATCH_VOLUMES
            .iter()
            .map(|(name, path)| (Volume::from_empty_dir(*name), VolumeMount::new(*name, *path)))
            .unzip();

        let container = Container {
            name: CONTAINER_NAME.to_string(),
            image: params.image().to_string(),
            image_pull_policy: ImagePullPolicy::IfNotPresent,
            ports: vec![ContainerPort {
                container_port: params.port(),
            }],
            resources: Some(ResourceRequirements {
                limits: Some(ResourceQuantity::new(CPU_LIMIT, MEMORY_LIMIT)),
                requests: Some(ResourceQuantity::new(CPU_REQUEST, MEMORY_REQUEST)),
            }),
            liveness_probe: Some(ProbeSpec::http_get(HEALTH_PATH, params.port())),
            readiness_probe: Some(ProbeSpec::http_get(HEALTH_PATH, params.port())),
            volume_mounts,
            security_context: Some(K8sSecurityContext {
                allow_privilege_escalation: Some(false),
                privileged: Some(false),
                read_only_root_filesystem: Some(true),
                run_as_group: Some(NONROOT_ID),
                run_as_non_root: Some(true),
                run_as_user: Some(NONROOT_ID),
            }),
        };

        Deployment {
            api_version: Deployment::API_VERSION.to_string(),
            kind: Deployment::KIND.to_string(),
            metadata: ObjectMeta::new(Self::deployment_name(params.name()))
                .with_namespace(params.namespace().map(str::to_string))
                .with_labels(labels.clone()),
            spec: DeploymentSpec {
                min_ready_seconds: 0,
                progress_deadline_seconds: 600,
                replicas: params.replicas(),
                selector: LabelSelector {
                    match_labels: labels.clone(),
                },
                strategy: Some(DeploymentStrategy::rolling()),
                template: PodTemplateSpec {
                    metadata: PodMeta {
                        labels: labels.clone(),
                    },
                    spec: PodSpec {
                        automount_service_account_token: Some(false),
                        containers: vec![container],
                        dns_policy: Some("ClusterFirst".to_string()),
                        host_network: Some(false),
                        restart_policy: Some("Always".to_string()),
                        security_context: Some(PodSecurityContext {
                            fs_group_change_policy: Some("Always".to_string()),
                            run_as_non_root: Some(true),
                        }),
                        set_hostname_as_fqdn: Some(false),
                        share_process_namespace: Some(false),
                        termination_grace_period_seconds: Some(30),
                        volumes,
                    },
                },
            },
        }
    }

    fn build_service(params: &ChartParams, labels: &Labels) -> Service {
        Service {
            api_version: Service::API_VERSION.to_string(),
            kind: Service::KIND.to_string(),
            metadata: ObjectMeta::new(params.service_name())
                .with_namespace(params.namespace().map(str::to_string))
                .with_labels(labels.clone()),
            spec: ServiceSpec {
                ports: vec![ServicePort {
                    port: params.service_port(),
                    target_port: Some(params.port()),
                }],
                selector: labels.clone(),
                type_: Some("ClusterIP".to_string()),
            },
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
