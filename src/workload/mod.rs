//! Workload types for the Spin chart
//!
//! This module defines the Kubernetes resources the chart emits:
//! - Deployment: runs the Spin container
//! - Service: exposes the Spin HTTP endpoint inside the cluster
//!
//! Shared types (Container, Volume, probes, etc.) come from [`crate::k8s`].
//! For manifest generation, use [`crate::chart::SpinChart`].

use serde::{Deserialize, Serialize};

use crate::k8s::{Container, LabelSelector, Labels, ObjectMeta, PodSecurityContext, Volume};

// =============================================================================
// Deployment
// =============================================================================

/// Kubernetes Deployment
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: DeploymentSpec,
}

impl Deployment {
    /// API version of apps/v1 Deployments
    pub const API_VERSION: &'static str = "apps/v1";
    /// Kind of Deployments
    pub const KIND: &'static str = "Deployment";
}

/// Deployment spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Seconds a new pod must be ready before it counts as available
    pub min_ready_seconds: i32,
    /// Seconds before a stalled rollout is reported as failed
    pub progress_deadline_seconds: i32,
    /// Number of replicas
    pub replicas: i32,
    /// Label selector
    pub selector: LabelSelector,
    /// Deployment strategy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<DeploymentStrategy>,
    /// Pod template
    pub template: PodTemplateSpec,
}

/// Deployment strategy
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentStrategy {
    /// Rolling update config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_update: Option<RollingUpdateConfig>,
    /// Strategy type: RollingUpdate or Recreate
    #[serde(rename = "type")]
    pub type_: String,
}

impl DeploymentStrategy {
    /// Rolling update allowing a quarter of the pods to surge or be unavailable
    pub fn rolling() -> Self {
        Self {
            rolling_update: Some(RollingUpdateConfig {
                max_surge: Some("25%".to_string()),
                max_unavailable: Some("25%".to_string()),
            }),
            type_: "RollingUpdate".to_string(),
        }
    }
}

/// Rolling update configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RollingUpdateConfig {
    /// Max surge pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<String>,
    /// Max unavailable pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<String>,
}

/// Pod template spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodTemplateSpec {
    /// Pod metadata
    pub metadata: PodMeta,
    /// Pod spec
    pub spec: PodSpec,
}

/// Pod metadata (subset of ObjectMeta)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodMeta {
    /// Labels
    pub labels: Labels,
}

/// Pod spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Whether to automount the service account token into pods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automount_service_account_token: Option<bool>,
    /// Containers
    pub containers: Vec<Container>,
    /// DNS policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_policy: Option<String>,
    /// Use the node's network namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,
    /// Restart policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_policy: Option<String>,
    /// Pod-level security context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<PodSecurityContext>,
    /// Use the pod's FQDN as its hostname
    #[serde(
        rename = "setHostnameAsFQDN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub set_hostname_as_fqdn: Option<bool>,
    /// Share one process namespace between all containers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_process_namespace: Option<bool>,
    /// Grace period between SIGTERM and SIGKILL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,
    /// Volumes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

// =============================================================================
// Service
// =============================================================================

/// Kubernetes Service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// API version
    pub api_version: String,
    /// Kind
    pub kind: String,
    /// Metadata
    pub metadata: ObjectMeta,
    /// Spec
    pub spec: ServiceSpec,
}

impl Service {
    /// API version of core Services
    pub const API_VERSION: &'static str = "v1";
    /// Kind of Services
    pub const KIND: &'static str = "Service";
}

/// Service spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    /// Ports
    pub ports: Vec<ServicePort>,
    /// Selector
    pub selector: Labels,
    /// Service type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// Service port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServicePort {
    /// Port number
    pub port: u16,
    /// Target port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
}

// =============================================================================
// Generated Manifests Container
// =============================================================================

/// The full resource set produced for one chart
#[derive(Clone, Debug, PartialEq)]
pub struct ManifestSet {
    /// Kubernetes Deployment
    pub deployment: Deployment,
    /// Kubernetes Service
    pub service: Service,
}

impl ManifestSet {
    /// Number of Kubernetes objects in the set
    pub fn resource_count(&self) -> usize {
        2
    }

    /// Objects in apply order, as JSON values
    pub fn to_values(&self) -> serde_json::Result<Vec<serde_json::Value>> {
        Ok(vec![
            serde_json::to_value(&self.deployment)?,
            serde_json::to_value(&self.service)?,
        ])
    }
}
