//! Kubernetes resource types shared by the Deployment and Service
//!
//! Only the fields this generator emits are modeled. Field order follows the
//! struct order, and every map is a `BTreeMap`, so serialization is stable
//! across runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Label set shared between a workload and whatever selects it
pub type Labels = BTreeMap<String, String>;

// =============================================================================
// Metadata
// =============================================================================

/// Object metadata
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// Resource name
    pub name: String,
    /// Resource namespace (omitted to use the kubectl context namespace)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

impl ObjectMeta {
    /// Create metadata with a name and no labels
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            labels: BTreeMap::new(),
        }
    }

    /// Set the namespace
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Replace the label set
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// Label selector
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Match labels
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_labels: Labels,
}

// =============================================================================
// Container
// =============================================================================

/// When the kubelet pulls the container image
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImagePullPolicy {
    /// Pull on every pod start
    Always,
    /// Pull only when the node lacks the image (images side-loaded into kind/k3d)
    #[default]
    IfNotPresent,
    /// Never pull; the image must already be on the node
    Never,
}

/// Container spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Container name
    pub name: String,
    /// Image
    pub image: String,
    /// Image pull policy
    pub image_pull_policy: ImagePullPolicy,
    /// Ports
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    /// Resource requirements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    /// Liveness probe - restarts container when it fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<ProbeSpec>,
    /// Readiness probe - removes from service endpoints when it fails
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_probe: Option<ProbeSpec>,
    /// Volume mounts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    /// Security context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_context: Option<K8sSecurityContext>,
}

/// Container port
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// Port number
    pub container_port: u16,
}

// =============================================================================
// Resource requirements
// =============================================================================

/// CPU quantity in millicores
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cpu(u32);

impl Cpu {
    /// CPU expressed in thousandths of a core
    pub const fn millis(millis: u32) -> Self {
        Self(millis)
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// Memory quantity in mebibytes
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Memory(u32);

impl Memory {
    /// Memory expressed in MiB
    pub const fn mebibytes(mib: u32) -> Self {
        Self(mib)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Mi", self.0)
    }
}

/// Resource requirements
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequirements {
    /// Limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ResourceQuantity>,
    /// Requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requests: Option<ResourceQuantity>,
}

/// Resource quantity
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ResourceQuantity {
    /// CPU (e.g. "500m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    /// Memory (e.g. "256Mi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl ResourceQuantity {
    /// Build a quantity from typed CPU and memory amounts
    pub fn new(cpu: Cpu, memory: Memory) -> Self {
        Self {
            cpu: Some(cpu.to_string()),
            memory: Some(memory.to_string()),
        }
    }
}

// =============================================================================
// Probes
// =============================================================================

/// Probe specification - maps 1:1 with Kubernetes probe spec
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    /// Consecutive failures before marking unhealthy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_threshold: Option<i32>,
    /// HTTP GET probe
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_get: Option<HttpGetAction>,
}

impl ProbeSpec {
    /// HTTP GET probe against a path on the given port
    pub fn http_get(path: impl Into<String>, port: u16) -> Self {
        Self {
            failure_threshold: Some(3),
            http_get: Some(HttpGetAction {
                path: path.into(),
                port,
                scheme: Some("HTTP".to_string()),
            }),
        }
    }
}

/// HTTP GET action for probe
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetAction {
    /// Path
    pub path: String,
    /// Port
    pub port: u16,
    /// Scheme (HTTP or HTTPS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

// =============================================================================
// Security context
// =============================================================================

/// Kubernetes container security context
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct K8sSecurityContext {
    /// Allow privilege escalation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_privilege_escalation: Option<bool>,
    /// Run container in privileged mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privileged: Option<bool>,
    /// Mount root filesystem as read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_root_filesystem: Option<bool>,
    /// GID to run the container as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_group: Option<i64>,
    /// Require the container to run as a non-root user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
    /// UID to run the container as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
}

/// Pod-level security context
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityContext {
    /// Policy for applying fsGroup to volumes (OnRootMismatch or Always)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fs_group_change_policy: Option<String>,
    /// Require all containers to run as non-root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_non_root: Option<bool>,
}

// =============================================================================
// Volumes
// =============================================================================

/// Volume
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume name
    pub name: String,
    /// EmptyDir source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirVolumeSource>,
}

impl Volume {
    /// Create a Volume backed by an emptyDir on the node's default medium.
    pub fn from_empty_dir(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            empty_dir: Some(EmptyDirVolumeSource::default()),
        }
    }
}

/// EmptyDir volume source on the node's default medium, without a size limit
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct EmptyDirVolumeSource {}

/// Volume mount
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    /// Mount path
    pub mount_path: String,
    /// Volume name
    pub name: String,
}

impl VolumeMount {
    /// Mount the named volume at a path
    pub fn new(name: impl Into<String>, mount_path: impl Into<String>) -> Self {
        Self {
            mount_path: mount_path.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_renders_as_millicores() {
        assert_eq!(Cpu::millis(100).to_string(), "100m");
        assert_eq!(Cpu::millis(500).to_string(), "500m");
        assert!(Cpu::millis(100) < Cpu::millis(500));
    }

    #[test]
    fn memory_renders_as_mebibytes() {
        assert_eq!(Memory::mebibytes(64).to_string(), "64Mi");
        assert_eq!(Memory::mebibytes(256).to_string(), "256Mi");
    }

    #[test]
    fn pull_policy_serializes_with_k8s_casing() {
        let json = serde_json::to_string(&ImagePullPolicy::IfNotPresent).unwrap();
        assert_eq!(json, "\"IfNotPresent\"");
        let parsed: ImagePullPolicy = serde_json::from_str("\"Never\"").unwrap();
        assert_eq!(parsed, ImagePullPolicy::Never);
    }

    #[test]
    fn empty_dir_volume_serializes_to_empty_object() {
        let json = serde_json::to_value(Volume::from_empty_dir("tmp")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "tmp", "emptyDir": {}}));
    }

    #[test]
    fn http_probe_defaults() {
        let probe = ProbeSpec::http_get("/healthz", 3000);
        let json = serde_json::to_value(&probe).unwrap();
        assert_eq!(json["failureThreshold"], 3);
        assert_eq!(json["httpGet"]["path"], "/healthz");
        assert_eq!(json["httpGet"]["port"], 3000);
        assert_eq!(json["httpGet"]["scheme"], "HTTP");
    }

    #[test]
    fn metadata_omits_unset_namespace() {
        let json = serde_json::to_value(ObjectMeta::new("spin")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "spin"}));

        let meta = ObjectMeta::new("spin").with_namespace(Some("dev".to_string()));
        assert_eq!(serde_json::to_value(meta).unwrap()["namespace"], "dev");
    }
}
