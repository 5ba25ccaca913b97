//! Chart configuration
//!
//! Values are resolved in this order (highest priority first):
//! 1. Explicit CLI flags
//! 2. A YAML values file passed with `--values`
//! 3. Built-in defaults ([`ChartConfig::local_dev`])
//!
//! [`ChartConfig::validate`] turns the loosely typed configuration into
//! [`ChartParams`], whose fields are already range-checked. The chart compiler
//! only accepts `ChartParams`, so an invalid value can never reach a manifest.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result, DEFAULT_CHART_NAME, DEFAULT_IMAGE, DEFAULT_PORT, DEFAULT_REPLICAS,
    DEFAULT_SERVICE_NAME, DEFAULT_SERVICE_PORT,
};

/// Longest name Kubernetes accepts for an RFC 1123 label
const MAX_DNS_LABEL_LEN: usize = 63;

/// User-facing chart configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ChartConfig {
    /// Chart id; names the output file and prefixes the Deployment name.
    pub name: String,
    /// Container image reference.
    pub image: String,
    /// Desired replica count.
    pub replicas: i32,
    /// Port the Spin HTTP trigger listens on inside the container.
    pub port: u32,
    /// Port the Service exposes inside the cluster.
    pub service_port: u32,
    /// Service name used for `kubectl port-forward svc/<name>`.
    pub service_name: String,
    /// Target namespace; left out of the manifests when unset.
    pub namespace: Option<String>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHART_NAME.to_string(),
            image: DEFAULT_IMAGE.to_string(),
            replicas: DEFAULT_REPLICAS,
            port: DEFAULT_PORT,
            service_port: DEFAULT_SERVICE_PORT,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            namespace: None,
        }
    }
}

impl ChartConfig {
    /// Configuration for Docker Desktop / kind / k3d development.
    pub fn local_dev() -> Self {
        Self::default()
    }

    /// Parse a values document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(Self::parse_values(yaml)?)
    }

    /// Load a values file from disk.
    pub fn from_values_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| Error::ValuesFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_values(&data).map_err(|source| Error::ValuesParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse_values(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Check every field and return the typed parameters the chart is built from.
    pub fn validate(&self) -> Result<ChartParams> {
        if self.image.is_empty() {
            return Err(Error::validation("image must not be empty"));
        }
        if self.image.chars().any(char::is_whitespace) {
            return Err(Error::validation(format!(
                "image '{}' must not contain whitespace",
                self.image
            )));
        }

        if self.replicas < 1 {
            return Err(Error::validation(format!(
                "replicas must be at least 1, got {}",
                self.replicas
            )));
        }

        let port = validate_port("port", self.port)?;
        let service_port = validate_port("servicePort", self.service_port)?;

        validate_dns_label("name", &self.name)?;
        validate_dns_label("serviceName", &self.service_name)?;
        if let Some(ns) = &self.namespace {
            validate_dns_label("namespace", ns)?;
        }

        Ok(ChartParams {
            name: self.name.clone(),
            image: self.image.clone(),
            replicas: self.replicas,
            port,
            service_port,
            service_name: self.service_name.clone(),
            namespace: self.namespace.clone(),
        })
    }
}

/// Validated chart parameters.
///
/// Only constructed by [`ChartConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartParams {
    name: String,
    image: String,
    replicas: i32,
    port: u16,
    service_port: u16,
    service_name: String,
    namespace: Option<String>,
}

impl ChartParams {
    /// Chart id
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Container image reference
    pub fn image(&self) -> &str {
        &self.image
    }

    /// Desired replica count (always positive)
    pub fn replicas(&self) -> i32 {
        self.replicas
    }

    /// Container port (never zero)
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Service port (never zero)
    pub fn service_port(&self) -> u16 {
        self.service_port
    }

    /// Service name
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Target namespace
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

fn validate_port(field: &str, port: u32) -> Result<u16> {
    match u16::try_from(port) {
        Ok(p) if p != 0 => Ok(p),
        _ => Err(Error::validation(format!(
            "{} {} is out of range (1-65535)",
            field, port
        ))),
    }
}

/// RFC 1123 label: lowercase alphanumerics and '-', alphanumeric at both ends.
fn validate_dns_label(field: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.len() > MAX_DNS_LABEL_LEN {
        return Err(Error::validation(format!(
            "{} '{}' must be 1-{} characters",
            field, value, MAX_DNS_LABEL_LEN
        )));
    }
    let valid_chars = value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid_chars || value.starts_with('-') || value.ends_with('-') {
        return Err(Error::validation(format!(
            "{} '{}' must consist of lowercase alphanumerics or '-' and start and end with an alphanumeric",
            field, value
        )));
    }
    Ok(())
}
