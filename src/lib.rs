//! spin-manifests - Kubernetes manifests for Spin WASM workloads
//!
//! Generates a Deployment and a ClusterIP Service for running a Spin container
//! on a local cluster (kind, k3d, minikube, Docker Desktop), written to a
//! directory that can be applied with `kubectl apply -f dist/` or committed
//! for Flux.
//!
//! # Modules
//!
//! - [`config`] - Chart configuration, values files and validation
//! - [`chart`] - Compiles a configuration into Kubernetes objects
//! - [`workload`] - Deployment and Service types
//! - [`k8s`] - Shared Kubernetes types (Container, Volume, probes, ...)
//! - [`synth`] - Renders and writes manifests to the output directory
//! - [`cli`] - Command-line interface
//! - [`error`] - Error types

#![deny(missing_docs)]

pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod k8s;
pub mod synth;
pub mod workload;

pub use chart::SpinChart;
pub use config::{ChartConfig, ChartParams};
pub use error::Error;
pub use synth::{OutputFormat, Synthesizer};
pub use workload::ManifestSet;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Default Configuration Constants
// =============================================================================

/// Chart id of the local development chart
pub const DEFAULT_CHART_NAME: &str = "spin-wasm-local";

/// Image built from the Spin runtime Dockerfile and side-loaded into the cluster
pub const DEFAULT_IMAGE: &str = "spin-wasm-demo:latest";

/// Default replica count
pub const DEFAULT_REPLICAS: i32 = 1;

/// Port the Spin HTTP trigger listens on
pub const DEFAULT_PORT: u32 = 3000;

/// Port the Service exposes inside the cluster
pub const DEFAULT_SERVICE_PORT: u32 = 80;

/// Name of the Service
pub const DEFAULT_SERVICE_NAME: &str = "spin-wasm-service";

/// Directory manifests are written to
pub const DEFAULT_OUTPUT_DIR: &str = "dist";
