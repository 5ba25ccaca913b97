//! Command-line interface
//!
//! Running with no arguments synthesizes the local development chart into
//! `dist/`. Every flag is optional and overrides the matching key of the
//! values file, which in turn overrides the built-in defaults.

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::info;

use crate::chart::SpinChart;
use crate::config::{ChartConfig, ChartParams};
use crate::synth::{OutputFormat, Synthesizer};
use crate::{Result, DEFAULT_OUTPUT_DIR};

/// Generate Kubernetes manifests for a Spin WASM workload
#[derive(Parser, Debug)]
#[command(name = "spin-manifests", version, about, long_about = None)]
pub struct Cli {
    /// YAML values file (keys: name, image, replicas, port, servicePort, serviceName, namespace)
    #[arg(short = 'f', long)]
    pub values: Option<PathBuf>,

    /// Chart id; names the output file
    #[arg(long)]
    pub name: Option<String>,

    /// Container image reference
    #[arg(long)]
    pub image: Option<String>,

    /// Desired replica count
    #[arg(long, allow_negative_numbers = true)]
    pub replicas: Option<i32>,

    /// Container port served by Spin
    #[arg(long)]
    pub port: Option<u32>,

    /// Port exposed by the Service
    #[arg(long)]
    pub service_port: Option<u32>,

    /// Namespace for both objects (defaults to the kubectl context namespace)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Directory to write manifests to
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Do not print the usage summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Merge defaults, the values file and flags into one configuration.
    pub fn resolve_config(&self) -> Result<ChartConfig> {
        let mut config = match &self.values {
            Some(path) => {
                info!(values = %path.display(), "loading values file");
                ChartConfig::from_values_file(path)?
            }
            None => ChartConfig::local_dev(),
        };

        if let Some(name) = &self.name {
            config.name = name.clone();
        }
        if let Some(image) = &self.image {
            config.image = image.clone();
        }
        if let Some(replicas) = self.replicas {
            config.replicas = replicas;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(service_port) = self.service_port {
            config.service_port = service_port;
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = Some(namespace.clone());
        }

        Ok(config)
    }

    /// Run the generator
    pub fn run(self) -> Result<()> {
        let config = self.resolve_config()?;
        let params = config.validate()?;
        let manifests = SpinChart::build(&params);

        let path = Synthesizer::new(&self.output_dir)
            .with_format(self.format)
            .synth(params.name(), &manifests)?;

        if !self.quiet {
            println!("{}", usage_summary(&self.output_dir, &path, &params));
        }
        Ok(())
    }
}

/// Next steps printed after a successful run
pub fn usage_summary(output_dir: &Path, manifest: &Path, params: &ChartParams) -> String {
    let dir = output_dir.display();
    let image = params.image();
    let service = params.service_name();
    let service_port = params.service_port();

    format!(
        r#"
Kubernetes manifests generated: {manifest}

To deploy locally:
    kubectl apply -f {dir}/

To build and load the container image (for kind):
    docker build -t {image} backend/compute/runtime/
    kind load docker-image {image}

To port-forward and test:
    kubectl port-forward svc/{service} 8080:{service_port}
    curl http://localhost:8080/

For Flux GitOps, commit the {dir}/ directory to your repo.
"#,
        manifest = manifest.display(),
    )
}
