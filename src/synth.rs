//! Manifest synthesis
//!
//! Renders a [`ManifestSet`] and writes it to the output directory as one
//! file per chart (`<chart>.k8s.yaml` or `<chart>.k8s.json`), ready for
//! `kubectl apply -f dist/` or a Flux `Kustomization` pointed at the directory.
//!
//! The file contents are fully rendered before the filesystem is touched and
//! land via write-to-temp + rename, so a failed run never leaves a truncated
//! manifest behind.
//!
//! The synthesizer owns every `*.k8s.yaml` / `*.k8s.json` file in the output
//! directory. Manifests left by earlier runs (another format or chart id) are
//! removed so `kubectl apply -f dist/` only sees the current chart. Other
//! files are left alone.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, info};

use crate::workload::ManifestSet;
use crate::Result;

/// Serialization format for synthesized manifests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Multi-document YAML
    #[default]
    Yaml,
    /// A single `v1` `List` object in JSON
    Json,
}

impl OutputFormat {
    const ALL: [Self; 2] = [Self::Yaml, Self::Json];

    /// File extension, including the `.k8s` infix
    pub fn extension(self) -> &'static str {
        match self {
            Self::Yaml => "k8s.yaml",
            Self::Json => "k8s.json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Render a manifest set to file contents.
///
/// YAML output puts the Deployment first, separates documents with `---` and
/// ends with a newline.
pub fn render(manifests: &ManifestSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => {
            let docs = [
                serde_yaml::to_string(&manifests.deployment)?,
                serde_yaml::to_string(&manifests.service)?,
            ];
            Ok(docs.join("---\n"))
        }
        OutputFormat::Json => {
            let items = manifests.to_values()?;
            let list = json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": items,
            });
            let mut out = serde_json::to_string_pretty(&list)?;
            out.push('\n');
            Ok(out)
        }
    }
}

/// Writes rendered charts into an output directory.
#[derive(Clone, Debug)]
pub struct Synthesizer {
    output_dir: PathBuf,
    format: OutputFormat,
}

impl Synthesizer {
    /// Synthesizer writing YAML into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: OutputFormat::default(),
        }
    }

    /// Set the output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Path the chart's manifest file is written to
    pub fn manifest_path(&self, chart: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", chart, self.format.extension()))
    }

    /// Render and write a chart. Returns the path written.
    pub fn synth(&self, chart: &str, manifests: &ManifestSet) -> Result<PathBuf> {
        let contents = render(manifests, self.format)?;

        std::fs::create_dir_all(&self.output_dir)?;

        let path = self.manifest_path(chart);
        let tmp = self
            .output_dir
            .join(format!("{}.{}.tmp", chart, self.format.extension()));
        debug!(tmp = %tmp.display(), bytes = contents.len(), "writing manifests");

        if let Err(e) = std::fs::write(&tmp, &contents) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = self.remove_stale(&path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        info!(
            path = %path.display(),
            format = %self.format,
            resources = manifests.resource_count(),
            "synthesized manifests"
        );
        Ok(path)
    }

    /// Delete manifests in the output directory other than `keep`.
    fn remove_stale(&self, keep: &Path) -> Result<()> {
        for entry in std::fs::read_dir(&self.output_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path == keep || !entry.file_type()?.is_file() || !is_manifest(&path) {
                continue;
            }
            info!(path = %path.display(), "removing stale manifest");
            std::fs::remove_file(&path)?;
        }
        Ok(())
    }
}

fn is_manifest(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    OutputFormat::ALL
        .iter()
        .any(|f| name.ends_with(&format!(".{}", f.extension())))
}
