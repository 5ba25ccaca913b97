//! End-to-end generation tests
//!
//! Drive the library the way the binary does: resolve a configuration,
//! compile the chart and synthesize it into a scratch directory.

use std::path::Path;

use clap::Parser;
use rstest::rstest;
use spin_manifests::cli::Cli;
use spin_manifests::{ChartConfig, Error, OutputFormat, SpinChart, Synthesizer};

fn generate(
    config: &ChartConfig,
    out: &Path,
    format: OutputFormat,
) -> spin_manifests::Result<String> {
    let manifests = SpinChart::compile(config)?;
    let path = Synthesizer::new(out)
        .with_format(format)
        .synth(&config.name, &manifests)?;
    Ok(std::fs::read_to_string(path)?)
}

fn documents(yaml: &str) -> Vec<serde_yaml::Value> {
    yaml.split("---\n")
        .map(|doc| serde_yaml::from_str(doc).expect("document should parse"))
        .collect()
}

#[test]
fn local_dev_chart_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let yaml = generate(&ChartConfig::local_dev(), dir.path(), OutputFormat::Yaml).unwrap();

    let docs = documents(&yaml);
    assert_eq!(docs.len(), 2);

    let deployment = &docs[0];
    assert_eq!(deployment["kind"].as_str(), Some("Deployment"));
    assert_eq!(deployment["spec"]["replicas"].as_i64(), Some(1));

    let container = &deployment["spec"]["template"]["spec"]["containers"][0];
    assert_eq!(container["image"].as_str(), Some("spin-wasm-demo:latest"));
    assert_eq!(container["ports"][0]["containerPort"].as_u64(), Some(3000));
    assert_eq!(container["resources"]["limits"]["cpu"].as_str(), Some("500m"));
    assert_eq!(container["resources"]["limits"]["memory"].as_str(), Some("256Mi"));

    let mounts: Vec<&str> = container["volumeMounts"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|m| m["mountPath"].as_str().unwrap())
        .collect();
    assert_eq!(mounts, vec!["/tmp", "/home/spin/.cache", "/app/.spin"]);

    let service = &docs[1];
    assert_eq!(service["kind"].as_str(), Some("Service"));
    assert_eq!(service["spec"]["ports"][0]["port"].as_u64(), Some(80));
    assert_eq!(service["spec"]["ports"][0]["targetPort"].as_u64(), Some(3000));

    assert_eq!(
        service["spec"]["selector"],
        deployment["spec"]["selector"]["matchLabels"]
    );
    assert_eq!(
        service["spec"]["selector"],
        deployment["spec"]["template"]["metadata"]["labels"]
    );
}

#[test]
fn regeneration_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = ChartConfig::from_yaml_str("replicas: 2\nport: 8080\n").unwrap();

    for format in [OutputFormat::Yaml, OutputFormat::Json] {
        let first = generate(&config, dir.path(), format).unwrap();
        let second = generate(&config, dir.path(), format).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn out_of_range_port_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    let config = ChartConfig::from_yaml_str("port: 70000\n").unwrap();

    let err = generate(&config, &out, OutputFormat::Yaml).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(!out.exists());
}

#[rstest]
#[case::malformed(Some("image: [unclosed\n"))]
#[case::unknown_key(Some("replica: 3\n"))]
#[case::unreadable(None)]
fn bad_values_file_writes_nothing(#[case] contents: Option<&str>) {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    let values = dir.path().join("values.yaml");
    if let Some(contents) = contents {
        std::fs::write(&values, contents).unwrap();
    }

    let cli = Cli::try_parse_from([
        "spin-manifests",
        "--quiet",
        "--values",
        values.to_str().unwrap(),
        "--output-dir",
        out.to_str().unwrap(),
    ])
    .unwrap();

    let err = cli.run().unwrap_err();
    assert!(matches!(
        err,
        Error::ValuesParse { .. } | Error::ValuesFile { .. }
    ));
    assert!(err.is_validation());
    assert!(!out.exists());
}

#[test]
fn rerun_with_other_format_leaves_one_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("dist");
    let out_arg = out.to_str().unwrap();

    Cli::try_parse_from(["spin-manifests", "--quiet", "--output-dir", out_arg])
        .unwrap()
        .run()
        .unwrap();
    Cli::try_parse_from([
        "spin-manifests",
        "--quiet",
        "--output-dir",
        out_arg,
        "--format",
        "json",
        "--replicas",
        "3",
    ])
    .unwrap()
    .run()
    .unwrap();

    let names: Vec<String> = std::fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["spin-wasm-local.k8s.json".to_string()]);
}
