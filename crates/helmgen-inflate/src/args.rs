//! `helm template` command line

use std::path::Path;

use crate::config::InflationParams;

/// Build the `helm template` arguments for a chart and its effective values file
pub fn template_args(params: &InflationParams, values_file: &Path) -> Vec<String> {
    let render = &params.render;
    let mut args = vec!["template".to_string()];

    match &render.release_name {
        Some(name) => args.push(name.clone()),
        None => args.push("--generate-name".to_string()),
    }
    args.push(params.chart.chart_dir().display().to_string());

    if let Some(namespace) = &render.namespace {
        args.extend(["--namespace".to_string(), namespace.clone()]);
    }
    if let Some(template) = &render.name_template {
        args.extend(["--name-template".to_string(), template.clone()]);
    }

    args.extend(["-f".to_string(), values_file.display().to_string()]);
    for file in &params.values.additional_files {
        args.extend(["-f".to_string(), file.display().to_string()]);
    }

    for version in &render.api_versions {
        args.extend(["--api-versions".to_string(), version.clone()]);
    }
    if let Some(version) = &render.kube_version {
        args.extend(["--kube-version".to_string(), version.clone()]);
    }

    if render.include_crds {
        args.push("--include-crds".to_string());
    }
    if render.skip_tests {
        args.push("--skip-tests".to_string());
    }
    if render.skip_hooks {
        args.push("--no-hooks".to_string());
    }
    if render.debug {
        args.push("--debug".to_string());
    }

    args
}
