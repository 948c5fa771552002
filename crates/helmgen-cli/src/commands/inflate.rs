//! Inflate command - render a chart configuration into resources

use console::style;
use helmgen_core::{FileLoader, HelmSettings, LoadRestriction, Loader, Resource, YamlResourceFactory};
use helmgen_inflate::HelmChartInflationGenerator;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};

#[allow(clippy::too_many_arguments)]
pub fn run(
    config_path: &Path,
    root: Option<&Path>,
    restriction: LoadRestriction,
    settings: &HelmSettings,
    output_dir: Option<&Path>,
    json: bool,
    show_values: bool,
    debug: bool,
) -> Result<()> {
    let config = fs::read(config_path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read chart configuration {}", config_path.display()))?;

    let root = root.map(Path::to_path_buf).unwrap_or_else(|| default_root(config_path));
    let loader = FileLoader::new(&root, restriction)
        .into_diagnostic()
        .wrap_err_with(|| format!("Invalid loader root {}", root.display()))?;

    if debug {
        eprintln!(
            "{} Loading files below {} ({})",
            style("DEBUG").dim(),
            loader.root().display(),
            restriction
        );
    }

    let factory = YamlResourceFactory;
    let mut generator = HelmChartInflationGenerator::configure(settings, &config, &loader, &factory)?;

    if debug {
        let params = generator.params();
        eprintln!(
            "{} Chart {} (version {}, values {}, policy {})",
            style("DEBUG").dim(),
            params.chart.name,
            params.chart.version.as_deref().unwrap_or("unset"),
            params.values.file.display(),
            params.values.policy
        );
    }

    let resources = generator.generate()?;

    if show_values {
        let values = &generator.params().values;
        println!("{}", style("# Computed Values").cyan().bold());
        println!("---");
        if values.inline.is_empty() {
            println!("# unchanged from {}", values.file.display());
        } else {
            let yaml = values
                .inline
                .to_yaml()
                .into_diagnostic()
                .wrap_err("Failed to serialize values")?;
            println!("{}", yaml.trim_end());
        }
        println!("---");
        println!();
    }

    if let Some(output_path) = output_dir {
        fs::create_dir_all(output_path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create output directory: {}", output_path.display()))?;

        for (index, resource) in resources.iter().enumerate() {
            let file_path = output_path.join(file_name(index, resource));
            let yaml = resource.to_yaml().into_diagnostic()?;
            fs::write(&file_path, yaml)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write {}", file_path.display()))?;

            println!("{} {}", style("wrote").green(), file_path.display());
        }
    } else if json {
        let out = serde_json::to_string_pretty(&resources)
            .into_diagnostic()
            .wrap_err("Failed to serialize resources as JSON")?;
        println!("{}", out);
    } else {
        let out = resources
            .to_yaml()
            .into_diagnostic()
            .wrap_err("Failed to serialize resources")?;
        print!("{}", out);
    }

    Ok(())
}

/// Values files are resolved next to the configuration by default
fn default_root(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `<index>-<kind>-<name>.yaml`, lowercased
///
/// Kind and name come from rendered output, so anything outside
/// `[a-z0-9._-]` becomes `_` and the result is always a single path component.
fn file_name(index: usize, resource: &Resource) -> String {
    format!(
        "{:03}-{}-{}.yaml",
        index,
        sanitize(resource.kind().unwrap_or("resource")),
        sanitize(resource.name().unwrap_or("unnamed"))
    )
}

fn sanitize(part: &str) -> String {
    part.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}
