//! Resolving process settings and chart configuration into inflation parameters

use helmgen_core::{
    ChartRef, HelmChartConfig, HelmSettings, Loader, MergePolicy, Values, DEFAULT_CHART_HOME,
};
use std::path::{Path, PathBuf};

use crate::error::{InflateError, Result};

/// Validated parameters of one chart inflation
#[derive(Debug, Clone)]
pub struct InflationParams {
    /// Renderer executable
    pub command: String,
    pub chart: ChartRef,
    pub values: ValuesSpec,
    pub render: RenderOptions,
    /// Renderer home chosen by the user; a scratch directory is used otherwise
    pub config_home: Option<PathBuf>,
}

/// Where chart values come from and how they combine
#[derive(Debug, Clone)]
pub struct ValuesSpec {
    /// Base values file, read through the loader
    pub file: PathBuf,
    /// Absolute paths of supplementary values files
    pub additional_files: Vec<PathBuf>,
    /// Inline values; replaced by the merged tree once values are reconciled
    pub inline: Values,
    pub policy: MergePolicy,
}

/// Options forwarded to `helm template`
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub release_name: Option<String>,
    pub namespace: Option<String>,
    pub name_template: Option<String>,
    pub include_crds: bool,
    pub skip_hooks: bool,
    pub skip_tests: bool,
    pub api_versions: Vec<String>,
    pub kube_version: Option<String>,
    pub debug: bool,
}

/// Parse and validate a raw chart configuration payload
pub fn resolve(
    settings: &HelmSettings,
    config: &[u8],
    loader: &dyn Loader,
) -> Result<InflationParams> {
    check_settings(settings)?;
    let config = HelmChartConfig::from_slice(config).map_err(|e| {
        InflateError::config_with_help(
            format!("invalid chart configuration: {}", e),
            "see the HelmChartInflationGenerator fields: name, version, repo, valuesInline, ...",
        )
    })?;
    resolve_config(settings, config, loader)
}

/// Validate an already-parsed chart configuration
pub fn resolve_config(
    settings: &HelmSettings,
    mut config: HelmChartConfig,
    loader: &dyn Loader,
) -> Result<InflationParams> {
    check_settings(settings)?;
    settings.apply_overrides(&mut config);

    if config.name.trim().is_empty() {
        return Err(InflateError::config("chart name cannot be empty"));
    }

    let policy = match config.values_merge.as_deref() {
        None | Some("") => MergePolicy::default(),
        Some(value) => value
            .parse::<MergePolicy>()
            .map_err(|e| InflateError::config(format!("valuesMerge: {}", e)))?,
    };

    let home = config
        .chart_home
        .clone()
        .filter(|h| !h.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHART_HOME));
    let chart = ChartRef::new(
        config.name.clone(),
        config.version.clone(),
        config.repo.clone(),
        &home,
        loader.root(),
    );

    let file = config
        .values_file
        .clone()
        .filter(|f| !f.as_os_str().is_empty())
        .unwrap_or_else(|| chart.default_values_file());

    let additional_files = config
        .additional_values_files
        .iter()
        .map(|f| resolve_additional_file(f, loader))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        chart = %chart.name,
        version = chart.version.as_deref().unwrap_or("-"),
        home = %chart.home().display(),
        policy = %policy,
        "resolved chart configuration"
    );

    Ok(InflationParams {
        command: settings.command.clone(),
        chart,
        values: ValuesSpec {
            file,
            additional_files,
            inline: config.values_inline,
            policy,
        },
        render: RenderOptions {
            release_name: config.release_name.filter(|s| !s.is_empty()),
            namespace: config.namespace.filter(|s| !s.is_empty()),
            name_template: config.name_template.filter(|s| !s.is_empty()),
            include_crds: config.include_crds,
            skip_hooks: config.skip_hooks,
            skip_tests: config.skip_tests,
            api_versions: config.api_versions,
            kube_version: config.kube_version.filter(|s| !s.is_empty()),
            debug: config.debug,
        },
        config_home: config.config_home.filter(|h| !h.as_os_str().is_empty()),
    })
}

fn check_settings(settings: &HelmSettings) -> Result<()> {
    if !settings.enabled {
        return Err(InflateError::config_with_help(
            "must specify --enable-helm",
            "chart inflation runs an external program and is disabled by default",
        ));
    }
    if settings.command.trim().is_empty() {
        return Err(InflateError::config("must specify --helm-command"));
    }
    Ok(())
}

/// Check a supplementary values file is loadable and make its path absolute
fn resolve_additional_file(file: &Path, loader: &dyn Loader) -> Result<PathBuf> {
    loader.load(file).map_err(|e| {
        InflateError::config(format!(
            "could not load additionalValuesFile '{}': {}",
            file.display(),
            e
        ))
    })?;
    Ok(if file.is_absolute() {
        file.to_path_buf()
    } else {
        loader.root().join(file)
    })
}
