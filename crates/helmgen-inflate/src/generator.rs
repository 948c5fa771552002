//! The chart inflation pipeline

use helmgen_core::{HelmSettings, Loader, ResourceCollection, ResourceFactory};
use std::path::{Path, PathBuf};

use crate::args::template_args;
use crate::config::{resolve, InflationParams};
use crate::error::{InflateError, Result};
use crate::locator::{locate_chart, pull_args, ChartLocation};
use crate::output::parse_output;
use crate::reconcile::reconcile;
use crate::runner::HelmRunner;
use crate::scratch::Scratch;

/// Directory below the scratch dir used as helm's home when none is configured
pub const SCRATCH_TOOL_HOME: &str = "helm";

/// Inflates one chart into resources
///
/// Each generator owns its scratch directory, so generators for different
/// charts can run on different threads against the same loader.
pub struct HelmChartInflationGenerator<'a> {
    params: InflationParams,
    loader: &'a dyn Loader,
    factory: &'a dyn ResourceFactory,
    scratch: Scratch,
}

impl<'a> HelmChartInflationGenerator<'a> {
    pub fn new(
        params: InflationParams,
        loader: &'a dyn Loader,
        factory: &'a dyn ResourceFactory,
    ) -> Self {
        Self {
            params,
            loader,
            factory,
            scratch: Scratch::new(),
        }
    }

    /// Resolve a raw chart configuration and build a generator for it
    pub fn configure(
        settings: &HelmSettings,
        config: &[u8],
        loader: &'a dyn Loader,
        factory: &'a dyn ResourceFactory,
    ) -> Result<Self> {
        let params = resolve(settings, config, loader)?;
        Ok(Self::new(params, loader, factory))
    }

    /// Current parameters; after a merge the inline values hold the merged tree
    pub fn params(&self) -> &InflationParams {
        &self.params
    }

    /// Run the whole pipeline
    ///
    /// The scratch directory is removed before returning, whatever the outcome.
    pub fn generate(&mut self) -> Result<ResourceCollection> {
        let result = self.run();
        self.scratch.release();
        result
    }

    fn run(&mut self) -> Result<ResourceCollection> {
        let dir = self.scratch.path().map_err(|e| {
            InflateError::config(format!("unable to create tmp dir for HELM_CONFIG_HOME: {}", e))
        })?;
        let runner = HelmRunner::new(&self.params.command, self.tool_home(&dir));

        runner.check_version()?;

        if let ChartLocation::FetchRequired = locate_chart(&self.params.chart)? {
            tracing::info!(
                chart = %self.params.chart.name,
                repo = self.params.chart.repo.as_deref().unwrap_or_default(),
                "pulling chart"
            );
            runner.run(&pull_args(&self.params.chart))?;
        }

        let values_file = reconcile(
            &mut self.params.values,
            &self.params.chart.name,
            self.loader,
            &dir,
        )?;

        let output = runner.run(&template_args(&self.params, &values_file))?;
        let resources = parse_output(self.factory, &output.stdout)?;
        tracing::info!(
            chart = %self.params.chart.name,
            resources = resources.len(),
            "chart inflated"
        );
        Ok(resources)
    }

    fn tool_home(&self, scratch: &Path) -> PathBuf {
        self.params
            .config_home
            .clone()
            .unwrap_or_else(|| scratch.join(SCRATCH_TOOL_HOME))
    }
}

/// Resolve `config` and inflate it in one call
pub fn inflate(
    settings: &HelmSettings,
    config: &[u8],
    loader: &dyn Loader,
    factory: &dyn ResourceFactory,
) -> Result<ResourceCollection> {
    HelmChartInflationGenerator::configure(settings, config, loader, factory)?.generate()
}
