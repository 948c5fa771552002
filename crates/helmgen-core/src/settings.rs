//! Process-wide renderer settings
//!
//! These come from the host process (command line flags, environment) and
//! are handed to the inflation pipeline explicitly. Non-empty settings take
//! precedence over the same fields in a chart configuration.

use serde::{Deserialize, Serialize};

use crate::chart::HelmChartConfig;

/// Settings shared by every chart inflation in a process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmSettings {
    /// Chart inflation is opt-in
    #[serde(default)]
    pub enabled: bool,

    /// Renderer executable, e.g. `helm` or `/usr/local/bin/helm`
    #[serde(default)]
    pub command: String,

    /// Kubernetes version override
    #[serde(default)]
    pub kube_version: String,

    /// Kubernetes API versions override
    #[serde(default)]
    pub api_versions: Vec<String>,

    /// Force `--debug` on every render
    #[serde(default)]
    pub debug: bool,
}

impl HelmSettings {
    /// Settings with inflation enabled for the given renderer command
    pub fn enabled(command: impl Into<String>) -> Self {
        Self {
            enabled: true,
            command: command.into(),
            ..Default::default()
        }
    }

    /// Overwrite the fields of `config` these settings pin
    pub fn apply_overrides(&self, config: &mut HelmChartConfig) {
        if !self.kube_version.is_empty() {
            config.kube_version = Some(self.kube_version.clone());
        }
        if !self.api_versions.is_empty() {
            config.api_versions = self.api_versions.clone();
        }
        if self.debug {
            config.debug = true;
        }
    }
}
