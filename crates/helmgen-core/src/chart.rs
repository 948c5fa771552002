//! Chart inflation configuration and chart references

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{CoreError, Result};
use crate::values::{Precedence, Values};

/// Chart home used when the configuration does not name one
pub const DEFAULT_CHART_HOME: &str = "charts";

/// Scheme prefix of container-registry chart locations
pub const OCI_SCHEME: &str = "oci://";

/// Per-invocation chart configuration, as written by the user
///
/// ```yaml
/// name: minecraft
/// version: 3.1.3
/// repo: https://itzg.github.io/minecraft-server-charts
/// releaseName: moria
/// valuesInline:
///   minecraftServer:
///     eula: true
/// valuesMerge: override
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartConfig {
    /// Chart name (required)
    #[serde(default)]
    pub name: String,

    /// Chart version; pulled charts land in `<chartHome>/<name>-<version>`
    #[serde(default)]
    pub version: Option<String>,

    /// Repository URL or `oci://` registry location to pull from
    #[serde(default)]
    pub repo: Option<String>,

    /// Release name; `--generate-name` is used when absent
    #[serde(default)]
    pub release_name: Option<String>,

    /// Namespace passed to the renderer
    #[serde(default)]
    pub namespace: Option<String>,

    /// Template for generated release names
    #[serde(default)]
    pub name_template: Option<String>,

    /// Directory holding charts, relative to the loader root unless absolute
    #[serde(default)]
    pub chart_home: Option<PathBuf>,

    /// Renderer configuration home; a scratch directory is used when absent
    #[serde(default)]
    pub config_home: Option<PathBuf>,

    /// Base values file
    #[serde(default)]
    pub values_file: Option<PathBuf>,

    /// Supplementary values files, applied after the base file
    #[serde(default)]
    pub additional_values_files: Vec<PathBuf>,

    /// Inline values embedded in the configuration
    #[serde(default)]
    pub values_inline: Values,

    /// How inline values combine with the base values file
    #[serde(default)]
    pub values_merge: Option<String>,

    #[serde(default, rename = "includeCRDs")]
    pub include_crds: bool,

    #[serde(default)]
    pub skip_hooks: bool,

    #[serde(default)]
    pub skip_tests: bool,

    /// Kubernetes API versions advertised to the chart
    #[serde(default)]
    pub api_versions: Vec<String>,

    /// Kubernetes version advertised to the chart
    #[serde(default)]
    pub kube_version: Option<String>,

    /// Pass `--debug` to the renderer
    #[serde(default)]
    pub debug: bool,
}

impl HelmChartConfig {
    /// Parse a configuration payload
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(bytes)?)
    }
}

/// Policy for combining inline values with the base values file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Base values win; inline values only fill gaps
    Merge,
    /// Inline values win; base values fill gaps
    #[default]
    Override,
    /// Inline values are used alone
    Replace,
}

impl MergePolicy {
    pub const ALL: [MergePolicy; 3] = [Self::Merge, Self::Override, Self::Replace];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Override => "override",
            Self::Replace => "replace",
        }
    }

    /// Precedence of the inline values over the base file, if the policy merges
    pub fn inline_precedence(&self) -> Option<Precedence> {
        match self {
            Self::Merge => Some(Precedence::Base),
            Self::Override => Some(Precedence::Overlay),
            Self::Replace => None,
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::InvalidMergePolicy {
                value: s.to_string(),
                expected: format!(
                    "[{}]",
                    Self::ALL.map(|p| p.as_str()).join(" ")
                ),
            })
    }
}

/// A chart identified by name, version and source, rooted in a chart home
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRef {
    pub name: String,
    pub version: Option<String>,
    pub repo: Option<String>,
    home: PathBuf,
}

impl ChartRef {
    /// Create a chart reference; a relative `home` is joined onto `root`
    pub fn new(
        name: impl Into<String>,
        version: Option<String>,
        repo: Option<String>,
        home: &Path,
        root: &Path,
    ) -> Self {
        let home = if home.is_absolute() {
            home.to_path_buf()
        } else {
            root.join(home)
        };
        Self {
            name: name.into(),
            version: version.filter(|v| !v.is_empty()),
            repo: repo.filter(|r| !r.is_empty()),
            home,
        }
    }

    /// Directory charts are looked up in and pulled into
    ///
    /// Versioned charts get their own `<name>-<version>` directory so that
    /// several versions of one chart can coexist.
    pub fn home(&self) -> PathBuf {
        match &self.version {
            Some(version) => self.home.join(format!("{}-{}", self.name, version)),
            None => self.home.clone(),
        }
    }

    /// Directory of the chart itself
    pub fn chart_dir(&self) -> PathBuf {
        self.home().join(&self.name)
    }

    /// Values file shipped with the chart
    pub fn default_values_file(&self) -> PathBuf {
        self.chart_dir().join("values.yaml")
    }

    /// Whether the repo is a container registry
    pub fn is_oci(&self) -> bool {
        self.repo.as_deref().is_some_and(|r| r.starts_with(OCI_SCHEME))
    }
}
