//! Deciding whether a chart must be pulled

use helmgen_core::ChartRef;
use std::path::PathBuf;

use crate::error::{InflateError, Result};

/// Where the chart will come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartLocation {
    /// Already unpacked at this directory
    Local(PathBuf),
    /// Must be pulled from the chart's repo before rendering
    FetchRequired,
}

/// Check the chart directory on disk
///
/// Nothing remote is probed. A missing chart without a repo is an error
/// since there is no way to obtain it.
pub fn locate_chart(chart: &ChartRef) -> Result<ChartLocation> {
    let dir = chart.chart_dir();
    if dir.is_dir() {
        tracing::debug!(chart = %chart.name, path = %dir.display(), "chart found locally");
        return Ok(ChartLocation::Local(dir));
    }
    if chart.repo.is_none() {
        return Err(InflateError::ChartNotFound { path: dir });
    }
    tracing::debug!(chart = %chart.name, path = %dir.display(), "chart not found locally, pull required");
    Ok(ChartLocation::FetchRequired)
}

/// Arguments of the `helm pull` that unpacks the chart into its home
pub fn pull_args(chart: &ChartRef) -> Vec<String> {
    let mut args = vec![
        "pull".to_string(),
        "--untar".to_string(),
        "--untardir".to_string(),
        chart.home().display().to_string(),
    ];

    match chart.repo.as_deref() {
        Some(repo) if chart.is_oci() => {
            args.push(format!("{}/{}", repo.trim_end_matches('/'), chart.name));
        }
        Some(repo) => {
            args.push("--repo".to_string());
            args.push(repo.to_string());
            args.push(chart.name.clone());
        }
        None => args.push(chart.name.clone()),
    }

    if let Some(version) = &chart.version {
        args.push("--version".to_string());
        args.push(version.clone());
    }

    args
}
