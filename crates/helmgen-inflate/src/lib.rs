//! helmgen Inflate - Rendering Helm charts into resources
//!
//! The pipeline, run once per chart:
//! 1. [`config`] validates settings and the chart configuration
//! 2. [`locator`] decides whether the chart must be pulled
//! 3. [`reconcile`] writes the effective values file
//! 4. [`runner`] runs `helm` with an isolated environment
//! 5. [`output`] parses what `helm template` printed
//!
//! [`HelmChartInflationGenerator`] ties these together.

pub mod args;
pub mod config;
pub mod error;
pub mod generator;
pub mod locator;
pub mod output;
pub mod reconcile;
pub mod runner;
pub mod scratch;

pub use config::{resolve, resolve_config, InflationParams, RenderOptions, ValuesSpec};
pub use error::{InflateError, Result};
pub use generator::{inflate, HelmChartInflationGenerator};
pub use locator::{locate_chart, pull_args, ChartLocation};
pub use output::parse_output;
pub use runner::{detect_version, HelmRunner, ToolOutput};
pub use scratch::Scratch;
