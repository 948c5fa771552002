//! helmgen Core - Core types for Helm chart inflation
//!
//! This crate provides the foundational types used throughout helmgen:
//! - `HelmChartConfig`: The per-invocation chart configuration
//! - `HelmSettings`: Process-wide renderer settings
//! - `ChartRef`: Where a chart lives on disk
//! - `Values`: Configuration values with structural merge support
//! - `Loader`: Restricted-root file access
//! - `Resource` / `ResourceFactory`: Rendered resources and how they are built

pub mod chart;
pub mod error;
pub mod loader;
pub mod resource;
pub mod settings;
pub mod values;

pub use chart::{ChartRef, HelmChartConfig, MergePolicy, DEFAULT_CHART_HOME, OCI_SCHEME};
pub use error::{CoreError, Result};
pub use loader::{FileLoader, LoadRestriction, Loader, MemoryLoader};
pub use resource::{Resource, ResourceCollection, ResourceFactory, YamlResourceFactory};
pub use settings::HelmSettings;
pub use values::{Precedence, Values};
