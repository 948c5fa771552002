//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

#![allow(dead_code)]

use helmgen_inflate::InflateError;
use miette::Report;

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - invalid chart configuration or settings
pub const CONFIG_ERROR: i32 = 2;

/// Chart error - chart missing or its values unusable
pub const CHART_ERROR: i32 = 3;

/// Render error - helm failed, is unsupported, or printed unparsable output
pub const RENDER_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;

/// Exit code for an inflation error
pub fn for_error(err: &InflateError) -> i32 {
    match err {
        InflateError::Configuration { .. } => CONFIG_ERROR,
        InflateError::ChartNotFound { .. } | InflateError::ValuesMerge { .. } => CHART_ERROR,
        InflateError::UnsupportedToolVersion { .. }
        | InflateError::Render { .. }
        | InflateError::OutputParse { .. } => RENDER_ERROR,
    }
}

/// Exit code for a reported error, looking through added context
pub fn for_report(report: &Report) -> i32 {
    if let Some(err) = report.downcast_ref::<InflateError>() {
        return for_error(err);
    }
    if report.downcast_ref::<std::io::Error>().is_some() {
        return IO_ERROR;
    }
    ERROR
}
