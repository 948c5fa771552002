//! Inflation error types
//!
//! Every failure of the pipeline is terminal for the invocation. Errors
//! coming out of the renderer carry enough context (command, arguments,
//! environment, captured output) to reproduce the call by hand.

use helmgen_core::CoreError;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main inflation error type
#[derive(Error, Debug, Diagnostic)]
pub enum InflateError {
    /// Missing or invalid input, detected before any process runs
    #[error("{message}")]
    #[diagnostic(code(helmgen::config))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// No local chart and nowhere to pull it from
    #[error("no repo specified for pull, no chart found at '{}'", .path.display())]
    #[diagnostic(
        code(helmgen::chart_not_found),
        help("set `repo` to pull the chart, or place the chart under the chart home")
    )]
    ChartNotFound { path: PathBuf },

    /// The base values could not be loaded, parsed, merged or written
    #[error("{message}")]
    #[diagnostic(code(helmgen::values))]
    ValuesMerge {
        message: String,
        #[source]
        source: Option<CoreError>,
    },

    /// The renderer is not helm v3
    #[error("{message}")]
    #[diagnostic(
        code(helmgen::tool_version),
        help("install helm v3 and point --helm-command at it")
    )]
    UnsupportedToolVersion {
        message: String,
        version: Option<String>,
    },

    /// The renderer could not be started or exited unsuccessfully
    #[error(
        "unable to run: '{command} {}' with env={env:?} (is '{command}' installed?): {reason}{}",
        .args.join(" "),
        captured_output(.stderr, .stdout)
    )]
    #[diagnostic(code(helmgen::render))]
    Render {
        command: String,
        args: Vec<String>,
        env: Vec<String>,
        reason: String,
        stderr: String,
        /// Only captured when the renderer ran with `--debug`
        stdout: Option<String>,
    },

    /// Neither the strict nor the lenient parse produced resources
    #[error("could not parse renderer output into resources: {source}{}", fallback_note(.fallback))]
    #[diagnostic(code(helmgen::output))]
    OutputParse {
        #[source]
        source: CoreError,
        /// Why the lenient re-read failed, if it got that far
        fallback: Option<String>,
    },
}

impl InflateError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: None,
        }
    }

    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    pub fn values(message: impl Into<String>, source: CoreError) -> Self {
        Self::ValuesMerge {
            message: message.into(),
            source: Some(source),
        }
    }
}

fn captured_output(stderr: &str, stdout: &Option<String>) -> String {
    match stdout {
        Some(stdout) => format!(
            "\n Helm stack trace:\n{}\nHelm template:\n{}\n",
            stderr, stdout
        ),
        None if stderr.trim().is_empty() => String::new(),
        None => format!("\n{}", stderr.trim_end()),
    }
}

fn fallback_note(fallback: &Option<String>) -> String {
    match fallback {
        Some(reason) => format!(" (lenient re-read also failed: {})", reason),
        None => " (no resource documents found after skipping leading text)".to_string(),
    }
}

/// Result type for inflation operations
pub type Result<T> = std::result::Result<T, InflateError>;
