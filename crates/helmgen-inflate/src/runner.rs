//! Running the helm binary
//!
//! Every invocation gets `HELM_CONFIG_HOME`, `HELM_CACHE_HOME` and
//! `HELM_DATA_HOME` pointed at the invocation's own tool home, so no state
//! leaks between invocations and the user's global helm setup is never read.

use regex::Regex;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;

use crate::error::{InflateError, Result};

pub const HELM_CONFIG_HOME: &str = "HELM_CONFIG_HOME";
pub const HELM_CACHE_HOME: &str = "HELM_CACHE_HOME";
pub const HELM_DATA_HOME: &str = "HELM_DATA_HOME";

/// Only this major version of helm is supported
pub const SUPPORTED_MAJOR_VERSION: &str = "3";

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v?\d+(\.\d+)+").expect("version pattern is valid"));

/// Captured result of a successful renderer run
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
}

/// Runs helm with an isolated environment
#[derive(Debug, Clone)]
pub struct HelmRunner {
    command: String,
    home: PathBuf,
}

impl HelmRunner {
    /// Create a runner for `command` whose helm state lives under `home`
    pub fn new(command: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            home: home.into(),
        }
    }

    /// Environment variables set on every invocation
    pub fn env(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            (HELM_CONFIG_HOME, self.home.clone()),
            (HELM_CACHE_HOME, self.home.join(".cache")),
            (HELM_DATA_HOME, self.home.join(".data")),
        ]
    }

    /// Run helm with `args`, failing on spawn errors and non-zero exits
    pub fn run(&self, args: &[String]) -> Result<ToolOutput> {
        let env = self.env();
        tracing::debug!(command = %self.command, args = %args.join(" "), "running helm");

        let output = Command::new(&self.command)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|e| self.failure(args, &env, e.to_string(), String::new(), Vec::new()))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(self.failure(args, &env, output.status.to_string(), stderr, output.stdout));
        }

        if !stderr.trim().is_empty() {
            tracing::debug!(stderr = %stderr.trim_end(), "helm wrote to stderr");
        }

        Ok(ToolOutput {
            stdout: output.stdout,
            stderr,
        })
    }

    /// Check that the binary is helm v3, returning the reported version
    pub fn check_version(&self) -> Result<String> {
        let args: Vec<String> = ["version", "-c", "--short"]
            .into_iter()
            .map(String::from)
            .collect();
        let output = self.run(&args)?;
        let version = detect_version(&String::from_utf8_lossy(&output.stdout))?;
        tracing::debug!(%version, "helm version accepted");
        Ok(version)
    }

    fn failure(
        &self,
        args: &[String],
        env: &[(&'static str, PathBuf)],
        reason: String,
        stderr: String,
        stdout: Vec<u8>,
    ) -> InflateError {
        let debug = args.iter().any(|a| a == "--debug");
        InflateError::Render {
            command: self.command.clone(),
            args: args.to_vec(),
            env: env
                .iter()
                .map(|(k, v)| format!("{}={}", k, v.display()))
                .collect(),
            reason,
            stderr,
            stdout: debug.then(|| String::from_utf8_lossy(&stdout).into_owned()),
        }
    }
}

/// Find the version token in `helm version` output and check its major version
///
/// Accepts output such as `v3.14.0+g3fc9f4b` or `3.14.0`; returns the
/// version without the leading `v`.
pub fn detect_version(output: &str) -> Result<String> {
    let Some(found) = VERSION_RE.find(output) else {
        return Err(InflateError::UnsupportedToolVersion {
            message: format!("cannot find version string in {}", output.trim()),
            version: None,
        });
    };

    let version = found.as_str().trim_start_matches('v');
    let major = version.split('.').next().unwrap_or_default();
    if major != SUPPORTED_MAJOR_VERSION {
        return Err(InflateError::UnsupportedToolVersion {
            message: format!("helmgen requires helm V3 but got v{}", version),
            version: Some(version.to_string()),
        });
    }

    Ok(version.to_string())
}
