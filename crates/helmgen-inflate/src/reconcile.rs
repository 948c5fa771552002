//! Producing the effective values file

use helmgen_core::{CoreError, Loader, Values};
use std::path::{Path, PathBuf};

use crate::config::ValuesSpec;
use crate::error::{InflateError, Result};

/// Suffix of the values file written for the renderer
pub const VALUES_FILE_SUFFIX: &str = "-helmgen-values.yaml";

/// Write the effective values for `chart_name` into `dir`
///
/// Without inline values the base file is copied as-is. Otherwise the inline
/// values are combined with the base file according to the policy and
/// `values.inline` is replaced by the result.
pub fn reconcile(
    values: &mut ValuesSpec,
    chart_name: &str,
    loader: &dyn Loader,
    dir: &Path,
) -> Result<PathBuf> {
    let target = dir.join(format!("{}{}", chart_name, VALUES_FILE_SUFFIX));

    let content = if values.inline.is_empty() {
        tracing::debug!(file = %values.file.display(), "no inline values, copying values file");
        load_base(values, loader)?
    } else {
        let effective = match values.policy.inline_precedence() {
            None => values.inline.clone(),
            Some(precedence) => {
                let base = Values::from_slice(&load_base(values, loader)?).map_err(|e| {
                    InflateError::values(
                        format!("failed to parse values file '{}'", values.file.display()),
                        e,
                    )
                })?;
                Values::merged(&base, &values.inline, precedence)
            }
        };
        tracing::debug!(policy = %values.policy, "combined inline values");

        let yaml = effective
            .to_yaml()
            .map_err(|e| InflateError::values("failed to serialize merged values", e))?;
        values.inline = effective;
        yaml.into_bytes()
    };

    std::fs::write(&target, content).map_err(|e| {
        InflateError::values(
            format!("failed to write values file '{}'", target.display()),
            CoreError::Io(e),
        )
    })?;

    Ok(target)
}

fn load_base(values: &ValuesSpec, loader: &dyn Loader) -> Result<Vec<u8>> {
    loader.load(&values.file).map_err(|e| {
        InflateError::values(
            format!("failed to load values file '{}'", values.file.display()),
            e,
        )
    })
}
