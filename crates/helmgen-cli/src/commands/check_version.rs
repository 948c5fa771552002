//! Check-version command - verify the helm binary

use console::style;
use helmgen_inflate::{HelmRunner, Scratch};
use miette::{IntoDiagnostic, Result, WrapErr};

pub fn run(helm_command: &str) -> Result<()> {
    // Throwaway helm home so the probe never reads the user's helm setup
    let mut scratch = Scratch::new();
    let home = scratch
        .path()
        .into_diagnostic()
        .wrap_err("Failed to create a temporary helm home")?;

    let result = HelmRunner::new(helm_command, home.join("helm")).check_version();
    scratch.release();
    let version = result?;

    println!("{} helm v{}", style("✓").green().bold(), version);
    Ok(())
}
