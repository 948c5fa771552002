//! helmgen CLI - Inflate Helm charts into Kubernetes resources

use clap::{Args, Parser, Subcommand};
use helmgen_core::{HelmSettings, LoadRestriction};
use miette::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;

#[derive(Parser)]
#[command(name = "helmgen")]
#[command(author = "helmgen Contributors")]
#[command(version)]
#[command(about = "Inflate Helm charts into Kubernetes resources", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a chart configuration into resources
    Inflate {
        /// Chart configuration file (YAML)
        config: PathBuf,

        /// Directory values files are resolved against (default: the config's directory)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Which files may be loaded: root-only or none
        #[arg(long, default_value = "root-only")]
        load_restrictor: LoadRestriction,

        /// Output directory, one file per resource (if not set, outputs to stdout)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print resources as a JSON array
        #[arg(long, conflicts_with = "output_dir")]
        json: bool,

        /// Show the effective values after inflation
        #[arg(long)]
        show_values: bool,

        #[command(flatten)]
        helm: HelmArgs,
    },

    /// Check that the helm binary is a supported version
    CheckVersion {
        /// Helm binary to run
        #[arg(long, env = "HELMGEN_HELM_COMMAND", default_value = "helm")]
        helm_command: String,
    },
}

/// Process-wide helm settings
#[derive(Args)]
struct HelmArgs {
    /// Allow running helm to inflate charts
    #[arg(long, env = "HELMGEN_ENABLE_HELM")]
    enable_helm: bool,

    /// Helm binary to run
    #[arg(long, env = "HELMGEN_HELM_COMMAND", default_value = "helm")]
    helm_command: String,

    /// Kubernetes version advertised to every chart
    #[arg(long, env = "HELMGEN_KUBE_VERSION")]
    helm_kube_version: Option<String>,

    /// Kubernetes API versions advertised to every chart (comma separated)
    #[arg(long, env = "HELMGEN_API_VERSIONS", value_delimiter = ',')]
    helm_api_versions: Vec<String>,

    /// Run helm with --debug
    #[arg(long, env = "HELMGEN_HELM_DEBUG")]
    helm_debug: bool,
}

impl HelmArgs {
    fn into_settings(self) -> HelmSettings {
        HelmSettings {
            enabled: self.enable_helm,
            command: self.helm_command,
            kube_version: self.helm_kube_version.unwrap_or_default(),
            api_versions: self.helm_api_versions,
            debug: self.helm_debug,
        }
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Inflate {
            config,
            root,
            load_restrictor,
            output_dir,
            json,
            show_values,
            helm,
        } => commands::inflate::run(
            &config,
            root.as_deref(),
            load_restrictor,
            &helm.into_settings(),
            output_dir.as_deref(),
            json,
            show_values,
            cli.debug,
        ),

        Commands::CheckVersion { helm_command } => commands::check_version::run(&helm_command),
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(report) = run(cli) {
        eprintln!("{:?}", report);
        std::process::exit(exit_codes::for_report(&report));
    }
}
