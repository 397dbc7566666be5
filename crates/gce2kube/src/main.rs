mod config;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use config::Config;
use gce2kube_core::Migrator;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gce2kube")]
#[command(version)]
#[command(
    about = "Translate a Compute Engine managed instance group into Kubernetes manifests",
    long_about = "Reads a managed instance group, its instance template and the forwarding rules \
in front of it through the gcloud CLI, and prints a Deployment, a HorizontalPodAutoscaler and, \
when the group is load balanced, a LoadBalancer Service for every pod spec found in the \
template's cloud-config user-data."
)]
struct Cli {
    /// Managed instance group to translate
    #[arg(long, env = "GCE2KUBE_INSTANCE_GROUP")]
    instance_group: String,

    /// Zone of a zonal instance group
    #[arg(long, conflicts_with = "region")]
    zone: Option<String>,

    /// Region of a regional instance group
    #[arg(long)]
    region: Option<String>,

    /// Project to read resources from (defaults to the gcloud configuration)
    #[arg(long, env = "CLOUDSDK_CORE_PROJECT")]
    project: Option<String>,

    /// gcloud executable
    #[arg(long, env = "GCE2KUBE_GCLOUD", default_value = "gcloud")]
    gcloud: PathBuf,

    /// Skip write_files entries that are not pod specs instead of failing
    #[arg(long)]
    skip_invalid_pod_specs: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdoutはマニフェスト専用なので、ログはstderrに出力
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn run(config: &Config) -> anyhow::Result<()> {
    let migrator = Migrator::new(config.gcloud(), config.migrate_options());

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    migrator
        .run(&config.instance_group, &mut out)
        .await
        .with_context(|| format!("failed to translate instance group '{}'", config.instance_group))?;
    out.flush()?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_cli(&cli);
    tracing::debug!("{:?}", config);

    if let Err(e) = run(&config).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
