#![warn(clippy::all, rust_2018_idioms)]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use awsinv::inventory::{
    collect_inventory, collectors, resolve_regions, CollectionContext, Config,
    CredentialCoordinator, NameResolutionCache, ReportWriter, SdkNameSource, GLOBAL_REGION,
};

#[derive(Parser)]
#[command(name = "awsinv", version, about = "Concurrent AWS resource inventory")]
struct Cli {
    /// Region to inventory (repeatable). The global pseudo-region is always
    /// included.
    #[arg(short, long = "region")]
    regions: Vec<String>,

    /// Maximum concurrent provider calls. Values below 1 fall back to the
    /// default of 5.
    #[arg(short = 'c', long, default_value_t = 0)]
    concurrency: i64,

    /// Restrict the run to these categories (repeatable). Unknown names are
    /// ignored with a warning.
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Directory the CSV report files are written to.
    #[arg(short, long, default_value = "inventory-out")]
    output_dir: PathBuf,

    /// AWS shared config profile to use.
    #[arg(long)]
    profile: Option<String>,

    /// Also write the full report as inventory.json.
    #[arg(long)]
    json: bool,

    /// List registered categories and exit.
    #[arg(long)]
    list_categories: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            regions: self.regions,
            max_concurrency: self.concurrency,
            categories: if self.categories.is_empty() {
                None
            } else {
                Some(self.categories)
            },
            output_dir: self.output_dir,
            json: self.json,
            profile: self.profile,
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "awsinv=info,aws_config=warn,aws_sigv4=warn,aws_smithy_runtime=warn,aws_smithy_runtime_api=warn,hyper=warn",
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    if cli.list_categories {
        for name in collectors::default_registry().category_names() {
            println!("{}", name);
        }
        return ExitCode::SUCCESS;
    }

    match run(cli.into_config()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Execute one collection run. `Ok(false)` means the run completed but one
/// or more categories failed; setup errors abort with `Err` before any
/// collection is scheduled.
async fn run(config: Config) -> Result<bool> {
    let registry = match &config.categories {
        Some(categories) => collectors::default_registry().filter(categories),
        None => collectors::default_registry(),
    };
    if registry.is_empty() {
        anyhow::bail!("no collectors selected");
    }

    let regions = resolve_regions(&config.regions, GLOBAL_REGION);
    info!("inventorying {} categories in {:?}", registry.len(), regions);

    let writer = ReportWriter::new(&config.output_dir)?;

    let credentials = Arc::new(CredentialCoordinator::new(config.profile.clone()));
    credentials.preflight().await?;

    let token = CancellationToken::new();
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling collection");
            ctrl_c_token.cancel();
        }
    });

    let names = NameResolutionCache::new(Arc::new(SdkNameSource::new(credentials.clone())));
    let ctx = Arc::new(CollectionContext::new(credentials, names, token));

    let report = collect_inventory(&registry, &regions, ctx, config.effective_concurrency()).await;

    writer.write(&report, &registry)?;
    if config.json {
        writer.write_json(&report)?;
    }

    if report.has_failures() {
        for (category, error) in &report.failures {
            error!("{}: {:#}", category, error);
        }
        if report.is_empty() {
            error!("collection failed: no resources collected");
        } else {
            error!("{} categor(ies) failed; report is incomplete", report.failures.len());
        }
        return Ok(false);
    }

    Ok(true)
}
