//! ShopMetrics CLI — synthesize, partition and publish per-shop daily metrics.
//!
//! Commands:
//! - `shops`: write a dummy shop registry
//! - `generate`: registry → local Parquet partitions (+ CSV dump)
//! - `publish`: full run: generate, upload, repair the catalog
//! - `repair`: catalog repair only
//! - `inspect`: print the rows of one partition file

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use shopmetrics_core::shops::{generate_dummy_shops, write_registry_file, DummyShopOptions};
use shopmetrics_core::writer::read_partition_file;
use shopmetrics_core::{AppConfig, SeedPolicy, UuidTokens};
use shopmetrics_publish::{
    generate_local, refresh_catalog, run_pipeline, AthenaClient, BlockingStore, CancelToken,
    QueryEngine, Remotes, RepairRequest, RunOptions, WaitOptions,
};

#[derive(Parser)]
#[command(
    name = "shopmetrics",
    about = "ShopMetrics CLI — synthetic daily shop metrics, partitioned and published"
)]
struct Cli {
    /// Path to a TOML config file. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GenerateArgs {
    /// Shop registry file (`shop_id,base_revenue` per line).
    #[arg(long, default_value = "shops.txt")]
    registry: PathBuf,

    /// Number of days ending today. Overrides `generation.days`.
    #[arg(long)]
    days: Option<u32>,

    /// Last day of the series (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    today: Option<String>,

    /// Master seed for reproducible values. File names stay random.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a registry of dummy shops.
    Shops {
        /// Number of shops.
        #[arg(long, default_value_t = 10)]
        count: usize,

        /// Output registry file.
        #[arg(long, default_value = "shops.txt")]
        output: PathBuf,

        /// Seed for names and revenues.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Generate the series and write local partitions only.
    Generate(GenerateArgs),
    /// Generate, upload every partition and repair the catalog.
    Publish {
        #[command(flatten)]
        args: GenerateArgs,

        /// Do not upload to the object store.
        #[arg(long, default_value_t = false)]
        skip_upload: bool,

        /// Do not run the catalog repair.
        #[arg(long, default_value_t = false)]
        skip_repair: bool,
    },
    /// Run the catalog repair and wait for it.
    Repair,
    /// Print the rows of a partition file.
    Inspect {
        /// Path to a `part-*.parquet` file.
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Shops {
            count,
            output,
            seed,
        } => run_shops(count, &output, seed),
        Commands::Generate(args) => run_generate(&config, &args),
        Commands::Publish {
            args,
            skip_upload,
            skip_repair,
        } => run_publish(&config, &args, skip_upload, skip_repair),
        Commands::Repair => run_repair(&config),
        Commands::Inspect { path } => run_inspect(&path),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => {
            let config =
                AppConfig::from_file(p).with_context(|| format!("loading {}", p.display()))?;
            info!(path = %p.display(), "loaded config");
            Ok(config)
        }
        None => {
            debug!("no --config given, using built-in defaults");
            Ok(AppConfig::default())
        }
    }
}

fn run_options(args: &GenerateArgs) -> Result<RunOptions> {
    let today = args
        .today
        .as_deref()
        .map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()
        .context("--today must be YYYY-MM-DD")?
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    Ok(RunOptions {
        today,
        days: args.days,
        seed: SeedPolicy::from_option(args.seed),
    })
}

fn run_shops(count: usize, output: &Path, seed: Option<u64>) -> Result<()> {
    let opts = DummyShopOptions {
        count,
        ..DummyShopOptions::default()
    };
    info!(count, output = %output.display(), "generating dummy shops");
    let mut rng = SeedPolicy::from_option(seed).rng_for("dummy-shops");
    let shops = generate_dummy_shops(&opts, &mut rng);
    write_registry_file(&shops, output)
        .with_context(|| format!("writing registry {}", output.display()))?;

    println!("Wrote {} shops to {}", shops.len(), output.display());
    Ok(())
}

fn run_generate(config: &AppConfig, args: &GenerateArgs) -> Result<()> {
    let opts = run_options(args)?;
    config.generation.validate()?;

    let local = generate_local(config, &args.registry, &opts, &mut UuidTokens)?;

    println!("Shops:      {}", local.shops);
    println!("Records:    {}", local.records);
    println!(
        "Partitions: {} (under {})",
        local.files.len(),
        config.output.local_root.display()
    );
    if let Some(csv) = &local.csv_path {
        println!("CSV dump:   {}", csv.display());
    }
    Ok(())
}

fn run_publish(
    config: &AppConfig,
    args: &GenerateArgs,
    skip_upload: bool,
    skip_repair: bool,
) -> Result<()> {
    let opts = run_options(args)?;

    let store = if skip_upload {
        None
    } else {
        config.storage.validate()?;
        Some(BlockingStore::from_config(&config.storage)?)
    };
    let engine = if skip_repair {
        None
    } else {
        config.catalog.validate()?;
        Some(AthenaClient::from_config(&config.catalog)?)
    };

    info!(
        today = %opts.today,
        store = store.as_ref().map(BlockingStore::label).unwrap_or("skipped"),
        repair = !skip_repair,
        "starting publish run"
    );
    let remotes = Remotes {
        store: store.as_ref(),
        engine: engine.as_ref().map(|e| e as &dyn QueryEngine),
        cancel: CancelToken::new(),
    };

    let summary = run_pipeline(config, &args.registry, &opts, &mut UuidTokens, &remotes)?;
    println!("{summary}");
    Ok(())
}

fn run_repair(config: &AppConfig) -> Result<()> {
    config.catalog.validate()?;
    let engine = AthenaClient::from_config(&config.catalog)?;
    let request = RepairRequest::for_table(&config.catalog);
    let wait = WaitOptions::from_config(&config.catalog);
    info!(table = %config.catalog.table, database = %config.catalog.database, "repairing catalog");

    let job_id = refresh_catalog(&engine, &request, &wait, &CancelToken::new())?;
    println!("Catalog repair succeeded: {job_id}");
    Ok(())
}

fn run_inspect(path: &Path) -> Result<()> {
    let rows = read_partition_file(path)?;
    debug!(path = %path.display(), rows = rows.len(), "read partition file");

    println!(
        "{:<40} {:<10} {:>12} {:>12} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "entity_id", "date", "gross", "net", "product", "marketing", "fulfill", "processing", "other"
    );
    for r in &rows {
        println!(
            "{:<40} {:<10} {:>12.2} {:>12.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2} {:>10.2}",
            r.shop_id,
            r.date_string(),
            r.gross_revenue,
            r.net_revenue,
            r.costs.product,
            r.costs.marketing,
            r.costs.fulfillment,
            r.costs.processing,
            r.costs.other,
        );
    }
    println!("{} row(s)", rows.len());
    Ok(())
}
