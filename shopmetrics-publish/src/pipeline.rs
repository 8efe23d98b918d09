//! End-to-end run: registry → series → CSV dump → partitions → upload → repair.
//!
//! Phases are strictly sequential and each is all-or-nothing at its boundary.
//! Nothing remote is touched until every local phase has succeeded, and no
//! phase undoes the effects of an earlier one.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use shopmetrics_core::config::check_days;
use shopmetrics_core::writer::write_csv_dump;
use shopmetrics_core::{
    generate_series, read_registry_file, AppConfig, ConfigError, PartitionFile, PartitionWriter,
    SeedPolicy, Synthesizer, TokenGenerator,
};
use tracing::info;

use crate::catalog::{refresh_catalog, CancelToken, QueryEngine, RepairRequest, WaitOptions};
use crate::error::PipelineError;
use crate::store::BlockingStore;
use crate::upload::upload_partitions;

/// Per-run knobs that do not belong in the config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Last day of the series (inclusive).
    pub today: NaiveDate,
    /// Overrides `generation.days`.
    pub days: Option<u32>,
    pub seed: SeedPolicy,
}

impl RunOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            days: None,
            seed: SeedPolicy::Entropy,
        }
    }
}

/// Remote collaborators. A `None` skips that phase.
pub struct Remotes<'a> {
    pub store: Option<&'a BlockingStore>,
    pub engine: Option<&'a dyn QueryEngine>,
    pub cancel: CancelToken,
}

impl Remotes<'_> {
    pub fn none() -> Self {
        Self {
            store: None,
            engine: None,
            cancel: CancelToken::new(),
        }
    }
}

/// Output of the local phases.
#[derive(Debug)]
pub struct LocalOutput {
    pub shops: usize,
    pub records: usize,
    pub files: Vec<PartitionFile>,
    pub csv_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub shops: usize,
    pub records: usize,
    pub partitions: usize,
    pub uploaded: usize,
    pub local_root: PathBuf,
    pub csv_path: Option<PathBuf>,
    pub repair_job_id: Option<String>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shops:           {}", self.shops)?;
        writeln!(f, "Records:         {}", self.records)?;
        writeln!(f, "Partitions:      {} (under {})", self.partitions, self.local_root.display())?;
        if let Some(csv) = &self.csv_path {
            writeln!(f, "CSV dump:        {}", csv.display())?;
        }
        writeln!(f, "Uploaded:        {}", self.uploaded)?;
        match &self.repair_job_id {
            Some(id) => write!(f, "Catalog repair:  {id}"),
            None => write!(f, "Catalog repair:  skipped"),
        }
    }
}

/// The day count for this run, checked after any override.
fn effective_days(config: &AppConfig, opts: &RunOptions) -> Result<u32, ConfigError> {
    let days = opts.days.unwrap_or(config.generation.days);
    check_days(days)?;
    if opts.today.checked_sub_days(Days::new(u64::from(days - 1))).is_none() {
        return Err(ConfigError::Invalid(format!(
            "{days} days ending {} fall outside the calendar range",
            opts.today
        )));
    }
    Ok(days)
}

/// Read the registry, synthesize the series, dump CSV, write partitions.
pub fn generate_local(
    config: &AppConfig,
    registry: &Path,
    opts: &RunOptions,
    tokens: &mut dyn TokenGenerator,
) -> Result<LocalOutput, PipelineError> {
    let days = effective_days(config, opts)?;
    let shops = read_registry_file(registry)?;
    let synth = Synthesizer::new(&config.generation)?;

    let records = generate_series(&shops, opts.today, days, &synth, &opts.seed);
    info!(shops = shops.len(), days, records = records.len(), "generated series");

    if let Some(csv_path) = &config.output.csv_path {
        write_csv_dump(&records, csv_path)?;
        info!(path = %csv_path.display(), "wrote CSV dump");
    }

    let files = PartitionWriter::new(&config.output.local_root).write_all(&records, tokens)?;

    Ok(LocalOutput {
        shops: shops.len(),
        records: records.len(),
        files,
        csv_path: config.output.csv_path.clone(),
    })
}

/// Run every phase. Upload and repair run only when their remote is given.
pub fn run_pipeline(
    config: &AppConfig,
    registry: &Path,
    opts: &RunOptions,
    tokens: &mut dyn TokenGenerator,
    remotes: &Remotes<'_>,
) -> Result<RunSummary, PipelineError> {
    config.generation.validate()?;
    if remotes.store.is_some() {
        config.storage.validate()?;
    }
    if remotes.engine.is_some() {
        config.catalog.validate()?;
    }

    let local = generate_local(config, registry, opts, tokens)?;

    let uploaded = match remotes.store {
        Some(store) => upload_partitions(store, &config.storage.prefix, &local.files)?.len(),
        None => 0,
    };

    let repair_job_id = match remotes.engine {
        Some(engine) => {
            let request = RepairRequest::for_table(&config.catalog);
            let wait = WaitOptions::from_config(&config.catalog);
            Some(refresh_catalog(engine, &request, &wait, &remotes.cancel)?)
        }
        None => None,
    };

    let summary = RunSummary {
        shops: local.shops,
        records: local.records,
        partitions: local.files.len(),
        uploaded,
        local_root: config.output.local_root.clone(),
        csv_path: local.csv_path,
        repair_job_id,
    };
    info!(
        partitions = summary.partitions,
        uploaded = summary.uploaded,
        repaired = summary.repair_job_id.is_some(),
        "run complete"
    );
    Ok(summary)
}
