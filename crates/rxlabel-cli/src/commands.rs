use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use rxlabel_map::Reconciler;
use rxlabel_model::{LabelRecord, MatchResult, ResolvedDrug, SearchCandidate};
use rxlabel_standards::{Dataset, DoctorReport, EngineConfig, locate_config};

/// Configuration and raw data, before any index is built.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub config_path: PathBuf,
    pub config: EngineConfig,
    pub dataset: Dataset,
}

impl LoadedData {
    /// Locate and read the configuration, then every data file it names.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_path = locate_config(explicit)?;
        let span = info_span!("load", config = %config_path.display());
        let _guard = span.enter();

        let config = EngineConfig::load(&config_path)
            .with_context(|| format!("read config {}", config_path.display()))?;
        let started = Instant::now();
        let dataset = Dataset::load(&config.data).context("load data")?;
        info!(
            labels = dataset.labels.len(),
            icd10 = dataset.icd10.len(),
            synonyms = dataset.synonyms.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded data"
        );
        Ok(Self {
            config_path,
            config,
            dataset,
        })
    }

    pub fn reconciler(&self) -> Result<Reconciler> {
        let Dataset {
            labels,
            icd10,
            synonyms,
            ..
        } = &self.dataset;
        Reconciler::build(
            labels.clone(),
            icd10.clone(),
            synonyms,
            self.config.options(),
        )
        .context("build indexes")
    }
}

fn load_reconciler(config: Option<&Path>) -> Result<Reconciler> {
    LoadedData::load(config)?.reconciler()
}

/// `ResolveError` is passed through unchanged so callers can tell a miss
/// from a failure.
pub fn run_resolve(config: Option<&Path>, drug: &str) -> Result<ResolvedDrug> {
    let reconciler = load_reconciler(config)?;
    Ok(reconciler.resolve(drug)?)
}

pub fn run_search(
    config: Option<&Path>,
    query: &str,
    top: Option<usize>,
) -> Result<Vec<SearchCandidate>> {
    let data = LoadedData::load(config)?;
    let top_n = top.unwrap_or(data.config.search.default_top_n);
    Ok(data.reconciler()?.search(query, top_n))
}

pub fn run_list(config: Option<&Path>) -> Result<Vec<LabelRecord>> {
    let reconciler = load_reconciler(config)?;
    Ok(reconciler.list_all().to_vec())
}

pub fn run_match(config: Option<&Path>, text: &str) -> Result<Vec<MatchResult>> {
    let reconciler = load_reconciler(config)?;
    Ok(reconciler.match_indication(text))
}

/// Load everything and build the indexes, so a report is only produced for
/// data the engine would accept.
pub fn run_doctor(config: Option<&Path>) -> Result<DoctorReport> {
    let data = LoadedData::load(config)?;
    data.reconciler()?;
    Ok(DoctorReport::from_dataset(
        Some(data.config_path.clone()),
        &data.dataset,
    ))
}
