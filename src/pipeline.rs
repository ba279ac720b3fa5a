//! One dashboard generation run: state refresh, sample synthesis, chart and
//! explorer export, strictly in that order.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::chart::export_chart;
use crate::config::Config;
use crate::explorer::{export_explorer, ExplorerOutcome, ExplorerRenderer};
use crate::logging::{error, info, obj, v_num, v_str, warn, Domain, ProfileScope};
use crate::sample::synthesize;
use crate::state::{update_state, LoadOutcome};

/// A file written by the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

impl Artifact {
    pub fn from_path(path: PathBuf) -> Result<Self> {
        let bytes = std::fs::metadata(&path)
            .with_context(|| format!("stat {}", path.display()))?
            .len();
        let sha256 = file_sha256(&path)?;
        Ok(Self { path, bytes, sha256 })
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub state_path: PathBuf,
    pub state_outcome: LoadOutcome,
    pub last_updated: String,
    pub rows: usize,
    pub chart: Artifact,
    pub explorer: ExplorerOutcome,
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn run<R: Rng + ?Sized>(
    cfg: &Config,
    rng: &mut R,
    renderer: &dyn ExplorerRenderer,
) -> Result<RunReport> {
    run_at(cfg, rng, renderer, Utc::now())
}

/// Same as [`run`] with an explicit clock. State and chart failures
/// propagate; the explorer outcome is recorded and never fails the run.
pub fn run_at<R: Rng + ?Sized>(
    cfg: &Config,
    rng: &mut R,
    renderer: &dyn ExplorerRenderer,
    now: DateTime<Utc>,
) -> Result<RunReport> {
    let state = {
        let _p = ProfileScope::new("state");
        update_state(&cfg.state_path, now)?
    };
    let last_updated = state
        .document
        .get(crate::state::LAST_UPDATED_KEY)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    info(
        Domain::State,
        "state_updated",
        obj(&[
            ("msg", v_str(&format!("Updated {} with timestamp.", cfg.state_path.display()))),
            ("path", v_str(&cfg.state_path.display().to_string())),
            ("source", v_str(load_source(&state.outcome))),
            ("last_updated", v_str(&last_updated)),
        ]),
    );

    info(Domain::Sample, "sample_start", obj(&[("msg", v_str("Generating sample sales data..."))]));
    let table = {
        let _p = ProfileScope::new("sample");
        synthesize(rng)
    };
    info(
        Domain::Sample,
        "sample_ready",
        obj(&[("rows", json!(table.len())), ("categories", json!(table.series_by_category().len()))]),
    );

    let chart = {
        let _p = ProfileScope::new("chart");
        let path = export_chart(&table, cfg, now)?;
        Artifact::from_path(path)?
    };
    info(
        Domain::Chart,
        "chart_written",
        obj(&[
            ("msg", v_str(&format!("Generated chart at {}", chart.path.display()))),
            ("path", v_str(&chart.path.display().to_string())),
            ("engine", v_str(cfg.engine.as_str())),
            ("bytes", v_num(chart.bytes as f64)),
            ("sha256", v_str(&chart.sha256)),
        ]),
    );

    info(Domain::Explorer, "explorer_start", obj(&[("msg", v_str("Generating explorer..."))]));
    let explorer = {
        let _p = ProfileScope::new("explorer");
        export_explorer(renderer, &table, cfg)
    };
    log_explorer(renderer.name(), &explorer);

    Ok(RunReport {
        state_path: cfg.state_path.clone(),
        state_outcome: state.outcome,
        last_updated,
        rows: table.len(),
        chart,
        explorer,
    })
}

fn load_source(outcome: &LoadOutcome) -> &'static str {
    match outcome {
        LoadOutcome::Loaded => "file",
        LoadOutcome::Missing => "default_missing",
        LoadOutcome::Malformed { .. } => "default_malformed",
    }
}

fn log_explorer(renderer: &str, outcome: &ExplorerOutcome) {
    match outcome {
        ExplorerOutcome::Written(path) => info(
            Domain::Explorer,
            "explorer_written",
            obj(&[
                ("msg", v_str(&format!("Generated explorer at {}", path.display()))),
                ("renderer", v_str(renderer)),
                ("path", v_str(&path.display().to_string())),
            ]),
        ),
        ExplorerOutcome::Skipped { reason } => warn(
            Domain::Explorer,
            "explorer_skipped",
            obj(&[("msg", v_str(reason)), ("renderer", v_str(renderer))]),
        ),
        ExplorerOutcome::Failed { error: err } => error(
            Domain::Explorer,
            "explorer_failed",
            obj(&[
                ("msg", v_str(&format!("Failed to generate explorer: {}", err))),
                ("renderer", v_str(renderer)),
            ]),
        ),
    }
}
