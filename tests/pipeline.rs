use dashgen::config::{Config, EngineMode};
use dashgen::explorer::{ExplorerOutcome, ExplorerRenderer, TableExplorer};
use dashgen::pipeline::{file_sha256, run};
use dashgen::sample::{synthesize, SampleTable};
use dashgen::state::LoadOutcome;
use rand::{rngs::StdRng, SeedableRng};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Exploding;

impl ExplorerRenderer for Exploding {
    fn name(&self) -> &'static str {
        "exploding"
    }

    fn render(&self, _table: &SampleTable) -> anyhow::Result<String> {
        anyhow::bail!("renderer crashed")
    }
}

#[test]
fn full_run_writes_every_artifact() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::rooted_at(dir.path());
    let report = run(&cfg, &mut StdRng::seed_from_u64(1), &TableExplorer).unwrap();

    assert_eq!(report.state_outcome, LoadOutcome::Missing);
    assert_eq!(report.rows, 30);
    assert!(cfg.state_path.exists());
    assert_eq!(report.chart.path, cfg.chart_path());
    assert!(report.chart.bytes > 0);
    assert_eq!(report.explorer, ExplorerOutcome::Written(cfg.explorer_path()));
    assert!(fs::metadata(cfg.explorer_path()).unwrap().len() > 0);
}

#[test]
fn inline_chart_draws_a_labelled_series_per_category() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::rooted_at(dir.path());
    run(&cfg, &mut StdRng::seed_from_u64(1), &TableExplorer).unwrap();
    let html = fs::read_to_string(cfg.chart_path()).unwrap();
    assert!(html.contains("<svg"));
    assert!(!html.contains("<script"));

    // the run draws the sample table first, so the same seed gives the same table
    let table = synthesize(&mut StdRng::seed_from_u64(1));
    for (category, _) in table.series_by_category() {
        assert!(html.contains(category.as_str()), "no legend label for {}", category.as_str());
    }
}

#[test]
fn chart_is_written_for_every_engine_mode() {
    let modes = [
        EngineMode::Inline,
        EngineMode::Cdn,
        EngineMode::Bundle(PathBuf::from("/nonexistent/plotly.min.js")),
    ];
    for engine in modes {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::rooted_at(dir.path());
        cfg.engine = engine.clone();
        run(&cfg, &mut StdRng::seed_from_u64(2), &TableExplorer).unwrap();
        let html = fs::read_to_string(cfg.chart_path()).unwrap();
        assert!(!html.is_empty(), "empty chart for {:?}", engine);
        assert!(html.contains("Daily Sales Report (Generated: "));
    }
}

#[test]
fn explorer_failure_leaves_run_and_chart_intact() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::rooted_at(dir.path());

    let report = run(&cfg, &mut StdRng::seed_from_u64(3), &Exploding).unwrap();

    match &report.explorer {
        ExplorerOutcome::Failed { error } => assert!(error.contains("renderer crashed")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(!cfg.explorer_path().exists());
    assert!(report.chart.bytes > 0);
    assert_eq!(file_sha256(&cfg.chart_path()).unwrap(), report.chart.sha256);
}

#[test]
fn explorer_write_error_is_contained() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::rooted_at(dir.path());
    // a directory where the explorer file should go makes the write fail
    fs::create_dir_all(cfg.explorer_path()).unwrap();

    let report = run(&cfg, &mut StdRng::seed_from_u64(4), &TableExplorer).unwrap();

    assert!(matches!(report.explorer, ExplorerOutcome::Failed { .. }));
    assert_eq!(file_sha256(&cfg.chart_path()).unwrap(), report.chart.sha256);
}

#[test]
fn chart_write_failure_propagates() {
    let dir = TempDir::new().unwrap();
    let mut cfg = Config::rooted_at(dir.path());
    // output dir path occupied by a regular file
    cfg.output_dir = dir.path().join("occupied");
    fs::write(&cfg.output_dir, "x").unwrap();

    assert!(run(&cfg, &mut StdRng::seed_from_u64(5), &TableExplorer).is_err());
}

#[test]
fn rerun_preserves_projects() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::rooted_at(dir.path());
    fs::create_dir_all(cfg.state_path.parent().unwrap()).unwrap();
    fs::write(&cfg.state_path, r#"{"projects": [{"name": "site"}]}"#).unwrap();

    let first = run(&cfg, &mut StdRng::seed_from_u64(6), &TableExplorer).unwrap();
    let second = run(&cfg, &mut StdRng::seed_from_u64(6), &TableExplorer).unwrap();

    assert_eq!(first.state_outcome, LoadOutcome::Loaded);
    assert_eq!(second.state_outcome, LoadOutcome::Loaded);
    assert!(second.last_updated >= first.last_updated);
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&cfg.state_path).unwrap()).unwrap();
    assert_eq!(doc["projects"][0]["name"], "site");
}

#[test]
fn demo_page_is_written() {
    let dir = TempDir::new().unwrap();
    let cfg = Config::rooted_at(dir.path());
    let path = dashgen::demo::export_demo(&mut StdRng::seed_from_u64(8), &cfg).unwrap();
    assert_eq!(path, cfg.demo_path());
    let html = fs::read_to_string(path).unwrap();
    assert!(html.contains("Generate Random Data"));
    assert!(html.contains("const DEMO = {"));
    assert!(html.contains("randomTable()"));
}
