use anyhow::Result;
use dashgen::config::Config;
use dashgen::explorer::TableExplorer;
use dashgen::logging::{info, obj, v_str, Domain};
use dashgen::{make_rng, pipeline};
use serde_json::json;

fn main() -> Result<()> {
    let cfg = Config::from_env();
    info(
        Domain::System,
        "startup",
        obj(&[
            ("state_path", v_str(&cfg.state_path.display().to_string())),
            ("output_dir", v_str(&cfg.output_dir.display().to_string())),
            ("engine", v_str(cfg.engine.as_str())),
            ("seed", json!(cfg.seed)),
        ]),
    );

    let mut rng = make_rng(cfg.seed);
    let report = pipeline::run(&cfg, &mut rng, &TableExplorer)?;

    info(
        Domain::System,
        "run_complete",
        obj(&[
            ("rows", json!(report.rows)),
            ("chart", v_str(&report.chart.path.display().to_string())),
            ("explorer", v_str(report.explorer.as_str())),
        ]),
    );
    Ok(())
}
