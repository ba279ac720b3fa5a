//! Write the random data demo page.
//!
//! Usage:
//!   cargo run --bin random_demo
//!
//! Honors DASH_OUTPUT_DIR and SAMPLE_SEED like the main generator.

use dashgen::config::Config;
use dashgen::demo::export_demo;
use dashgen::logging::{error, info, obj, v_str, Domain};
use dashgen::make_rng;

fn main() {
    let cfg = Config::from_env();
    let mut rng = make_rng(cfg.seed);
    match export_demo(&mut rng, &cfg) {
        Ok(path) => info(
            Domain::Demo,
            "demo_written",
            obj(&[
                ("msg", v_str(&format!("Generated demo page at {}", path.display()))),
                ("path", v_str(&path.display().to_string())),
            ]),
        ),
        Err(err) => {
            error(Domain::Demo, "demo_failed", obj(&[("msg", v_str(&format!("{:#}", err)))]));
            std::process::exit(1);
        }
    }
}
