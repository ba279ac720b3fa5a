use std::path::PathBuf;
use std::str::FromStr;

use crate::logging::{obj, v_str, warn, Domain};

pub const CHART_FILE: &str = "plotly_chart.html";
pub const EXPLORER_FILE: &str = "explorer.html";
pub const DEMO_FILE: &str = "demo.html";

/// How the chart page gets its rendering engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMode {
    /// Chart is drawn to SVG at export time; the page has no script dependency.
    Inline,
    /// Page loads plotly.js from its CDN and draws the figure in the browser.
    Cdn,
    /// A local plotly.js file is copied into the page.
    Bundle(PathBuf),
}

impl EngineMode {
    pub fn parse(kind: &str, bundle_path: PathBuf) -> Option<Self> {
        match kind.trim().to_lowercase().as_str() {
            "inline" | "svg" => Some(EngineMode::Inline),
            "cdn" => Some(EngineMode::Cdn),
            "bundle" | "local" => Some(EngineMode::Bundle(bundle_path)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineMode::Inline => "inline",
            EngineMode::Cdn => "cdn",
            EngineMode::Bundle(_) => "bundle",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub state_path: PathBuf,
    pub output_dir: PathBuf,
    pub engine: EngineMode,
    /// Fixed seed for the sample table; entropy when unset.
    pub seed: Option<u64>,
    /// Tables larger than this are skipped by the explorer.
    pub explorer_max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from("assets/data/data.json"),
            output_dir: PathBuf::from("dashboard_files"),
            engine: EngineMode::Inline,
            seed: None,
            explorer_max_rows: 10_000,
        }
    }
}

impl Config {
    /// Defaults overridden by environment variables. Values that do not
    /// parse are ignored with a `config_invalid` warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let env = |key: &str| std::env::var(key).ok();
        let bundle_path = env("PLOTLY_JS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets/js/plotly.min.js"));
        Self {
            state_path: env("DASH_STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.state_path),
            output_dir: env("DASH_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            engine: parse_engine(env("CHART_ENGINE"), bundle_path).unwrap_or(defaults.engine),
            seed: parse_setting("SAMPLE_SEED", env("SAMPLE_SEED"), "an unsigned integer"),
            explorer_max_rows: parse_setting(
                "EXPLORER_MAX_ROWS",
                env("EXPLORER_MAX_ROWS"),
                "an unsigned integer",
            )
            .unwrap_or(defaults.explorer_max_rows),
        }
    }

    /// Config rooted in `dir`, for isolated runs.
    pub fn rooted_at(dir: &std::path::Path) -> Self {
        Self {
            state_path: dir.join("assets/data/data.json"),
            output_dir: dir.join("dashboard_files"),
            ..Self::default()
        }
    }

    pub fn chart_path(&self) -> PathBuf {
        self.output_dir.join(CHART_FILE)
    }

    pub fn explorer_path(&self) -> PathBuf {
        self.output_dir.join(EXPLORER_FILE)
    }

    pub fn demo_path(&self) -> PathBuf {
        self.output_dir.join(DEMO_FILE)
    }
}

fn invalid_setting(key: &str, raw: &str, expected: &str) {
    warn(
        Domain::System,
        "config_invalid",
        obj(&[
            ("msg", v_str(&format!("ignoring {}={:?}, expected {}", key, raw, expected))),
            ("key", v_str(key)),
            ("value", v_str(raw)),
        ]),
    );
}

fn parse_setting<T: FromStr>(key: &str, raw: Option<String>, expected: &str) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            invalid_setting(key, &raw, expected);
            None
        }
    }
}

fn parse_engine(raw: Option<String>, bundle_path: PathBuf) -> Option<EngineMode> {
    let raw = raw?;
    let engine = EngineMode::parse(&raw, bundle_path);
    if engine.is_none() {
        invalid_setting("CHART_ENGINE", &raw, "inline, cdn or bundle");
    }
    engine
}
