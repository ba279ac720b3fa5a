//! Random data demo page: a title, a line of text, and a button that draws
//! a line chart of a random table. Every click after the first draws a
//! freshly generated table.

use anyhow::{Context, Result};
use rand::Rng;
use serde_json::{json, Map, Value};
use std::f64::consts::PI;
use std::fs;
use std::path::PathBuf;
use v_htmlescape::escape;

use crate::chart::svg::{render_plot, LinePlot};
use crate::chart::PLOTLY_CDN;
use crate::config::Config;
use crate::html::{fill_template, json_for_script};

pub const DEMO_ROWS: usize = 20;
pub const DEMO_COLUMNS: [&str; 3] = ["a", "b", "c"];
pub const DEMO_TITLE: &str = "Example Dashgen App";
pub const DEMO_TEXT: &str = "This is a simple demo page generated by dashgen.";
pub const BUTTON_LABEL: &str = "Generate Random Data";

/// Column-major table of standard-normal samples.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomTable {
    pub columns: Vec<(String, Vec<f64>)>,
}

/// Box-Muller draw from N(0, 1).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln() stays finite
    let u1 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

pub fn random_table<R: Rng + ?Sized>(rng: &mut R, rows: usize) -> RandomTable {
    let mut columns: Vec<(String, Vec<f64>)> = DEMO_COLUMNS
        .iter()
        .map(|c| (c.to_string(), Vec::with_capacity(rows)))
        .collect();
    // row-major draw order, one value per column per row
    for _ in 0..rows {
        for (_, values) in columns.iter_mut() {
            values.push(standard_normal(rng));
        }
    }
    RandomTable { columns }
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<script src="__PLOTLY__" charset="utf-8"></script>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; max-width: 960px; margin: 32px auto; padding: 0 16px; }
  button { padding: 8px 14px; border: 1px solid #ccc; border-radius: 6px; background: #f8f8f8; cursor: pointer; }
  #chart { margin-top: 16px; }
  #chart svg { width: 100%; height: auto; }
  #note { color: #666; font-size: 13px; }
</style>
</head>
<body>
<h1>__TITLE__</h1>
<p>__TEXT__</p>
<button id="generate">__BUTTON__</button>
<div id="chart" hidden>
<div id="static">__CHART__</div>
<div id="plot"></div>
<p id="note" hidden>plotly.js is unavailable; showing the table generated with the page.</p>
</div>
<script>
const DEMO = __DATA__;
let clicks = 0;

function standardNormal() {
  const u1 = 1 - Math.random();
  const u2 = Math.random();
  return Math.sqrt(-2 * Math.log(u1)) * Math.cos(2 * Math.PI * u2);
}

function randomTable() {
  const table = {};
  for (const c of DEMO.columns) table[c] = [];
  for (let i = 0; i < DEMO.rows; i++) {
    for (const c of DEMO.columns) table[c].push(standardNormal());
  }
  return table;
}

function draw(table) {
  const index = Array.from({length: DEMO.rows}, (_, i) => i);
  const data = DEMO.columns.map(c => ({type: "scatter", mode: "lines", name: c, x: index, y: table[c]}));
  Plotly.react("plot", data, {
    xaxis: {title: {text: "index"}},
    yaxis: {title: {text: "value"}},
    margin: {t: 24},
  }, {responsive: true});
}

document.getElementById("generate").onclick = () => {
  document.getElementById("chart").hidden = false;
  const table = clicks === 0 ? DEMO.initial : randomTable();
  clicks += 1;
  const scripted = typeof window.Plotly !== "undefined";
  document.getElementById("static").hidden = scripted;
  document.getElementById("note").hidden = scripted || clicks === 1;
  if (scripted) draw(table);
};
</script>
</body>
</html>
"#;

/// Page payload: the table drawn on the first click, and the shape of the
/// tables regenerated on later clicks.
pub fn demo_payload(table: &RandomTable) -> Value {
    let initial: Map<String, Value> = table
        .columns
        .iter()
        .map(|(name, values)| (name.clone(), json!(values)))
        .collect();
    json!({
        "rows": table.columns.first().map(|(_, v)| v.len()).unwrap_or(0),
        "columns": table.columns.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
        "initial": initial,
    })
}

pub fn render_demo_page(table: &RandomTable) -> Result<String> {
    let x_label = |x: &f64| format!("{}", *x as i64);
    let plot = LinePlot {
        caption: "",
        x_desc: "index",
        y_desc: "value",
        series: table
            .columns
            .iter()
            .map(|(name, values)| {
                let points: Vec<(f64, f64)> =
                    values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect();
                (name.clone(), points)
            })
            .collect(),
        x_label: &x_label,
    };
    let chart = render_plot(&plot)?;
    let data = json_for_script(&demo_payload(table))?;
    let title = escape(DEMO_TITLE).to_string();
    let text = escape(DEMO_TEXT).to_string();
    let button = escape(BUTTON_LABEL).to_string();
    Ok(fill_template(
        PAGE,
        &[
            ("__TITLE__", title.as_str()),
            ("__TEXT__", text.as_str()),
            ("__BUTTON__", button.as_str()),
            ("__PLOTLY__", PLOTLY_CDN),
            ("__CHART__", chart.as_str()),
            ("__DATA__", data.as_str()),
        ],
    ))
}

/// Write the demo page to `<output_dir>/demo.html`.
pub fn export_demo<R: Rng + ?Sized>(rng: &mut R, cfg: &Config) -> Result<PathBuf> {
    let table = random_table(rng, DEMO_ROWS);
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create output dir {}", cfg.output_dir.display()))?;
    let path = cfg.demo_path();
    fs::write(&path, render_demo_page(&table)?)
        .with_context(|| format!("write demo page {}", path.display()))?;
    Ok(path)
}
