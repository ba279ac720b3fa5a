//! Daily sales line chart exported as a standalone HTML page.

pub mod svg;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use v_htmlescape::escape;

use crate::config::{Config, EngineMode};
use crate::html::{fill_template, json_for_script, script_body};
use crate::logging::{obj, v_str, warn, Domain};
use crate::sample::SampleTable;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub x: Vec<NaiveDate>,
    pub y: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
    pub traces: Vec<Trace>,
}

impl Figure {
    /// Figure in the shape plotly.js expects: `{data, layout}`.
    pub fn to_plotly_json(&self) -> Value {
        let data: Vec<Value> = self
            .traces
            .iter()
            .enumerate()
            .map(|(i, t)| {
                json!({
                    "type": "scatter",
                    "mode": "lines",
                    "name": t.name,
                    "x": t.x.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect::<Vec<_>>(),
                    "y": t.y,
                    "line": {"color": svg::palette_hex(i)},
                })
            })
            .collect();
        json!({
            "data": data,
            "layout": {
                "title": {"text": self.title},
                "xaxis": {"title": {"text": self.x_label}},
                "yaxis": {"title": {"text": self.y_label}},
                "legend": {"title": {"text": self.legend_title}},
                "template": "plotly",
            },
        })
    }
}

pub fn chart_title(now: DateTime<Utc>) -> String {
    format!("Daily Sales Report (Generated: {})", now.format("%Y-%m-%d %H:%M"))
}

/// Sales over Date, one trace per Category.
pub fn sales_figure(table: &SampleTable, now: DateTime<Utc>) -> Figure {
    let traces = table
        .series_by_category()
        .into_iter()
        .map(|(category, points)| Trace {
            name: category.as_str().to_string(),
            x: points.iter().map(|p| p.0).collect(),
            y: points.iter().map(|p| p.1).collect(),
        })
        .collect();
    Figure {
        title: chart_title(now),
        x_label: "Date".to_string(),
        y_label: "Sales".to_string(),
        legend_title: "Category".to_string(),
        traces,
    }
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
__HEAD__
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; background: #fff; }
  #chart { width: 100%; max-width: 960px; margin: 24px auto; }
  #chart svg { width: 100%; height: auto; }
</style>
</head>
<body>
<div id="chart">__BODY__</div>
__SCRIPT__
</body>
</html>
"#;

const DRAW_SCRIPT: &str = r#"<script>
const FIGURE = __FIGURE__;
Plotly.newPlot("chart", FIGURE.data, FIGURE.layout, {responsive: true});
</script>"#;

fn scripted_page(fig: &Figure, engine_tag: &str) -> Result<String> {
    let figure = json_for_script(&fig.to_plotly_json())?;
    let script = DRAW_SCRIPT.replace("__FIGURE__", &figure);
    let title = escape(&fig.title).to_string();
    Ok(fill_template(
        PAGE,
        &[
            ("__TITLE__", title.as_str()),
            ("__HEAD__", engine_tag),
            ("__BODY__", ""),
            ("__SCRIPT__", script.as_str()),
        ],
    ))
}

fn inline_page(fig: &Figure) -> Result<String> {
    let title = escape(&fig.title).to_string();
    let body = svg::render_svg(fig)?;
    Ok(fill_template(
        PAGE,
        &[
            ("__TITLE__", title.as_str()),
            ("__HEAD__", ""),
            ("__BODY__", body.as_str()),
            ("__SCRIPT__", ""),
        ],
    ))
}

/// Render the figure as a complete HTML document for the given engine mode.
///
/// A `Bundle` whose file cannot be read degrades to the inline rendering so
/// the page is always produced.
pub fn render_chart_page(fig: &Figure, engine: &EngineMode) -> Result<String> {
    match engine {
        EngineMode::Inline => inline_page(fig),
        EngineMode::Cdn => scripted_page(
            fig,
            &format!(r#"<script src="{}" charset="utf-8"></script>"#, PLOTLY_CDN),
        ),
        EngineMode::Bundle(path) => match read_bundle(path) {
            Ok(js) => scripted_page(fig, &format!("<script>{}</script>", script_body(&js))),
            Err(err) => {
                warn(
                    Domain::Chart,
                    "bundle_unavailable",
                    obj(&[
                        ("msg", v_str("plotly bundle unreadable; rendering inline")),
                        ("path", v_str(&path.display().to_string())),
                        ("reason", v_str(&format!("{:#}", err))),
                    ]),
                );
                inline_page(fig)
            }
        },
    }
}

fn read_bundle(path: &Path) -> Result<String> {
    let js = fs::read_to_string(path)
        .with_context(|| format!("read plotly bundle {}", path.display()))?;
    anyhow::ensure!(!js.trim().is_empty(), "plotly bundle {} is empty", path.display());
    Ok(js)
}

/// Write the sales chart to `<output_dir>/plotly_chart.html`.
pub fn export_chart(table: &SampleTable, cfg: &Config, now: DateTime<Utc>) -> Result<PathBuf> {
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create output dir {}", cfg.output_dir.display()))?;
    let fig = sales_figure(table, now);
    let html = render_chart_page(&fig, &cfg.engine)?;
    let path = cfg.chart_path();
    fs::write(&path, html).with_context(|| format!("write chart {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::synthesize;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 3, 14, 5, 59).unwrap()
    }

    #[test]
    fn title_embeds_generation_minute() {
        assert_eq!(chart_title(now()), "Daily Sales Report (Generated: 2024-02-03 14:05)");
    }

    #[test]
    fn figure_covers_every_row_once() {
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let fig = sales_figure(&table, now());
        let points: usize = fig.traces.iter().map(|t| t.x.len()).sum();
        assert_eq!(points, 30);
        assert!(fig.traces.len() <= 3);
    }

    #[test]
    fn plotly_json_has_trace_per_category() {
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let fig = sales_figure(&table, now());
        let v = fig.to_plotly_json();
        assert_eq!(v["data"].as_array().unwrap().len(), fig.traces.len());
        assert_eq!(v["layout"]["title"]["text"], fig.title.as_str());
        assert_eq!(v["data"][0]["mode"], "lines");
    }

    #[test]
    fn cdn_page_references_cdn() {
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let page = render_chart_page(&sales_figure(&table, now()), &EngineMode::Cdn).unwrap();
        assert!(page.contains(PLOTLY_CDN));
        assert!(page.contains("Plotly.newPlot"));
    }

    #[test]
    fn inline_page_needs_no_script() {
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let page = render_chart_page(&sales_figure(&table, now()), &EngineMode::Inline).unwrap();
        assert!(page.contains("<svg"));
        assert!(!page.contains("<script"));
    }

    #[test]
    fn bundle_page_inlines_file_contents() {
        let dir = tempfile::TempDir::new().unwrap();
        let js = dir.path().join("plotly.min.js");
        fs::write(&js, "window.Plotly={newPlot:function(){}};").unwrap();
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let page = render_chart_page(&sales_figure(&table, now()), &EngineMode::Bundle(js)).unwrap();
        assert!(page.contains("window.Plotly={newPlot"));
        assert!(!page.contains(PLOTLY_CDN));
    }

    #[test]
    fn bundle_cannot_close_its_script_tag() {
        let dir = tempfile::TempDir::new().unwrap();
        let js = dir.path().join("plotly.min.js");
        fs::write(&js, "window.Plotly={newPlot:function(){}};var s=\"</SCRIPT><b>x</b>\";").unwrap();
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let page = render_chart_page(&sales_figure(&table, now()), &EngineMode::Bundle(js)).unwrap();
        assert!(page.contains(r#"var s="<\/SCRIPT><b>x</b>";"#));
        // bundle tag and draw script, nothing else
        assert_eq!(page.to_ascii_lowercase().matches("</script>").count(), 2);
    }

    #[test]
    fn page_title_is_escaped() {
        let mut fig = sales_figure(&synthesize(&mut StdRng::seed_from_u64(3)), now());
        fig.title = "Sales <b>& \"more\"</b>".into();
        let page = render_chart_page(&fig, &EngineMode::Cdn).unwrap();
        assert!(page.contains("<title>Sales &lt;b&gt;&amp; &quot;more&quot;&lt;"));
        assert!(!page.contains("<title>Sales <b>"));
    }

    #[test]
    fn missing_bundle_falls_back_to_inline() {
        let table = synthesize(&mut StdRng::seed_from_u64(3));
        let engine = EngineMode::Bundle(PathBuf::from("/nonexistent/plotly.min.js"));
        let page = render_chart_page(&sales_figure(&table, now()), &engine).unwrap();
        assert!(page.contains("<svg"));
    }
}
