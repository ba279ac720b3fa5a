//! Interactive table explorer exported as a standalone HTML page.
//!
//! Rendering sits behind [`ExplorerRenderer`] so the explorer is independent
//! of the chart exporter and failures stay contained in this stage.

use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::html::{fill_template, json_for_script};
use crate::sample::{Category, SampleTable};

/// Result of the explorer stage. Never an error: the run continues either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExplorerOutcome {
    Written(PathBuf),
    /// Known limitation; nothing was attempted.
    Skipped { reason: String },
    /// Rendering or writing failed.
    Failed { error: String },
}

impl ExplorerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplorerOutcome::Written(_) => "written",
            ExplorerOutcome::Skipped { .. } => "skipped",
            ExplorerOutcome::Failed { .. } => "failed",
        }
    }
}

pub trait ExplorerRenderer {
    fn name(&self) -> &'static str;
    fn render(&self, table: &SampleTable) -> Result<String>;
}

/// Built-in renderer: sortable, filterable table with per-category totals.
pub struct TableExplorer;

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Sample Data Explorer</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; display: flex; gap: 12px; align-items: center; }
  main { padding: 12px 16px; display: flex; gap: 24px; flex-wrap: wrap; }
  section { flex: 1; min-width: 320px; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; font-size: 13px; }
  table { border-collapse: collapse; width: 100%; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { position: sticky; top: 0; background: white; border-bottom: 1px solid #ddd; cursor: pointer; user-select: none; }
  th.sorted::after { content: attr(data-dir); color: #777; margin-left: 4px; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<header>
  <strong>Sample Data Explorer</strong>
  <label>Category
    <select id="category"><option value="">All</option>__OPTIONS__</select>
  </label>
  <span class="pill" id="count"></span>
</header>
<main>
  <section>
    <table>
      <thead><tr id="head"></tr></thead>
      <tbody id="rows"></tbody>
    </table>
  </section>
  <section>
    <h3>By category</h3>
    <table>
      <thead><tr><th>Category</th><th class="num">Days</th><th class="num">Sales</th><th class="num">Profit</th></tr></thead>
      <tbody id="totals"></tbody>
    </table>
  </section>
</main>
<script>
const DATA = __DATA__;

const state = { category: "", sortKey: "Date", asc: true };

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function visibleRows() {
  const rows = DATA.rows.filter(r => !state.category || r.Category === state.category);
  const k = state.sortKey;
  rows.sort((a, b) => (a[k] < b[k] ? -1 : a[k] > b[k] ? 1 : 0) * (state.asc ? 1 : -1));
  return rows;
}

function renderHead() {
  const head = document.getElementById("head");
  head.innerHTML = DATA.columns.map(c => {
    const cls = (DATA.numeric.includes(c) ? "num " : "") + (c === state.sortKey ? "sorted" : "");
    return `<th class="${cls}" data-key="${c}" data-dir="${state.asc ? "▲" : "▼"}">${escapeHtml(c)}</th>`;
  }).join("");
  head.querySelectorAll("th").forEach(th => th.onclick = () => {
    const k = th.dataset.key;
    state.asc = state.sortKey === k ? !state.asc : true;
    state.sortKey = k;
    render();
  });
}

function renderRows() {
  const rows = visibleRows();
  document.getElementById("rows").innerHTML = rows.map(r =>
    "<tr>" + DATA.columns.map(c =>
      `<td class="${DATA.numeric.includes(c) ? "num" : ""}">${escapeHtml(r[c])}</td>`).join("") + "</tr>"
  ).join("");
  document.getElementById("count").textContent = `${rows.length} of ${DATA.rows.length} rows`;
}

function renderTotals() {
  document.getElementById("totals").innerHTML = DATA.totals
    .filter(t => !state.category || t.category === state.category)
    .map(t => `<tr><td>${escapeHtml(t.category)}</td><td class="num">${t.days}</td><td class="num">${t.sales}</td><td class="num">${t.profit}</td></tr>`)
    .join("");
}

function render() { renderHead(); renderRows(); renderTotals(); }

document.getElementById("category").onchange = e => { state.category = e.target.value; render(); };
render();
</script>
</body>
</html>
"#;

impl ExplorerRenderer for TableExplorer {
    fn name(&self) -> &'static str {
        "table_explorer"
    }

    fn render(&self, table: &SampleTable) -> Result<String> {
        let payload = json!({
            "columns": ["Date", "Sales", "Category", "Profit"],
            "numeric": ["Sales", "Profit"],
            "rows": table.rows,
            "totals": table.category_totals(),
        });
        let data = json_for_script(&payload).context("serialize explorer data")?;
        let options: String = Category::ALL
            .iter()
            .map(|c| format!(r#"<option value="{0}">{0}</option>"#, c.as_str()))
            .collect();
        Ok(fill_template(
            PAGE,
            &[("__OPTIONS__", options.as_str()), ("__DATA__", data.as_str())],
        ))
    }
}

/// Render and write `<output_dir>/explorer.html`.
pub fn export_explorer(
    renderer: &dyn ExplorerRenderer,
    table: &SampleTable,
    cfg: &Config,
) -> ExplorerOutcome {
    if table.is_empty() {
        return ExplorerOutcome::Skipped {
            reason: "sample table has no rows".to_string(),
        };
    }
    if table.len() > cfg.explorer_max_rows {
        return ExplorerOutcome::Skipped {
            reason: format!(
                "{} rows exceeds explorer limit of {}",
                table.len(),
                cfg.explorer_max_rows
            ),
        };
    }
    match write_explorer(renderer, table, cfg) {
        Ok(path) => ExplorerOutcome::Written(path),
        Err(err) => ExplorerOutcome::Failed {
            error: format!("{:#}", err),
        },
    }
}

fn write_explorer(
    renderer: &dyn ExplorerRenderer,
    table: &SampleTable,
    cfg: &Config,
) -> Result<PathBuf> {
    let html = renderer
        .render(table)
        .with_context(|| format!("{} render", renderer.name()))?;
    fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create output dir {}", cfg.output_dir.display()))?;
    let path = cfg.explorer_path();
    fs::write(&path, html).with_context(|| format!("write explorer {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::synthesize;
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::TempDir;

    struct Broken;

    impl ExplorerRenderer for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn render(&self, _table: &SampleTable) -> Result<String> {
            anyhow::bail!("unsupported dtype")
        }
    }

    fn table() -> SampleTable {
        synthesize(&mut StdRng::seed_from_u64(11))
    }

    #[test]
    fn page_embeds_rows_and_totals() {
        let html = TableExplorer.render(&table()).unwrap();
        assert!(html.contains("const DATA = {"));
        assert!(html.contains("\"Category\""));
        assert!(html.contains(r#"<option value="Clothing">Clothing</option>"#));
        assert!(!html.contains("__DATA__"));
    }

    #[test]
    fn writes_explorer_file() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::rooted_at(dir.path());
        let outcome = export_explorer(&TableExplorer, &table(), &cfg);
        assert_eq!(outcome, ExplorerOutcome::Written(cfg.explorer_path()));
        assert!(fs::metadata(cfg.explorer_path()).unwrap().len() > 0);
    }

    #[test]
    fn renderer_error_is_reported_not_raised() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::rooted_at(dir.path());
        match export_explorer(&Broken, &table(), &cfg) {
            ExplorerOutcome::Failed { error } => {
                assert!(error.contains("broken render"));
                assert!(error.contains("unsupported dtype"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!cfg.explorer_path().exists());
    }

    #[test]
    fn oversized_or_empty_tables_are_skipped() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::rooted_at(dir.path());
        cfg.explorer_max_rows = 10;
        assert!(matches!(
            export_explorer(&TableExplorer, &table(), &cfg),
            ExplorerOutcome::Skipped { .. }
        ));
        assert!(matches!(
            export_explorer(&TableExplorer, &SampleTable::default(), &cfg),
            ExplorerOutcome::Skipped { .. }
        ));
    }
}
