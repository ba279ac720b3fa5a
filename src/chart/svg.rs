//! Static SVG rendering of line charts through plotters' SVG backend.

use anyhow::{anyhow, Result};
use chrono::{Days, NaiveDate};
use plotters::prelude::*;

use super::Figure;

const SIZE: (u32, u32) = (960, 480);

/// Default qualitative palette, same order plotly.js uses.
const PALETTE: [(u8, u8, u8); 10] = [
    (0x63, 0x6e, 0xfa),
    (0xef, 0x55, 0x3b),
    (0x00, 0xcc, 0x96),
    (0xab, 0x63, 0xfa),
    (0xff, 0xa1, 0x5a),
    (0x19, 0xd3, 0xf3),
    (0xff, 0x66, 0x92),
    (0xb6, 0xe8, 0x80),
    (0xff, 0x97, 0xff),
    (0xfe, 0xcb, 0x52),
];

pub fn palette_color(i: usize) -> RGBColor {
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    RGBColor(r, g, b)
}

/// `#rrggbb` form of [`palette_color`], for the plotly figure JSON.
pub fn palette_hex(i: usize) -> String {
    let (r, g, b) = PALETTE[i % PALETTE.len()];
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Numeric line plot; x labels come from `x_label`.
pub struct LinePlot<'a> {
    pub caption: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
    pub series: Vec<(String, Vec<(f64, f64)>)>,
    pub x_label: &'a dyn Fn(&f64) -> String,
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("Failed to draw chart: {}", e)
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Date-axis rendering of a chart figure; x is days since the first date.
pub fn render_svg(fig: &Figure) -> Result<String> {
    let origin: Option<NaiveDate> = fig.traces.iter().flat_map(|t| t.x.iter().copied()).min();
    let x_label = move |x: &f64| {
        let day = x.round();
        if day < 0.0 {
            return String::new();
        }
        match origin.and_then(|o| o.checked_add_days(Days::new(day as u64))) {
            Some(d) => d.format("%b %d").to_string(),
            None => String::new(),
        }
    };
    let offset = |d: &NaiveDate| origin.map(|o| (*d - o).num_days() as f64).unwrap_or(0.0);
    let plot = LinePlot {
        caption: &fig.title,
        x_desc: &fig.x_label,
        y_desc: &fig.y_label,
        series: fig
            .traces
            .iter()
            .map(|t| {
                let points: Vec<(f64, f64)> =
                    t.x.iter().zip(&t.y).map(|(d, v)| (offset(d), *v as f64)).collect();
                (t.name.clone(), points)
            })
            .collect(),
        x_label: &x_label,
    };
    render_plot(&plot)
}

pub fn render_plot(plot: &LinePlot<'_>) -> Result<String> {
    let points = || plot.series.iter().flat_map(|(_, pts)| pts.iter().copied());
    let (x_lo, mut x_hi) = bounds(points().map(|p| p.0)).unwrap_or((0.0, 1.0));
    if x_hi <= x_lo {
        x_hi = x_lo + 1.0;
    }
    let (y_min, y_max) = bounds(points().map(|p| p.1)).unwrap_or((0.0, 1.0));
    let pad = if y_max > y_min { (y_max - y_min) * 0.05 } else { 1.0 };

    let mut buffer = String::new();
    {
        let root = SVGBackend::with_string(&mut buffer, SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        let mut chart = ChartBuilder::on(&root)
            .caption(plot.caption, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x_lo..x_hi, (y_min - pad)..(y_max + pad))
            .map_err(draw_err)?;
        chart
            .configure_mesh()
            .x_desc(plot.x_desc)
            .y_desc(plot.y_desc)
            .x_label_formatter(plot.x_label)
            .draw()
            .map_err(draw_err)?;

        for (i, (name, pts)) in plot.series.iter().enumerate() {
            let color = palette_color(i);
            chart
                .draw_series(LineSeries::new(pts.iter().copied(), color.stroke_width(2)))
                .map_err(draw_err)?
                .label(name.as_str())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });
        }
        if !plot.series.is_empty() {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(draw_err)?;
        }
        root.present().map_err(draw_err)?;
    }
    Ok(buffer)
}
