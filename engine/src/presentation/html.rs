// Standalone HTML page with inline SVG chart panels
use super::{ChartPanel, Presenter};
use crate::error::EngineError;
use crate::pipeline::{Severity, ViewModel};
use shared::utils::{format_optional, format_timestamp, format_volume};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 30.0;

pub struct HtmlPresenter {
    path: PathBuf,
    width: u32,
}

impl HtmlPresenter {
    pub fn new(path: impl AsRef<Path>, width: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            width,
        }
    }

    pub fn render(&self, view: &ViewModel) -> String {
        let mut html = String::new();
        let title = format!("{} Financial Dashboard", escape(&view.request.ticker));
        let _ = write!(
            html,
            "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title>\n\
             <style>body{{font-family:sans-serif;margin:24px}}.warning{{color:#8a6d3b;background:#fcf8e3;padding:8px}}\
             .success{{color:#3c763d;background:#dff0d8;padding:8px}}table{{border-collapse:collapse;font-size:12px}}\
             td,th{{border:1px solid #ddd;padding:2px 6px;text-align:right}}</style></head><body>\n\
             <h1>{title}</h1>\n<p>Interval {} &middot; Duration {} &middot; Source {}</p>\n",
            view.request.interval,
            view.request.period,
            escape(&view.provider),
        );

        let class = match view.status.severity {
            Severity::Warning => "warning",
            Severity::Success => "success",
        };
        let _ = writeln!(html, "<p class=\"{}\">{}</p>", class, escape(&view.status.message));

        if let Some(panels) = &view.panels {
            for panel in [&panels.price, &panels.rsi, &panels.macd] {
                let _ = writeln!(html, "<h3>{}</h3>", escape(&panel.title));
                html.push_str(&self.render_panel(panel));
                html.push('\n');
            }
            html.push_str(&render_table(view));
        }

        html.push_str("</body></html>\n");
        html
    }

    /// Lines become polylines (broken where values are undefined), bars become
    /// rects from the zero line, reference lines span the plot width.
    pub fn render_panel(&self, panel: &ChartPanel) -> String {
        let width = self.width as f64;
        let height = panel.height as f64;
        let plot_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_height = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

        let (mut min, mut max) = panel.value_range().unwrap_or((0.0, 1.0));
        if panel.bars.is_some() {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        if (max - min).abs() < f64::EPSILON {
            min -= 1.0;
            max += 1.0;
        }
        let y_scale = plot_height / (max - min);
        let to_y = |v: f64| MARGIN_TOP + (max - v) * y_scale;

        let n = panel.timestamps.len().max(1);
        let slot = plot_width / n as f64;
        let to_x = |i: usize| MARGIN_LEFT + i as f64 * slot + slot / 2.0;

        let mut svg = String::new();
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = self.width,
            h = panel.height
        );
        let _ = write!(
            svg,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"#ccc\"/>",
            MARGIN_LEFT, MARGIN_TOP, plot_width, plot_height
        );
        let _ = write!(
            svg,
            "<text x=\"4\" y=\"{:.2}\" font-size=\"11\">{:.2}</text><text x=\"4\" y=\"{:.2}\" font-size=\"11\">{:.2}</text>",
            MARGIN_TOP + 4.0,
            max,
            MARGIN_TOP + plot_height,
            min
        );
        if let Some(label) = &panel.y_label {
            let _ = write!(
                svg,
                "<text x=\"4\" y=\"{:.2}\" font-size=\"11\">{}</text>",
                MARGIN_TOP + plot_height / 2.0,
                escape(label)
            );
        }
        if let (Some(first), Some(last)) = (panel.timestamps.first(), panel.timestamps.last()) {
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\">{}</text>\
                 <text x=\"{:.2}\" y=\"{:.2}\" font-size=\"11\" text-anchor=\"end\">{}</text>",
                MARGIN_LEFT,
                height - 8.0,
                format_timestamp(first),
                MARGIN_LEFT + plot_width,
                height - 8.0,
                format_timestamp(last)
            );
        }

        if let Some(bars) = &panel.bars {
            let zero = to_y(0.0);
            let bar_width = (slot * 0.8).max(0.5);
            for (i, &v) in bars.values.iter().enumerate() {
                if !v.is_finite() {
                    continue;
                }
                let y = to_y(v);
                let _ = write!(
                    svg,
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                    to_x(i) - bar_width / 2.0,
                    y.min(zero),
                    bar_width,
                    (zero - y).abs(),
                    escape(&bars.color)
                );
            }
        }

        for reference in &panel.reference_lines {
            let y = to_y(reference.value);
            let dash = if reference.dashed { " stroke-dasharray=\"6 4\"" } else { "" };
            let _ = write!(
                svg,
                "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\"{}/>",
                MARGIN_LEFT,
                y,
                MARGIN_LEFT + plot_width,
                y,
                escape(&reference.color),
                dash
            );
        }

        for line in &panel.lines {
            for segment in segments(&line.values) {
                let points: Vec<String> = segment
                    .iter()
                    .map(|&(i, v)| format!("{:.2},{:.2}", to_x(i), to_y(v)))
                    .collect();
                let _ = write!(
                    svg,
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>",
                    points.join(" "),
                    escape(&line.color)
                );
            }
        }

        let mut legend_x = MARGIN_LEFT;
        let names = panel
            .lines
            .iter()
            .map(|l| (&l.name, &l.color))
            .chain(panel.bars.iter().map(|b| (&b.name, &b.color)));
        for (name, color) in names {
            let _ = write!(
                svg,
                "<text x=\"{:.2}\" y=\"18\" font-size=\"12\" fill=\"{}\">{}</text>",
                legend_x,
                escape(color),
                escape(name)
            );
            legend_x += 14.0 + 7.0 * name.chars().count() as f64;
        }

        svg.push_str("</svg>");
        svg
    }
}

impl Presenter for HtmlPresenter {
    fn present(&self, view: &ViewModel) -> Result<(), EngineError> {
        std::fs::write(&self.path, self.render(view))?;
        tracing::info!(path = %self.path.display(), panels = view.has_data(), "Wrote HTML dashboard");
        Ok(())
    }
}

// Runs of consecutive defined, finite values with their indices.
fn segments(values: &[Option<f64>]) -> Vec<Vec<(usize, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => current.push((i, *v)),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn render_table(view: &ViewModel) -> String {
    let mut html = String::from(
        "<details><summary>View Raw Data</summary>\n<table><tr><th>Datetime</th><th>Open</th><th>High</th>\
         <th>Low</th><th>Close</th><th>Volume</th><th>RSI</th><th>EMA fast</th><th>EMA slow</th>\
         <th>MACD</th><th>Signal</th></tr>\n",
    );
    for row in &view.table {
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td>\
             <td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.4}</td><td>{:.4}</td></tr>",
            format_timestamp(&row.timestamp),
            row.open,
            row.high,
            row.low,
            row.close,
            format_volume(row.volume),
            format_optional(row.rsi, 2),
            row.ema_fast,
            row.ema_slow,
            row.macd,
            row.signal
        );
    }
    html.push_str("</table></details>\n");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
