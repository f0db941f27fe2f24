//! SVG chart rendering.
//!
//! Backtest: price with EMA20/EMA50 and trade markers, plus an RSI panel.
//! Portfolio: equity curves, daily return distribution and a correlation
//! heatmap. Each chart is a standalone `.svg` file in the chart directory.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::domain::error::TrendscopeError;
use crate::domain::price_table::{CorrelationMatrix, DateTable, histogram};
use crate::domain::report::{BacktestReport, PortfolioReport};
use crate::domain::signal::BACKTEST_RSI_THRESHOLD;
use crate::ports::report_port::ReportPort;

const CHART_WIDTH: f64 = 800.0;
const CHART_HEIGHT: f64 = 360.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 120.0;
const MARGIN_TOP: f64 = 30.0;
const MARGIN_BOTTOM: f64 = 40.0;

pub const HISTOGRAM_BINS: usize = 50;

const PALETTE: [&str; 8] = [
    "#2563eb", "#f97316", "#16a34a", "#dc2626", "#9333ea", "#0891b2", "#ca8a04", "#db2777",
];

struct Line<'a> {
    label: &'a str,
    color: &'a str,
    /// (x index, value) pairs in x order; a jump in index breaks the line.
    points: Vec<(usize, f64)>,
}

struct Frame {
    x_count: usize,
    y_min: f64,
    y_max: f64,
}

impl Frame {
    fn new(x_count: usize, y_min: f64, y_max: f64) -> Self {
        let (y_min, y_max) = if y_max > y_min {
            (y_min, y_max)
        } else {
            (y_min - 1.0, y_max + 1.0)
        };
        Frame {
            x_count,
            y_min,
            y_max,
        }
    }

    fn plot_width() -> f64 {
        CHART_WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        CHART_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn x(&self, i: usize) -> f64 {
        MARGIN_LEFT + (i as f64 / (self.x_count.saturating_sub(1)).max(1) as f64) * Self::plot_width()
    }

    fn y(&self, v: f64) -> f64 {
        MARGIN_TOP + Self::plot_height() - ((v - self.y_min) / (self.y_max - self.y_min)) * Self::plot_height()
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn open_svg(title: &str) -> String {
    let mut svg = format!(
        r##"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"##,
        CHART_WIDTH, CHART_HEIGHT, CHART_WIDTH, CHART_HEIGHT
    );
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"18\" font-size=\"14\" fill=\"#333\">{}</text>\n",
        MARGIN_LEFT,
        escape(title)
    ));
    svg
}

fn axes(frame: &Frame, x_labels: [String; 3], y_format: fn(f64) -> String) -> String {
    let bottom = CHART_HEIGHT - MARGIN_BOTTOM;
    let right = CHART_WIDTH - MARGIN_RIGHT;
    let mut svg = format!(
        "  <line x1=\"{l}\" y1=\"{t}\" x2=\"{l}\" y2=\"{b}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n\
         \x20 <line x1=\"{l}\" y1=\"{b}\" x2=\"{r}\" y2=\"{b}\" stroke=\"#ccc\" stroke-width=\"1\"/>\n",
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = bottom,
        r = right
    );
    let mid = (frame.y_min + frame.y_max) / 2.0;
    for v in [frame.y_max, mid, frame.y_min] {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            MARGIN_LEFT - 5.0,
            frame.y(v) + 3.0,
            y_format(v)
        ));
    }
    let xs = [MARGIN_LEFT, MARGIN_LEFT + Frame::plot_width() / 2.0, right];
    for (x, label) in xs.iter().zip(x_labels) {
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#666\">{}</text>\n",
            x,
            CHART_HEIGHT - 10.0,
            escape(&label)
        ));
    }
    svg
}

fn date_labels(dates: &[NaiveDate]) -> [String; 3] {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) => [
            first.to_string(),
            dates[dates.len() / 2].to_string(),
            last.to_string(),
        ],
        _ => Default::default(),
    }
}

fn line_path(frame: &Frame, line: &Line) -> String {
    let mut d = String::new();
    let mut prev: Option<usize> = None;
    for &(i, v) in &line.points {
        let cmd = match prev {
            Some(p) if p + 1 == i => "L",
            _ => "M",
        };
        if !d.is_empty() {
            d.push(' ');
        }
        d.push_str(&format!("{} {:.1} {:.1}", cmd, frame.x(i), frame.y(v)));
        prev = Some(i);
    }
    format!(
        "  <path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\"/>\n",
        d, line.color
    )
}

fn guide_line(frame: &Frame, level: f64, color: &str, label: &str) -> String {
    let y = frame.y(level);
    format!(
        "  <line x1=\"{}\" y1=\"{:.1}\" x2=\"{}\" y2=\"{:.1}\" stroke=\"{}\" stroke-dasharray=\"4 3\" stroke-width=\"1\"/>\n\
         \x20 <text x=\"{}\" y=\"{:.1}\" font-size=\"10\" fill=\"{}\">{}</text>\n",
        MARGIN_LEFT,
        y,
        CHART_WIDTH - MARGIN_RIGHT,
        y,
        color,
        CHART_WIDTH - MARGIN_RIGHT + 5.0,
        y + 3.0,
        color,
        escape(label)
    )
}

fn legend(entries: &[(&str, &str)]) -> String {
    let mut svg = String::new();
    let x = CHART_WIDTH - MARGIN_RIGHT + 10.0;
    for (i, (label, color)) in entries.iter().enumerate() {
        let y = MARGIN_TOP + 10.0 + i as f64 * 16.0;
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{:.1}\" width=\"10\" height=\"10\" fill=\"{}\"/>\n\
             \x20 <text x=\"{}\" y=\"{:.1}\" font-size=\"10\" fill=\"#333\">{}</text>\n",
            x,
            y - 9.0,
            color,
            x + 14.0,
            y,
            escape(label)
        ));
    }
    svg
}

fn fmt_price(v: f64) -> String {
    format!("{:.2}", v)
}

fn fmt_plain(v: f64) -> String {
    format!("{:.0}", v)
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Close with EMA20/EMA50 and entry (green) / exit (red) markers.
/// Empty when there are no signal rows.
pub fn price_chart_svg(report: &BacktestReport) -> String {
    let rows = &report.signals;
    let Some((lo, hi)) = bounds(
        rows.iter()
            .flat_map(|s| [s.row.close(), s.row.ema20, s.row.ema50]),
    ) else {
        return String::new();
    };
    let frame = Frame::new(rows.len(), lo, hi);
    let dates: Vec<NaiveDate> = rows.iter().map(|s| s.row.bar.date).collect();

    let lines = [
        Line {
            label: "Close",
            color: "#111827",
            points: rows.iter().enumerate().map(|(i, s)| (i, s.row.close())).collect(),
        },
        Line {
            label: "EMA20",
            color: PALETTE[1],
            points: rows.iter().enumerate().map(|(i, s)| (i, s.row.ema20)).collect(),
        },
        Line {
            label: "EMA50",
            color: PALETTE[0],
            points: rows.iter().enumerate().map(|(i, s)| (i, s.row.ema50)).collect(),
        },
    ];

    let mut svg = open_svg(&format!("{} price with EMA20 / EMA50", report.symbol));
    svg.push_str(&axes(&frame, date_labels(&dates), fmt_price));
    for line in &lines {
        svg.push_str(&line_path(&frame, line));
    }

    for trade in &report.trades {
        if let Ok(i) = dates.binary_search(&trade.entry_date) {
            svg.push_str(&marker(&frame, i, trade.entry_price, true));
        }
        if let Ok(i) = dates.binary_search(&trade.exit_date) {
            svg.push_str(&marker(&frame, i, trade.exit_price, false));
        }
    }

    let mut entries: Vec<(&str, &str)> = lines.iter().map(|l| (l.label, l.color)).collect();
    entries.push(("Entry", "#16a34a"));
    entries.push(("Exit", "#dc2626"));
    svg.push_str(&legend(&entries));
    svg.push_str("</svg>");
    svg
}

fn marker(frame: &Frame, i: usize, price: f64, entry: bool) -> String {
    let (x, y) = (frame.x(i), frame.y(price));
    let (points, color) = if entry {
        (
            format!("{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}", x, y + 2.0, x - 5.0, y + 10.0, x + 5.0, y + 10.0),
            "#16a34a",
        )
    } else {
        (
            format!("{:.1},{:.1} {:.1},{:.1} {:.1},{:.1}", x, y - 2.0, x - 5.0, y - 10.0, x + 5.0, y - 10.0),
            "#dc2626",
        )
    };
    format!("  <polygon points=\"{}\" fill=\"{}\"/>\n", points, color)
}

/// RSI(14) on a fixed 0..100 scale with guides at 30, 70 and the entry threshold.
pub fn rsi_chart_svg(report: &BacktestReport) -> String {
    let rows = &report.signals;
    if rows.is_empty() {
        return String::new();
    }
    let frame = Frame::new(rows.len(), 0.0, 100.0);
    let dates: Vec<NaiveDate> = rows.iter().map(|s| s.row.bar.date).collect();
    let line = Line {
        label: "RSI14",
        color: PALETTE[4],
        points: rows.iter().enumerate().map(|(i, s)| (i, s.row.rsi14)).collect(),
    };

    let mut svg = open_svg(&format!("{} RSI(14)", report.symbol));
    svg.push_str(&axes(&frame, date_labels(&dates), fmt_plain));
    svg.push_str(&guide_line(&frame, 70.0, "#dc2626", "70"));
    svg.push_str(&guide_line(&frame, 30.0, "#16a34a", "30"));
    svg.push_str(&guide_line(
        &frame,
        BACKTEST_RSI_THRESHOLD,
        "#6b7280",
        &format!("{} entry", BACKTEST_RSI_THRESHOLD),
    ));
    svg.push_str(&line_path(&frame, &line));
    svg.push_str("</svg>");
    svg
}

/// One line per symbol, growth of one unit.
pub fn equity_chart_svg(equity: &DateTable) -> String {
    let Some((lo, hi)) = bounds(equity.rows.iter().flat_map(|r| r.values.iter().flatten().copied()))
    else {
        return String::new();
    };
    let frame = Frame::new(equity.rows.len(), lo.min(1.0), hi.max(1.0));
    let dates: Vec<NaiveDate> = equity.rows.iter().map(|r| r.date).collect();

    let lines: Vec<Line> = equity
        .symbols
        .iter()
        .enumerate()
        .map(|(col, symbol)| Line {
            label: symbol,
            color: PALETTE[col % PALETTE.len()],
            points: equity
                .column(col)
                .enumerate()
                .filter_map(|(i, v)| v.map(|v| (i, v)))
                .collect(),
        })
        .collect();

    let mut svg = open_svg("Equity curves (starting at 1.0)");
    svg.push_str(&axes(&frame, date_labels(&dates), fmt_price));
    svg.push_str(&guide_line(&frame, 1.0, "#9ca3af", "1.0"));
    for line in &lines {
        svg.push_str(&line_path(&frame, line));
    }
    let entries: Vec<(&str, &str)> = lines.iter().map(|l| (l.label, l.color)).collect();
    svg.push_str(&legend(&entries));
    svg.push_str("</svg>");
    svg
}

/// Overlaid translucent histograms of each symbol's daily returns.
pub fn returns_histogram_svg(returns: &DateTable, bins: usize) -> String {
    let per_symbol: Vec<_> = (0..returns.symbols.len())
        .filter_map(|col| histogram(&returns.present(col), bins).map(|h| (col, h)))
        .collect();
    let Some((x_lo, x_hi)) = bounds(per_symbol.iter().flat_map(|(_, h)| [h.min, h.max])) else {
        return String::new();
    };
    let max_count = per_symbol
        .iter()
        .flat_map(|(_, h)| h.counts.iter().copied())
        .max()
        .unwrap_or(0)
        .max(1);

    let frame = Frame::new(2, 0.0, max_count as f64);
    let x_span = x_hi - x_lo;
    let x_at = |v: f64| MARGIN_LEFT + (v - x_lo) / x_span * Frame::plot_width();

    let mut svg = open_svg("Distribution of daily returns");
    let x_labels = [
        format!("{:.1}%", x_lo * 100.0),
        format!("{:.1}%", (x_lo + x_hi) / 2.0 * 100.0),
        format!("{:.1}%", x_hi * 100.0),
    ];
    svg.push_str(&axes(&frame, x_labels, fmt_plain));

    let mut entries = Vec::new();
    for (col, h) in &per_symbol {
        let color = PALETTE[col % PALETTE.len()];
        let width = h.bin_width();
        for (k, &count) in h.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let left = x_at(h.min + k as f64 * width);
            let right = x_at(h.min + (k + 1) as f64 * width);
            let top = frame.y(count as f64);
            svg.push_str(&format!(
                "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" fill-opacity=\"0.4\"/>\n",
                left,
                top,
                (right - left).max(0.5),
                frame.y(0.0) - top,
                color
            ));
        }
        entries.push((returns.symbols[*col].as_str(), color));
    }
    svg.push_str(&legend(&entries));
    svg.push_str("</svg>");
    svg
}

/// Diverging blue-white-red scale for a correlation in [-1, 1].
fn heat_color(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "#e5e7eb".to_string();
    };
    let (from, to, t) = if v < 0.0 {
        ((221.0, 221.0, 221.0), (59.0, 76.0, 192.0), -v)
    } else {
        ((221.0, 221.0, 221.0), (180.0, 4.0, 38.0), v)
    };
    let mix = |a: f64, b: f64| (a + (b - a) * t.clamp(0.0, 1.0)).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(from.0, to.0),
        mix(from.1, to.1),
        mix(from.2, to.2)
    )
}

/// Annotated matrix of pairwise return correlations.
pub fn correlation_heatmap_svg(corr: &CorrelationMatrix) -> String {
    let n = corr.symbols.len();
    if n == 0 {
        return String::new();
    }
    let label_space = 110.0;
    let cell = ((CHART_HEIGHT.min(CHART_WIDTH) - MARGIN_TOP - label_space) / n as f64).min(80.0);
    let size = label_space + cell * n as f64 + 20.0;

    let mut svg = format!(
        r##"<svg width="{s:.0}" height="{s:.0}" viewBox="0 0 {s:.0} {s:.0}" xmlns="http://www.w3.org/2000/svg">"##,
        s = size + MARGIN_TOP
    );
    svg.push_str("\n  <rect width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str(&format!(
        "  <text x=\"{}\" y=\"18\" font-size=\"14\" fill=\"#333\">Correlation of daily returns</text>\n",
        label_space
    ));

    let origin_y = MARGIN_TOP + label_space - 20.0;
    for (i, symbol) in corr.symbols.iter().enumerate() {
        let center = label_space + (i as f64 + 0.5) * cell;
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"start\" font-size=\"10\" fill=\"#333\" transform=\"rotate(-45 {:.1} {:.1})\">{}</text>\n",
            center,
            origin_y - 5.0,
            center,
            origin_y - 5.0,
            escape(symbol)
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"end\" font-size=\"10\" fill=\"#333\">{}</text>\n",
            label_space - 5.0,
            origin_y + (i as f64 + 0.5) * cell + 3.0,
            escape(symbol)
        ));
    }

    for i in 0..n {
        for j in 0..n {
            let value = corr.get(i, j);
            let x = label_space + j as f64 * cell;
            let y = origin_y + i as f64 * cell;
            let text = value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v));
            svg.push_str(&format!(
                "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" fill=\"{}\" stroke=\"white\"/>\n\
                 \x20 <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\" fill=\"#111\">{}</text>\n",
                x,
                y,
                cell,
                cell,
                heat_color(value),
                x + cell / 2.0,
                y + cell / 2.0 + 3.0,
                text
            ));
        }
    }
    svg.push_str("</svg>");
    svg
}

/// Writes the charts for each report into `dir`.
pub struct SvgChartReport {
    dir: PathBuf,
}

impl SvgChartReport {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn save(&self, file: &str, svg: String) -> Result<(), TrendscopeError> {
        if svg.is_empty() {
            return Ok(());
        }
        let path = self.dir.join(file);
        fs::write(&path, svg)?;
        info!(path = %path.display(), "chart written");
        Ok(())
    }
}

impl ReportPort for SvgChartReport {
    fn write_backtest(&self, report: &BacktestReport) -> Result<(), TrendscopeError> {
        fs::create_dir_all(&self.dir)?;
        self.save(&format!("{}_price.svg", report.symbol), price_chart_svg(report))?;
        self.save(&format!("{}_rsi.svg", report.symbol), rsi_chart_svg(report))
    }

    fn write_portfolio(&self, report: &PortfolioReport) -> Result<(), TrendscopeError> {
        fs::create_dir_all(&self.dir)?;
        self.save("equity_curves.svg", equity_chart_svg(&report.equity))?;
        self.save(
            "return_distribution.svg",
            returns_histogram_svg(&report.returns, HISTOGRAM_BINS),
        )?;
        self.save("correlation_heatmap.svg", correlation_heatmap_svg(&report.correlation))
    }
}
