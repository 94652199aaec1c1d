//! Audit Report Composition
//!
//! Assembles an already-computed risk view into one self-contained HTML
//! document: header, metrics table, historical price chart, cross-asset
//! volatility comparison chart — in that order. Pure aggregation: no data
//! access, no filesystem, no display dependency, so the output is
//! snapshot-testable byte-for-byte.
//!
//! Failure policy: composition must never fail the caller. Any internal
//! rendering error degrades to a placeholder document carrying the error
//! text.

use anyhow::Result;
use tracing::error;

use crate::metrics;
use crate::models::{ComparisonSet, PricePoint, PriceSeries};
use crate::risk::RiskTier;

const CHART_WIDTH: i32 = 576;
const CHART_HEIGHT: i32 = 288;
const PADDING: f64 = 36.0;
const LINE_COLOR: &str = "#d4af37";
const BAR_COLORS: &[&str] = &[
    "#ff6384", "#36a2eb", "#ffce56", "#4bc0c0", "#9966ff", "#ff9f40", "#d4af37",
];

/// Compose the audit artifact. Always returns a non-empty byte sequence.
pub fn compose(
    identity: &str,
    asset_label: &str,
    price: f64,
    volatility: f64,
    tier: RiskTier,
    history: &PriceSeries,
    comparison: &ComparisonSet,
) -> Vec<u8> {
    match render(identity, asset_label, price, volatility, tier, history, comparison) {
        Ok(html) => html.into_bytes(),
        Err(err) => {
            error!(asset = asset_label, error = %err, "report rendering failed, emitting placeholder");
            placeholder(identity, asset_label, &err.to_string())
        }
    }
}

fn render(
    identity: &str,
    asset_label: &str,
    price: f64,
    volatility: f64,
    tier: RiskTier,
    history: &PriceSeries,
    comparison: &ComparisonSet,
) -> Result<String> {
    let max_drawdown = metrics::max_drawdown(history);
    let date_range = match history.date_range() {
        Some((first, last)) => format!("{} to {}", first, last),
        None => "no data available".to_string(),
    };

    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\">");
    html.push_str("<style>body{font-family:Helvetica,Arial,sans-serif;color:#1a1a1a;max-width:640px;margin:24px auto}");
    html.push_str("header{background:#141e28;color:#d4af37;padding:16px;text-align:center}");
    html.push_str("table{border-collapse:collapse;width:100%}td,th{border:1px solid #999;padding:6px 10px}");
    html.push_str("th{background:#d4af37;color:#fff}h2{margin-top:28px}footer{color:#808080;font-size:11px;text-align:center;margin-top:32px}</style>");
    html.push_str("</head><body>");

    // 1. Header
    html.push_str("<header><h1>OFFICIAL RISK INTELLIGENCE REPORT</h1></header>");
    html.push_str(&format!(
        "<p><b>Account Holder:</b> {}<br><b>Asset Analyzed:</b> {}<br><b>Data Range:</b> {}</p>",
        escape(&identity.to_uppercase()),
        escape(&asset_label.to_uppercase()),
        escape(&date_range),
    ));

    // 2. Metrics table
    html.push_str("<h2>RISK QUANTIFICATION SUMMARY</h2>");
    html.push_str("<table><tr><th>METRIC</th><th>VALUE</th></tr>");
    for (label, value) in [
        ("Current Market Price", format_money(price)),
        ("Annualized Volatility", format_pct(volatility)),
        ("Max Drawdown", format_pct(max_drawdown)),
        ("Risk Assessment", tier.as_str().to_string()),
    ] {
        html.push_str(&format!("<tr><td>{}</td><td>{}</td></tr>", label, value));
    }
    html.push_str("</table>");

    // 3. Historical price chart
    html.push_str("<h2>DETAILED PRICE ACTION TREND</h2>");
    html.push_str(&line_chart(history.points()));

    // 4. Cross-asset volatility comparison
    html.push_str("<h2>MARKET RISK COMPARISON</h2>");
    html.push_str("<p>Annualized Volatility Benchmark</p>");
    html.push_str(&bar_chart(comparison));

    html.push_str("<footer>CONFIDENTIAL: Generated by RISKDESK.</footer>");
    html.push_str("</body></html>");
    Ok(html)
}

/// Minimal but structurally valid artifact for the failure path.
fn placeholder(identity: &str, asset_label: &str, error_text: &str) -> Vec<u8> {
    format!(
        "<!DOCTYPE html><html><body><h1>RISK REPORT UNAVAILABLE</h1>\
         <p>Account Holder: {}</p><p>Asset: {}</p><p>Error: {}</p></body></html>",
        escape(identity),
        escape(asset_label),
        escape(error_text),
    )
    .into_bytes()
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn format_money(value: f64) -> String {
    if value.is_finite() {
        format!("${:.2}", value)
    } else {
        "n/a".to_string()
    }
}

fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}%", value * 100.0)
    } else {
        "n/a".to_string()
    }
}

fn svg_open() -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#666}}</style>"#,
        w = CHART_WIDTH,
        h = CHART_HEIGHT
    )
}

/// Price history as an SVG polyline. Zero points renders an annotated empty
/// frame; one point renders a single marker. Both are valid artifacts.
fn line_chart(points: &[PricePoint]) -> String {
    let mut svg = svg_open();
    let finite: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.price.is_finite())
        .map(|(i, p)| (i, p.price))
        .collect();

    if finite.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle">no price history</text>"#,
            x = CHART_WIDTH / 2,
            y = CHART_HEIGHT / 2
        ));
        svg.push_str("</svg>");
        return svg;
    }

    let (min_v, max_v) = value_extent(finite.iter().map(|(_, v)| *v));
    let span_x = (finite.len().max(2) - 1) as f64;
    let to_x = |i: usize| PADDING + (i as f64 / span_x) * (CHART_WIDTH as f64 - 2.0 * PADDING);
    let to_y = |v: f64| {
        let t = (v - min_v) / (max_v - min_v);
        (CHART_HEIGHT as f64 - PADDING) - t * (CHART_HEIGHT as f64 - 2.0 * PADDING)
    };

    if finite.len() == 1 {
        let (i, v) = finite[0];
        svg.push_str(&format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="3" fill="{}" />"#,
            to_x(i),
            to_y(v),
            LINE_COLOR
        ));
    } else {
        let coords: Vec<String> = finite
            .iter()
            .map(|&(i, v)| format!("{:.1},{:.1}", to_x(i), to_y(v)))
            .collect();
        svg.push_str(&format!(
            r#"<polyline fill="none" stroke="{}" stroke-width="1.5" points="{}" />"#,
            LINE_COLOR,
            coords.join(" ")
        ));
    }

    svg.push_str(&format!(
        r#"<text x="{x}" y="12">{hi}</text><text x="{x}" y="{by}">{lo}</text>"#,
        x = 4,
        by = CHART_HEIGHT - 4,
        hi = format_money(max_v),
        lo = format_money(min_v),
    ));
    svg.push_str("</svg>");
    svg
}

/// Comparison set as an SVG bar chart, one bar per asset label.
fn bar_chart(comparison: &ComparisonSet) -> String {
    let mut svg = svg_open();
    let entries: Vec<(&String, f64)> = comparison
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(k, v)| (k, *v))
        .collect();

    if entries.is_empty() {
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" text-anchor="middle">no comparison data</text>"#,
            x = CHART_WIDTH / 2,
            y = CHART_HEIGHT / 2
        ));
        svg.push_str("</svg>");
        return svg;
    }

    let max_v = entries.iter().map(|(_, v)| *v).fold(0.0f64, f64::max).max(1e-9);
    let plot_w = CHART_WIDTH as f64 - 2.0 * PADDING;
    let plot_h = CHART_HEIGHT as f64 - 2.0 * PADDING;
    let slot = plot_w / entries.len() as f64;
    let bar_w = (slot * 0.7).max(1.0);

    for (idx, (label, value)) in entries.iter().enumerate() {
        let h = (value / max_v) * plot_h;
        let x = PADDING + idx as f64 * slot + (slot - bar_w) / 2.0;
        let y = CHART_HEIGHT as f64 - PADDING - h;
        let color = BAR_COLORS[idx % BAR_COLORS.len()];
        svg.push_str(&format!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" />"#,
            x, y, bar_w, h, color
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{}" text-anchor="middle">{}</text>"#,
            x + bar_w / 2.0,
            CHART_HEIGHT - 20,
            escape(label)
        ));
        svg.push_str(&format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
            x + bar_w / 2.0,
            (y - 4.0).max(10.0),
            format_pct(*value)
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// Extent with a tiny pad so a flat series still spans a visible range.
fn value_extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if !min_v.is_finite() || !max_v.is_finite() {
        return (0.0, 1.0);
    }
    if (max_v - min_v).abs() < f64::EPSILON {
        let pad = min_v.abs().max(1.0) * 0.05;
        return (min_v - pad, max_v + pad);
    }
    (min_v, max_v)
}
