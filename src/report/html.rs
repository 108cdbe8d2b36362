//! HTML report generation with Plotly charts
//!
//! The page is self-contained apart from the Plotly script: the view is
//! embedded as JSON and drawn on load.

use crate::dashboard::DashboardView;
use crate::error::Result;
use crate::summary::Trend;
use std::io::Write;

const STYLE: &str = r#"
        :root {
            --bg: #0d1117;
            --card: #161b22;
            --border: #30363d;
            --text: #e6edf3;
            --dim: #7d8590;
            --up: #3fb950;
            --down: #f85149;
            --accent: #58a6ff;
        }
        * { box-sizing: border-box; margin: 0; padding: 0; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Noto Sans', Helvetica, Arial, sans-serif;
            background: var(--bg);
            color: var(--text);
            line-height: 1.5;
        }
        .container { max-width: 1600px; margin: 0 auto; padding: 2rem; }
        .header { margin-bottom: 2rem; padding-bottom: 1rem; border-bottom: 1px solid var(--border); }
        .logo { font-size: 2.5rem; font-weight: 800; color: var(--accent); }
        .subtitle { color: var(--dim); }
        .stats { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 1rem; margin-bottom: 2rem; }
        .stat { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1.25rem; text-align: center; }
        .stat-value { font-size: 1.75rem; font-weight: 700; }
        .stat-value.up { color: var(--up); }
        .stat-value.down { color: var(--down); }
        .stat-label { color: var(--dim); font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.05em; }
        .chart-card { background: var(--card); border: 1px solid var(--border); border-radius: 12px; padding: 1rem; margin-bottom: 1.5rem; }
        .chart { width: 100%; height: 420px; }
        .empty { color: var(--dim); padding: 2rem; text-align: center; }
        table { width: 100%; border-collapse: collapse; font-size: 0.875rem; }
        th, td { padding: 0.5rem; border-bottom: 1px solid var(--border); text-align: left; }
        td.numeric { text-align: right; font-variant-numeric: tabular-nums; }
"#;

const SCRIPT: &str = r#"
        const layoutBase = {
            paper_bgcolor: '#161b22',
            plot_bgcolor: '#0d1117',
            font: { color: '#e6edf3' },
            margin: { t: 40, r: 30, b: 60, l: 70 }
        };
        const config = { responsive: true, displayModeBar: false };

        function trace(series, mode) {
            return {
                x: series.points.map(p => p.x),
                y: series.points.map(p => p.y),
                text: series.points.map(p => p.label),
                hoverinfo: 'text',
                mode: mode,
                type: 'scatter',
                name: series.name
            };
        }

        function plot(id, traces, title) {
            const el = document.getElementById(id);
            if (traces.length === 0 || traces.every(t => t.x.length === 0)) {
                el.innerHTML = '<div class="empty">No data to display</div>';
                return;
            }
            Plotly.newPlot(el, traces, Object.assign({ title: { text: title } }, layoutBase), config);
        }

        plot('overview-chart', DATA.overview.map(s => trace(s, 'lines+markers')), 'All models (averaged across scenarios)');
        if (DATA.criteria.model.kind === 'all') {
            document.getElementById('timeseries-chart').innerHTML =
                '<div class="empty">Select a model to see its performance over time</div>';
        } else {
            plot('timeseries-chart', [trace(DATA.time_series, 'lines+markers')], DATA.time_series.name);
        }

        const days = DATA.daily_comparison;
        plot('comparison-chart', days.length === 0 ? [] : [{
            x: days.map(d => d.date),
            y: days.map(d => d.mean),
            error_y: { type: 'data', array: days.map(d => d.std_dev), visible: true },
            text: days.map(d => `Mean: ${d.mean.toFixed(4)}<br>Std Dev: ${d.std_dev.toFixed(4)}<br>Runs: ${d.runs}`),
            hoverinfo: 'text',
            mode: 'markers',
            type: 'scatter',
            name: 'Daily average'
        }], 'Daily comparison (±1 std dev)');
"#;

/// Escape text for HTML body content
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

fn stat_card(value: &str, label: &str, class: &str) -> String {
    format!(
        r#"<div class="stat"><div class="stat-value {}">{}</div><div class="stat-label">{}</div></div>"#,
        class,
        html_escape(value),
        html_escape(label)
    )
}

fn build_stat_cards(view: &DashboardView) -> String {
    let s = &view.summary;
    if s.is_empty() {
        return r#"<div class="empty">No data available for the selected filters</div>"#.to_string();
    }

    let trend_class = match s.trend {
        Some(Trend::Up) => "up",
        Some(Trend::Down) => "down",
        _ => "",
    };
    let (latest_label, mean_label, points_label) = if view.averaging {
        ("Latest Avg", "Overall Avg", "Avg Points")
    } else {
        ("Latest Value", "Average", "Data Points")
    };

    let mut cards = vec![
        stat_card(&fmt_value(s.latest), latest_label, trend_class),
        stat_card(&fmt_value(s.mean), mean_label, ""),
        stat_card(&fmt_value(s.min), "Minimum", ""),
        stat_card(&fmt_value(s.max), "Maximum", ""),
        stat_card(&s.unique_runs.to_string(), "Total Runs", ""),
        stat_card(&s.count.to_string(), points_label, ""),
    ];
    if let Some(days) = s.days_tracked {
        cards.push(stat_card(&days.to_string(), "Days Tracked", ""));
    }
    if let Some(n) = s.scenarios_averaged {
        cards.push(stat_card(&n.to_string(), "Scenarios Averaged", ""));
    }
    cards.join("\n")
}

fn build_table(view: &DashboardView) -> String {
    if view.table.is_empty() {
        return r#"<div class="empty">No data to display</div>"#.to_string();
    }

    let mut html = String::from("<table><thead><tr><th>Model</th><th>Scenario</th>");
    if view.averaging {
        html.push_str("<th>Scenarios Included</th>");
    }
    html.push_str("<th>Metric</th><th>Split</th><th>Date &amp; Time</th><th>Mean</th><th>Count</th><th>Std Dev</th></tr></thead><tbody>");

    for r in &view.table {
        html.push_str("<tr>");
        html.push_str(&format!("<td>{}</td><td>{}</td>", html_escape(&r.model), html_escape(&r.scenario_class)));
        if view.averaging {
            let scenarios = r.average.as_ref().map(|a| a.scenarios.as_str()).unwrap_or("-");
            html.push_str(&format!("<td>{}</td>", html_escape(scenarios)));
        }
        let when = r
            .run_timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        html.push_str(&format!(
            r#"<td>{}</td><td>{}</td><td>{}</td><td class="numeric">{}</td><td class="numeric">{}</td><td class="numeric">{}</td>"#,
            html_escape(&r.metric_name),
            html_escape(if r.split.is_empty() { "-" } else { r.split.as_str() }),
            when,
            fmt_value(r.stats.mean),
            r.stats.count.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string()),
            fmt_value(r.stats.std),
        ));
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

pub fn write<W: Write>(writer: &mut W, view: &DashboardView) -> Result<()> {
    // "</" inside a script block would end it early
    let json_data = serde_json::to_string(view)?.replace("</", "<\\/");
    let subtitle = format!(
        "{} records · generated {}",
        view.records.len(),
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );

    write!(
        writer,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Benchmark Dashboard Report</title>
    <script src="https://cdn.plot.ly/plotly-2.27.0.min.js"></script>
    <style>{style}</style>
</head>
<body>
    <div class="container">
        <div class="header">
            <div class="logo">benchdash</div>
            <div class="subtitle">{subtitle}</div>
        </div>
        <div class="stats">
{cards}
        </div>
        <div class="chart-card"><div id="overview-chart" class="chart"></div></div>
        <div class="chart-card"><div id="timeseries-chart" class="chart"></div></div>
        <div class="chart-card"><div id="comparison-chart" class="chart"></div></div>
        <div class="chart-card" id="data-table">
{table}
        </div>
    </div>
    <script>
        const DATA = {data};
{script}
    </script>
</body>
</html>
"#,
        style = STYLE,
        subtitle = html_escape(&subtitle),
        cards = build_stat_cards(view),
        table = build_table(view),
        data = json_data,
        script = SCRIPT,
    )?;
    Ok(())
}
