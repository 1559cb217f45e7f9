use crate::breakdown::StatusBreakdown;
use crate::chart::SlotDefinition;
use crate::filters::{DropdownSpec, FilterKind};
use crate::models::{DashboardResponse, OverviewResponse};
use serde::Serialize;

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub fn render_index(
    dashboard: &DashboardResponse,
    slots: &[&SlotDefinition],
) -> Result<String, serde_json::Error> {
    let selects: String = dashboard
        .dropdowns
        .iter()
        .map(|spec| render_select(spec, dashboard.filters.get(spec.filter.param())))
        .collect();
    let canvases: String = slots.iter().map(|slot| render_canvas(slot)).collect();
    let breakdown = StatusBreakdown {
        lines: dashboard.breakdown.clone(),
    }
    .to_html();
    let charts = format!(
        r#"{canvases}<div class="chart-card"><h2>Status Breakdown</h2><div id="ticketStatusBreakdown">{breakdown}</div></div>"#
    );
    let subtitle = format!(
        r#"Viewing as {}. Refreshed <span id="refreshed">{}</span>."#,
        dashboard.role.as_str(),
        escape_html(&dashboard.refreshed_at)
    );

    Ok(render_page(
        "Helpdesk Statistics",
        &subtitle,
        &selects,
        &charts,
        &embedded(dashboard)?,
    ))
}

pub fn render_overview(
    overview: &OverviewResponse,
    slots: &[&SlotDefinition],
) -> Result<String, serde_json::Error> {
    let charts: String = if slots.is_empty() {
        r#"<p class="hint">No overview data loaded.</p>"#.to_string()
    } else {
        slots.iter().map(|slot| render_canvas(slot)).collect()
    };
    let subtitle = format!(
        r#"Ticket report. Loaded <span id="refreshed">{}</span>."#,
        escape_html(&overview.loaded_at)
    );

    Ok(render_page(
        "Helpdesk Overview",
        &subtitle,
        "",
        &charts,
        &embedded(overview)?,
    ))
}

// Keeps a `</script>` inside a label from closing the data block.
fn embedded<T: Serialize>(data: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(data)?.replace("</", "<\\/"))
}

fn render_page(title: &str, subtitle: &str, filters: &str, charts: &str, data: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", title)
        .replace("{{SUBTITLE}}", subtitle)
        .replace("{{FILTERS}}", filters)
        .replace("{{CHARTS}}", charts)
        .replace("{{DATA}}", data)
}

fn filter_title(filter: FilterKind) -> &'static str {
    match filter {
        FilterKind::TimePeriod => "Time Period",
        FilterKind::Customer => "Customer",
        FilterKind::Region => "Region",
        FilterKind::Terminal => "Terminal",
    }
}

fn render_select(spec: &DropdownSpec, current: Option<&String>) -> String {
    let options: String = spec
        .entries()
        .iter()
        .map(|option| {
            let selected = if current.map(String::as_str) == Some(option.id.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected}>{}</option>"#,
                escape_html(&option.id),
                escape_html(&option.name)
            )
        })
        .collect();
    let disabled = if spec.editable { "" } else { " disabled" };
    let id = spec.filter.control_id();

    format!(
        r#"<label class="filter" for="{id}"><span class="label">{}</span><select id="{id}" data-filter="{}"{disabled}>{options}</select></label>"#,
        filter_title(spec.filter),
        spec.filter.param(),
    )
}

fn render_canvas(slot: &SlotDefinition) -> String {
    format!(
        r#"<div class="chart-card"><h2>{}</h2><canvas id="{}"></canvas></div>"#,
        escape_html(slot.label),
        slot.target
    )
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
  <script src="https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2"></script>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f4f6fb;
      --bg-2: #d6e4ff;
      --ink: #1f2a37;
      --accent: #007bff;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #eef3ff 60%, #f7f9fc 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(1280px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: baseline;
      justify-content: space-between;
      gap: 8px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.8rem, 4vw, 2.6rem);
      margin: 0;
    }

    .subtitle {
      margin: 0;
      color: #5f6b7a;
      font-size: 0.95rem;
    }

    nav a {
      margin-right: 12px;
      color: #5f6b7a;
    }

    .hint {
      color: #5f6b7a;
    }

    .filters {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
      gap: 16px;
      background: var(--card);
      border-radius: 20px;
      padding: 20px;
      box-shadow: var(--shadow);
    }

    .filter {
      display: grid;
      gap: 6px;
    }

    .filter .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #7b8594;
    }

    select {
      appearance: none;
      border: 1px solid rgba(47, 72, 88, 0.16);
      border-radius: 12px;
      padding: 10px 12px;
      font: inherit;
      background: white;
    }

    select:disabled {
      background: rgba(47, 72, 88, 0.06);
      color: #7b8594;
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(360px, 1fr));
      gap: 20px;
    }

    .chart-card {
      background: var(--card);
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      box-shadow: var(--shadow);
    }

    .chart-card h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
    }

    #ticketStatusBreakdown p {
      margin: 4px 0;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    @media (max-width: 600px) {
      .charts {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <nav><a href="/">Dashboard</a> <a href="/overview">Overview</a></nav>
      <h1>{{TITLE}}</h1>
      <p class="subtitle">{{SUBTITLE}}</p>
    </header>

    <section class="filters">{{FILTERS}}</section>

    <div class="status" id="status"></div>

    <section class="charts">
      {{CHARTS}}
    </section>
  </main>

  <script id="dashboard-data" type="application/json">{{DATA}}</script>
  <script>
    const statusEl = document.getElementById('status');
    const refreshedEl = document.getElementById('refreshed');
    const breakdownEl = document.getElementById('ticketStatusBreakdown');
    const selects = Array.from(document.querySelectorAll('select[data-filter]'));
    const live = {};
    let issued = 0;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (raw) =>
      String(raw).replace(/[&<>"']/g, (ch) => ({
        '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
      })[ch]);

    const prepare = (canvas, config) => {
      const ctx = canvas.getContext('2d');
      config.data.datasets.forEach((dataset) => {
        if (dataset.gradient) {
          const fill = ctx.createLinearGradient(0, 0, 0, canvas.height || 400);
          fill.addColorStop(0, dataset.gradient.from);
          fill.addColorStop(1, dataset.gradient.to);
          dataset.backgroundColor = fill;
          delete dataset.gradient;
        }
        if (dataset.dataLabels) {
          const labels = dataset.dataLabels;
          delete dataset.dataLabels;
          if (window.ChartDataLabels) {
            config.plugins = [ChartDataLabels];
          }
          config.options.plugins = config.options.plugins || {};
          config.options.plugins.datalabels = {
            color: '#fff',
            formatter: (_value, context) => labels[context.dataIndex]
          };
        }
      });
      return config;
    };

    const renderCharts = (charts) => {
      Object.entries(charts).forEach(([target, config]) => {
        const canvas = document.getElementById(target);
        if (!canvas) {
          return;
        }
        if (live[target]) {
          live[target].destroy();
        }
        live[target] = new Chart(canvas, prepare(canvas, config));
      });
    };

    const renderBreakdown = (lines) => {
      breakdownEl.innerHTML = lines
        .map((line) => `<p><strong>${escapeHtml(line.label)}:</strong> ${line.count} tickets (${line.percentage.toFixed(2)}%)</p>`)
        .join('');
    };

    const apply = (dashboard) => {
      renderCharts(dashboard.charts);
      if (breakdownEl) {
        renderBreakdown(dashboard.breakdown || []);
      }
      if (refreshedEl) {
        refreshedEl.textContent = dashboard.refreshed_at || dashboard.loaded_at;
      }
      selects.forEach((select) => {
        const value = (dashboard.filters || {})[select.dataset.filter];
        if (value !== undefined) {
          select.value = value;
        }
      });
      if (dashboard.last_error) {
        setStatus(dashboard.last_error, 'error');
      } else {
        setStatus('', '');
      }
    };

    const changeFilter = async (filter, value) => {
      issued += 1;
      const sequence = issued;
      setStatus('Loading...', 'info');
      const res = await fetch('/api/filters', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ filter, value })
      });
      if (sequence !== issued) {
        return;
      }
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      const dashboard = await res.json();
      if (sequence === issued) {
        apply(dashboard);
      }
    };

    selects.forEach((select) => {
      select.addEventListener('change', () => {
        changeFilter(select.dataset.filter, select.value).catch((err) => setStatus(err.message, 'error'));
      });
    });

    apply(JSON.parse(document.getElementById('dashboard-data').textContent));
  </script>
</body>
</html>
"#;
