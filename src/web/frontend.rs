//! Embedded HTML/CSS/JS frontend for the demandboard web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant. Charts
//! are drawn with Chart.js loaded from a CDN; every chart config and table
//! arrives fully prepared from the JSON API.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>demandboard</title>
<script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app { max-width: 1280px; margin: 0 auto; padding: 24px; }

header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  margin-bottom: 24px;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}
header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.health-badges { display: flex; gap: 8px; }
.badge {
  font-size: 12px;
  padding: 2px 10px;
  border-radius: 12px;
  border: 1px solid var(--border);
}
.badge.ok { color: var(--green); }
.badge.warn { color: var(--yellow); }

nav { display: flex; gap: 4px; margin-bottom: 20px; }
nav button {
  background: none;
  border: 1px solid transparent;
  color: var(--text-muted);
  padding: 6px 14px;
  border-radius: var(--radius);
  cursor: pointer;
  font-size: 14px;
}
nav button.active { color: var(--text); border-color: var(--border); background: var(--surface); }

.panel { display: none; }
.panel.active { display: block; }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 12px; }

.grid-2 { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.chart-box { position: relative; height: 280px; }

/* Controls */
.controls { display: flex; gap: 8px; align-items: center; margin-bottom: 12px; }
input[type=text], select {
  background: var(--bg);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 6px 10px;
  font-size: 14px;
}
input[type=text] { flex: 1; }
.btn {
  background: var(--surface);
  color: var(--text);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 6px 14px;
  cursor: pointer;
}
.btn.primary { background: var(--accent); color: #0d1117; border-color: var(--accent); }

/* Plan table */
.table-wrap { overflow-x: auto; max-height: 560px; }
table { border-collapse: collapse; width: 100%; font-size: 13px; }
th, td { padding: 4px 10px; border-bottom: 1px solid var(--border); text-align: right; white-space: nowrap; }
th { position: sticky; top: 0; background: var(--surface); color: var(--text-muted); }
td.sku, td.metric, th.sku, th.metric { text-align: left; }
td.sku { font-family: var(--mono); color: var(--accent); }
td.missing { color: var(--text-muted); }
.empty { color: var(--text-muted); padding: 24px; text-align: center; }

/* Chat */
.chat-log { height: 360px; overflow-y: auto; margin-bottom: 12px; }
.msg { margin-bottom: 10px; white-space: pre-wrap; }
.msg .who { font-weight: 600; margin-right: 6px; }
.msg.user .who { color: var(--accent); }
.msg.agent .who { color: var(--green); }
.msg.error { color: var(--red); }

.history-item { border-bottom: 1px solid var(--border); padding: 10px 0; }
.history-item .meta { color: var(--text-muted); font-size: 12px; }

.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 10px 16px;
  opacity: 0;
  transition: opacity 0.2s;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); color: var(--red); }
</style>
</head>
<body>
<div class="app">

<header>
  <div>
    <h1><span class="logo">demandboard</span></h1>
    <div class="subtitle">Demand plan review</div>
  </div>
  <div class="health-badges" id="health-badges"></div>
</header>

<nav id="nav">
  <button class="active" data-panel="overview">Overview</button>
  <button data-panel="table">Plan Table</button>
  <button data-panel="assistant">Assistant</button>
  <button data-panel="history">History</button>
</nav>

<!-- Overview Panel -->
<div class="panel active" id="panel-overview">
  <div class="grid-2">
    <div class="card"><h2>Historical Sales</h2><div class="chart-box"><canvas id="chart-history"></canvas></div></div>
    <div class="card"><h2>Constrained Forecast</h2><div class="chart-box"><canvas id="chart-forecast"></canvas></div></div>
  </div>
  <div class="card"><h2>Top Products</h2><div class="chart-box"><canvas id="chart-top"></canvas></div></div>
</div>

<!-- Table Panel -->
<div class="panel" id="panel-table">
  <div class="card">
    <h2>Plan by SKU</h2>
    <div class="controls">
      <input type="text" id="sku-filter" placeholder="Filter SKU...">
      <select id="bucket">
        <option value="weekly">Weekly</option>
        <option value="monthly">Monthly</option>
      </select>
    </div>
    <div class="table-wrap" id="plan-table"></div>
  </div>
</div>

<!-- Assistant Panel -->
<div class="panel" id="panel-assistant">
  <div class="grid-2">
    <div class="card">
      <h2>Chat</h2>
      <div class="chat-log" id="chat-log"></div>
      <div class="controls">
        <input type="text" id="chat-input" placeholder="Ask about the plan, or type 'run planning'">
        <button class="btn primary" id="btn-send">Send</button>
      </div>
    </div>
    <div class="card">
      <h2>Chart Generator</h2>
      <div class="controls">
        <input type="text" id="chart-input" placeholder="e.g. weekly forecast for SKU_001">
        <button class="btn primary" id="btn-chart">Draw</button>
      </div>
      <div class="chart-box"><canvas id="chart-dynamic"></canvas></div>
    </div>
  </div>
</div>

<!-- History Panel -->
<div class="panel" id="panel-history">
  <div class="card">
    <h2>Interaction History</h2>
    <div id="history-list"></div>
  </div>
</div>

</div>

<!-- Toast -->
<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
const charts = {};
let filterTimer = null;

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  return res.json();
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------
document.getElementById('nav').addEventListener('click', e => {
  if (e.target.tagName !== 'BUTTON') return;
  const panel = e.target.dataset.panel;
  if (!panel) return;

  document.querySelectorAll('nav button').forEach(b => b.classList.remove('active'));
  e.target.classList.add('active');

  document.querySelectorAll('.panel').forEach(p => p.classList.remove('active'));
  document.getElementById('panel-' + panel).classList.add('active');

  loadPanel(panel);
});

async function loadPanel(panel) {
  switch (panel) {
    case 'overview': return loadOverview();
    case 'table': return loadTable();
    case 'history': return loadHistory();
  }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

// Replaces any chart already drawn on the canvas.
function drawChart(id, config) {
  if (charts[id]) charts[id].destroy();
  const ctx = document.getElementById(id);
  const opts = Object.assign({ responsive: true, maintainAspectRatio: false }, config.options || {});
  charts[id] = new Chart(ctx, Object.assign({}, config, { options: opts }));
}

async function loadOverview() {
  try {
    const d = await api('GET', '/api/dashboard');
    drawChart('chart-history', d.charts.history);
    drawChart('chart-forecast', d.charts.forecast);
    drawChart('chart-top', d.charts.top_products);
  } catch (e) {
    toast('Failed to load dashboard: ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Plan table
// ---------------------------------------------------------------------------
async function loadTable() {
  const sku = document.getElementById('sku-filter').value;
  const bucket = document.getElementById('bucket').value;
  const q = '?sku=' + encodeURIComponent(sku) + '&bucket=' + encodeURIComponent(bucket);
  try {
    renderTable(await api('GET', '/api/table' + q));
  } catch (e) {
    toast('Failed to load table: ' + e.message, true);
  }
}

function renderTable(view) {
  const el = document.getElementById('plan-table');
  if (view.status !== 'table') {
    el.innerHTML = `<div class="empty">${esc(view.message || 'No data available')}</div>`;
    return;
  }

  let html = '<table><thead><tr><th class="sku">SKU</th><th class="metric">Metric</th>';
  html += view.dates.map(d => `<th>${esc(d)}</th>`).join('');
  html += '</tr></thead><tbody>';

  let lastSku = null;
  for (const row of view.rows) {
    const skuCell = row.sku === lastSku ? '' : esc(row.sku);
    lastSku = row.sku;
    html += `<tr><td class="sku">${skuCell}</td><td class="metric">${esc(row.metric)}</td>`;
    html += row.cells.map(c => c === null
      ? '<td class="missing">-</td>'
      : `<td>${c.toLocaleString(undefined, { maximumFractionDigits: 0 })}</td>`).join('');
    html += '</tr>';
  }
  el.innerHTML = html + '</tbody></table>';
}

document.getElementById('sku-filter').addEventListener('input', () => {
  clearTimeout(filterTimer);
  filterTimer = setTimeout(loadTable, 200);
});
document.getElementById('bucket').addEventListener('change', loadTable);

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------
function appendMessage(who, text, cls) {
  const log = document.getElementById('chat-log');
  const div = document.createElement('div');
  div.className = 'msg ' + cls;
  div.innerHTML = `<span class="who">${esc(who)}:</span>${esc(text)}`;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

async function sendChat() {
  const input = document.getElementById('chat-input');
  const message = input.value.trim();
  if (!message) return;
  input.value = '';
  appendMessage('You', message, 'user');

  try {
    const r = await api('POST', '/api/chat', { message });
    const isError = r.response.startsWith('Error:');
    appendMessage(r.agent || 'System', r.response, isError ? 'error' : 'agent');
    if (r.planning) {
      (r.planning.logs || []).forEach(l => appendMessage('Log', l, 'agent'));
      if (r.planning.report) appendMessage('Report', r.planning.report, 'agent');
      loadOverview();
      loadTable();
    }
  } catch (e) {
    appendMessage('System', 'Error: ' + e.message, 'error');
  }
}

document.getElementById('btn-send').addEventListener('click', sendChat);
document.getElementById('chat-input').addEventListener('keydown', e => {
  if (e.key === 'Enter') sendChat();
});

// ---------------------------------------------------------------------------
// Chart generator
// ---------------------------------------------------------------------------
async function requestChart() {
  const query = document.getElementById('chart-input').value.trim();
  if (!query) return;
  try {
    const r = await api('POST', '/api/chart', { query });
    if (r.status === 'ok') {
      drawChart('chart-dynamic', r.config);
    } else {
      toast(r.message, true);
    }
  } catch (e) {
    toast('Error generating chart: ' + e.message, true);
  }
}

document.getElementById('btn-chart').addEventListener('click', requestChart);
document.getElementById('chart-input').addEventListener('keydown', e => {
  if (e.key === 'Enter') requestChart();
});

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------
async function loadHistory() {
  const el = document.getElementById('history-list');
  try {
    const h = await api('GET', '/api/history');
    if (!h.entries.length) {
      el.innerHTML = '<div class="empty">No interactions yet</div>';
      return;
    }
    el.innerHTML = h.entries.slice().reverse().map(i => `
      <div class="history-item">
        <div class="meta">${esc(i.timestamp.slice(0, 16))} &middot; ${esc(i.agent)}</div>
        <div><strong>Q:</strong> ${esc(i.user_query)}</div>
        <div><strong>A:</strong> ${esc(i.agent_response)}</div>
      </div>`).join('');
  } catch (e) {
    toast('Failed to load history: ' + e.message, true);
  }
}

// ---------------------------------------------------------------------------
// Health badges
// ---------------------------------------------------------------------------
async function loadHealth() {
  try {
    const h = await api('GET', '/api/health');
    document.getElementById('health-badges').innerHTML = [
      badge(h.plan_records + ' plan rows', h.plan_records > 0 ? 'ok' : 'warn'),
      badge('Agent', h.agent_available ? 'ok' : 'warn'),
    ].join('');
  } catch (e) {
    // badges are optional
  }
}

function badge(label, cls) {
  return `<span class="badge ${cls}">${esc(label)}</span>`;
}

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------
function esc(s) {
  if (s === undefined || s === null) return '';
  return String(s).replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
loadHealth();
loadOverview();
</script>
</body>
</html>"##;
