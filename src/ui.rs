pub fn render_index(date: &str) -> String {
    INDEX_HTML.replace("{{DATE}}", date)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Phone Farm</title>
  <link rel="stylesheet" href="/assets/style.css" />
</head>
<body>
  <main class="app">
    <header>
      <h1>Phone Farm</h1>
      <p class="subtitle">Earning apps across all phones, as of {{DATE}}.</p>
    </header>

    <section class="panel" id="totals">
      <div class="stat">
        <span class="label">Phones</span>
        <span id="total-phones" class="value">0</span>
      </div>
      <div class="stat">
        <span class="label">Apps</span>
        <span id="total-apps" class="value">0</span>
      </div>
      <div class="stat">
        <span class="label">Balance</span>
        <span id="total-balance" class="value">0</span>
      </div>
      <div class="stat">
        <span class="label">Earned</span>
        <span id="total-earned" class="value">0</span>
      </div>
      <div class="stat">
        <span class="label">Withdrawn</span>
        <span id="total-withdrawn" class="value">0</span>
      </div>
      <div class="stat">
        <span class="label">Ready to withdraw</span>
        <span id="ready-apps" class="value net">0</span>
      </div>
    </section>

    <section class="chart-area">
      <div class="chart-header">
        <h2>Earnings, last 7 days</h2>
      </div>
      <div class="chart-card">
        <svg id="chart" viewBox="0 0 600 260" aria-label="Daily earnings chart" role="img"></svg>
      </div>
    </section>

    <section class="phones">
      <h2>Phones</h2>
      <table id="phone-table">
        <thead>
          <tr>
            <th>Phone</th>
            <th>Apps</th>
            <th>Balance</th>
            <th>Earned</th>
            <th>Withdrawn</th>
          </tr>
        </thead>
        <tbody></tbody>
      </table>
    </section>

    <div class="status" id="status"></div>
  </main>
  <script src="/assets/app.js"></script>
</body>
</html>
"#;
