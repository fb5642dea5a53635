use crate::models::PoolSet;

const ALL_POOLS: &str = "all";

/// The single-page form: pool picker, epoch input and a results table.
pub fn render_index(pools: &PoolSet) -> String {
    let options: String = pools
        .iter()
        .map(|pool| {
            format!(
                "        <option value=\"{}\">{}</option>\n",
                escape_html(&pool.id_hex()),
                escape_html(&pool.name)
            )
        })
        .collect();

    PAGE.replace("{{POOL_OPTIONS}}", &options)
        .replace("{{ALL_POOLS}}", ALL_POOLS)
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Epoch Rewards</title>
  <style>
    body { font-family: sans-serif; max-width: 56rem; margin: 2rem auto; }
    label { display: block; margin-top: 1rem; }
    table { border-collapse: collapse; margin-top: 1.5rem; width: 100%; }
    th, td { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }
    td.error { color: #b00020; }
  </style>
</head>
<body>
  <h1>Compute Rewards</h1>
  <form id="rewards-form">
    <label>Pool
      <select id="pool">
        <option value="{{ALL_POOLS}}">All Pools</option>
{{POOL_OPTIONS}}      </select>
    </label>
    <label>Epoch
      <input id="epoch" type="text" required>
    </label>
    <button type="submit">Compute</button>
  </form>
  <p id="status"></p>
  <table id="results" hidden>
    <thead><tr><th>Pool</th><th>Pool ID</th><th>Raw result</th><th>Rewards</th></tr></thead>
    <tbody></tbody>
  </table>
  <script>
    const form = document.getElementById('rewards-form');
    const status = document.getElementById('status');
    const table = document.getElementById('results');
    const body = table.querySelector('tbody');

    function cell(row, text, cls) {
      const td = row.insertCell();
      td.textContent = text ?? '';
      if (cls) td.className = cls;
    }

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      const pool = document.getElementById('pool').value;
      const epoch = document.getElementById('epoch').value.trim();
      const all = pool === '{{ALL_POOLS}}';
      status.textContent = 'Loading...';
      body.innerHTML = '';
      table.hidden = true;
      try {
        const response = await fetch(all ? '/api/all-pools' : '/api/rewards', {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(all ? { epoch } : { poolId: pool, epoch }),
        });
        const data = await response.json();
        if (!data.success) {
          status.textContent = 'Error: ' + data.error;
          return;
        }
        for (const r of data.results) {
          const row = body.insertRow();
          cell(row, r.poolName);
          cell(row, r.poolId);
          if (r.error) {
            cell(row, r.error, 'error');
            cell(row, '');
          } else {
            cell(row, r.result);
            cell(row, r.formattedValue);
          }
        }
        table.hidden = false;
        status.textContent = '';
      } catch (err) {
        status.textContent = 'Error: ' + err;
      }
    });
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_lists_all_pools_first() {
        let html = render_index(&PoolSet::default());
        let all = html.find(">All Pools<").unwrap();
        let first = html.find(">PancakeSwap WETH<").unwrap();
        assert!(all < first);
        assert_eq!(html.matches("<option ").count(), 6);
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_pool_names_are_escaped() {
        let pools = PoolSet::from_parts(
            &["0x02d1dc927ecebd87407e1a58a6f2d81f0d6c0ade72ac926e865310aa482b893a"],
            &["<b>A & B</b>"],
        )
        .unwrap();
        let html = render_index(&pools);
        assert!(html.contains(">&lt;b&gt;A &amp; B&lt;/b&gt;<"));
        assert!(!html.contains("<b>A"));
    }
}
