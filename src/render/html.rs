//! Self-contained HTML rendering of a page: inline CSS, no scripts, every
//! backend-provided string escaped.

use super::{contrast_text, coolwarm, format_cell};
use crate::payload::{BarData, Matrix, Records};
use crate::widgets::{Page, Widget};

pub fn render_html(page: &Page, generated: &str) -> String {
    let title = page
        .widgets
        .iter()
        .find_map(|w| match w {
            Widget::Title(t) => Some(t.as_str()),
            _ => None,
        })
        .unwrap_or("Dashboard");
    let body: String = page.widgets.iter().map(render_widget).collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{css}</style>
</head>
<body>
<main>
{body}<footer>Generated {generated}</footer>
</main>
</body>
</html>
"#,
        title = escape(title),
        css = CSS,
        body = body,
        generated = escape(generated),
    )
}

const CSS: &str = "
body { font-family: system-ui, sans-serif; margin: 0; background: #fafafa; color: #1f2328; }
main { max-width: 1100px; margin: 0 auto; padding: 2rem; }
h1 { margin-top: 0; }
h2 { border-bottom: 1px solid #d0d7de; padding-bottom: .3rem; }
.metrics { display: flex; flex-wrap: wrap; gap: 1rem; }
.metric { background: #fff; border: 1px solid #d0d7de; border-radius: 6px; padding: .75rem 1rem; min-width: 10rem; }
.metric .label { font-size: .85rem; color: #57606a; }
.metric .value { font-size: 1.6rem; font-weight: 600; }
.caption { color: #57606a; font-size: .9rem; }
.error { background: #ffebe9; border: 1px solid #ff8182; border-radius: 6px; padding: .5rem .75rem; color: #82071e; }
table { border-collapse: collapse; background: #fff; font-size: .9rem; }
th, td { border: 1px solid #d0d7de; padding: .25rem .5rem; text-align: left; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
.bar-row { display: flex; align-items: center; gap: .5rem; margin: .15rem 0; }
.bar-label { width: 8rem; text-align: right; font-size: .85rem; }
.bar { background: #4c78a8; height: 1rem; }
.bar.neg { background: #e45756; }
button.pressed { font-weight: 600; }
pre { background: #f6f8fa; padding: .75rem; overflow-x: auto; }
footer { margin-top: 2rem; color: #8c959f; font-size: .8rem; }
";

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
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

fn render_widget(widget: &Widget) -> String {
    match widget {
        Widget::Title(t) => format!("<h1>{}</h1>\n", escape(t)),
        Widget::Header(t) => format!("<h2>{}</h2>\n", escape(t)),
        Widget::Subheader(t) => format!("<h3>{}</h3>\n", escape(t)),
        Widget::Caption(t) => format!("<p class=\"caption\">{}</p>\n", escape(t)),
        Widget::Metric { label, value } => format!(
            "<div class=\"metrics\"><div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div></div>\n",
            escape(label),
            escape(value)
        ),
        Widget::Field { key, value } => {
            format!("<p><strong>{}</strong>: {}</p>\n", escape(key), escape(value))
        }
        Widget::Text(t) => format!("<p>{}</p>\n", escape(t).replace('\n', "<br>")),
        Widget::Code(t) => format!("<pre>{}</pre>\n", escape(t)),
        Widget::Table(records) => table(records),
        Widget::BarChart(bars) => bar_chart(bars),
        Widget::Grid(matrix) => matrix_table(matrix, false),
        Widget::Heatmap(matrix) => matrix_table(matrix, true),
        Widget::Divider => "<hr>\n".to_string(),
        Widget::Error(t) => format!("<div class=\"error\">{}</div>\n", escape(t)),
        Widget::Select { label, value } => format!(
            "<p><label>{} <select disabled><option>{}</option></select></label></p>\n",
            escape(label),
            escape(value)
        ),
        Widget::Checkbox { label, checked } => format!(
            "<p><label><input type=\"checkbox\" disabled{}> {}</label></p>\n",
            if *checked { " checked" } else { "" },
            escape(label)
        ),
        Widget::Button { label, pressed } => format!(
            "<p><button disabled class=\"{}\">{}</button></p>\n",
            if *pressed { "pressed" } else { "idle" },
            escape(label)
        ),
    }
}

fn table(records: &Records) -> String {
    let mut html = String::from("<table><thead><tr>");
    for col in &records.columns {
        html.push_str(&format!("<th>{}</th>", escape(col)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in &records.rows {
        html.push_str("<tr>");
        for cell in row {
            let class = if matches!(cell, Some(serde_json::Value::Number(_))) {
                " class=\"num\""
            } else {
                ""
            };
            html.push_str(&format!("<td{}>{}</td>", class, escape(&Records::cell_text(cell))));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>\n");
    html
}

fn bar_chart(bars: &BarData) -> String {
    let max = bars.max_abs();
    let mut html = String::from("<div class=\"bars\">");
    for (i, category) in bars.categories.iter().enumerate() {
        for series in &bars.series {
            let label = if bars.series.len() > 1 {
                format!("{} · {}", category, series.name)
            } else {
                category.clone()
            };
            let Some(v) = series.values.get(i).copied().flatten() else {
                html.push_str(&format!(
                    "<div class=\"bar-row\"><span class=\"bar-label\">{}</span><span class=\"caption\">n/a</span></div>",
                    escape(&label)
                ));
                continue;
            };
            let pct = if max > 0.0 { v.abs() / max * 100.0 } else { 0.0 };
            html.push_str(&format!(
                "<div class=\"bar-row\"><span class=\"bar-label\">{}</span><div class=\"bar{}\" style=\"width:{:.1}%\"></div><span>{}</span></div>",
                escape(&label),
                if v < 0.0 { " neg" } else { "" },
                pct * 0.8,
                v
            ));
        }
    }
    html.push_str("</div>\n");
    html
}

fn matrix_table(matrix: &Matrix, shaded: bool) -> String {
    let mut html = String::from("<table><thead><tr><th></th>");
    for col in &matrix.columns {
        html.push_str(&format!("<th>{}</th>", escape(col)));
    }
    html.push_str("</tr></thead><tbody>");
    for (r, label) in matrix.rows.iter().enumerate() {
        html.push_str(&format!("<tr><th>{}</th>", escape(label)));
        for c in 0..matrix.columns.len() {
            let text = format_cell(matrix.cells[r].get(c).copied().flatten());
            match matrix.normalized(r, c).filter(|_| shaded) {
                Some(t) => {
                    let bg = coolwarm(t);
                    let fg = contrast_text(bg);
                    html.push_str(&format!(
                        "<td class=\"num\" style=\"background:rgb({},{},{});color:rgb({},{},{})\">{}</td>",
                        bg.0, bg.1, bg.2, fg.0, fg.1, fg.2, text
                    ));
                }
                None => html.push_str(&format!("<td class=\"num\">{}</td>", text)),
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"R&D\"</b>"), "&lt;b&gt;&quot;R&amp;D&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_backend_text_is_escaped() {
        let page = Page {
            widgets: vec![
                Widget::Title("Clinical Data Quality Monitor".to_string()),
                Widget::Code("<script>alert(1)</script>".to_string()),
            ],
        };
        let html = render_html(&page, "2026-10-16T00:00:00Z");
        assert!(html.contains("<title>Clinical Data Quality Monitor</title>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_bar_gaps_shown_as_na() {
        let bars = BarData::from_json(&json!({"A": 50, "B": "pending"})).unwrap();
        let html = bar_chart(&bars);
        assert_eq!(html.matches("class=\"bar-row\"").count(), 2);
        assert!(html.contains("<span class=\"bar-label\">B</span><span class=\"caption\">n/a</span>"));
    }

    #[test]
    fn test_heatmap_cells_coloured() {
        let m = Matrix::from_json(&json!({"dqi": {"dqi": 1.0, "queries": -0.5}})).unwrap();
        let shaded = matrix_table(&m, true);
        assert!(shaded.contains("background:rgb(180,4,38)"));
        assert!(shaded.contains("background:rgb(59,76,192)"));
        let plain = matrix_table(&m, false);
        assert!(!plain.contains("background"));
    }
}
