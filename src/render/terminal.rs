//! ANSI terminal rendering.

use serde_json::Value;

use super::{contrast_text, coolwarm, format_cell, Rgb};
use crate::payload::{BarData, Matrix, Records};
use crate::widgets::{Page, Widget};

const BAR_WIDTH: usize = 40;
const MAX_CELL_WIDTH: usize = 32;

pub struct TerminalRenderer {
    color: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, page: &Page) -> String {
        let mut out = String::new();
        for widget in &page.widgets {
            self.widget(&mut out, widget);
        }
        out
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn widget(&self, out: &mut String, widget: &Widget) {
        match widget {
            Widget::Title(text) => {
                out.push_str(&self.paint("1", text));
                out.push('\n');
                out.push_str(&"=".repeat(width(text)));
                out.push_str("\n\n");
            }
            Widget::Header(text) => {
                out.push('\n');
                out.push_str(&self.paint("1", text));
                out.push('\n');
                out.push_str(&"-".repeat(width(text)));
                out.push('\n');
            }
            Widget::Subheader(text) => {
                out.push('\n');
                out.push_str(&self.paint("1;4", text));
                out.push('\n');
            }
            Widget::Caption(text) => {
                out.push_str(&self.paint("2", text));
                out.push('\n');
            }
            Widget::Metric { label, value } => {
                out.push_str(&format!("  {}\n    {}\n", label, self.paint("1", value)));
            }
            Widget::Field { key, value } => {
                out.push_str(&format!("{}: {}\n", self.paint("1", key), value));
            }
            Widget::Text(text) => {
                out.push_str(text);
                out.push('\n');
            }
            Widget::Code(text) => {
                for line in text.lines() {
                    out.push_str("    ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
            Widget::Table(records) => self.table(out, records),
            Widget::BarChart(bars) => self.bars(out, bars),
            Widget::Grid(matrix) => self.matrix(out, matrix, false),
            Widget::Heatmap(matrix) => self.matrix(out, matrix, true),
            Widget::Divider => {
                out.push_str(&"─".repeat(BAR_WIDTH));
                out.push('\n');
            }
            Widget::Error(text) => {
                out.push_str(&self.paint("31", &format!("error: {}", text)));
                out.push('\n');
            }
            Widget::Select { label, value } => {
                out.push('\n');
                out.push_str(&format!("{} {}\n", label, self.paint("1", &format!("[{} ▾]", value))));
            }
            Widget::Checkbox { label, checked } => {
                let mark = if *checked { "[x]" } else { "[ ]" };
                out.push('\n');
                out.push_str(&format!("{} {}\n", mark, label));
            }
            Widget::Button { label, pressed } => {
                let code = if *pressed { "7" } else { "2" };
                out.push('\n');
                out.push_str(&self.paint(code, &format!("( {} )", label)));
                out.push('\n');
            }
        }
    }

    fn table(&self, out: &mut String, records: &Records) {
        if records.columns.is_empty() {
            out.push_str(&self.paint("2", "(no records)"));
            out.push('\n');
            return;
        }
        let cells: Vec<Vec<(String, bool)>> = records
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| {
                        let numeric = matches!(c, Some(Value::Number(_)));
                        (clip(&Records::cell_text(c)), numeric)
                    })
                    .collect()
            })
            .collect();
        let headers: Vec<String> = records.columns.iter().map(|c| clip(c)).collect();
        let widths: Vec<usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                cells
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|(s, _)| width(s))
                    .fold(width(h), usize::max)
            })
            .collect();

        let header_line: Vec<String> = headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad_right(h, *w))
            .collect();
        out.push_str(&self.paint("1", header_line.join("  ").trim_end()));
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');
        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|((s, numeric), w)| if *numeric { pad_left(s, *w) } else { pad_right(s, *w) })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
        out.push_str(&self.paint("2", &format!("{} rows", records.rows.len())));
        out.push('\n');
    }

    fn bars(&self, out: &mut String, bars: &BarData) {
        let max = bars.max_abs();
        let label_w = bars.categories.iter().map(|c| width(c)).max().unwrap_or(0);
        let multi = bars.series.len() > 1;
        let series_w = bars.series.iter().map(|s| width(&s.name)).max().unwrap_or(0);
        for (i, category) in bars.categories.iter().enumerate() {
            for (n, series) in bars.series.iter().enumerate() {
                let label = if n == 0 { category.as_str() } else { "" };
                out.push_str(&pad_right(label, label_w));
                out.push_str(" │ ");
                if multi {
                    out.push_str(&pad_right(&series.name, series_w));
                    out.push(' ');
                }
                match series.values.get(i).copied().flatten() {
                    Some(v) => {
                        let len = bar_len(v, max);
                        let glyph = if v < 0.0 { "░" } else { "█" };
                        out.push_str(&self.paint("36", &glyph.repeat(len)));
                        out.push_str(&format!(" {}", trim_float(v)));
                    }
                    None => out.push_str(&self.paint("2", "n/a")),
                }
                out.push('\n');
            }
        }
    }

    fn matrix(&self, out: &mut String, matrix: &Matrix, shaded: bool) {
        let label_w = matrix.rows.iter().map(|r| width(r)).max().unwrap_or(0);
        let col_w: Vec<usize> = matrix
            .columns
            .iter()
            .enumerate()
            .map(|(c, name)| {
                matrix
                    .cells
                    .iter()
                    .map(|row| width(&format_cell(row.get(c).copied().flatten())))
                    .fold(width(name), usize::max)
            })
            .collect();

        out.push_str(&" ".repeat(label_w));
        for (name, w) in matrix.columns.iter().zip(&col_w) {
            out.push_str("  ");
            out.push_str(&self.paint("1", &pad_left(name, *w)));
        }
        out.push('\n');
        for (r, label) in matrix.rows.iter().enumerate() {
            out.push_str(&self.paint("1", &pad_right(label, label_w)));
            for (c, w) in col_w.iter().enumerate() {
                out.push_str("  ");
                let text = pad_left(&format_cell(matrix.cells[r].get(c).copied().flatten()), *w);
                match matrix.normalized(r, c).filter(|_| shaded && self.color) {
                    Some(t) => out.push_str(&shade(&text, coolwarm(t))),
                    None => out.push_str(&text),
                }
            }
            out.push('\n');
        }
    }
}

fn shade(text: &str, bg: Rgb) -> String {
    let fg = contrast_text(bg);
    format!(
        "\x1b[48;2;{};{};{}m\x1b[38;2;{};{};{}m{}\x1b[0m",
        bg.0, bg.1, bg.2, fg.0, fg.1, fg.2, text
    )
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn clip(s: &str) -> String {
    let s = s.replace('\n', " ");
    if width(&s) <= MAX_CELL_WIDTH {
        return s;
    }
    let mut clipped: String = s.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

fn pad_right(s: &str, w: usize) -> String {
    format!("{}{}", s, " ".repeat(w.saturating_sub(width(s))))
}

fn pad_left(s: &str, w: usize) -> String {
    format!("{}{}", " ".repeat(w.saturating_sub(width(s))), s)
}

fn bar_len(v: f64, max: f64) -> usize {
    if max <= 0.0 {
        return 0;
    }
    ((v.abs() / max) * BAR_WIDTH as f64).round() as usize
}

fn trim_float(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{:.2}", v)
    }
}
