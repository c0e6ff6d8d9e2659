//! Widget model: what a page is made of, independent of how it is drawn.

use crate::payload::{BarData, Matrix, Records};

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Title(String),
    Header(String),
    Subheader(String),
    Caption(String),
    /// Labelled value tile.
    Metric { label: String, value: String },
    /// `**key**: value` line.
    Field { key: String, value: String },
    Text(String),
    /// Preformatted text shown verbatim (raw response bodies).
    Code(String),
    Table(Records),
    BarChart(BarData),
    /// Matrix drawn as a plain grid.
    Grid(Matrix),
    /// Matrix drawn with per-column gradient colouring.
    Heatmap(Matrix),
    Divider,
    Error(String),
    /// Study selector with its current value.
    Select { label: String, value: String },
    Checkbox { label: String, checked: bool },
    /// Button; `pressed` marks the one that triggered this render.
    Button { label: String, pressed: bool },
}

impl Widget {
    pub fn is_error(&self) -> bool {
        matches!(self, Widget::Error(_))
    }
}

/// One full render of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub widgets: Vec<Widget>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, widget: Widget) {
        self.widgets.push(widget);
    }

    pub fn extend(&mut self, widgets: Vec<Widget>) {
        self.widgets.extend(widgets);
    }

    pub fn errors(&self) -> Vec<&str> {
        self.widgets
            .iter()
            .filter_map(|w| match w {
                Widget::Error(msg) => Some(msg.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.widgets.iter().any(|w| match w {
            Widget::Title(s)
            | Widget::Header(s)
            | Widget::Subheader(s)
            | Widget::Caption(s)
            | Widget::Text(s)
            | Widget::Code(s)
            | Widget::Error(s) => s.contains(needle),
            Widget::Metric { label, value } => label.contains(needle) || value.contains(needle),
            Widget::Field { key, value } => key.contains(needle) || value.contains(needle),
            _ => false,
        })
    }
}

/// `total_open_queries` -> `Total Open Queries`.
///
/// Words are split on `_` and whitespace-delimited; each alphabetic run
/// starts upper-case and continues lower-case, so `avg_DQI` reads `Avg Dqi`.
pub fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut prev_alpha = false;
    for ch in spaced.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
