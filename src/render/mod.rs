//! Page renderers: ANSI terminal text and standalone HTML.

pub mod html;
pub mod terminal;

pub use html::render_html;
pub use terminal::TerminalRenderer;

pub type Rgb = (u8, u8, u8);

// Diverging cool-to-warm anchors (blue, neutral grey, red).
const COOL: Rgb = (59, 76, 192);
const MID: Rgb = (221, 221, 221);
const WARM: Rgb = (180, 4, 38);

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Cool-to-warm colour for a position in `0.0..=1.0`; out-of-range input
/// is clamped.
pub fn coolwarm(t: f64) -> Rgb {
    let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
    let (from, to, local) = if t <= 0.5 {
        (COOL, MID, t * 2.0)
    } else {
        (MID, WARM, (t - 0.5) * 2.0)
    };
    (
        lerp(from.0, to.0, local),
        lerp(from.1, to.1, local),
        lerp(from.2, to.2, local),
    )
}

/// Readable foreground for text on `bg`.
pub fn contrast_text(bg: Rgb) -> Rgb {
    let luma = 0.299 * bg.0 as f64 + 0.587 * bg.1 as f64 + 0.114 * bg.2 as f64;
    if luma > 140.0 {
        (0, 0, 0)
    } else {
        (255, 255, 255)
    }
}

/// Matrix cell text.
pub fn format_cell(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{:.3}", v),
        None => String::new(),
    }
}
