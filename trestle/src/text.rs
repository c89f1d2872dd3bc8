//! Text measurement and cell formatting.

use unicode_width::UnicodeWidthChar;
use unicode_width::UnicodeWidthStr;

use crate::column::Alignment;

/// Display width of a string in terminal cells.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Truncate `text` to at most `width` cells, appending `…` when clipped.
///
/// Wide characters never straddle the boundary; the ellipsis is dropped
/// entirely when `width` is zero.
pub fn truncate(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let room = width - 1;
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > room {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

/// Truncate then pad `text` to exactly `width` cells with the given
/// alignment.
pub fn align(text: &str, width: usize, alignment: Alignment) -> String {
    let clipped = truncate(text, width);
    let pad = width.saturating_sub(display_width(&clipped));
    match alignment {
        Alignment::Left => format!("{}{}", clipped, " ".repeat(pad)),
        Alignment::Right => format!("{}{}", " ".repeat(pad), clipped),
        Alignment::Center => {
            let left = pad / 2;
            let right = pad - left;
            format!("{}{}{}", " ".repeat(left), clipped, " ".repeat(right))
        }
    }
}
