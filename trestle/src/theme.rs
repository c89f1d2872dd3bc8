//! Grid theme with dark purple accents.

use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;

/// Styles for the table chrome (pagination bar, action buttons).
#[derive(Debug, Clone)]
pub struct ChromeStyles {
    /// Bar background and base text.
    pub bar: Style,
    /// Enabled action/button text.
    pub button: Style,
    /// Disabled action/button text.
    pub button_disabled: Style,
    /// Keyboard hint text.
    pub hint: Style,
}

/// Styles for dropdowns and the value input of the filter row.
#[derive(Debug, Clone)]
pub struct FieldStyles {
    /// Field with a value, unfocused.
    pub normal: Style,
    /// Focused field.
    pub focused: Style,
    /// Placeholder text of an empty field.
    pub placeholder: Style,
    /// Field that failed validation.
    pub error: Style,
    /// Inert field (operator dropdown before a column is picked).
    pub disabled: Style,
    /// Open dropdown option row.
    pub option: Style,
    /// Option row under the cursor.
    pub option_cursor: Style,
    /// Option row matching the current selection.
    pub option_selected: Style,
}

/// Theme consumed by the grid widgets.
///
/// Plain data: construct one, override what you need, hand it to the
/// render context.
#[derive(Debug, Clone)]
pub struct GridTheme {
    /// Group header line above the column headers.
    pub group_header: Style,
    /// Column header line.
    pub header: Style,
    /// Data row.
    pub row: Style,
    /// Selected data row.
    pub row_selected: Style,
    /// Footer summary lines.
    pub footer: Style,
    /// Resize handle glyph between header cells.
    pub resize_handle: Style,
    /// Applied on top of body/footer while loading.
    pub loading: Style,
    /// Chrome styles.
    pub chrome: ChromeStyles,
    /// Filter field styles.
    pub field: FieldStyles,
}

impl Default for GridTheme {
    fn default() -> Self {
        let surface = Color::Rgb(0x1e, 0x1e, 0x2e);
        let text = Color::Rgb(0xcd, 0xd6, 0xf4);
        let muted = Color::Rgb(0x7f, 0x84, 0x9c);
        let accent = Color::Rgb(0xa2, 0x77, 0xff);
        let selected = Color::Rgb(0x6e, 0x54, 0x94);
        let error = Color::Rgb(0xf3, 0x8b, 0xa8);

        Self {
            group_header: Style::default().fg(muted).bg(surface),
            header: Style::default()
                .fg(text)
                .bg(surface)
                .add_modifier(Modifier::BOLD),
            row: Style::default().fg(text),
            row_selected: Style::default().fg(surface).bg(selected),
            footer: Style::default()
                .fg(muted)
                .bg(surface)
                .add_modifier(Modifier::ITALIC),
            resize_handle: Style::default().fg(muted),
            loading: Style::default().add_modifier(Modifier::DIM),
            chrome: ChromeStyles {
                bar: Style::default().fg(text).bg(surface),
                button: Style::default().fg(accent).bg(surface),
                button_disabled: Style::default()
                    .fg(muted)
                    .bg(surface)
                    .add_modifier(Modifier::DIM),
                hint: Style::default()
                    .fg(muted)
                    .bg(surface)
                    .add_modifier(Modifier::DIM),
            },
            field: FieldStyles {
                normal: Style::default().fg(text),
                focused: Style::default()
                    .fg(text)
                    .bg(Color::Rgb(0x50, 0x50, 0x64))
                    .add_modifier(Modifier::BOLD),
                placeholder: Style::default().fg(muted).add_modifier(Modifier::DIM),
                error: Style::default().fg(error),
                disabled: Style::default().fg(muted).add_modifier(Modifier::DIM),
                option: Style::default().fg(text).bg(surface),
                option_cursor: Style::default().fg(surface).bg(accent),
                option_selected: Style::default().fg(surface).bg(selected),
            },
        }
    }
}
