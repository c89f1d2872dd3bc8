//! Event handling for the TableView widget.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::events::{ClickModifiers, EventResult};
use crate::widget::{GridWidget, RenderContext};

use super::render;
use super::state::{TableView, contains};

impl GridWidget for TableView {
    fn id(&self) -> String {
        self.id_string()
    }

    fn is_dirty(&self) -> bool {
        TableView::is_dirty(self)
    }

    fn clear_dirty(&self) {
        TableView::clear_dirty(self)
    }

    fn on_click(&self, x: u16, y: u16, modifiers: ClickModifiers) -> EventResult {
        let chrome = self.chrome_areas();

        if self.is_size_open() && contains(chrome.size_options, x, y) {
            self.choose_size((y - chrome.size_options.y) as usize);
            return EventResult::Consumed;
        }
        if contains(chrome.size, x, y) {
            if self.is_size_open() {
                self.close_size_menu();
            } else {
                self.open_size_menu();
            }
            return EventResult::Consumed;
        }
        if contains(chrome.prev, x, y) {
            self.grid().prev_page();
            return EventResult::Consumed;
        }
        if contains(chrome.next, x, y) {
            self.grid().next_page();
            return EventResult::Consumed;
        }
        if contains(chrome.show_all, x, y) {
            // Disabled while every column is already visible.
            if !self.grid().all_columns_visible() {
                self.grid().show_all_columns();
            }
            return EventResult::Consumed;
        }
        if contains(chrome.clear, x, y) {
            self.grid().clear_selection();
            return EventResult::Consumed;
        }
        if contains(chrome.export, x, y) {
            self.export();
            return EventResult::Consumed;
        }

        if self.is_resizable()
            && let Some(path) = self.handle_at(x, y)
        {
            self.begin_resize(&path, x);
            return EventResult::StartDrag;
        }
        if let Some(path) = self.header_at(x, y) {
            self.toggle_sort(&path);
            return EventResult::Consumed;
        }
        if let Some(id) = self.gutter_at(x, y) {
            self.grid().toggle_selected(id);
            return EventResult::Consumed;
        }
        if let Some(id) = self.row_at(x, y) {
            // Plain click replaces the selection; ctrl (or cmd) toggles.
            if modifiers.ctrl {
                self.grid().toggle_selected(id);
            } else {
                self.grid().select_only(id);
            }
            return EventResult::Consumed;
        }

        self.close_size_menu();
        EventResult::Consumed
    }

    fn on_drag(&self, x: u16, _y: u16) -> EventResult {
        self.update_resize(x);
        EventResult::Consumed
    }

    fn on_release(&self, _x: u16, _y: u16) -> EventResult {
        self.end_resize();
        EventResult::Consumed
    }

    fn on_key(&self, key: &KeyEvent) -> EventResult {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return EventResult::Ignored;
        }

        if self.is_size_open() {
            return match key.code {
                KeyCode::Up => {
                    self.size_cursor_up();
                    EventResult::Consumed
                }
                KeyCode::Down => {
                    self.size_cursor_down();
                    EventResult::Consumed
                }
                KeyCode::Enter | KeyCode::Char(' ') => {
                    self.choose_size_at_cursor();
                    EventResult::Consumed
                }
                KeyCode::Esc => {
                    self.close_size_menu();
                    EventResult::Consumed
                }
                _ => EventResult::Ignored,
            };
        }

        match key.code {
            KeyCode::Left => {
                self.grid().prev_page();
                EventResult::Consumed
            }
            KeyCode::Right => {
                self.grid().next_page();
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn on_blur(&self) {
        self.close_size_menu();
    }

    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, ctx: &mut RenderContext<'_>) {
        render::draw(self, frame, area, focused, ctx);
    }
}
