//! Object-safe widget trait and per-frame render context.

use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::events::ClickModifiers;
use crate::events::EventResult;
use crate::hit::HitMap;
use crate::theme::GridTheme;

/// Per-frame context handed to widget renderers.
pub struct RenderContext<'a> {
    /// Active theme.
    pub theme: &'a GridTheme,
    /// Hit map the widget registers its interactive area into.
    pub hit_map: &'a mut HitMap,
}

/// Object-safe interface every grid widget implements.
///
/// Widgets use interior mutability (shared state behind a lock plus an
/// atomic dirty flag), so dispatch and render both take `&self`; handles
/// can be cloned into the render loop and the dispatcher alike. Mouse
/// coordinates are absolute: widgets remember the sub-areas they rendered
/// into and resolve hits themselves.
///
/// All dispatch methods default to [`EventResult::Ignored`], so widgets
/// only implement the events they care about.
pub trait GridWidget {
    /// Unique widget id used by the hit map and event routing.
    fn id(&self) -> String;

    /// Whether the widget needs re-rendering.
    fn is_dirty(&self) -> bool;

    /// Acknowledge a render.
    fn clear_dirty(&self);

    /// Whether the widget participates in focus cycling.
    fn is_focusable(&self) -> bool {
        true
    }

    /// Whether printable keys belong to this widget while it is focused.
    fn captures_input(&self) -> bool {
        false
    }

    /// Mouse press at absolute coordinates.
    ///
    /// Return [`EventResult::StartDrag`] to receive the follow-up
    /// drag/release events of the gesture.
    fn on_click(&self, _x: u16, _y: u16, _modifiers: ClickModifiers) -> EventResult {
        EventResult::Ignored
    }

    /// Mouse movement while this widget owns the drag gesture.
    fn on_drag(&self, _x: u16, _y: u16) -> EventResult {
        EventResult::Ignored
    }

    /// Mouse release ending the drag gesture.
    fn on_release(&self, _x: u16, _y: u16) -> EventResult {
        EventResult::Ignored
    }

    /// Key press while focused.
    fn on_key(&self, _key: &KeyEvent) -> EventResult {
        EventResult::Ignored
    }

    /// Focus left the widget; close transient popups.
    fn on_blur(&self) {}

    /// Draw into `area` and register hit boxes.
    fn render(&self, frame: &mut Frame, area: Rect, focused: bool, ctx: &mut RenderContext<'_>);
}
