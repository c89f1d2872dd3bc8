//! Hit testing for mouse interactions.

use ratatui::layout::Rect;

/// Information about an interactive element's position.
#[derive(Debug, Clone)]
pub struct HitBox {
    /// Widget ID.
    pub id: String,
    /// Bounding rectangle.
    pub rect: Rect,
    /// Whether this element captures text input when focused.
    pub captures_input: bool,
}

/// Collection of hit boxes for the current frame.
#[derive(Debug, Default)]
pub struct HitMap {
    /// Hit boxes in render order (later elements are on top).
    boxes: Vec<HitBox>,
}

impl HitMap {
    /// Create a new empty hit map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all hit boxes (call at the start of each frame).
    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    /// Register a hit box for a widget.
    pub fn register(&mut self, id: String, rect: Rect, captures_input: bool) {
        self.boxes.push(HitBox {
            id,
            rect,
            captures_input,
        });
    }

    /// Find the widget at a given position (returns topmost).
    pub fn hit_test(&self, x: u16, y: u16) -> Option<&HitBox> {
        self.boxes.iter().rev().find(|hit_box| {
            x >= hit_box.rect.x
                && x < hit_box.rect.x + hit_box.rect.width
                && y >= hit_box.rect.y
                && y < hit_box.rect.y + hit_box.rect.height
        })
    }
}
