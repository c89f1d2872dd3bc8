//! Paged data table over a shared [`GridState`](crate::state::GridState).
//!
//! [`TableView`] renders the container's current page with optional
//! column-group headers, per-column and per-group footers, a selection
//! gutter, and a chrome bar for paging, page size, column visibility,
//! selection clearing, and CSV export. Column resizing is opt-in via
//! [`TableView::resizable`].

mod events;
mod render;
mod state;

pub use state::PAGE_SIZE_OPTIONS;
pub use state::ResizeDrag;
pub use state::TableView;
pub use state::TableViewId;
