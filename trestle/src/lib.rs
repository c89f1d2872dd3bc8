//! Filterable, paged data-grid widgets for ratatui.
//!
//! A shared [`state::GridState`] container holds rows, paging, selection,
//! and column visibility. [`table::TableView`] renders its current page
//! with group headers, footers, and chrome; [`filter::FilterRow`] edits
//! one filter predicate and submits complete ones after a debounce
//! window. Widgets communicate upward through [`events::EventSink`].

pub mod column;
pub mod debounce;
pub mod error;
pub mod events;
pub mod filter;
pub mod hit;
pub mod record;
pub mod state;
pub mod table;
pub mod text;
pub mod theme;
pub mod value;
pub mod widget;

pub mod prelude {
    pub use crate::column::{Alignment, Column, ColumnGroup, ColumnSpec, FooterRule, GroupFooter};
    pub use crate::debounce::Debouncer;
    pub use crate::error::FilterError;
    pub use crate::events::{ClickModifiers, EventResult, EventSink, GridEvent};
    pub use crate::filter::{
        ActiveFilter, DataType, FilterField, FilterRow, FilterRowId, SUBMIT_DELAY, apply_filters,
    };
    pub use crate::hit::{HitBox, HitMap};
    pub use crate::record::Record;
    pub use crate::state::{DEFAULT_PAGE_SIZE, GridState};
    pub use crate::table::{PAGE_SIZE_OPTIONS, ResizeDrag, TableView, TableViewId};
    pub use crate::theme::GridTheme;
    pub use crate::value::{DATE_FORMAT, Value};
    pub use crate::widget::{GridWidget, RenderContext};
}
