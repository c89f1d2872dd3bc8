//! Event handling types shared by the grid widgets.
//!
//! Widgets handle input through the dispatch methods on
//! [`GridWidget`](crate::widget::GridWidget) and report outcomes to the
//! application by pushing [`GridEvent`]s into an [`EventSink`]. The
//! application's event loop stays a thin dispatcher: hit-test, forward,
//! drain the event channel.

use tokio::sync::mpsc;

use crate::filter::ActiveFilter;

/// Result of handling an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    /// Event was ignored, try other handlers.
    Ignored,
    /// Event was consumed, stop propagation.
    Consumed,
    /// Event started a drag gesture on this widget.
    ///
    /// The dispatch loop routes subsequent drag/release events to the
    /// originating widget until release.
    StartDrag,
}

impl EventResult {
    /// Check if the event was handled (consumed or started a drag).
    pub fn is_handled(&self) -> bool {
        !matches!(self, EventResult::Ignored)
    }
}

/// Keyboard modifiers active during a mouse event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickModifiers {
    /// Shift was held.
    pub shift: bool,
    /// Control (or Command on macOS terminals reporting it as ctrl) was held.
    pub ctrl: bool,
    /// Alt was held.
    pub alt: bool,
}

impl From<crossterm::event::KeyModifiers> for ClickModifiers {
    fn from(m: crossterm::event::KeyModifiers) -> Self {
        use crossterm::event::KeyModifiers;
        Self {
            shift: m.contains(KeyModifiers::SHIFT),
            ctrl: m.contains(KeyModifiers::CONTROL) || m.contains(KeyModifiers::SUPER),
            alt: m.contains(KeyModifiers::ALT),
        }
    }
}

/// A widget outcome for the application to consume.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A filter row validated and submitted its predicate.
    FilterSubmit {
        /// Id of the originating filter-row widget.
        source: String,
        /// The submitted predicate snapshot.
        filter: ActiveFilter,
    },
    /// A filter row asked to be removed from the active set.
    FilterRemove {
        /// Id of the originating filter-row widget.
        source: String,
        /// The row's current predicate, for deletion by value.
        filter: ActiveFilter,
    },
    /// A header click toggled the sort order.
    SortChange {
        /// Column path to sort by.
        path: String,
        /// `true` for ascending.
        ascending: bool,
    },
    /// The export control was activated; serialization is the
    /// application's job.
    ExportRequested,
}

/// Sending half of the widget event channel.
///
/// Handed to widgets at construction; cheap to clone. Sends never block
/// and a closed receiver only logs, so widgets can emit unconditionally.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<GridEvent>,
}

impl EventSink {
    /// Creates a sink/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<GridEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Pushes an event to the application.
    pub fn send(&self, event: GridEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("event receiver dropped, grid event discarded");
        }
    }
}
