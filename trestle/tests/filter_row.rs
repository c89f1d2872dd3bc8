//! Behavioral tests for the filter-row widget: debounced submission,
//! column-change resets, existence operators, and removal.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedReceiver;

use trestle::column::Column;
use trestle::events::{EventSink, GridEvent};
use trestle::filter::{ActiveFilter, DataType, FilterField, FilterRow, operators};
use trestle::value::Value;
use trestle::widget::GridWidget;

fn columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name", DataType::Text),
        Column::new("age", "Age", DataType::Number),
        Column::new("active", "Active", DataType::Boolean),
        Column::new("joined", "Joined", DataType::Date),
    ]
}

fn filter_row() -> (FilterRow, UnboundedReceiver<GridEvent>) {
    let (sink, rx) = EventSink::channel();
    (FilterRow::new(columns(), sink), rx)
}

/// Advance paused time and let spawned debounce tasks run.
async fn settle(ms: u64) {
    // Let tasks spawned just before this call register their timers
    // at the current mock time, then advance past them.
    tokio::task::yield_now().await;
    tokio::time::advance(Duration::from_millis(ms)).await;
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
}

fn type_text(row: &FilterRow, text: &str) {
    for ch in text.chars() {
        row.insert_char(ch);
    }
}

fn operator_index(row: &FilterRow, id: &str) -> usize {
    row.operator_options()
        .iter()
        .position(|spec| spec.id == id)
        .unwrap_or_else(|| panic!("operator {id} not offered"))
}

fn expect_submit(rx: &mut UnboundedReceiver<GridEvent>) -> ActiveFilter {
    match rx.try_recv() {
        Ok(GridEvent::FilterSubmit { filter, .. }) => filter,
        other => panic!("expected FilterSubmit, got {other:?}"),
    }
}

// =============================================================================
// Debounced submission
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_typed_value_submits_after_quiet_period() {
    let (row, mut rx) = filter_row();
    row.set_column(1); // age
    type_text(&row, "30");

    settle(499).await;
    assert!(rx.try_recv().is_err(), "submitted before the quiet period");

    settle(1).await;
    let filter = expect_submit(&mut rx);
    assert_eq!(filter.path.as_deref(), Some("age"));
    assert_eq!(filter.operator.as_deref(), Some(operators::EQ));
    assert_eq!(filter.value, Value::Int(30));
    assert!(rx.try_recv().is_err(), "more than one submission");
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_submit_once_with_latest_state() {
    let (row, mut rx) = filter_row();
    row.set_column(1);

    row.insert_char('3');
    settle(300).await;
    row.insert_char('0');
    settle(499).await;
    assert!(rx.try_recv().is_err(), "earlier edit leaked through");

    settle(1).await;
    assert_eq!(expect_submit(&mut rx).value, Value::Int(30));
    settle(1_000).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_incomplete_filter_never_submits() {
    let (row, mut rx) = filter_row();

    // No column picked: typing does nothing submittable.
    row.set_value_text("30");
    settle(1_000).await;
    assert!(rx.try_recv().is_err());

    // Column picked but no value.
    row.set_column(1);
    settle(1_000).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_zero_and_false_still_submit() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    type_text(&row, "0");
    settle(500).await;
    assert_eq!(expect_submit(&mut rx).value, Value::Int(0));

    let (row, mut rx) = filter_row();
    row.set_column(2); // active
    type_text(&row, "false");
    settle(500).await;
    assert_eq!(expect_submit(&mut rx).value, Value::Bool(false));
}

#[tokio::test(start_paused = true)]
async fn test_invalid_value_cancels_pending_submission() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    type_text(&row, "30");
    row.insert_char('x'); // "30x" no longer parses as a number

    settle(1_000).await;
    assert!(rx.try_recv().is_err(), "stale snapshot submitted");
    assert!(row.value_error());
    assert!(row.value_message().is_some());

    // Fixing the value re-arms the debounce.
    row.backspace();
    settle(500).await;
    assert_eq!(expect_submit(&mut rx).value, Value::Int(30));
    assert!(!row.value_error());
}

#[tokio::test(start_paused = true)]
async fn test_flush_submits_without_waiting() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    type_text(&row, "30");
    row.flush();
    assert_eq!(expect_submit(&mut rx).value, Value::Int(30));

    settle(1_000).await;
    assert!(rx.try_recv().is_err(), "flush left the timer armed");
}

// =============================================================================
// Column and operator interplay
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_column_change_resets_operator_and_value() {
    let (row, mut rx) = filter_row();
    row.set_column(0); // name: text default
    assert_eq!(row.filter().operator.as_deref(), Some(operators::CONTAINS));
    type_text(&row, "abc");

    row.set_column(1); // age
    let filter = row.filter();
    assert_eq!(filter.operator.as_deref(), Some(operators::EQ));
    assert_eq!(filter.value, Value::Null);
    assert_eq!(row.value_text(), "");

    // The text predicate was complete and scheduled; the reset must
    // cancel it.
    settle(1_000).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_repicking_same_column_keeps_state() {
    let (row, _rx) = filter_row();
    row.set_column(1);
    let gt = operator_index(&row, operators::GT);
    row.set_operator(gt);
    type_text(&row, "30");

    row.set_column(1);
    assert_eq!(row.filter().operator.as_deref(), Some(operators::GT));
    assert_eq!(row.value_text(), "30");
}

#[tokio::test(start_paused = true)]
async fn test_existence_operator_submits_immediately_with_null() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    type_text(&row, "30");

    let exists = operator_index(&row, operators::EXISTS);
    row.set_operator(exists);

    // No settle: the submission fires synchronously.
    let filter = expect_submit(&mut rx);
    assert_eq!(filter.operator.as_deref(), Some(operators::EXISTS));
    assert!(filter.value.is_null(), "value must be null on submit");
    assert!(!row.shows_value());

    settle(1_000).await;
    assert!(rx.try_recv().is_err(), "debounced duplicate after fire-now");
}

#[tokio::test(start_paused = true)]
async fn test_operator_dropdown_inert_until_column_picked() {
    let (row, _rx) = filter_row();
    assert!(row.operator_options().is_empty());
    row.open(FilterField::Operator);
    assert_eq!(row.open_dropdown(), None);

    row.set_column(0);
    row.open(FilterField::Operator);
    assert_eq!(row.open_dropdown(), Some(FilterField::Operator));
}

#[tokio::test(start_paused = true)]
async fn test_one_of_parses_comma_separated_list() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    let one_of = operator_index(&row, operators::ONE_OF);
    row.set_operator(one_of);
    type_text(&row, "1, 2, 3");

    settle(500).await;
    let filter = expect_submit(&mut rx);
    assert_eq!(
        filter.value,
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)])
    );
}

// =============================================================================
// Validation flags
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_untouched_row_shows_no_errors() {
    let (row, _rx) = filter_row();
    assert!(!row.path_error());
    assert!(!row.operator_error());
    assert!(!row.value_error());
}

#[tokio::test(start_paused = true)]
async fn test_validation_runs_after_each_change() {
    let (row, _rx) = filter_row();
    row.set_column(0);
    assert!(!row.path_error());
    assert!(!row.operator_error());
    assert!(row.value_error(), "empty value on a text operator");

    type_text(&row, "a");
    assert!(!row.value_error());
}

// =============================================================================
// Removal
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_remove_reports_predicate_upward() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    type_text(&row, "30");
    settle(500).await;
    let _ = expect_submit(&mut rx);

    row.remove();
    match rx.try_recv() {
        Ok(GridEvent::FilterRemove { source, filter }) => {
            assert_eq!(source, row.id_string());
            assert_eq!(filter.path.as_deref(), Some("age"));
        }
        other => panic!("expected FilterRemove, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_remove_disabled_on_placeholder_row() {
    let (sink, mut rx) = EventSink::channel();
    let row = FilterRow::new(columns(), sink).removable(false);
    row.remove();
    assert!(rx.try_recv().is_err());

    row.set_removable(true);
    row.remove();
    assert!(matches!(rx.try_recv(), Ok(GridEvent::FilterRemove { .. })));
}

#[tokio::test(start_paused = true)]
async fn test_remove_cancels_pending_submission() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    type_text(&row, "30");
    row.remove();

    assert!(matches!(rx.try_recv(), Ok(GridEvent::FilterRemove { .. })));
    settle(1_000).await;
    assert!(rx.try_recv().is_err(), "removed row still submitted");
}

// =============================================================================
// Focus and key dispatch
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_focus_skips_hidden_value_field() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    let exists = operator_index(&row, operators::EXISTS);
    row.set_operator(exists);
    let _ = expect_submit(&mut rx);

    row.set_focus(FilterField::Column);
    assert!(row.focus_next());
    assert_eq!(row.focus(), FilterField::Operator);
    assert!(!row.focus_next(), "value field should not be reachable");
}

#[tokio::test(start_paused = true)]
async fn test_keys_edit_value_and_submit() {
    let (row, mut rx) = filter_row();
    row.set_column(1);
    row.set_focus(FilterField::Value);

    let press = |code| {
        let result = row.on_key(&KeyEvent::new(code, KeyModifiers::NONE));
        assert!(result.is_handled());
    };
    press(KeyCode::Char('4'));
    press(KeyCode::Char('2'));
    assert_eq!(row.value_text(), "42");
    press(KeyCode::Backspace);
    assert_eq!(row.value_text(), "4");

    settle(500).await;
    assert_eq!(expect_submit(&mut rx).value, Value::Int(4));
}

#[tokio::test(start_paused = true)]
async fn test_restores_existing_filter() {
    let (sink, _rx) = EventSink::channel();
    let mut filter = ActiveFilter::new();
    filter.path = Some("age".to_string());
    filter.operator = Some(operators::GT.to_string());
    filter.value = Value::Int(30);
    filter.data_type = Some(DataType::Number);

    let row = FilterRow::new(columns(), sink).with_filter(filter.clone());
    assert_eq!(row.filter(), filter);
    assert_eq!(row.value_text(), "30");
    assert_eq!(row.selected_column(), Some(1));
}
