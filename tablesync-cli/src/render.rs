//! Terminal output for a settled table.

use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tablesync_lib::boundary::BodyView;
use tablesync_lib::controller::PaginationControls;
use tablesync_lib::state::TableState;

use crate::tasks::{COLUMNS, Priority, Status, Task};

pub fn print_location(query: &str) {
    println!("URL: ?{}", query);
}

pub fn print_state(state: &TableState) {
    if !state.sorting.is_empty() {
        let sorted: Vec<String> = state
            .sorting
            .columns()
            .iter()
            .map(|sort| format!("{} {}", sort.id, if sort.desc { "desc" } else { "asc" }))
            .collect();
        println!("Sorted by: {}", sorted.join(", "));
    }
    for (column, value) in state.column_filters.iter() {
        println!("Filter: {} = {}", column, value);
    }
    if !state.global_filter.is_empty() {
        println!("Search: {}", state.global_filter);
    }
}

pub fn print_body(body: &BodyView<Task>) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(COLUMNS.map(header_cell));

    match body {
        BodyView::Rows(page) => {
            for task in page.rows() {
                table.add_row(vec![
                    Cell::new(task.id).set_alignment(CellAlignment::Right),
                    Cell::new(&task.title),
                    status_cell(task.status),
                    priority_cell(task.priority),
                    Cell::new(task.due),
                ]);
            }
        }
        BodyView::NoResults { message, .. } => {
            // comfy-table has no colspan; the message goes in the first cell.
            table.add_row(vec![Cell::new(message).add_attribute(Attribute::Dim)]);
        }
        BodyView::Skeleton { rows, columns } => {
            for _ in 0..*rows {
                table.add_row((0..*columns).map(|_| Cell::new("···").add_attribute(Attribute::Dim)));
            }
        }
        BodyView::Failed(error) => {
            table.add_row(vec![Cell::new(error).fg(Color::Red)]);
        }
    }
    println!("{table}");
}

pub fn print_controls(controls: &PaginationControls) {
    let page_count = controls
        .page_count
        .map_or_else(|| "?".to_string(), |count| count.to_string());
    println!(
        "Page {} of {}  [{}previous] [{}next]",
        controls.page_index + 1,
        page_count,
        if controls.previous_enabled() { "" } else { "x " },
        if controls.next_enabled() { "" } else { "x " },
    );
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn status_cell(status: Status) -> Cell {
    let color = match status {
        Status::Todo => Color::Blue,
        Status::InProgress => Color::Yellow,
        Status::Done => Color::Green,
        Status::Canceled => Color::DarkGrey,
    };
    Cell::new(status.as_str()).fg(color)
}

fn priority_cell(priority: Priority) -> Cell {
    let cell = Cell::new(priority.as_str());
    match priority {
        Priority::High => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Priority::Medium => cell,
        Priority::Low => cell.add_attribute(Attribute::Dim),
    }
}
