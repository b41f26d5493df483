//! Text rendering of boards and turn events

use trimerge_core::{Board, TurnEvent};

/// Render the board as a fixed-width grid, `.` for empty cells
pub fn render_board(board: &Board) -> String {
    let width = board
        .max_tile()
        .map_or(1, |tile| tile.value().to_string().len())
        .max(1);

    let mut out = String::new();
    for row in 0..board.rows() {
        let cells: Vec<String> = (0..board.cols())
            .map(|col| match board.get(row * board.cols() + col) {
                Some(tile) => format!("{:>width$}", tile.value()),
                None => format!("{:>width$}", "."),
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// One-line description of an event
pub fn describe_event(event: &TurnEvent) -> String {
    match event {
        TurnEvent::Move { from, to } => format!("move {from} -> {to}"),
        TurnEvent::Merge {
            root,
            absorbed,
            new_value,
        } => format!("merge {absorbed:?} into {root} ({new_value})"),
        TurnEvent::Upgrade { index, value } => format!("upgrade {index} to {value}"),
        TurnEvent::Spawn { index, value } => format!("spawn {value} at {index}"),
    }
}
