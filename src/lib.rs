//! # classboard
//!
//! Builds a per-student, per-exercise completion board for a class roster
//! from a remote progress source, and exports snapshots of it as CSV.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Fetching a class and loading its rows
pub mod board;
/// Runtime configuration
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Snapshot export
pub mod export;
/// Rendering the board for terminals and browsers
pub mod render;
/// Reducing submissions to the latest status per exercise
pub mod resolve;
/// Narrowing the roster and exercise catalog
pub mod roster;
/// Where students, exercises and submissions come from
pub mod source;
/// Mapping raw statuses to display symbols
pub mod status;
/// Rows, the keyed row store, and the assembled table
pub mod table;
/// Shared data types
pub mod types;

use board::{Board, BoardOptions};
use source::ProgressSource;
use table::ProgressTable;

/// Loads every roster student's progress from `source` and returns the
/// assembled table.
pub async fn load_table<S: ProgressSource>(source: S, options: BoardOptions) -> ProgressTable {
    let board = Board::new(source, options);
    let view = board.load().await;
    board.table(&view).await
}
