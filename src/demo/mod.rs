//! Sudoku demo - a concrete [`WorkerTask`](crate::task::WorkerTask) and a headless controller.
//!
//! - [`SolveTask`] runs a [`BacktrackingSolver`] over a shared [`SudokuBoard`],
//!   pausing every `pause_every` placements
//! - [`ResultsView`] / [`ConsoleView`] display the board during a pause
//! - [`drive`] is the controller's timer loop

pub mod board;
pub mod driver;
pub mod solver;
pub mod view;

pub use board::{BoardError, SudokuBoard};
pub use driver::drive;
pub use solver::{BacktrackingSolver, SolveTask};
pub use view::{ConsoleView, ResultsView};
