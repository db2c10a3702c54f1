use super::board::SudokuBoard;

/// Where a paused solver's board gets displayed
#[cfg_attr(test, mockall::automock)]
pub trait ResultsView {
    /// Display the board; returns true if modal UI was shown
    fn show_board(&mut self, board: &SudokuBoard) -> bool;
}

/// Prints each paused board to stdout
#[derive(Debug, Default)]
pub struct ConsoleView {
    shown: u64,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boards shown so far
    pub fn shown(&self) -> u64 {
        self.shown
    }
}

impl ResultsView for ConsoleView {
    fn show_board(&mut self, board: &SudokuBoard) -> bool {
        self.shown += 1;
        println!(
            "--- pause {} ({} cells filled) ---\n{}",
            self.shown,
            board.filled_cells(),
            board
        );
        false
    }
}
