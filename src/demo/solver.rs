// Backtracking sudoku solver running as a WorkerTask

use super::board::SudokuBoard;
use super::view::ResultsView;
use crate::task::{PollWindow, WorkContext, WorkError, WorkerTask};

/// Depth-first backtracking over the shared board.
///
/// Every placement and every undo is written straight to the shared board, so a
/// pause shows the search exactly where it is.
#[derive(Debug, Clone, Default)]
pub struct BacktrackingSolver {
    /// Pause for results after this many placements; 0 never pauses
    pub pause_every: u64,
}

impl BacktrackingSolver {
    pub fn new(pause_every: u64) -> Self {
        Self { pause_every }
    }

    /// Returns `Ok(false)` when the puzzle has no solution
    pub fn solve(&self, work: &WorkContext<Self, SudokuBoard>) -> Result<bool, WorkError> {
        let mut placements = 0;
        self.fill(work, &mut placements)
    }

    fn fill(
        &self,
        work: &WorkContext<Self, SudokuBoard>,
        placements: &mut u64,
    ) -> Result<bool, WorkError> {
        work.checkpoint()?;

        let Some(cell) = work.subject().read(SudokuBoard::first_empty) else {
            return Ok(true);
        };

        for digit in 1..=9 {
            if !work.subject().update(|board| board.try_place(cell, digit)) {
                continue;
            }

            *placements += 1;
            if self.pause_every > 0 && *placements % self.pause_every == 0 {
                work.pause_for_results()?;
            }

            if self.fill(work, placements)? {
                return Ok(true);
            }
            work.subject().update(|board| board.clear(cell));
        }

        Ok(false)
    }
}

/// Solves the shared board with the [`BacktrackingSolver`] it is given as context
#[derive(Debug, Clone, Copy, Default)]
pub struct SolveTask;

impl WorkerTask for SolveTask {
    type Context = BacktrackingSolver;
    type Subject = SudokuBoard;
    type Controller = dyn ResultsView;

    fn name(&self) -> &str {
        "sudoku-solver"
    }

    fn run_work(
        &self,
        work: &WorkContext<BacktrackingSolver, SudokuBoard>,
    ) -> Result<(), WorkError> {
        if work.context().solve(work)? {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Puzzle has no solution").into())
        }
    }

    fn supports_cancel(&self) -> bool {
        true
    }

    fn on_poll(&self, window: &PollWindow<'_, SudokuBoard>, view: &mut Self::Controller) -> bool {
        window
            .present_and_resume(|board| view.show_board(board))
            .unwrap_or(false)
    }
}
