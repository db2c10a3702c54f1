//! WorkThread - headless demo controller.
//!
//! # Overview
//!
//! Runs the bundled sudoku solver on a background work thread and plays the part
//! of a UI thread: a tokio interval timer polls the work thread, prints the board
//! whenever the solver pauses to show results, and resumes it.
//!
//! # Execution Flow
//!
//! 1. Load `WorkThread Data/WorkThread Config.yaml` (+ `WORKTHREAD__*` overrides)
//! 2. Initialize logging → logs/workthread.<date>
//! 3. Parse the puzzle and start the solver's work thread
//! 4. Drive `poll_once` from the timer until the thread exits
//! 5. Print the final board and log metrics

use anyhow::{Context, Result};
use std::sync::Arc;
use workthread::demo::{self, BacktrackingSolver, ConsoleView, SolveTask, SudokuBoard};
use workthread::{APP_NAME, ConfigManager, SharedSubject, TaskOutcome, VERSION, WorkThread};

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("WorkThread Data")?;
    let config = config_manager.load_config()?;

    // Keep the guard alive until exit so buffered log lines are flushed
    let _log_guard = workthread::logging::setup_logging_from_settings(&config.logging)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let board: SudokuBoard = config
        .demo
        .puzzle
        .parse()
        .context("Invalid puzzle in demo configuration")?;
    tracing::info!("Loaded puzzle with {} givens", board.filled_cells());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut work_thread = WorkThread::with_settings(
        SolveTask,
        Arc::new(BacktrackingSolver::new(config.demo.pause_every)),
        SharedSubject::new(board),
        &config.poll,
    );
    work_thread.start()?;

    let cancel_after = (config.demo.max_pauses > 0).then_some(config.demo.max_pauses);
    let mut view = ConsoleView::new();

    let outcome = runtime.block_on(demo::drive::<SolveTask>(
        &work_thread,
        &mut view,
        config.poll.poll_interval(),
        cancel_after,
    ))?;

    let final_board = work_thread.subject().snapshot();
    match outcome {
        TaskOutcome::Completed => println!("Solved:\n{}", final_board),
        TaskOutcome::Cancelled => println!(
            "Cancelled after {} pauses:\n{}",
            view.shown(),
            final_board
        ),
        TaskOutcome::Faulted => {
            let fault = work_thread.status().fault.unwrap_or_default();
            tracing::error!("Solver failed: {}", fault);
            println!("Solver failed: {}", fault);
        }
    }

    work_thread.metrics().log_summary(work_thread.name());
    tracing::info!("Demo finished: {:?}", outcome);

    Ok(())
}
