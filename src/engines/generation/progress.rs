use super::gene_pool::SubmitOutcome;
use super::search_engine::{ProgressCallback, SearchStats};
use crate::types::FitnessResult;

/// Logs progress through the `log` facade.
pub struct ConsoleProgressCallback {
    /// Log an iteration line every `every` iterations
    pub every: usize,
}

impl Default for ConsoleProgressCallback {
    fn default() -> Self {
        Self { every: 100 }
    }
}

impl ProgressCallback for ConsoleProgressCallback {
    fn on_iteration(&mut self, iteration: usize, total: usize) {
        let done = iteration + 1;
        if done % self.every.max(1) == 0 || done == total {
            log::info!("  Iteration {}/{}", done, total);
        }
    }

    fn on_submission(&mut self, iteration: usize, result: &FitnessResult, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Rejected => {}
            SubmitOutcome::Inserted { pool } => log::debug!(
                "[{}] inserted into pool {} (correctness {:.2}, size {})",
                iteration + 1,
                pool,
                result.correctness,
                result.size
            ),
            SubmitOutcome::Replaced { pool, incumbent } => log::debug!(
                "[{}] replaced {} in pool {} (correctness {:.2}, size {})",
                iteration + 1,
                incumbent.to_formula_short(40),
                pool,
                result.correctness,
                result.size
            ),
        }
    }

    fn on_run_complete(&mut self, stats: &SearchStats) {
        log::info!(
            "Search complete: {} iterations, {} scored, {} inserted, {} replaced, {} rejected",
            stats.iterations,
            stats.evaluated,
            stats.inserted,
            stats.replaced,
            stats.rejected
        );
    }
}

/// Ignores every event.
pub struct SilentProgressCallback;

impl ProgressCallback for SilentProgressCallback {
    fn on_iteration(&mut self, _iteration: usize, _total: usize) {}
    fn on_submission(
        &mut self,
        _iteration: usize,
        _result: &FitnessResult,
        _outcome: &SubmitOutcome,
    ) {
    }
    fn on_run_complete(&mut self, _stats: &SearchStats) {}
}

// For forwarding progress to another thread
pub struct ChannelProgressCallback {
    sender: std::sync::mpsc::Sender<ProgressMessage>,
}

#[derive(Debug, Clone)]
pub enum ProgressMessage {
    Iteration { current: usize, total: usize },
    Accepted { iteration: usize, pool: usize, correctness: f64 },
    Complete(SearchStats),
}

impl ChannelProgressCallback {
    pub fn new(sender: std::sync::mpsc::Sender<ProgressMessage>) -> Self {
        Self { sender }
    }
}

impl ProgressCallback for ChannelProgressCallback {
    fn on_iteration(&mut self, iteration: usize, total: usize) {
        let _ = self.sender.send(ProgressMessage::Iteration {
            current: iteration,
            total,
        });
    }

    fn on_submission(&mut self, iteration: usize, result: &FitnessResult, outcome: &SubmitOutcome) {
        let pool = match outcome {
            SubmitOutcome::Rejected => return,
            SubmitOutcome::Inserted { pool } | SubmitOutcome::Replaced { pool, .. } => *pool,
        };
        let _ = self.sender.send(ProgressMessage::Accepted {
            iteration,
            pool,
            correctness: result.correctness,
        });
    }

    fn on_run_complete(&mut self, stats: &SearchStats) {
        let _ = self.sender.send(ProgressMessage::Complete(stats.clone()));
    }
}
