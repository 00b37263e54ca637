//! Outer loop: repeated runs sharing one value table, persisted after each run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::compute::{RunOutcome, Simulation, StepReport, ValueTable};
use crate::schema::{HighScores, RunRecord, SimulationConfig};
use crate::storage::{self, Storage, StorageError};

/// Session errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] crate::schema::ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Owns everything that outlives a single run.
pub struct Session {
    config: SimulationConfig,
    storage: Storage,
    table: ValueTable,
    high_scores: HighScores,
    last_run: Option<RunRecord>,
    runs_completed: usize,
    rng: StdRng,
    cancelled: Arc<AtomicBool>,
}

impl Session {
    /// Validate the configuration and load the persisted table and high scores.
    pub fn open(config: SimulationConfig, storage: Storage) -> Result<Self, SessionError> {
        config.validate()?;
        let table = storage::load_value_table(&storage.value_table)?;
        let high_scores = storage::load_high_scores(&storage.high_scores)?;
        log::info!(
            "Loaded {} states; best run so far: {} steps, {} births",
            table.len(),
            high_scores.max_steps,
            high_scores.max_births
        );

        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            storage,
            table,
            high_scores,
            last_run: None,
            runs_completed: 0,
            rng,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn table(&self) -> &ValueTable {
        &self.table
    }

    pub fn high_scores(&self) -> HighScores {
        self.high_scores
    }

    pub fn last_run(&self) -> Option<RunRecord> {
        self.last_run
    }

    pub fn runs_completed(&self) -> usize {
        self.runs_completed
    }

    /// One full run: initialize, step, finalize and persist.
    pub fn run_once(&mut self) -> Result<RunOutcome, SessionError> {
        self.run_once_with_callback(|_, _| {})
    }

    /// One full run, reporting after every step.
    pub fn run_once_with_callback<F>(&mut self, callback: F) -> Result<RunOutcome, SessionError>
    where
        F: FnMut(&StepReport, &Simulation),
    {
        let run_rng = StdRng::seed_from_u64(self.rng.next_u64());
        let mut simulation = Simulation::new(self.config.clone(), run_rng)?;
        let outcome = simulation.run_with_callback(&mut self.table, &self.cancelled, callback);
        self.finalize(&outcome)?;
        Ok(outcome)
    }

    fn finalize(&mut self, outcome: &RunOutcome) -> Result<(), SessionError> {
        let record = outcome.record;
        if self.high_scores.record(&record) {
            log::info!(
                "New high scores: {} steps, {} births, max-Q {:.3}",
                self.high_scores.max_steps,
                self.high_scores.max_births,
                self.high_scores.max_q
            );
        }
        let runs = storage::append_history(&self.storage.history, record)?;
        storage::save_value_table(&self.storage.value_table, &self.table)?;
        storage::save_high_scores(&self.storage.high_scores, &self.high_scores)?;

        self.last_run = Some(record);
        self.runs_completed += 1;
        log::info!(
            "Run {} ended ({:?}) after {} steps with {} births; mean max-Q {:.3}, {} states",
            runs,
            outcome.stop_reason,
            record.steps,
            record.births,
            record.max_q,
            self.table.len()
        );
        Ok(())
    }

    /// Repeat runs until a stop is requested or `max_runs` runs completed.
    pub fn run_until_stopped(
        &mut self,
        max_runs: Option<usize>,
    ) -> Result<Vec<RunOutcome>, SessionError> {
        let mut outcomes = Vec::new();
        while !self.is_cancelled() && max_runs.is_none_or(|max| outcomes.len() < max) {
            outcomes.push(self.run_once()?);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::StopReason;
    use tempfile::tempdir;

    fn test_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            random_seed: Some(seed),
            max_steps: Some(3_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_run_persists_everything() {
        let dir = tempdir().unwrap();
        let storage = Storage::in_dir(dir.path()).unwrap();
        // 10x10 grid, 30 food, 3 founders; this seed dies out well before the cap.
        let mut session = Session::open(test_config(2), storage.clone()).unwrap();
        assert!(storage.value_table.exists());

        let before = storage::load_high_scores(&storage.high_scores).unwrap();
        let history_before = storage::load_history(&storage.history).unwrap().len();

        let outcome = session.run_once().unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Extinct);
        assert!(outcome.record.steps < 3_000);

        let after = storage::load_high_scores(&storage.high_scores).unwrap();
        assert!(after.max_steps >= before.max_steps);
        assert!(after.max_births >= before.max_births);
        assert!(after.max_steps >= outcome.record.steps);
        assert!(after.max_births >= outcome.record.births);

        let history = storage::load_history(&storage.history).unwrap();
        assert_eq!(history.len(), history_before + 1);
        assert_eq!(history.last(), Some(&outcome.record));

        let table = storage::load_value_table(&storage.value_table).unwrap();
        assert_eq!(table.len(), session.table().len());
    }

    #[test]
    fn test_table_carries_across_sessions() {
        let dir = tempdir().unwrap();
        let storage = Storage::in_dir(dir.path()).unwrap();

        let mut first = Session::open(test_config(2), storage.clone()).unwrap();
        first.run_once().unwrap();
        let states = first.table().len();
        let scores = first.high_scores();

        let mut second = Session::open(test_config(3), storage.clone()).unwrap();
        assert_eq!(second.table().len(), states);
        assert_eq!(second.high_scores(), scores);

        second.run_once().unwrap();
        let after = second.high_scores();
        assert!(after.max_steps >= scores.max_steps);
        assert!(after.max_births >= scores.max_births);
        assert_eq!(storage::load_history(&storage.history).unwrap().len(), 2);
    }

    #[test]
    fn test_run_limit() {
        let dir = tempdir().unwrap();
        let storage = Storage::in_dir(dir.path()).unwrap();
        let mut config = test_config(4);
        config.max_steps = Some(50);
        let mut session = Session::open(config, storage).unwrap();

        let outcomes = session.run_until_stopped(Some(3)).unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(session.runs_completed(), 3);
        assert_eq!(session.last_run(), Some(outcomes[2].record));
    }

    #[test]
    fn test_cancel_finalizes_and_persists() {
        let dir = tempdir().unwrap();
        let storage = Storage::in_dir(dir.path()).unwrap();
        let mut session = Session::open(test_config(5), storage.clone()).unwrap();
        let cancel = session.cancel_handle();

        // Stop from inside the run after ten steps.
        let outcome = session
            .run_once_with_callback(|report, _| {
                if report.step == 10 {
                    cancel.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();

        assert!(outcome.record.steps <= 10);
        if outcome.stop_reason == StopReason::Cancelled {
            assert_eq!(outcome.record.steps, 10);
        }
        assert_eq!(storage::load_history(&storage.history).unwrap().len(), 1);
        assert!(session.run_until_stopped(None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = tempdir().unwrap();
        let storage = Storage::in_dir(dir.path()).unwrap();
        let config = SimulationConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            Session::open(config, storage),
            Err(SessionError::Config(_))
        ));
    }
}
