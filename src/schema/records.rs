//! Persisted per-run records: run summaries and the all-time high scores.

use serde::{Deserialize, Serialize};

/// Summary of one completed run, as appended to the history log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Steps executed before extinction or stop.
    pub steps: u64,
    /// Children born during the run.
    pub births: u64,
    /// Mean over all table rows of the row maximum, at run end.
    pub max_q: f64,
}

/// Running maxima across every completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    #[serde(default)]
    pub max_steps: u64,
    #[serde(default)]
    pub max_births: u64,
    #[serde(default)]
    pub max_q: f64,
}

impl HighScores {
    /// Fold a finished run into the high scores, field by field.
    ///
    /// Returns true if any field improved.
    pub fn record(&mut self, run: &RunRecord) -> bool {
        let before = *self;
        self.max_steps = self.max_steps.max(run.steps);
        self.max_births = self.max_births.max(run.births);
        self.max_q = self.max_q.max(run.max_q);
        *self != before
    }
}
