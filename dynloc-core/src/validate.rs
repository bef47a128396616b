//! Structural checks for runs and experiments read back from disk.

use crate::error::{DesignError, Result};
use crate::experiment::{Experiment, Run};
use crate::trial::Trial;

/// Summary of a structurally valid run
#[derive(Debug, Clone, PartialEq)]
pub struct RunShape {
    /// Category order of the first block; the second block is its reverse.
    pub block_order: Vec<String>,
    pub trials_per_category: usize,
    pub repetitions: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentShape {
    pub categories: Vec<String>,
    pub runs: Vec<(usize, RunShape)>,
}

fn invalid(msg: String) -> DesignError {
    DesignError::InvalidRecord(msg)
}

impl Run {
    /// Checks the fixation / block / reversed-block layout and that every
    /// repetition duplicates its predecessor.
    pub fn check_structure(&self) -> Result<RunShape> {
        let trials = self.trials();
        if trials
            .iter()
            .any(|t| matches!(t, Trial::ButtonPress { .. }))
        {
            return Err(invalid("run contains button presses".into()));
        }

        let fixations = self.fixation_positions();
        let len = self.len();
        let expected = if len >= 3 {
            vec![0, (len - 1) / 2, len - 1]
        } else {
            Vec::new()
        };
        if len < 3 || len % 2 == 0 || fixations != expected {
            return Err(invalid(format!(
                "expected 3 fixations at {expected:?}, found {fixations:?} in {len} trials"
            )));
        }

        let blocks = self.blocks();
        let first = Run::block_order(blocks[0]);
        let mut second = Run::block_order(blocks[1]);
        second.reverse();
        if first != second {
            return Err(invalid(format!(
                "second block order {second:?} is not the reverse of {first:?}"
            )));
        }
        if first.is_empty() {
            return Err(invalid("run has no stimulus trials".into()));
        }
        let mut distinct = first.clone();
        distinct.sort_unstable();
        distinct.dedup();
        if distinct.len() != first.len() {
            return Err(invalid(format!("categories are not contiguous: {first:?}")));
        }

        let per_category = blocks[0].len() / first.len();
        for block in &blocks {
            if block.len() != per_category * first.len() {
                return Err(invalid(format!(
                    "block of {} trials does not split into {} categories",
                    block.len(),
                    first.len()
                )));
            }
            for (chunk, category) in block.chunks(per_category).zip(Run::block_order(block)) {
                if chunk.iter().any(|t| t.category() != Some(category)) {
                    return Err(invalid(format!(
                        "'{category}' does not fill a whole block of {per_category}"
                    )));
                }
            }
        }

        let mut repeated: Vec<&str> = Vec::new();
        for (i, trial) in trials.iter().enumerate().filter(|(_, t)| t.is_repetition()) {
            let prev = &trials[i - 1];
            if prev.category() != trial.category() || prev.stimulus_id() != trial.stimulus_id() {
                return Err(invalid(format!(
                    "repetition at {i} does not duplicate the preceding trial"
                )));
            }
            let category = trial.category().unwrap_or_default();
            if repeated.contains(&category) {
                return Err(invalid(format!("'{category}' is repeated more than once")));
            }
            repeated.push(category);
        }

        Ok(RunShape {
            block_order: first.into_iter().map(String::from).collect(),
            trials_per_category: per_category,
            repetitions: repeated.len(),
        })
    }
}

impl Experiment {
    /// Checks every run plus the cross-run rules: runs numbered from zero,
    /// a shared category set and either no attention checks or one per
    /// category in every run.
    pub fn check_structure(&self) -> Result<ExperimentShape> {
        if self.is_empty() {
            return Err(invalid("experiment has no runs".into()));
        }
        let expected: Vec<usize> = (0..self.len()).collect();
        if self.run_indices() != expected {
            return Err(invalid(format!(
                "run indices {:?} are not numbered from 0",
                self.run_indices()
            )));
        }

        let mut categories = self.categories();
        categories.sort();

        let mut runs = Vec::with_capacity(self.len());
        for (index, run) in self.runs() {
            let shape = run
                .check_structure()
                .map_err(|e| invalid(format!("run {index}: {e}")))?;
            let mut run_categories = shape.block_order.clone();
            run_categories.sort();
            if run_categories != categories {
                return Err(invalid(format!(
                    "run {index} uses {run_categories:?}, expected {categories:?}"
                )));
            }
            runs.push((index, shape));
        }

        let with_checks = runs.iter().filter(|(_, s)| s.repetitions > 0).count();
        if with_checks > 0
            && runs
                .iter()
                .any(|(_, s)| s.repetitions != categories.len())
        {
            return Err(invalid(
                "attention checks must cover every category in every run".into(),
            ));
        }

        Ok(ExperimentShape { categories, runs })
    }
}
