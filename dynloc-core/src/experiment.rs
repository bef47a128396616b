use std::collections::BTreeMap;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::trial::Trial;

/// Ordered trials of one scanner run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Run {
    trials: Vec<Trial>,
}

impl Run {
    pub fn new(trials: Vec<Trial>) -> Self {
        Self { trials }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn into_trials(self) -> Vec<Trial> {
        self.trials
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trial> {
        self.trials.iter()
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Stimulus categories in order of first appearance.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for category in self.trials.iter().filter_map(Trial::category) {
            if !seen.iter().any(|c| c == category) {
                seen.push(category.to_string());
            }
        }
        seen
    }

    pub fn fixation_positions(&self) -> Vec<usize> {
        self.trials
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_fixation())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn fixation_count(&self) -> usize {
        self.trials.iter().filter(|t| t.is_fixation()).count()
    }

    pub fn stimulus_count(&self) -> usize {
        self.trials.iter().filter(|t| t.is_stimulus()).count()
    }

    pub fn repetition_count(&self) -> usize {
        self.trials.iter().filter(|t| t.is_repetition()).count()
    }

    /// The trial runs between consecutive fixations.
    pub fn blocks(&self) -> Vec<&[Trial]> {
        let fixations = self.fixation_positions();
        fixations
            .windows(2)
            .map(|w| &self.trials[w[0] + 1..w[1]])
            .collect()
    }

    /// Category order of a block, collapsing consecutive trials of the same
    /// category.
    pub fn block_order(block: &[Trial]) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::new();
        for category in block.iter().filter_map(Trial::category) {
            if order.last() != Some(&category) {
                order.push(category);
            }
        }
        order
    }
}

impl Index<usize> for Run {
    type Output = Trial;

    fn index(&self, index: usize) -> &Trial {
        &self.trials[index]
    }
}

impl<'a> IntoIterator for &'a Run {
    type Item = &'a Trial;
    type IntoIter = std::slice::Iter<'a, Trial>;

    fn into_iter(self) -> Self::IntoIter {
        self.trials.iter()
    }
}

/// All runs generated for one subject, keyed by 0-based run index.
///
/// Serializes as a JSON object whose keys are the decimal run indices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Experiment {
    runs: BTreeMap<usize, Run>,
}

impl Experiment {
    pub fn new(runs: BTreeMap<usize, Run>) -> Self {
        Self { runs }
    }

    /// Numbers the runs from zero in the given order.
    pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
        Self {
            runs: runs.into_iter().enumerate().collect(),
        }
    }

    pub fn run(&self, index: usize) -> Option<&Run> {
        self.runs.get(&index)
    }

    pub fn runs(&self) -> impl Iterator<Item = (usize, &Run)> {
        self.runs.iter().map(|(i, r)| (*i, r))
    }

    pub fn run_indices(&self) -> Vec<usize> {
        self.runs.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Category set of the experiment, taken from its first run.
    pub fn categories(&self) -> Vec<String> {
        self.runs
            .values()
            .next()
            .map(Run::categories)
            .unwrap_or_default()
    }
}
