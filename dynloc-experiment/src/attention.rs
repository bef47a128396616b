//! Attention checks: one repeated trial per category per run.
//!
//! Half of the categories get their repetition in the early-middle part of
//! the run (first block, never right after the lead-in fixation), the other
//! half in the second half of the run. A repetition replaces a trial with a
//! copy of the trial before it, so run length and timing are unchanged.

use std::collections::BTreeMap;

use dynloc_core::{DesignError, Experiment, Result, Run};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::balance::CategoryBalancer;

/// How categories are split between the two regions of each run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HalfAssignment {
    /// Shuffle, split in two and pair the halves with the regions at random.
    #[default]
    Shuffled,
    /// Pick the early-middle half with a [`CategoryBalancer`] carried across
    /// runs, so each category is checked early equally often.
    Counterbalanced,
}

/// Trial positions a category's repetition may be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// `1 < index < len / 2`
    EarlyMiddle,
    /// `index >= len / 2`
    SecondHalf,
}

impl Region {
    pub fn contains(&self, index: usize, run_len: usize) -> bool {
        let half = run_len / 2;
        match self {
            Region::EarlyMiddle => index > 1 && index < half,
            Region::SecondHalf => index >= half,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AttentionCheckInjector {
    assignment: HalfAssignment,
}

impl AttentionCheckInjector {
    pub fn new(assignment: HalfAssignment) -> Self {
        Self { assignment }
    }

    /// Returns a copy of `experiment` with one repetition per category in
    /// every run. The input is left untouched.
    pub fn inject<R>(&self, experiment: &Experiment, rng: &mut R) -> Result<Experiment>
    where
        R: Rng + ?Sized,
    {
        let categories = shared_categories(experiment)?;
        let half = categories.len() / 2;
        let mut balancer = CategoryBalancer::new(categories.clone());

        let mut runs = BTreeMap::new();
        for (index, run) in experiment.runs() {
            let (early, late) = match self.assignment {
                HalfAssignment::Shuffled => {
                    let mut first = categories.clone();
                    first.shuffle(rng);
                    let second = first.split_off(half);
                    if rng.random_bool(0.5) {
                        (first, second)
                    } else {
                        (second, first)
                    }
                }
                HalfAssignment::Counterbalanced => {
                    // With counters starting level and k even, the least-drawn
                    // set always holds at least k/2 categories, so the draw
                    // has no duplicates.
                    let early = balancer.select(half, rng)?;
                    let late = categories
                        .iter()
                        .filter(|c| !early.contains(c))
                        .cloned()
                        .collect();
                    (early, late)
                }
            };

            let mut trials = run.trials().to_vec();
            for (region, group) in [(Region::EarlyMiddle, &early), (Region::SecondHalf, &late)] {
                for category in group {
                    let target = pick_position(run, index, category, region, rng)?;
                    trials[target] = run[target - 1].as_repetition();
                }
            }
            debug!(run = index, early = ?early, late = ?late, "placed attention checks");
            runs.insert(index, Run::new(trials));
        }

        Ok(Experiment::new(runs))
    }
}

/// Adds attention checks with shuffled half assignment.
pub fn add_attention_checks<R>(experiment: &Experiment, rng: &mut R) -> Result<Experiment>
where
    R: Rng + ?Sized,
{
    AttentionCheckInjector::default().inject(experiment, rng)
}

fn shared_categories(experiment: &Experiment) -> Result<Vec<String>> {
    let categories = experiment.categories();
    if categories.is_empty() {
        return Err(DesignError::InvalidDesign(
            "experiment has no stimulus trials".into(),
        ));
    }
    if categories.len() % 2 != 0 {
        return Err(DesignError::InvalidDesign(format!(
            "attention checks need an even number of categories, got {}",
            categories.len()
        )));
    }

    let mut expected = categories.clone();
    expected.sort();
    for (index, run) in experiment.runs() {
        let mut found = run.categories();
        found.sort();
        if found != expected {
            return Err(DesignError::InvalidDesign(format!(
                "run {index} uses categories {found:?}, expected {expected:?}"
            )));
        }
    }
    Ok(categories)
}

/// Picks a trial of `category` inside `region`, skipping the first eligible
/// one so the repeated trial is never the first of its block.
fn pick_position<R>(
    run: &Run,
    run_index: usize,
    category: &str,
    region: Region,
    rng: &mut R,
) -> Result<usize>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<usize> = run
        .iter()
        .enumerate()
        .filter(|(i, t)| t.category() == Some(category) && region.contains(*i, run.len()))
        .map(|(i, _)| i)
        .skip(1)
        .collect();

    eligible
        .choose(rng)
        .copied()
        .ok_or_else(|| DesignError::AttentionCheckPlacement {
            run: run_index,
            category: category.to_string(),
        })
}
