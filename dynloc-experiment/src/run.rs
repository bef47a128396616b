use std::collections::BTreeMap;

use dynloc_core::{DesignError, Result, Run, RunPhase, StimulusPool, Trial};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::config::DesignConfig;

/// Builds single localizer runs: fixation, a shuffled category block,
/// fixation, the same categories in reverse, fixation.
#[derive(Debug, Clone, Default)]
pub struct RunBuilder {
    config: DesignConfig,
}

impl RunBuilder {
    pub fn new(config: DesignConfig) -> Self {
        Self { config }
    }

    pub fn build<R>(&self, pool: &StimulusPool, rng: &mut R) -> Result<Run>
    where
        R: Rng + ?Sized,
    {
        if pool.is_empty() {
            return Err(DesignError::EmptyPool);
        }
        let per_block = self.config.stimuli_per_block;

        let mut order = pool.category_names();
        order.shuffle(rng);

        // Shuffled private decks; drawing pops from the end.
        let mut decks: BTreeMap<&str, Vec<&str>> = pool
            .iter()
            .map(|(category, stimuli)| {
                let mut deck: Vec<&str> = stimuli.iter().map(String::as_str).collect();
                deck.shuffle(rng);
                (category, deck)
            })
            .collect();

        let mut trials = Vec::with_capacity(3 + 2 * per_block * order.len());
        for phase in RunPhase::sequence() {
            if phase.is_fixation() {
                trials.push(Trial::fixation(self.config.fixation_duration_s));
                continue;
            }
            let mut block: Vec<&String> = order.iter().collect();
            if phase.is_reversed() {
                block.reverse();
            }
            for category in block {
                let deck = decks.get_mut(category.as_str()).ok_or_else(|| {
                    DesignError::InvalidDesign(format!("unknown category '{category}'"))
                })?;
                if deck.len() < per_block {
                    return Err(DesignError::InsufficientStimuli {
                        category: category.clone(),
                        available: deck.len(),
                        required: per_block,
                    });
                }
                for id in deck.split_off(deck.len() - per_block).into_iter().rev() {
                    trials.push(Trial::stimulus(
                        category.as_str(),
                        self.config.stimulus_duration_s,
                        id,
                    ));
                }
            }
        }

        debug!(order = ?order, trials = trials.len(), "built run");
        Ok(Run::new(trials))
    }
}

/// Builds one run with the standard 18 s / 3 s / 6-per-block layout.
pub fn create_run<R>(pool: &StimulusPool, rng: &mut R) -> Result<Run>
where
    R: Rng + ?Sized,
{
    RunBuilder::default().build(pool, rng)
}
