use dynloc_core::{DesignError, Experiment, Result, StimulusPool};
use rand::Rng;
use tracing::debug;

use crate::attention::AttentionCheckInjector;
use crate::config::DesignConfig;
use crate::run::RunBuilder;

/// Assembles multi-run experiments from a stimulus pool.
#[derive(Debug, Clone)]
pub struct ExperimentBuilder {
    config: DesignConfig,
    attention_checks: bool,
}

impl Default for ExperimentBuilder {
    fn default() -> Self {
        Self::new(DesignConfig::default())
    }
}

impl ExperimentBuilder {
    pub fn new(config: DesignConfig) -> Self {
        Self {
            config,
            attention_checks: true,
        }
    }

    pub fn with_attention_checks(mut self, enabled: bool) -> Self {
        self.attention_checks = enabled;
        self
    }

    /// Builds `runs` independent runs, each drawing from the full pool.
    pub fn build<R>(&self, pool: &StimulusPool, runs: usize, rng: &mut R) -> Result<Experiment>
    where
        R: Rng + ?Sized,
    {
        if runs == 0 {
            return Err(DesignError::InvalidDesign(
                "an experiment needs at least one run".into(),
            ));
        }
        let builder = RunBuilder::new(self.config.clone());
        let runs = (0..runs)
            .map(|_| builder.build(pool, rng))
            .collect::<Result<Vec<_>>>()?;
        debug!(runs = runs.len(), categories = pool.len(), "built experiment");
        Ok(Experiment::from_runs(runs))
    }

    /// Full generation: validated config, `config.runs` runs and, unless
    /// disabled, attention checks.
    pub fn generate<R>(&self, pool: &StimulusPool, rng: &mut R) -> Result<Experiment>
    where
        R: Rng + ?Sized,
    {
        self.config.validate()?;
        let experiment = self.build(pool, self.config.runs, rng)?;
        if !self.attention_checks {
            return Ok(experiment);
        }
        AttentionCheckInjector::new(self.config.half_assignment).inject(&experiment, rng)
    }
}

/// Builds `runs` runs with the standard layout and no attention checks.
pub fn create_experiment<R>(pool: &StimulusPool, runs: usize, rng: &mut R) -> Result<Experiment>
where
    R: Rng + ?Sized,
{
    ExperimentBuilder::default().build(pool, runs, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pool() -> StimulusPool {
        StimulusPool::new(["a", "b"].map(|c| {
            (c, (0..12).map(|i| format!("{c}{i}")).collect())
        }))
        .unwrap()
    }

    #[test]
    fn zero_runs_is_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(create_experiment(&pool(), 0, &mut rng).is_err());
    }

    #[test]
    fn generate_uses_configured_run_count_and_checks() {
        let config = DesignConfig {
            runs: 3,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let exp = ExperimentBuilder::new(config.clone())
            .generate(&pool(), &mut rng)
            .unwrap();
        assert_eq!(exp.run_indices(), vec![0, 1, 2]);
        assert!(exp.runs().all(|(_, r)| r.repetition_count() == 2));

        let plain = ExperimentBuilder::new(config)
            .with_attention_checks(false)
            .generate(&pool(), &mut rng)
            .unwrap();
        assert!(plain.runs().all(|(_, r)| r.repetition_count() == 0));
    }

    #[test]
    fn same_seed_same_experiment() {
        let a = ExperimentBuilder::default()
            .generate(&pool(), &mut StdRng::seed_from_u64(99))
            .unwrap();
        let b = ExperimentBuilder::default()
            .generate(&pool(), &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(a, b);
    }
}
