use dynloc_core::{
    DesignError, FIXATION_DURATION_S, Result, STIMULI_PER_BLOCK, STIMULUS_DURATION_S,
};
use serde::{Deserialize, Serialize};

use crate::attention::HalfAssignment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    pub fixation_duration_s: f64,
    pub stimulus_duration_s: f64,
    pub stimuli_per_block: usize,
    pub runs: usize,
    pub half_assignment: HalfAssignment,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            fixation_duration_s: FIXATION_DURATION_S,
            stimulus_duration_s: STIMULUS_DURATION_S,
            stimuli_per_block: STIMULI_PER_BLOCK,
            runs: 4,
            half_assignment: HalfAssignment::default(),
        }
    }
}

impl DesignConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stimuli_per_block == 0 {
            return Err(DesignError::InvalidDesign(
                "stimuli_per_block must be at least 1".into(),
            ));
        }
        if self.runs == 0 {
            return Err(DesignError::InvalidDesign("runs must be at least 1".into()));
        }
        for (name, value) in [
            ("fixation_duration_s", self.fixation_duration_s),
            ("stimulus_duration_s", self.stimulus_duration_s),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DesignError::InvalidDesign(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_file_keeps_defaults() {
        let config: DesignConfig =
            serde_json::from_str(r#"{"runs": 2, "half_assignment": "counterbalanced"}"#).unwrap();
        assert_eq!(config.runs, 2);
        assert_eq!(config.half_assignment, HalfAssignment::Counterbalanced);
        assert_eq!(config.stimuli_per_block, 6);
        assert_eq!(config.fixation_duration_s, 18.0);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_empty_blocks_and_bad_durations() {
        let config = DesignConfig {
            stimuli_per_block: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DesignConfig {
            stimulus_duration_s: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
