use serde::{Deserialize, Serialize};

use crate::record::TrialRecord;
use crate::{BUTTON_PRESS, FIXATION};

/// One presentation trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrialRecord", into = "TrialRecord")]
pub enum Trial {
    Fixation {
        duration: f64,
    },
    Stimulus {
        category: String,
        duration: f64,
        stimulus_id: String,
        repetition: bool,
    },
    /// Logged by the presentation runtime only; generation never emits it.
    ButtonPress {
        duration: f64,
    },
}

impl Trial {
    pub fn fixation(duration: f64) -> Self {
        Trial::Fixation { duration }
    }

    pub fn stimulus(category: impl Into<String>, duration: f64, stimulus_id: impl Into<String>) -> Self {
        Trial::Stimulus {
            category: category.into(),
            duration,
            stimulus_id: stimulus_id.into(),
            repetition: false,
        }
    }

    pub fn duration(&self) -> f64 {
        match self {
            Trial::Fixation { duration }
            | Trial::Stimulus { duration, .. }
            | Trial::ButtonPress { duration } => *duration,
        }
    }

    /// Category of a stimulus trial.
    pub fn category(&self) -> Option<&str> {
        match self {
            Trial::Stimulus { category, .. } => Some(category),
            _ => None,
        }
    }

    pub fn stimulus_id(&self) -> Option<&str> {
        match self {
            Trial::Stimulus { stimulus_id, .. } => Some(stimulus_id),
            _ => None,
        }
    }

    /// Name written to the `stim_type` field.
    pub fn stim_type(&self) -> &str {
        match self {
            Trial::Fixation { .. } => FIXATION,
            Trial::Stimulus { category, .. } => category,
            Trial::ButtonPress { .. } => BUTTON_PRESS,
        }
    }

    pub fn is_fixation(&self) -> bool {
        matches!(self, Trial::Fixation { .. })
    }

    pub fn is_stimulus(&self) -> bool {
        matches!(self, Trial::Stimulus { .. })
    }

    pub fn is_repetition(&self) -> bool {
        matches!(self, Trial::Stimulus { repetition: true, .. })
    }

    /// A copy of this trial marked as an attention-check repetition.
    /// Non-stimulus trials are returned unchanged.
    pub fn as_repetition(&self) -> Trial {
        match self {
            Trial::Stimulus {
                category,
                duration,
                stimulus_id,
                ..
            } => Trial::Stimulus {
                category: category.clone(),
                duration: *duration,
                stimulus_id: stimulus_id.clone(),
                repetition: true,
            },
            other => other.clone(),
        }
    }
}
