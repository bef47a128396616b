//! Flat trial record read by the presentation runtime.
//!
//! Field names and value types are fixed: `stim_type`, `duration`,
//! `stim_fn` (null for fixation and button presses) and an optional
//! integer `repetition` flag.

use serde::{Deserialize, Serialize};

use crate::error::DesignError;
use crate::trial::Trial;
use crate::{BUTTON_PRESS, FIXATION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub stim_type: String,
    pub duration: f64,
    #[serde(default)]
    pub stim_fn: Option<String>,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub repetition: u8,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl From<Trial> for TrialRecord {
    fn from(trial: Trial) -> Self {
        match trial {
            Trial::Fixation { duration } => TrialRecord {
                stim_type: FIXATION.to_string(),
                duration,
                stim_fn: None,
                repetition: 0,
            },
            Trial::Stimulus {
                category,
                duration,
                stimulus_id,
                repetition,
            } => TrialRecord {
                stim_type: category,
                duration,
                stim_fn: Some(stimulus_id),
                repetition: u8::from(repetition),
            },
            Trial::ButtonPress { duration } => TrialRecord {
                stim_type: BUTTON_PRESS.to_string(),
                duration,
                stim_fn: None,
                repetition: 0,
            },
        }
    }
}

impl TryFrom<TrialRecord> for Trial {
    type Error = DesignError;

    fn try_from(record: TrialRecord) -> Result<Self, Self::Error> {
        let repetition = match record.repetition {
            0 => false,
            1 => true,
            other => {
                return Err(DesignError::InvalidRecord(format!(
                    "repetition must be 0 or 1, got {other}"
                )));
            }
        };

        match record.stim_type.as_str() {
            FIXATION | BUTTON_PRESS if repetition => Err(DesignError::InvalidRecord(format!(
                "{} trial cannot be a repetition",
                record.stim_type
            ))),
            FIXATION => Ok(Trial::Fixation {
                duration: record.duration,
            }),
            BUTTON_PRESS => Ok(Trial::ButtonPress {
                duration: record.duration,
            }),
            _ => {
                let stimulus_id = record.stim_fn.ok_or_else(|| {
                    DesignError::InvalidRecord(format!(
                        "'{}' trial is missing stim_fn",
                        record.stim_type
                    ))
                })?;
                Ok(Trial::Stimulus {
                    category: record.stim_type,
                    duration: record.duration,
                    stimulus_id,
                    repetition,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn fixation_writes_null_stim_fn() {
        let value = serde_json::to_value(Trial::fixation(18.0)).unwrap();
        assert_eq!(
            value,
            json!({"stim_type": "fixation", "duration": 18.0, "stim_fn": null})
        );
    }

    #[test]
    fn repetition_written_as_integer() {
        let trial = Trial::stimulus("faces", 3.0, "faces/a.mp4").as_repetition();
        let value = serde_json::to_value(&trial).unwrap();
        assert_eq!(
            value,
            json!({"stim_type": "faces", "duration": 3.0, "stim_fn": "faces/a.mp4", "repetition": 1})
        );
    }

    #[test]
    fn missing_repetition_defaults_to_plain_trial() {
        let trial: Trial = serde_json::from_value(
            json!({"stim_type": "bodies", "duration": 3.0, "stim_fn": "bodies/x.mp4"}),
        )
        .unwrap();
        assert_eq!(trial, Trial::stimulus("bodies", 3.0, "bodies/x.mp4"));
    }

    #[test]
    fn button_press_is_decoded() {
        let trial: Trial =
            serde_json::from_value(json!({"stim_type": "button_press", "duration": 0.0}))
                .unwrap();
        assert_eq!(trial, Trial::ButtonPress { duration: 0.0 });
    }

    #[test]
    fn stimulus_without_file_is_rejected() {
        let err = serde_json::from_value::<Trial>(
            json!({"stim_type": "scenes", "duration": 3.0, "stim_fn": null}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing stim_fn"));
    }

    #[test]
    fn out_of_range_repetition_is_rejected() {
        let err = serde_json::from_value::<Trial>(
            json!({"stim_type": "scenes", "duration": 3.0, "stim_fn": "s.mp4", "repetition": 2}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("repetition"));
    }
}
