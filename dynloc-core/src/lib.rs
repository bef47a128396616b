pub mod error;
pub mod experiment;
pub mod phase;
pub mod record;
pub mod stimulus;
pub mod trial;
pub mod validate;

pub use error::{DesignError, Result};
pub use experiment::{Experiment, Run};
pub use phase::RunPhase;
pub use record::TrialRecord;
pub use stimulus::StimulusPool;
pub use trial::Trial;
pub use validate::{ExperimentShape, RunShape};

/// Wire name of fixation trials in the persisted record.
pub const FIXATION: &str = "fixation";
/// Wire name of button presses logged by the presentation runtime.
pub const BUTTON_PRESS: &str = "button_press";

pub const FIXATION_DURATION_S: f64 = 18.0;
pub const STIMULUS_DURATION_S: f64 = 3.0;
pub const STIMULI_PER_BLOCK: usize = 6;
