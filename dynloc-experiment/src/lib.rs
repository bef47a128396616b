pub mod attention;
pub mod balance;
pub mod builder;
pub mod config;
pub mod run;

pub use attention::{AttentionCheckInjector, HalfAssignment, Region, add_attention_checks};
pub use balance::{CategoryBalancer, balanced_select};
pub use builder::{ExperimentBuilder, create_experiment};
pub use config::DesignConfig;
pub use run::{RunBuilder, create_run};
