use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dynloc")]
#[command(about = "Stimulus orders for the dynamic category localizer", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// JSON file overriding the design defaults (durations, block size, runs)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate and save the stimulus order for a subject
    Generate(GenerateArgs),
    /// Print one run of a subject's order, generating it if needed
    Show(ShowArgs),
    /// Validate a saved stimulus order
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct SubjectArgs {
    /// Subject id
    #[arg(short = 's', long)]
    pub subid: String,

    /// Number of runs [default: 4, or the config file's value]
    #[arg(short = 'n', long)]
    pub nruns: Option<usize>,

    /// Directory holding the saved stimulus orders
    #[arg(short = 'o', long)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct GenerationArgs {
    /// Directory with one subdirectory of stimuli per category
    #[arg(short = 'd', long, default_value = "stimuli")]
    pub stimdir: PathBuf,

    /// Seed for a reproducible order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Leave out the attention-check repetitions
    #[arg(long, default_value_t = false)]
    pub no_attention_checks: bool,

    /// Balance across runs which categories get an early attention check
    #[arg(long, default_value_t = false)]
    pub counterbalance: bool,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub subject: SubjectArgs,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Replace an existing stimulus order
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub subject: SubjectArgs,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Run number (0-based)
    #[arg(short = 'r', long)]
    pub run: usize,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Saved stimulus order (JSON)
    #[arg(short = 'f', long)]
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_defaults() {
        let cli = Cli::try_parse_from(["dynloc", "generate", "-s", "s01", "-o", "cfg"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.subject.subid, "s01");
        assert_eq!(args.subject.nruns, None);
        assert_eq!(args.generation.stimdir, PathBuf::from("stimuli"));
        assert!(!args.overwrite);
        assert!(!cli.verbose);
    }

    #[test]
    fn show_requires_a_run() {
        assert!(Cli::try_parse_from(["dynloc", "show", "-s", "s01", "-o", "cfg"]).is_err());
        let cli = Cli::try_parse_from([
            "dynloc", "-v", "show", "-s", "s01", "-o", "cfg", "-r", "2", "--seed", "3",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Command::Show(args) = cli.command else {
            panic!("expected show");
        };
        assert_eq!(args.run, 2);
        assert_eq!(args.generation.seed, Some(3));
    }
}
