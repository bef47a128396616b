use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dynloc_cache::{ExperimentStore, StoreError, load_path};
use dynloc_core::{ExperimentShape, Run, StimulusPool};
use dynloc_experiment::{DesignConfig, ExperimentBuilder, HalfAssignment};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::cli::{CheckArgs, Command, GenerateArgs, GenerationArgs, ShowArgs};

pub struct App {
    config: DesignConfig,
}

impl App {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("opening config {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => DesignConfig::default(),
        };
        config.validate()?;
        debug!(?config, "design config");
        Ok(Self { config })
    }

    pub fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Generate(args) => {
                let path = self.generate(&args)?;
                println!("Stimulus order saved to {}", path.display());
            }
            Command::Show(args) => {
                let run = self.show(&args)?;
                print_run(args.run, &run);
            }
            Command::Check(args) => {
                let shape = self.check(&args)?;
                print_shape(&args.file, &shape);
            }
        }
        Ok(())
    }

    fn design(&self, runs: usize, args: &GenerationArgs) -> ExperimentBuilder {
        let half_assignment = if args.counterbalance {
            HalfAssignment::Counterbalanced
        } else {
            self.config.half_assignment
        };
        let config = DesignConfig {
            runs,
            half_assignment,
            ..self.config.clone()
        };
        ExperimentBuilder::new(config).with_attention_checks(!args.no_attention_checks)
    }

    pub fn generate(&self, args: &GenerateArgs) -> Result<PathBuf> {
        let subject = &args.subject;
        let runs = subject.nruns.unwrap_or(self.config.runs);
        let store = ExperimentStore::new(&subject.output);

        if !args.overwrite && store.exists(&subject.subid, runs)? {
            let path = store.path_for(&subject.subid, runs)?;
            return Err(StoreError::OutputExists { path }.into());
        }

        let pool = load_pool(&args.generation.stimdir)?;
        let mut rng = rng_from(args.generation.seed);
        let experiment = self.design(runs, &args.generation).generate(&pool, &mut rng)?;
        let path = store.save(&subject.subid, &experiment, args.overwrite)?;
        info!(subject = %subject.subid, runs, "generated stimulus order");
        Ok(path)
    }

    pub fn show(&self, args: &ShowArgs) -> Result<Run> {
        let subject = &args.subject;
        let runs = subject.nruns.unwrap_or(self.config.runs);
        let store = ExperimentStore::new(&subject.output);

        let builder = self.design(runs, &args.generation);
        let experiment = store.load_or_generate(&subject.subid, runs, || {
            let pool = StimulusPool::from_dir(&args.generation.stimdir)?;
            builder.generate(&pool, &mut rng_from(args.generation.seed))
        })?;

        let path = store.path_for(&subject.subid, runs)?;
        let run = experiment
            .run(args.run)
            .cloned()
            .ok_or(StoreError::MissingRun { run: args.run, path })?;
        Ok(run)
    }

    pub fn check(&self, args: &CheckArgs) -> Result<ExperimentShape> {
        let experiment = load_path(&args.file)?;
        let shape = experiment
            .check_structure()
            .with_context(|| format!("{} is not a valid stimulus order", args.file.display()))?;
        Ok(shape)
    }
}

fn load_pool(dir: &Path) -> Result<StimulusPool> {
    let pool = StimulusPool::from_dir(dir)
        .with_context(|| format!("reading stimuli from {}", dir.display()))?;
    info!(categories = pool.len(), dir = %dir.display(), "loaded stimulus pool");
    Ok(pool)
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn print_run(index: usize, run: &Run) {
    println!("Run {index}: {} trials", run.len());
    for (i, trial) in run.iter().enumerate() {
        println!(
            "{:>4}  {:<14} {:>5.1}s  {}{}",
            i,
            trial.stim_type(),
            trial.duration(),
            trial.stimulus_id().unwrap_or("-"),
            if trial.is_repetition() { "  [repeat]" } else { "" },
        );
    }
}

fn print_shape(file: &Path, shape: &ExperimentShape) {
    println!("{}: OK", file.display());
    println!("  categories: {}", shape.categories.join(", "));
    for (index, run) in &shape.runs {
        println!(
            "  run {index}: {} x {} trials, {} attention checks",
            run.block_order.join(" > "),
            run.trials_per_category,
            run.repetitions,
        );
    }
}
