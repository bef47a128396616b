//! On-disk store of generated experiments, one JSON file per subject.
//!
//! A subject's trial order is generated once and read back on every later
//! session. Files are written to a temporary sibling and renamed into
//! place, so a failed save never leaves a partial file behind.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use dynloc_core::{DesignError, Experiment, Run, Trial};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::{Result, StoreError};

/// `sub-{subject}_task-localizer_{runs}runs.json`
pub fn file_name(subject: &str, runs: usize) -> String {
    format!("sub-{subject}_task-localizer_{runs}runs.json")
}

/// Reads an experiment record from an arbitrary path.
pub fn load_path(path: impl AsRef<Path>) -> Result<Experiment> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound {
            path: path.to_path_buf(),
        },
        _ => StoreError::Io(e),
    })?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[derive(Debug, Clone)]
pub struct ExperimentStore {
    dir: PathBuf,
}

impl ExperimentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, subject: &str, runs: usize) -> Result<PathBuf> {
        validate_subject(subject)?;
        Ok(self.dir.join(file_name(subject, runs)))
    }

    pub fn exists(&self, subject: &str, runs: usize) -> Result<bool> {
        Ok(self.path_for(subject, runs)?.is_file())
    }

    /// Writes `experiment` for `subject`; refuses to replace an existing
    /// file unless `overwrite` is set.
    pub fn save(&self, subject: &str, experiment: &Experiment, overwrite: bool) -> Result<PathBuf> {
        let path = self.path_for(subject, experiment.len())?;
        if !overwrite && path.exists() {
            return Err(StoreError::OutputExists { path });
        }
        fs::create_dir_all(&self.dir)?;

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, experiment)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;

        if overwrite {
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        } else {
            tmp.persist_noclobber(&path).map_err(|e| match e.error.kind() {
                ErrorKind::AlreadyExists => StoreError::OutputExists { path: path.clone() },
                _ => StoreError::Io(e.error),
            })?;
        }

        info!(path = %path.display(), runs = experiment.len(), "saved experiment");
        Ok(path)
    }

    pub fn load(&self, subject: &str, runs: usize) -> Result<Experiment> {
        let path = self.path_for(subject, runs)?;
        let experiment = load_path(&path)?;
        if experiment.len() != runs {
            return Err(DesignError::InvalidRecord(format!(
                "{} holds {} runs, expected {runs}",
                path.display(),
                experiment.len()
            ))
            .into());
        }
        info!(path = %path.display(), "loaded experiment");
        Ok(experiment)
    }

    /// Reads a single run, looked up by the decimal form of its index the
    /// way the presentation runtime does.
    pub fn load_run(&self, subject: &str, runs: usize, run: usize) -> Result<Run> {
        let path = self.path_for(subject, runs)?;
        let file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound { path: path.clone() },
            _ => StoreError::Io(e),
        })?;
        let mut record: BTreeMap<String, Vec<Trial>> =
            serde_json::from_reader(BufReader::new(file))?;
        record
            .remove(&run.to_string())
            .map(Run::new)
            .ok_or(StoreError::MissingRun { run, path })
    }

    /// Returns the stored experiment for `subject`, generating and saving
    /// one first when none exists.
    pub fn load_or_generate<F>(&self, subject: &str, runs: usize, generate: F) -> Result<Experiment>
    where
        F: FnOnce() -> std::result::Result<Experiment, DesignError>,
    {
        if self.exists(subject, runs)? {
            return self.load(subject, runs);
        }
        warn!(subject, "creating stimulus order");
        let experiment = generate()?;
        if experiment.len() != runs {
            return Err(DesignError::InvalidDesign(format!(
                "generated {} runs, expected {runs}",
                experiment.len()
            ))
            .into());
        }
        self.save(subject, &experiment, false)?;
        Ok(experiment)
    }
}

fn validate_subject(subject: &str) -> Result<()> {
    let bad = subject.is_empty()
        || subject == "."
        || subject == ".."
        || subject.contains(['/', '\\'])
        || subject.chars().any(char::is_whitespace);
    if bad {
        return Err(StoreError::InvalidSubject(subject.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynloc_core::StimulusPool;
    use dynloc_experiment::ExperimentBuilder;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tempfile::TempDir;

    fn experiment(seed: u64) -> Experiment {
        let pool = StimulusPool::new(["faces", "scenes"].map(|c| {
            (c, (0..12).map(|i| format!("{c}/{i}.mp4")).collect())
        }))
        .unwrap();
        ExperimentBuilder::default()
            .generate(&pool, &mut StdRng::seed_from_u64(seed))
            .unwrap()
    }

    #[test]
    fn file_name_embeds_subject_and_runs() {
        assert_eq!(file_name("sid000005", 4), "sub-sid000005_task-localizer_4runs.json");
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = ExperimentStore::new(tmp.path().join("cfg"));
        let exp = experiment(1);

        let path = store.save("s01", &exp, false).unwrap();
        assert!(path.ends_with("sub-s01_task-localizer_4runs.json"));
        assert_eq!(store.load("s01", 4).unwrap(), exp);
        assert_eq!(&store.load_run("s01", 4, 3).unwrap(), exp.run(3).unwrap());
    }

    #[test]
    fn refuses_to_overwrite_without_flag() {
        let tmp = TempDir::new().unwrap();
        let store = ExperimentStore::new(tmp.path());
        let path = store.save("s01", &experiment(1), false).unwrap();
        let before = fs::read(&path).unwrap();

        let err = store.save("s01", &experiment(2), false).unwrap_err();
        assert!(matches!(err, StoreError::OutputExists { .. }));
        assert_eq!(fs::read(&path).unwrap(), before);

        store.save("s01", &experiment(2), true).unwrap();
        assert_eq!(store.load("s01", 4).unwrap(), experiment(2));
        // only the record itself, no leftover temporary files
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 1);
    }

    #[test]
    fn load_or_generate_is_stable_across_sessions() {
        let tmp = TempDir::new().unwrap();
        let store = ExperimentStore::new(tmp.path());

        let first = store.load_or_generate("s02", 4, || Ok(experiment(3))).unwrap();
        let second = store
            .load_or_generate("s02", 4, || panic!("should load the stored order"))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn failed_generation_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let store = ExperimentStore::new(tmp.path());
        let err = store
            .load_or_generate("s03", 4, || Err(DesignError::EmptyPool))
            .unwrap_err();
        assert!(matches!(err, StoreError::Design(DesignError::EmptyPool)));
        assert!(!store.exists("s03", 4).unwrap());
    }

    #[test]
    fn missing_run_and_missing_file() {
        let tmp = TempDir::new().unwrap();
        let store = ExperimentStore::new(tmp.path());
        assert!(matches!(
            store.load("nobody", 4).unwrap_err(),
            StoreError::NotFound { .. }
        ));
        store.save("s04", &experiment(4), false).unwrap();
        assert!(matches!(
            store.load_run("s04", 4, 7).unwrap_err(),
            StoreError::MissingRun { run: 7, .. }
        ));
    }

    #[test]
    fn subject_ids_cannot_escape_the_directory() {
        let store = ExperimentStore::new("cfg");
        for bad in ["", "..", "../s01", "a/b", "a b"] {
            assert!(
                matches!(store.path_for(bad, 4), Err(StoreError::InvalidSubject(_))),
                "{bad:?} accepted"
            );
        }
    }
}
