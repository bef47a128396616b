use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DesignError, Result};
use crate::{BUTTON_PRESS, FIXATION};

/// Stimulus identifiers available per category.
///
/// Categories are kept in name order so that a seeded generator always
/// sees the same sequence. The pool is never mutated by generation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct StimulusPool {
    categories: BTreeMap<String, Vec<String>>,
}

impl StimulusPool {
    pub fn new<I, C>(categories: I) -> Result<Self>
    where
        I: IntoIterator<Item = (C, Vec<String>)>,
        C: Into<String>,
    {
        let mut map = BTreeMap::new();
        for (name, stimuli) in categories {
            let name = name.into();
            if name.is_empty() || name == FIXATION || name == BUTTON_PRESS {
                return Err(DesignError::InvalidDesign(format!(
                    "'{name}' cannot be used as a category name"
                )));
            }
            if map.contains_key(&name) {
                return Err(DesignError::InvalidDesign(format!(
                    "category '{name}' is listed twice"
                )));
            }
            map.insert(name, stimuli);
        }
        Ok(Self { categories: map })
    }

    /// Reads a pool from `dir`: every subdirectory is a category and every
    /// file inside it a stimulus, identified by its path. Hidden entries are
    /// skipped.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut categories = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if is_hidden(&entry.path()) || !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let mut stimuli = Vec::new();
            for file in fs::read_dir(entry.path())? {
                let file = file?;
                let path = file.path();
                if is_hidden(&path) || !file.file_type()?.is_file() {
                    continue;
                }
                stimuli.push(path.to_string_lossy().into_owned());
            }
            stimuli.sort();
            debug!(category = %name, count = stimuli.len(), "found stimuli");
            categories.push((name, stimuli));
        }
        Self::new(categories)
    }

    /// Category names in name order.
    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn stimuli(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, stimuli)| (name.as_str(), stimuli.as_slice()))
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl TryFrom<BTreeMap<String, Vec<String>>> for StimulusPool {
    type Error = DesignError;

    fn try_from(categories: BTreeMap<String, Vec<String>>) -> Result<Self> {
        Self::new(categories)
    }
}

impl From<StimulusPool> for BTreeMap<String, Vec<String>> {
    fn from(pool: StimulusPool) -> Self {
        pool.categories
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
