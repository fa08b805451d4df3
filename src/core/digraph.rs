/// Digraph frequency table — two-character context to weighted next
/// characters, trained from a seed corpus.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::core::sampler::WeightedChoices;

/// Continuation recorded after the last character of every corpus word.
pub const TERMINAL: char = '.';

/// Corpus bundled with the crate for the default table.
const SEED_CORPUS: &str = include_str!("../../lexicon/seed_corpus.txt");

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialization error: {0}")]
    RonSer(#[from] ron::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid digraph table: {0}")]
    Invalid(String),
}

/// Weighted character transitions keyed by the preceding two characters.
///
/// Deserialized tables are validated, so every context and start entry is
/// exactly two characters and every weight is positive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableData")]
pub struct DigraphTable {
    /// Context -> [(next character, count)], in first-seen order.
    transitions: BTreeMap<String, WeightedChoices<char>>,
    /// Opening two characters of corpus words, weighted by frequency.
    starts: WeightedChoices<String>,
}

impl DigraphTable {
    /// Train a table from free text.
    ///
    /// The corpus is lowercased and split into runs of alphabetic
    /// characters. Words shorter than two characters are skipped.
    pub fn train(corpus: &str) -> DigraphTable {
        let mut table = DigraphTable::default();
        let mut words = 0usize;

        for word in corpus
            .split(|c: char| !c.is_alphabetic())
            .filter(|w| !w.is_empty())
        {
            let chars: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
            if chars.len() < 2 {
                continue;
            }
            words += 1;

            let start: String = chars[..2].iter().collect();
            increment(&mut table.starts, start);

            let mut padded = chars;
            padded.push(TERMINAL);
            for window in padded.windows(3) {
                let context: String = window[..2].iter().collect();
                increment(table.transitions.entry(context).or_default(), window[2]);
            }
        }

        tracing::info!(
            words,
            contexts = table.transitions.len(),
            starts = table.starts.len(),
            "trained digraph table"
        );
        table
    }

    /// Table trained from the bundled English seed corpus.
    pub fn english() -> DigraphTable {
        Self::train(SEED_CORPUS)
    }

    /// Weighted continuations of `context`, or `None` if it was never seen
    /// with a following character.
    pub fn continuations(&self, context: &str) -> Option<&[(char, u32)]> {
        self.transitions.get(context).map(Vec::as_slice)
    }

    /// Every context with at least one continuation, in sorted order.
    pub fn contexts(&self) -> impl Iterator<Item = &str> {
        self.transitions.keys().map(String::as_str)
    }

    pub fn starts(&self) -> &[(String, u32)] {
        &self.starts
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Check the shape a word maker relies on: two-character contexts and
    /// start entries, positive weights.
    pub fn validate(&self) -> Result<(), TableError> {
        for (context, options) in &self.transitions {
            check_pair(context, "context")?;
            if options.is_empty() {
                return Err(TableError::Invalid(format!(
                    "context '{}' has no continuations",
                    context
                )));
            }
            if let Some((next, _)) = options.iter().find(|(_, w)| *w == 0) {
                return Err(TableError::Invalid(format!(
                    "continuation {:?} of '{}' has zero weight",
                    next, context
                )));
            }
        }
        for (start, weight) in &self.starts {
            check_pair(start, "start")?;
            if *weight == 0 {
                return Err(TableError::Invalid(format!(
                    "start '{}' has zero weight",
                    start
                )));
            }
        }
        Ok(())
    }
}

fn check_pair(pair: &str, what: &str) -> Result<(), TableError> {
    if pair.chars().count() != 2 {
        return Err(TableError::Invalid(format!(
            "{} '{}' is not two characters",
            what, pair
        )));
    }
    Ok(())
}

/// Wire form of [`DigraphTable`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename = "DigraphTable")]
struct TableData {
    transitions: BTreeMap<String, WeightedChoices<char>>,
    starts: WeightedChoices<String>,
}

impl TryFrom<TableData> for DigraphTable {
    type Error = TableError;

    fn try_from(data: TableData) -> Result<Self, Self::Error> {
        let table = DigraphTable {
            transitions: data.transitions,
            starts: data.starts,
        };
        table.validate()?;
        Ok(table)
    }
}

fn increment<K: PartialEq>(choices: &mut WeightedChoices<K>, key: K) {
    if let Some(entry) = choices.iter_mut().find(|(k, _)| *k == key) {
        entry.1 += 1;
    } else {
        choices.push((key, 1));
    }
}

/// Save a table to a RON file.
pub fn save_table(table: &DigraphTable, path: &Path) -> Result<(), TableError> {
    let serialized = ron::ser::to_string_pretty(table, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, serialized)?;
    Ok(())
}

/// Load a table from a RON file.
pub fn load_table(path: &Path) -> Result<DigraphTable, TableError> {
    let contents = std::fs::read_to_string(path)?;
    let table: DigraphTable = ron::from_str(&contents)?;
    tracing::info!(path = %path.display(), contexts = table.len(), "loaded digraph table");
    Ok(table)
}
