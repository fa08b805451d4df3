//! Engine configuration loaded from RON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::digraph::DigraphTable;
use crate::core::transform::{RuleError, RuleSet, RuleSpec};
use crate::core::translate::{TranslateError, Translator};
use crate::core::word::WordConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),
    #[error("translator error: {0}")]
    Translate(#[from] TranslateError),
}

/// Everything needed to assemble a [`Translator`].
///
/// ```ron
/// (
///     word: (min_len: 3, max_len: 8, seed: Hash),
///     rules: [
///         Rule(pattern: "(S (NP $n) (VP $v))", replacement: "(S (VP $v) (NP $n))"),
///     ],
///     corpus: Some("lexicon/seed_corpus.txt"),
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConlangConfig {
    pub word: WordConfig,
    pub rules: Vec<RuleSpec>,
    /// Corpus file for the digraph table; the bundled English corpus when
    /// absent.
    pub corpus: Option<PathBuf>,
}

impl ConlangConfig {
    pub fn load_from_ron(path: &Path) -> Result<ConlangConfig, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<ConlangConfig, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    /// Compile the rules, train the table, and build a translator.
    pub fn translator(&self) -> Result<Translator, ConfigError> {
        let rules = RuleSet::from_specs(&self.rules)?;
        let table = match &self.corpus {
            Some(path) => {
                let corpus = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                DigraphTable::train(&corpus)
            }
            None => DigraphTable::english(),
        };

        Ok(Translator::builder()
            .rules(rules)
            .table(table)
            .word_config(self.word.clone())
            .build()?)
    }
}
