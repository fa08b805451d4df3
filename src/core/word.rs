/// Word maker — grows invented words character by character over a
/// digraph table, optionally seeded from a key string.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::digraph::{DigraphTable, TERMINAL};
use crate::core::sampler::{weighted_choice, SamplerError};
use crate::core::seed::SeedAlgorithm;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("invalid word config: {0}")]
    InvalidConfig(String),
    #[error("digraph table is empty")]
    EmptyTable,
    #[error(transparent)]
    Sampler(#[from] SamplerError),
}

/// How the opening two characters of a word are picked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StartMode {
    /// Weighted by how often corpus words open with each pair.
    #[default]
    Pool,
    /// Uniformly over every context in the table.
    Uniform,
}

/// Generation parameters for a [`WordMaker`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordConfig {
    /// Shortest acceptable word, in characters.
    pub min_len: usize,
    /// Length ceiling, in characters. At least 2.
    pub max_len: usize,
    /// Extra attempts made when a word stops short of `min_len`.
    pub max_retries: u32,
    pub start: StartMode,
    pub seed: SeedAlgorithm,
}

impl Default for WordConfig {
    fn default() -> Self {
        Self {
            min_len: 3,
            max_len: 8,
            max_retries: 10,
            start: StartMode::Pool,
            seed: SeedAlgorithm::Hash,
        }
    }
}

impl WordConfig {
    pub fn with_lengths(mut self, min_len: usize, max_len: usize) -> Self {
        self.min_len = min_len;
        self.max_len = max_len;
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_start(mut self, start: StartMode) -> Self {
        self.start = start;
        self
    }

    pub fn with_seed_algorithm(mut self, seed: SeedAlgorithm) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), WordError> {
        if self.min_len == 0 {
            return Err(WordError::InvalidConfig("min_len must be at least 1".into()));
        }
        if self.max_len < 2 {
            return Err(WordError::InvalidConfig("max_len must be at least 2".into()));
        }
        if self.min_len > self.max_len {
            return Err(WordError::InvalidConfig(format!(
                "min_len {} exceeds max_len {}",
                self.min_len, self.max_len
            )));
        }
        Ok(())
    }
}

/// Invents words from a digraph table.
///
/// Holds no random state of its own: each call either derives a source from
/// the seed key or uses the one the caller threads through.
#[derive(Debug, Clone)]
pub struct WordMaker<'a> {
    table: &'a DigraphTable,
    config: WordConfig,
}

impl<'a> WordMaker<'a> {
    pub fn new(table: &'a DigraphTable, config: WordConfig) -> Result<Self, WordError> {
        config.validate()?;
        if table.is_empty() {
            return Err(WordError::EmptyTable);
        }
        Ok(WordMaker { table, config })
    }

    pub fn config(&self) -> &WordConfig {
        &self.config
    }

    /// Generate a word. With a seed key the result is reproducible; without
    /// one a fresh entropy-seeded source is used.
    pub fn generate(&self, seed: Option<&str>) -> Result<String, WordError> {
        let mut rng = match seed {
            Some(key) => StdRng::seed_from_u64(self.config.seed.seed(key)),
            None => StdRng::from_entropy(),
        };
        self.generate_with(&mut rng)
    }

    /// [`generate`](Self::generate) with per-call length bounds.
    pub fn generate_within(
        &self,
        seed: Option<&str>,
        min_len: usize,
        max_len: usize,
    ) -> Result<String, WordError> {
        let config = self.config.clone().with_lengths(min_len, max_len);
        WordMaker::new(self.table, config)?.generate(seed)
    }

    /// Generate a word drawing from the caller's random source.
    ///
    /// Words that stop short of `min_len` are retried up to `max_retries`
    /// times; after that the longest attempt is returned.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, WordError> {
        let mut best = String::new();
        let mut best_len = 0;

        for _ in 0..=self.config.max_retries {
            let word = self.grow(rng)?;
            let len = word.chars().count();
            if len >= self.config.min_len {
                return Ok(word);
            }
            if len > best_len {
                best = word;
                best_len = len;
            }
        }

        tracing::debug!(
            word = %best,
            min_len = self.config.min_len,
            attempts = self.config.max_retries + 1,
            "accepting short word after retries"
        );
        Ok(best)
    }

    /// Generate `count` words from one random source.
    pub fn generate_many<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, WordError> {
        (0..count).map(|_| self.generate_with(rng)).collect()
    }

    /// One attempt: pick a start context, then extend until the ceiling,
    /// a terminal draw, or a context with no continuation.
    fn grow<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String, WordError> {
        let mut chars: Vec<char> = self.start_context(rng)?.chars().collect();
        chars.truncate(self.config.max_len);

        while chars.len() < self.config.max_len {
            let context: String = chars[chars.len() - 2..].iter().collect();
            let Some(options) = self.table.continuations(&context) else {
                break;
            };
            let next = *weighted_choice(options, rng)?;
            if next == TERMINAL {
                break;
            }
            chars.push(next);
        }

        Ok(chars.into_iter().collect())
    }

    fn start_context<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&'a str, WordError> {
        let table: &'a DigraphTable = self.table;
        match self.config.start {
            StartMode::Pool => Ok(weighted_choice(table.starts(), rng)?.as_str()),
            StartMode::Uniform => {
                let count = table.len();
                let index = rng.gen_range(0..count);
                table.contexts().nth(index).ok_or(WordError::EmptyTable)
            }
        }
    }
}
