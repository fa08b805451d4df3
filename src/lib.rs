//! Conlang Engine — surface text for a constructed language.
//!
//! Two engines share this crate: tagged parse trees rewritten by
//! pattern/replacement rules and linearized into sentences, and a digraph
//! Markov word maker that coins vocabulary reproducibly from a seed key.

pub mod config;
pub mod core;

pub use crate::config::{ConfigError, ConlangConfig};
pub use crate::core::digraph::{DigraphTable, TableError};
pub use crate::core::sampler::{weighted_choice, SamplerError, WeightedChoices};
pub use crate::core::seed::{hash_seed, naive_seed, SeedAlgorithm};
pub use crate::core::transform::{Bindings, RuleError, RuleSet, RuleSpec, Scope, TransformRule};
pub use crate::core::translate::{TranslateError, Translation, Translator};
pub use crate::core::tree::{ParseError, Tag, TreeNode};
pub use crate::core::word::{StartMode, WordConfig, WordError, WordMaker};
