/// Translation pipeline: tagged sentence -> rewritten tree -> surface text
/// plus a coined conlang word for each surface token.

use thiserror::Error;

use crate::core::digraph::DigraphTable;
use crate::core::transform::RuleSet;
use crate::core::tree::{ParseError, Tag};
use crate::core::word::{WordConfig, WordError, WordMaker};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("word error: {0}")]
    Word(#[from] WordError),
}

/// Result of translating one tagged sentence.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// The tree after every rule has run.
    pub tree: Tag,
    /// `tree.clean()`.
    pub surface: String,
    /// One coined word per surface token, in order.
    pub words: Vec<String>,
}

impl Translation {
    /// Surface tokens paired with their coined words.
    pub fn glossary(&self) -> impl Iterator<Item = (&str, &str)> {
        self.surface
            .split_whitespace()
            .zip(self.words.iter().map(String::as_str))
    }
}

/// Rule pipeline plus word maker. Built via `Translator::builder()`.
#[derive(Debug, Clone)]
pub struct Translator {
    rules: RuleSet,
    table: DigraphTable,
    word_config: WordConfig,
}

/// Builder for constructing a `Translator`.
#[derive(Debug, Default)]
pub struct TranslatorBuilder {
    rules: Option<RuleSet>,
    table: Option<DigraphTable>,
    word_config: Option<WordConfig>,
}

impl TranslatorBuilder {
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn table(mut self, table: DigraphTable) -> Self {
        self.table = Some(table);
        self
    }

    pub fn word_config(mut self, config: WordConfig) -> Self {
        self.word_config = Some(config);
        self
    }

    pub fn build(self) -> Result<Translator, TranslateError> {
        let translator = Translator {
            rules: self.rules.unwrap_or_default(),
            table: self.table.unwrap_or_else(DigraphTable::english),
            word_config: self.word_config.unwrap_or_default(),
        };
        // Surface config and table problems here rather than on first use.
        translator.maker()?;
        Ok(translator)
    }
}

impl Translator {
    pub fn builder() -> TranslatorBuilder {
        TranslatorBuilder::default()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn table(&self) -> &DigraphTable {
        &self.table
    }

    pub fn maker(&self) -> Result<WordMaker<'_>, WordError> {
        WordMaker::new(&self.table, self.word_config.clone())
    }

    /// Parse `source`, run the rule pipeline, and coin a word for each
    /// surface token.
    pub fn translate(&self, source: &str) -> Result<Translation, TranslateError> {
        let parsed = Tag::from_text(source)?;
        let tree = self.rules.apply(&parsed);
        let surface = tree.clean();

        let maker = self.maker()?;
        let words = tree
            .leaves()
            .map(|token| maker.generate(Some(token)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Translation {
            tree,
            surface,
            words,
        })
    }

    /// Coin the word for a single key.
    pub fn coin(&self, key: &str) -> Result<String, TranslateError> {
        Ok(self.maker()?.generate(Some(key))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pivot_rules() -> RuleSet {
        RuleSet::from_pairs([(
            "(S (NP $n) (VP $v $n2))",
            "(S (VP $v) (NP $n) (PP a $n2))",
        )])
        .unwrap()
    }

    #[test]
    fn translate_rewrites_then_coins() {
        let translator = Translator::builder().rules(pivot_rules()).build().unwrap();
        let t = translator
            .translate("(S (NP I) (VP am (NP groot)))")
            .unwrap();
        assert_eq!(t.surface, "am I a groot");
        assert_eq!(t.words.len(), 4);
        assert_eq!(t.words[0], translator.coin("am").unwrap());
        assert_eq!(t.words[3], translator.coin("groot").unwrap());
    }

    #[test]
    fn repeated_tokens_share_a_word() {
        let translator = Translator::builder().build().unwrap();
        let t = translator.translate("(S (NP the mage) (VP saw (NP the dog)))").unwrap();
        assert_eq!(t.surface, "the mage saw the dog");
        assert_eq!(t.words[0], t.words[3]);
    }

    #[test]
    fn glossary_pairs_tokens_with_words() {
        let translator = Translator::builder().build().unwrap();
        let t = translator.translate("(S (VP kill) (NP mage))").unwrap();
        let pairs: Vec<_> = t.glossary().collect();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0, "kill");
        assert_eq!(pairs[1].0, "mage");
    }

    #[test]
    fn parse_errors_surface() {
        let translator = Translator::builder().build().unwrap();
        assert!(matches!(
            translator.translate("(S (NP I)"),
            Err(TranslateError::Parse(ParseError::Unclosed(0)))
        ));
    }

    #[test]
    fn build_rejects_bad_word_config() {
        let result = Translator::builder()
            .word_config(WordConfig::default().with_lengths(9, 3))
            .build();
        assert!(matches!(
            result,
            Err(TranslateError::Word(WordError::InvalidConfig(_)))
        ));
    }

    #[test]
    fn build_rejects_empty_table() {
        let result = Translator::builder().table(DigraphTable::default()).build();
        assert!(matches!(result, Err(TranslateError::Word(WordError::EmptyTable))));
    }
}
