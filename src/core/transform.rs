/// Transform rules — pattern matching with variable binding over tagged
/// trees, template instantiation, and ordered rule pipelines.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::core::tree::{self, ParseError, Tag, TreeNode, VARIABLE_SIGIL};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("pattern: {0}")]
    Pattern(ParseError),
    #[error("replacement: {0}")]
    Replacement(ParseError),
    #[error("replacement uses '{0}' which the pattern never binds")]
    UnboundVariable(String),
    #[error("rule '{name}': {source}")]
    Named {
        name: String,
        #[source]
        source: Box<RuleError>,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// One element of a compiled pattern or replacement template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Pattern {
    Var(String),
    Leaf(String),
    Node { label: String, children: Vec<Pattern> },
}

impl Pattern {
    fn compile(node: &TreeNode) -> Pattern {
        match node {
            TreeNode::Leaf(token) if token.starts_with(VARIABLE_SIGIL) => {
                Pattern::Var(token.clone())
            }
            TreeNode::Leaf(token) => Pattern::Leaf(token.clone()),
            TreeNode::Node(tag) => Pattern::compile_tag(tag),
        }
    }

    fn compile_tag(tag: &Tag) -> Pattern {
        Pattern::Node {
            label: tag.label.clone(),
            children: tag.children.iter().map(Pattern::compile).collect(),
        }
    }

    fn variables<'a>(&'a self, out: &mut FxHashSet<&'a str>) {
        match self {
            Pattern::Var(name) => {
                out.insert(name);
            }
            Pattern::Leaf(_) => {}
            Pattern::Node { children, .. } => {
                for child in children {
                    child.variables(out);
                }
            }
        }
    }
}

/// Variable bindings produced by a successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
    vars: FxHashMap<String, TreeNode>,
}

impl Bindings {
    /// Subtree bound to `name` (including the sigil, e.g. `"$n"`).
    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.vars.get(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Bind `name`, or check that an existing binding is structurally equal.
    fn bind(&mut self, name: &str, value: &TreeNode) -> bool {
        match self.vars.get(name) {
            Some(existing) => existing == value,
            None => {
                self.vars.insert(name.to_string(), value.clone());
                true
            }
        }
    }
}

/// Where a rule looks for its pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// The pattern must match the entire tree handed to the rule.
    #[default]
    Whole,
    /// Search top-down for matching subtrees and rewrite each one found.
    Anywhere,
}

/// A pattern -> replacement rewrite over tagged trees.
///
/// Both sides use the bracketed tree syntax; leaves starting with `$` are
/// variables. Matching is structural and total: same label, same arity,
/// children in order, no backtracking.
#[derive(Debug, Clone)]
pub struct TransformRule {
    name: Option<String>,
    scope: Scope,
    pattern_text: String,
    replacement_text: String,
    pattern: Pattern,
    replacement: Pattern,
}

impl TransformRule {
    pub fn new(pattern: &str, replacement: &str) -> Result<TransformRule, RuleError> {
        let pattern_tag = tree::parse(pattern, true).map_err(RuleError::Pattern)?;
        let replacement_tag = tree::parse(replacement, true).map_err(RuleError::Replacement)?;

        let compiled_pattern = Pattern::compile_tag(&pattern_tag);
        let compiled_replacement = Pattern::compile_tag(&replacement_tag);

        let mut bound = FxHashSet::default();
        compiled_pattern.variables(&mut bound);
        let mut used = FxHashSet::default();
        compiled_replacement.variables(&mut used);
        if let Some(unbound) = used.difference(&bound).min() {
            return Err(RuleError::UnboundVariable(unbound.to_string()));
        }

        Ok(TransformRule {
            name: None,
            scope: Scope::Whole,
            pattern_text: pattern.to_string(),
            replacement_text: replacement.to_string(),
            pattern: compiled_pattern,
            replacement: compiled_replacement,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn pattern_text(&self) -> &str {
        &self.pattern_text
    }

    pub fn replacement_text(&self) -> &str {
        &self.replacement_text
    }

    /// Unify the pattern against the whole of `source`.
    pub fn matches(&self, source: &Tag) -> Option<Bindings> {
        let mut bindings = Bindings::default();
        if match_tag(&self.pattern, source, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    /// Rewrite `source` if the pattern matches the whole tree; `None` means
    /// no match.
    pub fn rewrite(&self, source: &Tag) -> Option<Tag> {
        let bindings = self.matches(source)?;
        Some(instantiate_tag(&self.replacement, &bindings))
    }

    /// Rewrite `source` according to the rule's scope. A tree that does not
    /// match comes back unchanged.
    pub fn apply(&self, source: &Tag) -> Tag {
        match self.scope {
            Scope::Whole => self.rewrite(source).unwrap_or_else(|| source.clone()),
            Scope::Anywhere => self.apply_anywhere(source),
        }
    }

    /// Depth-first search for matching subtrees. A node that matches is
    /// replaced and its replacement is not searched again; otherwise the
    /// search descends into its children.
    pub fn apply_anywhere(&self, source: &Tag) -> Tag {
        if let Some(rewritten) = self.rewrite(source) {
            return rewritten;
        }
        let children = source
            .children
            .iter()
            .map(|child| match child {
                TreeNode::Leaf(_) => child.clone(),
                TreeNode::Node(tag) => TreeNode::Node(self.apply_anywhere(tag)),
            })
            .collect();
        Tag::new(source.label.clone(), children)
    }
}

fn match_tag(pattern: &Pattern, source: &Tag, bindings: &mut Bindings) -> bool {
    match pattern {
        Pattern::Node { label, children } => {
            *label == source.label
                && children.len() == source.children.len()
                && children
                    .iter()
                    .zip(&source.children)
                    .all(|(p, s)| match_node(p, s, bindings))
        }
        // Roots are always nodes.
        _ => false,
    }
}

fn match_node(pattern: &Pattern, source: &TreeNode, bindings: &mut Bindings) -> bool {
    match (pattern, source) {
        (Pattern::Var(name), _) => bindings.bind(name, source),
        (Pattern::Leaf(expected), TreeNode::Leaf(token)) => expected == token,
        (Pattern::Node { .. }, TreeNode::Node(tag)) => match_tag(pattern, tag, bindings),
        _ => false,
    }
}

fn instantiate_tag(template: &Pattern, bindings: &Bindings) -> Tag {
    match instantiate(template, bindings) {
        TreeNode::Node(tag) => tag,
        // Replacement roots are parsed as nodes, never leaves.
        TreeNode::Leaf(token) => Tag::new(token, Vec::new()),
    }
}

fn instantiate(template: &Pattern, bindings: &Bindings) -> TreeNode {
    match template {
        // Unbound variables are rejected when the rule is built.
        Pattern::Var(name) => bindings
            .get(name)
            .cloned()
            .unwrap_or_else(|| TreeNode::Leaf(name.clone())),
        Pattern::Leaf(token) => TreeNode::Leaf(token.clone()),
        Pattern::Node { label, children } => TreeNode::node(
            label.clone(),
            children.iter().map(|c| instantiate(c, bindings)).collect(),
        ),
    }
}

/// A rule as written in a RON rule file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "Rule")]
pub struct RuleSpec {
    #[serde(default)]
    pub name: Option<String>,
    pub pattern: String,
    pub replacement: String,
    #[serde(default)]
    pub scope: Scope,
}

impl RuleSpec {
    pub fn compile(&self) -> Result<TransformRule, RuleError> {
        let rule = TransformRule::new(&self.pattern, &self.replacement).map_err(|e| {
            match &self.name {
                Some(name) => RuleError::Named {
                    name: name.clone(),
                    source: Box::new(e),
                },
                None => e,
            }
        })?;
        let rule = rule.with_scope(self.scope);
        Ok(match &self.name {
            Some(name) => rule.named(name.clone()),
            None => rule,
        })
    }
}

/// An ordered pipeline of transform rules. Each rule runs exactly once,
/// consuming the previous rule's output.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    pub rules: Vec<TransformRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from `(pattern, replacement)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<RuleSet, RuleError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, replacement)| TransformRule::new(pattern, replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { rules })
    }

    pub fn from_specs(specs: &[RuleSpec]) -> Result<RuleSet, RuleError> {
        let rules = specs
            .iter()
            .map(RuleSpec::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { rules })
    }

    /// Load a rule pipeline from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<RuleSet, RuleError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a rule pipeline from a RON list of `Rule(...)` entries.
    pub fn parse_ron(input: &str) -> Result<RuleSet, RuleError> {
        let specs: Vec<RuleSpec> = ron::from_str(input)?;
        Self::from_specs(&specs)
    }

    pub fn push(&mut self, rule: TransformRule) {
        self.rules.push(rule);
    }

    /// Append another pipeline's rules after this one's.
    pub fn merge(&mut self, other: RuleSet) {
        self.rules.extend(other.rules);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule once, in order.
    pub fn apply(&self, source: &Tag) -> Tag {
        let mut current = source.clone();
        for (index, rule) in self.rules.iter().enumerate() {
            let next = rule.apply(&current);
            tracing::debug!(
                rule = rule.name().unwrap_or(rule.pattern_text()),
                index,
                fired = next != current,
                "applied transform rule"
            );
            current = next;
        }
        current
    }
}
