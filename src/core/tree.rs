/// Tagged trees — bracketed sentence structure, parsing, and linearization.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Leading character reserved for pattern variables (`$n`, `$v2`).
pub const VARIABLE_SIGIL: char = '$';

/// Deepest node nesting the parser accepts.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty tree text")]
    Empty,
    #[error("expected '(' at offset {0}")]
    ExpectedOpen(usize),
    #[error("node at offset {0} has no label")]
    MissingLabel(usize),
    #[error("node '{label}' at offset {at} has no children")]
    EmptyNode { label: String, at: usize },
    #[error("unclosed '(' at offset {0}")]
    Unclosed(usize),
    #[error("unmatched ')' at offset {0}")]
    UnmatchedClose(usize),
    #[error("unexpected input after the root node at offset {0}")]
    TrailingInput(usize),
    #[error("invalid character {ch:?} at offset {at}")]
    InvalidChar { ch: char, at: usize },
    #[error("token '{token}' at offset {at} uses the reserved '$' sigil")]
    ReservedSigil { token: String, at: usize },
    #[error("nesting deeper than {max} nodes at offset {0}", max = MAX_DEPTH)]
    TooDeep(usize),
}

/// A child of a [`Tag`]: either a terminal token or a nested node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf(String),
    Node(Tag),
}

/// A labelled node with ordered children, e.g. `(NP (DET the) (N mage))`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub label: String,
    pub children: Vec<TreeNode>,
}

impl Tag {
    /// Build a node directly. Internal nodes always carry at least one
    /// child; `(X)` would not parse back.
    pub fn new(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        debug_assert!(!children.is_empty(), "a tag needs at least one child");
        Tag {
            label: label.into(),
            children,
        }
    }

    /// Parse a fully parenthesized tree such as
    /// `(S (VP (TV kill) (NP (DET the) (N mage))))`.
    ///
    /// Tokens are ASCII letters, digits and hyphens. Tokens carrying the
    /// `$` sigil are rejected; only transform rules may use them. Nesting
    /// beyond [`MAX_DEPTH`] is an error.
    pub fn from_text(source: &str) -> Result<Tag, ParseError> {
        parse(source, false)
    }

    /// Linearize the tree: terminal tokens in pre-order, joined by single
    /// spaces. Labels are structural only and never appear.
    pub fn clean(&self) -> String {
        self.leaves().collect::<Vec<_>>().join(" ")
    }

    /// Terminal tokens in left-to-right order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![self.children.iter()],
        }
    }

    /// Total number of nodes and leaves, including this node.
    pub fn size(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                TreeNode::Leaf(_) => 1,
                TreeNode::Node(tag) => tag.size(),
            })
            .sum::<usize>()
    }
}

impl TreeNode {
    pub fn leaf(token: impl Into<String>) -> Self {
        TreeNode::Leaf(token.into())
    }

    pub fn node(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        TreeNode::Node(Tag::new(label, children))
    }

    /// Linearized text of this child alone.
    pub fn clean(&self) -> String {
        match self {
            TreeNode::Leaf(token) => token.clone(),
            TreeNode::Node(tag) => tag.clean(),
        }
    }
}

/// Pre-order iterator over the terminal tokens of a [`Tag`].
pub struct Leaves<'a> {
    stack: Vec<std::slice::Iter<'a, TreeNode>>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                Some(TreeNode::Leaf(token)) => return Some(token),
                Some(TreeNode::Node(tag)) => self.stack.push(tag.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {}", child)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeNode::Leaf(token) => f.write_str(token),
            TreeNode::Node(tag) => fmt::Display::fmt(tag, f),
        }
    }
}

// ---------------------------------------------------------------------------
// Lexing and parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Lexeme<'a> {
    Open,
    Close,
    Word(&'a str),
}

#[derive(Debug, Clone)]
struct Token<'a> {
    lexeme: Lexeme<'a>,
    at: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}

fn tokenize(source: &str, allow_variables: bool) -> Result<Vec<Token<'_>>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(at, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '(' {
            chars.next();
            tokens.push(Token {
                lexeme: Lexeme::Open,
                at,
            });
        } else if c == ')' {
            chars.next();
            tokens.push(Token {
                lexeme: Lexeme::Close,
                at,
            });
        } else if is_word_char(c) || c == VARIABLE_SIGIL {
            chars.next();
            let mut end = at + c.len_utf8();
            while let Some(&(i, next)) = chars.peek() {
                if !is_word_char(next) {
                    break;
                }
                end = i + next.len_utf8();
                chars.next();
            }
            if let Some(&(_, VARIABLE_SIGIL)) = chars.peek() {
                // `a$b`, `$a$b`: the sigil may only open a token.
                while let Some(&(i, next)) = chars.peek() {
                    if !is_word_char(next) && next != VARIABLE_SIGIL {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                return Err(ParseError::ReservedSigil {
                    token: source[at..end].to_string(),
                    at,
                });
            }
            let word = &source[at..end];
            if word.starts_with(VARIABLE_SIGIL) && (!allow_variables || word.len() == 1) {
                return Err(ParseError::ReservedSigil {
                    token: word.to_string(),
                    at,
                });
            }
            tokens.push(Token {
                lexeme: Lexeme::Word(word),
                at,
            });
        } else {
            return Err(ParseError::InvalidChar { ch: c, at });
        }
    }

    Ok(tokens)
}

/// Shared entry point for plain trees and rule patterns.
///
/// With `allow_variables`, leaves of the form `$name` are accepted and kept
/// as ordinary leaf tokens; the transform module gives them meaning.
pub(crate) fn parse(source: &str, allow_variables: bool) -> Result<Tag, ParseError> {
    let tokens = tokenize(source, allow_variables)?;
    let first = tokens.first().ok_or(ParseError::Empty)?;
    if first.lexeme != Lexeme::Open {
        return Err(match first.lexeme {
            Lexeme::Close => ParseError::UnmatchedClose(first.at),
            _ => ParseError::ExpectedOpen(first.at),
        });
    }

    let mut pos = 0;
    let root = parse_tag(&tokens, &mut pos, 1)?;

    if let Some(extra) = tokens.get(pos) {
        return Err(match extra.lexeme {
            Lexeme::Close => ParseError::UnmatchedClose(extra.at),
            _ => ParseError::TrailingInput(extra.at),
        });
    }
    Ok(root)
}

/// Parse one `( label child* )` starting at `tokens[*pos]`, which must be `(`.
/// `depth` counts this node, the root being 1.
fn parse_tag(tokens: &[Token<'_>], pos: &mut usize, depth: usize) -> Result<Tag, ParseError> {
    let open_at = tokens[*pos].at;
    if depth > MAX_DEPTH {
        return Err(ParseError::TooDeep(open_at));
    }
    *pos += 1;

    let label = match tokens.get(*pos) {
        Some(Token {
            lexeme: Lexeme::Word(word),
            at,
        }) => {
            if word.starts_with(VARIABLE_SIGIL) {
                return Err(ParseError::ReservedSigil {
                    token: word.to_string(),
                    at: *at,
                });
            }
            *pos += 1;
            word.to_string()
        }
        Some(_) => return Err(ParseError::MissingLabel(open_at)),
        None => return Err(ParseError::Unclosed(open_at)),
    };

    let mut children = Vec::new();
    loop {
        match tokens.get(*pos) {
            Some(Token {
                lexeme: Lexeme::Close,
                ..
            }) => {
                *pos += 1;
                break;
            }
            Some(Token {
                lexeme: Lexeme::Open,
                ..
            }) => children.push(TreeNode::Node(parse_tag(tokens, pos, depth + 1)?)),
            Some(Token {
                lexeme: Lexeme::Word(word),
                ..
            }) => {
                children.push(TreeNode::Leaf(word.to_string()));
                *pos += 1;
            }
            None => return Err(ParseError::Unclosed(open_at)),
        }
    }

    if children.is_empty() {
        return Err(ParseError::EmptyNode { label, at: open_at });
    }
    Ok(Tag { label, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_nested_sentence() {
        let t = Tag::from_text("(S (VP (TV kill) (NP (DET the) (NP mage))))").unwrap();
        assert_eq!(
            t,
            Tag::new(
                "S",
                vec![TreeNode::node(
                    "VP",
                    vec![
                        TreeNode::node("TV", vec![TreeNode::leaf("kill")]),
                        TreeNode::node(
                            "NP",
                            vec![
                                TreeNode::node("DET", vec![TreeNode::leaf("the")]),
                                TreeNode::node("NP", vec![TreeNode::leaf("mage")]),
                            ]
                        ),
                    ]
                )]
            )
        );
    }

    #[test]
    fn display_writes_bracketed_form() {
        let src = "(S (VP (TV kill) (NP (DET the) (NP mage))))";
        let t = Tag::from_text(src).unwrap();
        assert_eq!(t.to_string(), src);
    }

    #[test]
    fn clean_drops_labels() {
        let t = Tag::from_text("(S (VP (TV kill) (NP (DET the) (NP mage))))").unwrap();
        assert_eq!(t.clean(), "kill the mage");
    }

    #[test]
    fn clean_mixes_leaves_and_nodes_in_order() {
        let t = Tag::from_text("(S did-Give (NP dog) to (NP (DET a) man))").unwrap();
        assert_eq!(t.clean(), "did-Give dog to a man");
    }

    #[test]
    fn whitespace_is_flexible() {
        let a = Tag::from_text("(S\n  (NP I)\t(VP am))").unwrap();
        let b = Tag::from_text("(S (NP I) (VP am))").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn hyphenated_tokens() {
        let t = Tag::from_text("(VP go-Kill)").unwrap();
        assert_eq!(t.children, vec![TreeNode::leaf("go-Kill")]);
    }

    #[test]
    fn leaf_and_single_child_node_differ() {
        let a = Tag::from_text("(S x)").unwrap();
        let b = Tag::from_text("(S (X x))").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.clean(), b.clean());
    }

    #[test]
    fn size_counts_nodes_and_leaves() {
        let t = Tag::from_text("(S (NP I) (VP am))").unwrap();
        assert_eq!(t.size(), 5);
    }

    #[test]
    fn empty_text_error() {
        assert_eq!(Tag::from_text(""), Err(ParseError::Empty));
        assert_eq!(Tag::from_text("   \n"), Err(ParseError::Empty));
    }

    #[test]
    fn bare_token_error() {
        assert_eq!(Tag::from_text("mage"), Err(ParseError::ExpectedOpen(0)));
    }

    #[test]
    fn unclosed_error() {
        assert_eq!(Tag::from_text("(S (NP I)"), Err(ParseError::Unclosed(0)));
    }

    #[test]
    fn extra_close_error() {
        assert_eq!(
            Tag::from_text("(S (NP I)))"),
            Err(ParseError::UnmatchedClose(10))
        );
        assert_eq!(Tag::from_text(")"), Err(ParseError::UnmatchedClose(0)));
    }

    #[test]
    fn label_without_children_error() {
        assert!(matches!(
            Tag::from_text("(S (NP) (VP am))"),
            Err(ParseError::EmptyNode { ref label, at: 3 }) if label == "NP"
        ));
    }

    #[test]
    fn missing_label_error() {
        assert_eq!(Tag::from_text("((NP I))"), Err(ParseError::MissingLabel(0)));
        assert_eq!(Tag::from_text("(S ())"), Err(ParseError::MissingLabel(3)));
    }

    #[test]
    fn trailing_input_error() {
        assert_eq!(
            Tag::from_text("(S a) (S b)"),
            Err(ParseError::TrailingInput(6))
        );
    }

    #[test]
    fn invalid_character_error() {
        assert_eq!(
            Tag::from_text("(S it's)"),
            Err(ParseError::InvalidChar { ch: '\'', at: 5 })
        );
    }

    #[test]
    fn sigil_rejected_in_plain_trees() {
        assert!(matches!(
            Tag::from_text("(S (NP $n))"),
            Err(ParseError::ReservedSigil { .. })
        ));
    }

    #[test]
    fn sigil_accepted_in_patterns() {
        let t = parse("(S (NP $n) $rest)", true).unwrap();
        assert_eq!(t.to_string(), "(S (NP $n) $rest)");
    }

    #[test]
    fn sigil_never_accepted_as_label() {
        assert!(matches!(
            parse("($x a)", true),
            Err(ParseError::ReservedSigil { .. })
        ));
    }

    #[test]
    fn lone_sigil_rejected() {
        assert!(matches!(
            parse("(S $)", true),
            Err(ParseError::ReservedSigil { .. })
        ));
    }

    #[test]
    fn sigil_inside_token_rejected() {
        for allow_variables in [false, true] {
            assert_eq!(
                parse("(S a$b)", allow_variables),
                Err(ParseError::ReservedSigil {
                    token: "a$b".to_string(),
                    at: 3
                })
            );
        }
        assert!(matches!(
            parse("(S $a$b c)", true),
            Err(ParseError::ReservedSigil { ref token, at: 3 }) if token == "$a$b"
        ));
    }

    fn nested(depth: usize) -> String {
        format!("{}x{}", "(A ".repeat(depth), ")".repeat(depth))
    }

    #[test]
    fn nesting_up_to_the_limit_parses() {
        let t = Tag::from_text(&nested(MAX_DEPTH)).unwrap();
        assert_eq!(t.clean(), "x");
        assert_eq!(t.size(), MAX_DEPTH + 1);
    }

    #[test]
    fn nesting_past_the_limit_is_an_error() {
        assert_eq!(
            Tag::from_text(&nested(MAX_DEPTH + 1)),
            Err(ParseError::TooDeep(3 * MAX_DEPTH))
        );
        assert!(matches!(
            Tag::from_text(&nested(200_000)),
            Err(ParseError::TooDeep(_))
        ));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "at least one child")]
    fn childless_tag_caught_in_debug_builds() {
        let _ = Tag::new("X", Vec::new());
    }

    #[test]
    fn non_ascii_tokens_rejected() {
        assert_eq!(
            Tag::from_text("(S café)"),
            Err(ParseError::InvalidChar { ch: 'é', at: 6 })
        );
    }

    #[test]
    fn serde_ron_round_trip() {
        let t = Tag::from_text("(S (NP I) (VP am (NP groot)))").unwrap();
        let serialized = ron::to_string(&t).unwrap();
        let back: Tag = ron::from_str(&serialized).unwrap();
        assert_eq!(back, t);
    }
}
