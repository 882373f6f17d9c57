//! CSS-like selector parsing and matching against a [`FakeSurface`].
//!
//! Supports:
//! - `"div"` - by tag
//! - `"#panel"` - by ID
//! - `".open"` - by class
//! - `"[data-testid='list']"` - by attribute
//! - `"div.panel.open"` - compound
//! - `"ul li"` / `"ul > li"` - descendant and child combinators
//! - `".a, .b"` - selector lists

use thiserror::Error;

use crate::surface::{FakeSurface, NodeId};

/// Parsed selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Match by tag name
    Type(String),
    /// Match by ID (e.g., `#my-id`)
    Id(String),
    /// Match by test ID (e.g., `[data-testid='foo']`)
    TestId(String),
    /// Match by class (e.g., `.my-class`)
    Class(String),
    /// Match by attribute (e.g., `[role='list']`)
    Attribute { name: String, value: String },
    /// All parts must match the same element (e.g., `div.panel`)
    Compound(Vec<Selector>),
    /// Descendant combinator (e.g., `ul li`)
    Descendant(Box<Selector>, Box<Selector>),
    /// Child combinator (e.g., `ul > li`)
    Child(Box<Selector>, Box<Selector>),
    /// Any of the alternatives (e.g., `.a, .b`)
    List(Vec<Selector>),
}

impl Selector {
    /// Parse a selector string.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector is invalid.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        SelectorParser::new(input).parse()
    }

    /// Check if this selector matches `node` in `tree`.
    #[must_use]
    pub fn matches(&self, tree: &FakeSurface, node: NodeId) -> bool {
        match self {
            Self::Type(tag) => tree.tag(node) == tag,
            Self::Id(id) => tree.element_id(node) == Some(id.as_str()),
            Self::TestId(id) => tree.attribute(node, "data-testid") == Some(id.as_str()),
            Self::Class(class) => tree.has_class(node, class),
            Self::Attribute { name, value } => tree.attribute(node, name) == Some(value.as_str()),
            Self::Compound(parts) => parts.iter().all(|p| p.matches(tree, node)),
            Self::Descendant(ancestor, sel) => {
                sel.matches(tree, node)
                    && tree
                        .ancestors(node)
                        .into_iter()
                        .any(|a| ancestor.matches(tree, a))
            }
            Self::Child(parent, sel) => {
                sel.matches(tree, node) && tree.parent(node).is_some_and(|p| parent.matches(tree, p))
            }
            Self::List(items) => items.iter().any(|s| s.matches(tree, node)),
        }
    }

    /// Simple selectors making up a compound, in source order.
    #[must_use]
    pub fn parts(&self) -> Vec<&Self> {
        match self {
            Self::Compound(parts) => parts.iter().collect(),
            other => vec![other],
        }
    }
}

/// Selector parser.
pub struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    /// Create a new parser.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse the selector.
    pub fn parse(&mut self) -> Result<Selector, SelectorError> {
        self.skip_whitespace();

        if self.input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut items = vec![self.parse_complex()?];
        while self.peek_char() == Some(',') {
            self.advance();
            self.skip_whitespace();
            items.push(self.parse_complex()?);
        }

        if items.len() == 1 {
            Ok(items.remove(0))
        } else {
            Ok(Selector::List(items))
        }
    }

    fn parse_complex(&mut self) -> Result<Selector, SelectorError> {
        let mut current = self.parse_compound()?;
        loop {
            let had_space = self.skip_whitespace();
            match self.peek_char() {
                None | Some(',') => return Ok(current),
                Some('>') => {
                    self.advance();
                    self.skip_whitespace();
                    let rhs = self.parse_compound()?;
                    current = Selector::Child(Box::new(current), Box::new(rhs));
                }
                Some(_) if had_space => {
                    let rhs = self.parse_compound()?;
                    current = Selector::Descendant(Box::new(current), Box::new(rhs));
                }
                Some(c) => return Err(SelectorError::UnexpectedChar(c)),
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Selector, SelectorError> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek_char() {
            let part = match c {
                '#' => self.parse_id()?,
                '.' => self.parse_class()?,
                '[' => self.parse_attribute()?,
                _ if c.is_alphabetic() && parts.is_empty() => self.parse_type()?,
                _ => break,
            };
            parts.push(part);
        }

        match parts.len() {
            0 => Err(self
                .peek_char()
                .map_or(SelectorError::Empty, SelectorError::UnexpectedChar)),
            1 => Ok(parts.remove(0)),
            _ => Ok(Selector::Compound(parts)),
        }
    }

    fn parse_id(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip '#'
        let id = self.read_identifier()?;
        Ok(Selector::Id(id))
    }

    fn parse_class(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip '.'
        let class = self.read_identifier()?;
        Ok(Selector::Class(class))
    }

    fn parse_type(&mut self) -> Result<Selector, SelectorError> {
        let name = self.read_identifier()?;
        Ok(Selector::Type(name))
    }

    fn parse_attribute(&mut self) -> Result<Selector, SelectorError> {
        self.advance(); // Skip '['

        let name = self.read_until_any(&['=', ']']);
        if name.is_empty() || self.peek_char() != Some('=') {
            return Err(SelectorError::InvalidAttribute);
        }

        self.advance(); // Skip '='

        let quote = self.peek_char();
        if quote == Some('\'') || quote == Some('"') {
            self.advance();
        }

        let value = self.read_until_any(&['\'', '"', ']']);

        if self.peek_char() == Some('\'') || self.peek_char() == Some('"') {
            self.advance();
        }

        if self.peek_char() != Some(']') {
            return Err(SelectorError::UnclosedAttribute);
        }
        self.advance();

        if name == "data-testid" {
            Ok(Selector::TestId(value))
        } else {
            Ok(Selector::Attribute { name, value })
        }
    }

    fn read_identifier(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance();
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(SelectorError::ExpectedIdentifier);
        }

        Ok(self.input[start..self.pos].to_string())
    }

    fn read_until_any(&mut self, stops: &[char]) -> String {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if stops.contains(&c) {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    /// Returns whether any whitespace was skipped.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
        self.pos > start
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }
}

/// Selector parsing error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Empty selector
    #[error("empty selector")]
    Empty,
    /// Unexpected character
    #[error("unexpected character: '{0}'")]
    UnexpectedChar(char),
    /// Expected identifier
    #[error("expected identifier")]
    ExpectedIdentifier,
    /// Invalid attribute syntax
    #[error("invalid attribute syntax")]
    InvalidAttribute,
    /// Unclosed attribute bracket
    #[error("unclosed attribute bracket")]
    UnclosedAttribute,
}
