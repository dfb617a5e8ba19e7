//! `{{name}}` placeholder substitution.
//!
//! The contract is small and explicit:
//!
//! - Every occurrence of `{{name}}` is replaced when `name` is a key of the
//!   [`Variables`] set, in any order and any number of times.
//! - A key whose value is absent or empty substitutes the empty string.
//! - A placeholder whose name is not a key is left verbatim.
//! - Substituted values are inserted as-is and never re-scanned.

/// An ordered set of template variables.
///
/// A variable can be *declared* without a value: it is then recognized by
/// [`format`] and renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    entries: Vec<(String, Option<String>)>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set where every name is recognized but unset.
    pub fn declared(names: &[&str]) -> Self {
        let mut vars = Self::new();
        for name in names {
            vars.declare(name);
        }
        vars
    }

    /// Builder form of [`Variables::set`].
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a value, replacing any previous value for `name`.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.put(name, Some(value.into()));
    }

    /// Set an optional value. `None` still marks the name as recognized.
    pub fn set_opt(&mut self, name: &str, value: Option<String>) {
        self.put(name, value);
    }

    /// Recognize `name` without giving it a value. Existing values are kept.
    pub fn declare(&mut self, name: &str) {
        if !self.contains(name) {
            self.entries.push((name.to_string(), None));
        }
    }

    /// Overlay `other` on top of `self`; values from `other` win.
    pub fn extend(&mut self, other: Variables) {
        for (name, value) in other.entries {
            match value {
                Some(v) => self.put(&name, Some(v)),
                None => self.declare(&name),
            }
        }
    }

    /// `None` when `name` is not recognized; `Some(None)` when recognized but unset.
    pub fn get(&self, name: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref())
    }

    /// Whether `name` has a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Some(v)) if !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Recognized names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn put(&mut self, name: &str, value: Option<String>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Variables
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut vars = Self::new();
        for (k, v) in iter {
            vars.set(k.as_ref(), v);
        }
        vars
    }
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A lexical piece of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    Text(&'t str),
    Placeholder(&'t str),
}

/// Split a template into literal text and `{{name}}` placeholders.
///
/// An unterminated `{{` is literal text. A name containing `{` is not a
/// placeholder: one brace is emitted as text and scanning resumes, so
/// `{{{a}}}` yields `{`, `{{a}}`, `}`.
pub fn tokenize(template: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut cursor = template;

    while let Some(start) = cursor.find(OPEN) {
        if start > 0 {
            tokens.push(Token::Text(&cursor[..start]));
        }
        let after = &cursor[start + OPEN.len()..];
        let Some(end) = after.find(CLOSE) else {
            tokens.push(Token::Text(&cursor[start..]));
            return tokens;
        };
        let name = &after[..end];
        if name.contains('{') {
            tokens.push(Token::Text(&cursor[start..start + 1]));
            cursor = &cursor[start + 1..];
            continue;
        }
        tokens.push(Token::Placeholder(name));
        cursor = &after[end + CLOSE.len()..];
    }

    if !cursor.is_empty() {
        tokens.push(Token::Text(cursor));
    }
    tokens
}

/// Distinct placeholder names in order of first appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for token in tokenize(template) {
        if let Token::Placeholder(name) = token {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Substitute `variables` into `template`.
pub fn format(template: &str, variables: &Variables) -> String {
    let mut out = String::with_capacity(template.len());
    for token in tokenize(template) {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Placeholder(name) => match variables.get(name) {
                Some(value) => out.push_str(value.unwrap_or_default()),
                None => {
                    out.push_str(OPEN);
                    out.push_str(name);
                    out.push_str(CLOSE);
                }
            },
        }
    }
    out
}
