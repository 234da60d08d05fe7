//! Path module for multimodel
//!
//! This module defines the addressing scheme of the global store:
//! subscripts, paths made of subscripts, and global references such as
//! `^AIRPORT("BOS","AUS")`.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;
use serde::{Serialize, Deserialize};

/// Errors that can occur when working with paths
#[derive(Error, Debug, PartialEq)]
pub enum PathError {
    #[error("Invalid path format: {0}")]
    InvalidFormat(String),
    #[error("Invalid global name: {0}")]
    InvalidGlobalName(String),
    #[error("Empty path")]
    EmptyPath,
}

/// A single key segment of a path
///
/// Subscripts collate like the vendor's globals: canonical integers sort
/// numerically and before every other string, other strings sort by bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscript(String);

impl Subscript {
    /// Create a new subscript
    pub fn new<S: Into<String>>(subscript: S) -> Self {
        Subscript(subscript.into())
    }

    /// Get the subscript as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the integer value if this subscript is a canonical integer
    pub fn as_number(&self) -> Option<i64> {
        let digits = self.0.strip_prefix('-').unwrap_or(&self.0);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // "007" and "-0" are plain strings, not numbers
        if digits.len() > 1 && digits.starts_with('0') {
            return None;
        }
        if digits.len() != self.0.len() && digits == "0" {
            return None;
        }
        self.0.parse().ok()
    }

    /// Check if this subscript collates as a number
    pub fn is_numeric(&self) -> bool {
        self.as_number().is_some()
    }
}

impl Ord for Subscript {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Subscript {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for Subscript {
    fn from(s: &str) -> Self {
        Subscript(s.to_string())
    }
}

impl From<String> for Subscript {
    fn from(s: String) -> Self {
        Subscript(s)
    }
}

impl From<&String> for Subscript {
    fn from(s: &String) -> Self {
        Subscript(s.clone())
    }
}

impl From<u64> for Subscript {
    fn from(n: u64) -> Self {
        Subscript(n.to_string())
    }
}

/// Numbers are written bare, everything else double-quoted with `""` escapes
impl fmt::Display for Subscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_numeric() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "\"{}\"", self.0.replace('"', "\"\""))
        }
    }
}

/// A path inside a global (e.g. `("BOS","AUS","AA150")`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    subscripts: Vec<Subscript>,
}

impl Path {
    /// Create a new empty path
    pub fn new() -> Self {
        Path { subscripts: Vec::new() }
    }

    /// Create a path from a vector of subscripts
    pub fn from_subscripts(subscripts: Vec<Subscript>) -> Self {
        Path { subscripts }
    }

    /// Add a subscript to the path
    pub fn push<S: Into<Subscript>>(&mut self, subscript: S) {
        self.subscripts.push(subscript.into());
    }

    /// Return a new path extended by one subscript
    pub fn child<S: Into<Subscript>>(&self, subscript: S) -> Path {
        let mut child = self.clone();
        child.push(subscript);
        child
    }

    /// Get the number of subscripts in the path
    pub fn len(&self) -> usize {
        self.subscripts.len()
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.subscripts.is_empty()
    }

    /// Get all subscripts in the path
    pub fn subscripts(&self) -> &[Subscript] {
        &self.subscripts
    }

    /// Get a specific subscript by index
    pub fn subscript(&self, index: usize) -> Option<&Subscript> {
        self.subscripts.get(index)
    }

    /// Get the last subscript
    pub fn last(&self) -> Option<&Subscript> {
        self.subscripts.last()
    }

    /// Check if this path starts with the given prefix path
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.subscripts.starts_with(&prefix.subscripts)
    }

    /// Check if `other` lies strictly beneath this path
    pub fn is_strict_prefix_of(&self, other: &Path) -> bool {
        other.len() > self.len() && other.starts_with(self)
    }
}

impl<S: Into<Subscript>, const N: usize> From<[S; N]> for Path {
    fn from(subscripts: [S; N]) -> Self {
        subscripts.into_iter().collect()
    }
}

impl<S: Into<Subscript>> From<Vec<S>> for Path {
    fn from(subscripts: Vec<S>) -> Self {
        subscripts.into_iter().collect()
    }
}

impl<S: Into<Subscript>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Path { subscripts: iter.into_iter().map(Into::into).collect() }
    }
}

/// Parse `("BOS","AUS")` (parentheses optional) into a Path
impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);

        if inner.trim().is_empty() {
            return Err(PathError::EmptyPath);
        }

        Ok(Path { subscripts: parse_subscripts(inner)? })
    }
}

/// Format a Path as a parenthesised subscript list
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.subscripts
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(",");

        write!(f, "({})", list)
    }
}

/// A path qualified by the global it lives in (e.g. `^AIRPORT("BOS","AUS")`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalRef {
    pub name: String,
    pub path: Path,
}

impl GlobalRef {
    /// Create a reference, validating the global name
    pub fn new<S: Into<String>>(name: S, path: Path) -> Result<Self, PathError> {
        let name = name.into();
        validate_global_name(&name)?;
        Ok(GlobalRef { name, path })
    }
}

impl FromStr for GlobalRef {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let body = s.strip_prefix('^').unwrap_or(s);

        let (name, path) = match body.find('(') {
            Some(open) => {
                let list = body[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| PathError::InvalidFormat(format!("missing ')' in {}", s)))?;
                if list.trim().is_empty() {
                    return Err(PathError::EmptyPath);
                }
                (&body[..open], Path::from_subscripts(parse_subscripts(list)?))
            }
            None => (body, Path::new()),
        };

        GlobalRef::new(name, path)
    }
}

impl fmt::Display for GlobalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "^{}", self.name)
        } else {
            write!(f, "^{}{}", self.name, self.path)
        }
    }
}

/// Check that a global name is made of `.`-separated alphanumeric words
/// each starting with a letter
pub fn validate_global_name(name: &str) -> Result<(), PathError> {
    let valid = !name.is_empty()
        && name.split('.').all(|word| {
            let mut chars = word.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric())
        });

    if valid {
        Ok(())
    } else {
        Err(PathError::InvalidGlobalName(name.to_string()))
    }
}

/// Parse a comma-separated list of quoted strings and canonical numbers
fn parse_subscripts(input: &str) -> Result<Vec<Subscript>, PathError> {
    let mut subscripts = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        skip_whitespace(&mut chars);

        let subscript = match chars.peek() {
            Some('"') => {
                chars.next();
                parse_quoted(&mut chars)?
            }
            Some(_) => {
                let mut raw = String::new();
                while let Some(&c) = chars.peek() {
                    if c == ',' || c.is_whitespace() {
                        break;
                    }
                    raw.push(c);
                    chars.next();
                }
                let subscript = Subscript(raw);
                if !subscript.is_numeric() {
                    return Err(PathError::InvalidFormat(format!(
                        "unquoted subscript must be a canonical number: {}",
                        subscript.0
                    )));
                }
                subscript
            }
            None => return Err(PathError::InvalidFormat("missing subscript".to_string())),
        };
        subscripts.push(subscript);

        skip_whitespace(&mut chars);
        match chars.next() {
            Some(',') => continue,
            None => break,
            Some(c) => {
                return Err(PathError::InvalidFormat(format!("unexpected character '{}'", c)));
            }
        }
    }

    Ok(subscripts)
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>) -> Result<Subscript, PathError> {
    let mut value = String::new();
    loop {
        match chars.next() {
            Some('"') if chars.peek() == Some(&'"') => {
                chars.next();
                value.push('"');
            }
            Some('"') => return Ok(Subscript(value)),
            Some(c) => value.push(c),
            None => {
                return Err(PathError::InvalidFormat("unterminated string subscript".to_string()));
            }
        }
    }
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().map_or(false, |c| c.is_whitespace()) {
        chars.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_ref_parsing() {
        let global: GlobalRef = "^AIRPORT(\"BOS\",\"AUS\",\"AA150\")".parse().unwrap();
        assert_eq!(global.name, "AIRPORT");
        assert_eq!(global.path.len(), 3);
        assert_eq!(global.path.subscript(0).unwrap().as_str(), "BOS");
        assert_eq!(global.path.subscript(2).unwrap().as_str(), "AA150");
    }

    #[test]
    fn test_global_ref_formatting() {
        let global = GlobalRef::new("AIRPORT", Path::from(["BOS", "AUS"])).unwrap();
        assert_eq!(global.to_string(), "^AIRPORT(\"BOS\",\"AUS\")");

        let bare = GlobalRef::new("Demo.Airport", Path::new()).unwrap();
        assert_eq!(bare.to_string(), "^Demo.Airport");
    }

    #[test]
    fn test_numeric_and_escaped_subscripts() {
        let global: GlobalRef = "^Demo.Airport(3, \"say \"\"hi\"\"\")".parse().unwrap();
        assert!(global.path.subscript(0).unwrap().is_numeric());
        assert_eq!(global.path.subscript(1).unwrap().as_str(), "say \"hi\"");
        assert_eq!(global.to_string(), "^Demo.Airport(3,\"say \"\"hi\"\"\")");

        let reparsed: GlobalRef = global.to_string().parse().unwrap();
        assert_eq!(reparsed, global);
    }

    #[test]
    fn test_invalid_references() {
        assert!(matches!("^AIRPORT(BOS)".parse::<GlobalRef>(), Err(PathError::InvalidFormat(_))));
        assert!(matches!("^AIRPORT(\"BOS\"".parse::<GlobalRef>(), Err(PathError::InvalidFormat(_))));
        assert_eq!("^AIRPORT()".parse::<GlobalRef>(), Err(PathError::EmptyPath));
        assert!(matches!("^1AIRPORT".parse::<GlobalRef>(), Err(PathError::InvalidGlobalName(_))));
        assert!(matches!("^Demo..Airport".parse::<GlobalRef>(), Err(PathError::InvalidGlobalName(_))));
    }

    #[test]
    fn test_path_parsing() {
        let path: Path = "(\"BOS\",\"AUS\")".parse().unwrap();
        assert_eq!(path, Path::from(["BOS", "AUS"]));
        assert_eq!(path.to_string(), "(\"BOS\",\"AUS\")");
        assert_eq!("()".parse::<Path>(), Err(PathError::EmptyPath));
    }

    #[test]
    fn test_collation_order() {
        let mut subscripts: Vec<Subscript> = ["b", "10", "A", "2", "-1", "007", "a"]
            .into_iter()
            .map(Subscript::from)
            .collect();
        subscripts.sort();

        let order: Vec<&str> = subscripts.iter().map(|s| s.as_str()).collect();
        assert_eq!(order, vec!["-1", "2", "10", "007", "A", "a", "b"]);
    }

    #[test]
    fn test_starts_with() {
        let full = Path::from(["BOS", "AUS", "AA150"]);
        let prefix = Path::from(["BOS", "AUS"]);

        assert!(full.starts_with(&prefix));
        assert!(prefix.starts_with(&prefix));
        assert!(prefix.is_strict_prefix_of(&full));
        assert!(!prefix.is_strict_prefix_of(&prefix));
        assert!(!Path::from(["BOS", "AU"]).is_strict_prefix_of(&full));
    }
}
