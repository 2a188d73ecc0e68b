//! Page identifiers.
//!
//! A [`PageName`] is interpolated verbatim into file-system paths (it is the
//! page's directory name), so every externally supplied identifier must pass
//! [`is_valid_page_name`] before it reaches storage. The newtype can only be
//! constructed through that check.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Shortest allowed page name, in characters.
pub const MIN_PAGE_NAME_LEN: usize = 3;

/// Longest allowed page name, in characters.
pub const MAX_PAGE_NAME_LEN: usize = 20;

/// Returns whether `candidate` is acceptable as a page name.
///
/// Page names must start with a letter, must contain only letters and
/// digits, must not be entirely capital letters, and must have at least three
/// characters and at most twenty. Only ASCII letters and digits count.
pub fn is_valid_page_name(candidate: &str) -> bool {
    if !(MIN_PAGE_NAME_LEN..=MAX_PAGE_NAME_LEN).contains(&candidate.len()) {
        return false;
    }
    if !candidate.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return false;
    }
    if !candidate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    !candidate.chars().all(|c| c.is_ascii_uppercase())
}

/// A validated page identifier.
///
/// Maps 1:1 to a directory under the wiki root. Ordering is byte-wise, which
/// for ASCII alphanumerics matches the sorted page listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageName(String);

impl PageName {
    /// Validates `candidate` and wraps it.
    pub fn parse(candidate: impl Into<String>) -> Result<Self, CoreError> {
        let candidate = candidate.into();
        if is_valid_page_name(&candidate) {
            Ok(PageName(candidate))
        } else {
            Err(CoreError::InvalidPageName { name: candidate })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PageName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageName::parse(s)
    }
}

impl TryFrom<String> for PageName {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PageName::parse(value)
    }
}

impl From<PageName> for String {
    fn from(name: PageName) -> Self {
        name.0
    }
}
