use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Zero-based line number where a heading begins.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeadingLine(u32);

impl HeadingLine {
    /// Creates a new `HeadingLine`
    #[must_use]
    pub fn new(line: u32) -> Self {
        Self(line)
    }

    /// Returns the underlying line number
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeadingLineError {
    #[error("heading line must be a non-negative integer: {raw:?}")]
    Invalid { raw: String },
}

impl From<u32> for HeadingLine {
    fn from(line: u32) -> Self {
        Self(line)
    }
}

impl FromStr for HeadingLine {
    type Err = HeadingLineError;

    /// Only the canonical decimal form is accepted, so `"012"` or `"+1"` never
    /// alias an existing line key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HeadingLineError::Invalid { raw: s.to_owned() };
        let line = s.parse::<u32>().map_err(|_| invalid())?;
        if line.to_string() != s {
            return Err(invalid());
        }
        Ok(Self(line))
    }
}

impl fmt::Debug for HeadingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeadingLine({})", self.0)
    }
}

impl fmt::Display for HeadingLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
