//! Key Module
//!
//! Hierarchical keys made of opaque string segments.
//!
//! ## Responsibilities
//! - Represent a key as an ordered sequence of segments
//! - Segment-wise ordering and prefix matching
//! - Order-preserving byte encoding for byte-keyed backends (see [`codec`])
//!
//! ## Ordering
//! Keys compare segment by segment, each segment byte-wise. When one key is a
//! prefix of the other, the shorter key sorts first:
//! ```text
//! [A]  <  [A, B]  <  [A, C]  <  [AB]
//! ```
//! Prefix matching never looks inside a segment: `[AB]` does not extend `[A]`.

pub mod codec;

use std::fmt;

use serde::{Deserialize, Serialize};

/// An ordered sequence of opaque string segments
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageKey(Vec<String>);

impl StorageKey {
    /// Create a key from any sequence of segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The key with zero segments. As a prefix it matches every key.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Borrow the segments
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Consume the key, returning its segments
    pub fn into_segments(self) -> Vec<String> {
        self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` equals `prefix` or extends it segment-wise
    pub fn starts_with(&self, prefix: &StorageKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// True when `self` extends `prefix` by at least one segment
    pub fn is_descendant_of(&self, prefix: &StorageKey) -> bool {
        self.len() > prefix.len() && self.starts_with(prefix)
    }

    /// Append a segment in place
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// A new key with `segment` appended
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut key = self.clone();
        key.push(segment);
        key
    }

    /// The last segment, if any
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}", segment)?;
        }
        f.write_str("]")
    }
}

impl From<Vec<String>> for StorageKey {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<&[&str]> for StorageKey {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for StorageKey {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl From<StorageKey> for Vec<String> {
    fn from(key: StorageKey) -> Self {
        key.0
    }
}
