//! Diff records produced by the default extractor.
//!
//! A [`DiffRecord`] tags an element with its [`Provenance`]: only in the left
//! source, only in the right source, or in both. Records serialize with lower-case
//! tags, e.g. `{"provenance":"both","left":3,"right":3}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a record's element was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
  /// Only in the left source.
  Left,
  /// Only in the right source.
  Right,
  /// In both sources.
  Both,
}

impl fmt::Display for Provenance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Provenance::Left => write!(f, "left"),
      Provenance::Right => write!(f, "right"),
      Provenance::Both => write!(f, "both"),
    }
  }
}

/// One classified element of a merge diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffRecord<T> {
  /// Which source(s) the element came from.
  pub provenance: Provenance,
  /// The left value, for `left` and `both` records.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub left: Option<T>,
  /// The right value, for `right` and `both` records.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub right: Option<T>,
}

impl<T> DiffRecord<T> {
  /// An element only the left source has.
  pub fn left(value: T) -> Self {
    Self {
      provenance: Provenance::Left,
      left: Some(value),
      right: None,
    }
  }

  /// An element only the right source has.
  pub fn right(value: T) -> Self {
    Self {
      provenance: Provenance::Right,
      left: None,
      right: Some(value),
    }
  }

  /// An element both sources have.
  pub fn both(left: T, right: T) -> Self {
    Self {
      provenance: Provenance::Both,
      left: Some(left),
      right: Some(right),
    }
  }

  /// The representative value: the left one if present, otherwise the right one.
  pub fn value(&self) -> Option<&T> {
    self.left.as_ref().or(self.right.as_ref())
  }

  /// Consumes the record, returning its representative value.
  pub fn into_value(self) -> Option<T> {
    self.left.or(self.right)
  }

  /// `(provenance, value)` pair, handy for assertions and logs.
  pub fn as_pair(&self) -> Option<(Provenance, &T)> {
    self.value().map(|value| (self.provenance, value))
  }
}

/// Per-provenance counts over a list of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
  /// Number of `left` records.
  pub left: usize,
  /// Number of `right` records.
  pub right: usize,
  /// Number of `both` records.
  pub both: usize,
}

impl DiffStats {
  /// Counts `records`.
  pub fn from_records<T>(records: &[DiffRecord<T>]) -> Self {
    records.iter().fold(Self::default(), |mut stats, record| {
      match record.provenance {
        Provenance::Left => stats.left += 1,
        Provenance::Right => stats.right += 1,
        Provenance::Both => stats.both += 1,
      }
      stats
    })
  }

  /// Total number of records.
  pub fn total(&self) -> usize {
    self.left + self.right + self.both
  }

  /// `true` when every element was found on both sides.
  pub fn is_identical(&self) -> bool {
    self.left == 0 && self.right == 0
  }
}

impl fmt::Display for DiffStats {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} left, {} right, {} both",
      self.left, self.right, self.both
    )
  }
}
