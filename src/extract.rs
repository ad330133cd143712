//! # Extractors
//!
//! An extractor turns one merge step into an output record. The engine calls it
//! with the value(s) consumed in that step and the comparison outcome:
//!
//! | step                      | left      | right     | outcome   |
//! |---------------------------|-----------|-----------|-----------|
//! | keys equal                | `Some(a)` | `Some(b)` | `Equal`   |
//! | left sorts first          | `Some(a)` | `None`    | `Less`    |
//! | right sorts first         | `None`    | `Some(b)` | `Greater` |
//! | right exhausted           | `Some(a)` | `None`    | `Less`    |
//! | left exhausted            | `None`    | `Some(b)` | `Greater` |
//!
//! [`ProvenanceExtractor`] (the default) records presence only. Custom
//! extractors can compute structural deltas for the `both` case instead.

use crate::compare::ComparisonResult;
use crate::error::{BoxError, DiffError};
use crate::record::DiffRecord;
use std::marker::PhantomData;

/// Builds an output record from one merge step.
pub trait Extractor<T>: Send + Sync {
  /// The record type accumulated by the engine.
  type Record: Send + 'static;

  /// Classifies one merge step.
  ///
  /// # Errors
  ///
  /// Any error aborts the merge diff. Implementations should fail with
  /// [`DiffError::InvalidExtraction`] when both values are absent.
  fn extract(
    &self,
    left: Option<T>,
    right: Option<T>,
    outcome: ComparisonResult,
  ) -> Result<Self::Record, BoxError>;
}

/// Tags each step with its provenance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvenanceExtractor;

impl<T: Send + 'static> Extractor<T> for ProvenanceExtractor {
  type Record = DiffRecord<T>;

  fn extract(
    &self,
    left: Option<T>,
    right: Option<T>,
    _outcome: ComparisonResult,
  ) -> Result<DiffRecord<T>, BoxError> {
    match (left, right) {
      (Some(left), Some(right)) => Ok(DiffRecord::both(left, right)),
      (Some(left), None) => Ok(DiffRecord::left(left)),
      (None, Some(right)) => Ok(DiffRecord::right(right)),
      (None, None) => Err(Box::new(DiffError::InvalidExtraction)),
    }
  }
}

/// Extractor backed by a closure.
///
/// # Example
///
/// ```rust
/// use mergediff::compare::ComparisonResult;
/// use mergediff::extract::{Extractor, FnExtractor};
///
/// // Report the change in value for rows present on both sides.
/// let delta = FnExtractor::new(
///   |left: Option<i64>, right: Option<i64>, _outcome: ComparisonResult| {
///     Ok(right.unwrap_or(0) - left.unwrap_or(0))
///   },
/// );
/// assert_eq!(delta.extract(Some(3), Some(5), ComparisonResult::Equal).unwrap(), 2);
/// ```
pub struct FnExtractor<F, T> {
  extract: F,
  _phantom: PhantomData<fn(T)>,
}

impl<F, T, R> FnExtractor<F, T>
where
  F: Fn(Option<T>, Option<T>, ComparisonResult) -> Result<R, BoxError> + Send + Sync,
  R: Send + 'static,
{
  /// Wraps `extract`.
  pub fn new(extract: F) -> Self {
    Self {
      extract,
      _phantom: PhantomData,
    }
  }
}

impl<F, T, R> Extractor<T> for FnExtractor<F, T>
where
  F: Fn(Option<T>, Option<T>, ComparisonResult) -> Result<R, BoxError> + Send + Sync,
  R: Send + 'static,
{
  type Record = R;

  fn extract(
    &self,
    left: Option<T>,
    right: Option<T>,
    outcome: ComparisonResult,
  ) -> Result<R, BoxError> {
    (self.extract)(left, right, outcome)
  }
}
