//! # Comparators
//!
//! A comparator decides, for the pending left and right elements, which one comes
//! first. It must be deterministic and consistent with the order both sources are
//! sorted by; the engine does not check either property.
//!
//! - [`NaturalOrder`]: `Ord` of the element type (the default)
//! - [`FnComparator`]: a closure returning [`std::cmp::Ordering`]
//! - [`TryFnComparator`]: a fallible closure; its errors fail the run
//! - [`ByKey`]: compares a projected key, for structured records
//! - [`PartialOrder`]: `PartialOrd` types; incomparable pairs (NaN) fail the run

use crate::error::{BoxError, StringError};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// Tri-state outcome of a comparison, canonically `-1`, `0`, `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonResult {
  /// The left element sorts first.
  Less,
  /// Both elements have the same key.
  Equal,
  /// The right element sorts first.
  Greater,
}

impl ComparisonResult {
  /// Canonical integer form.
  pub fn as_i8(self) -> i8 {
    match self {
      Self::Less => -1,
      Self::Equal => 0,
      Self::Greater => 1,
    }
  }

  /// Reads the sign of `value`, the way C-style comparators report order.
  pub fn from_i8(value: i8) -> Self {
    value.cmp(&0).into()
  }

  /// Swaps `Less` and `Greater`.
  #[must_use]
  pub fn reverse(self) -> Self {
    match self {
      Self::Less => Self::Greater,
      Self::Equal => Self::Equal,
      Self::Greater => Self::Less,
    }
  }
}

impl From<Ordering> for ComparisonResult {
  fn from(ordering: Ordering) -> Self {
    match ordering {
      Ordering::Less => Self::Less,
      Ordering::Equal => Self::Equal,
      Ordering::Greater => Self::Greater,
    }
  }
}

impl From<ComparisonResult> for Ordering {
  fn from(result: ComparisonResult) -> Self {
    match result {
      ComparisonResult::Less => Ordering::Less,
      ComparisonResult::Equal => Ordering::Equal,
      ComparisonResult::Greater => Ordering::Greater,
    }
  }
}

impl fmt::Display for ComparisonResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Less => write!(f, "less"),
      Self::Equal => write!(f, "equal"),
      Self::Greater => write!(f, "greater"),
    }
  }
}

/// Total order over the elements of both sources.
pub trait Comparator<T>: Send + Sync {
  /// Compares the pending left element with the pending right element.
  ///
  /// # Errors
  ///
  /// Any error aborts the merge diff as an upstream failure.
  fn compare(&self, left: &T, right: &T) -> Result<ComparisonResult, BoxError>;
}

/// Natural ordering via `Ord`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<T: Ord> Comparator<T> for NaturalOrder {
  fn compare(&self, left: &T, right: &T) -> Result<ComparisonResult, BoxError> {
    Ok(left.cmp(right).into())
  }
}

/// Ordering via `PartialOrd`, failing on pairs that do not compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartialOrder;

impl<T: PartialOrd + fmt::Debug> Comparator<T> for PartialOrder {
  fn compare(&self, left: &T, right: &T) -> Result<ComparisonResult, BoxError> {
    left.partial_cmp(right).map(Into::into).ok_or_else(|| {
      Box::new(StringError(format!(
        "{:?} and {:?} are not comparable",
        left, right
      ))) as BoxError
    })
  }
}

/// Comparator backed by an infallible closure.
///
/// # Example
///
/// ```rust
/// use mergediff::compare::{ComparisonResult, Comparator, FnComparator};
///
/// let descending = FnComparator::new(|a: &i32, b: &i32| b.cmp(a));
/// assert_eq!(descending.compare(&1, &2).unwrap(), ComparisonResult::Greater);
/// ```
pub struct FnComparator<F, T> {
  compare: F,
  _phantom: PhantomData<fn(&T, &T)>,
}

impl<F, T> FnComparator<F, T>
where
  F: Fn(&T, &T) -> Ordering + Send + Sync,
{
  /// Wraps `compare`.
  pub fn new(compare: F) -> Self {
    Self {
      compare,
      _phantom: PhantomData,
    }
  }
}

impl<F, T> Comparator<T> for FnComparator<F, T>
where
  F: Fn(&T, &T) -> Ordering + Send + Sync,
{
  fn compare(&self, left: &T, right: &T) -> Result<ComparisonResult, BoxError> {
    Ok((self.compare)(left, right).into())
  }
}

/// Comparator backed by a fallible closure.
pub struct TryFnComparator<F, T> {
  compare: F,
  _phantom: PhantomData<fn(&T, &T)>,
}

impl<F, T> TryFnComparator<F, T>
where
  F: Fn(&T, &T) -> Result<Ordering, BoxError> + Send + Sync,
{
  /// Wraps `compare`.
  pub fn new(compare: F) -> Self {
    Self {
      compare,
      _phantom: PhantomData,
    }
  }
}

impl<F, T> Comparator<T> for TryFnComparator<F, T>
where
  F: Fn(&T, &T) -> Result<Ordering, BoxError> + Send + Sync,
{
  fn compare(&self, left: &T, right: &T) -> Result<ComparisonResult, BoxError> {
    (self.compare)(left, right).map(Into::into)
  }
}

/// Compares elements by a projected key.
///
/// # Example
///
/// ```rust
/// use mergediff::compare::{ByKey, ComparisonResult, Comparator};
///
/// let by_id = ByKey::new(|row: &(u32, String)| row.0);
/// let left = (7, "a".to_string());
/// let right = (7, "b".to_string());
/// assert_eq!(by_id.compare(&left, &right).unwrap(), ComparisonResult::Equal);
/// ```
pub struct ByKey<F, T> {
  key: F,
  _phantom: PhantomData<fn(&T)>,
}

impl<F, T, K> ByKey<F, T>
where
  F: Fn(&T) -> K + Send + Sync,
  K: Ord,
{
  /// Compares by `key`.
  pub fn new(key: F) -> Self {
    Self {
      key,
      _phantom: PhantomData,
    }
  }
}

impl<F, T, K> Comparator<T> for ByKey<F, T>
where
  F: Fn(&T) -> K + Send + Sync,
  K: Ord,
{
  fn compare(&self, left: &T, right: &T) -> Result<ComparisonResult, BoxError> {
    Ok((self.key)(left).cmp(&(self.key)(right)).into())
  }
}
