//! # Error Handling
//!
//! Error types for merge-diff runs. Every failure a run can surface is a
//! [`DiffError`]; failures raised by collaborators (sources, comparators,
//! extractors) travel inside [`DiffError::Upstream`] together with the stage
//! where they happened and an [`ErrorContext`] describing the run at that point.
//!
//! ## Taxonomy
//!
//! - **AlreadyComparing**: `compare` was invoked on an instance that already ran
//! - **InvalidSourceShape**: a type-erased source held neither supported shape
//! - **InvalidExtraction**: an extractor was handed neither a left nor a right value
//! - **Upstream**: a pull, comparison or extraction failed
//!
//! Propagation is fail-fast. The first upstream failure rejects the run and no
//! further pulls are issued; records already delivered to progress observers
//! are the only partial output.
//!
//! ## Example
//!
//! ```rust
//! use mergediff::error::{DiffError, ErrorContext, FailureStage};
//! use mergediff::source::Side;
//!
//! let error = DiffError::upstream(
//!   FailureStage::Pull(Side::Left),
//!   ErrorContext::default(),
//!   Box::new(std::io::Error::other("cursor closed")),
//! );
//! assert!(error.is_upstream());
//! ```

use crate::source::Side;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Boxed error carried out of sources, comparators and extractors.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Errors produced while configuring or running a merge diff.
#[derive(Debug, Error)]
pub enum DiffError {
  /// The instance is single-use and `compare` was already invoked on it.
  #[error("{component} already ran a compare; merge diff instances are single-use")]
  AlreadyComparing {
    /// The engine that rejected the call.
    component: ComponentInfo,
  },
  /// A type-erased source held neither a pull closure nor a pull object.
  #[error("invalid {side} source: expected a pull closure or a pull object")]
  InvalidSourceShape {
    /// Which slot the source was supplied for.
    side: Side,
  },
  /// An extractor was invoked without any value.
  #[error("extractor invoked with neither a left nor a right value")]
  InvalidExtraction,
  /// A source, comparator or extractor failed.
  #[error("upstream failure during {stage} in {}: {source}", .context.component)]
  Upstream {
    /// Where in the merge step the failure happened.
    stage: FailureStage,
    /// State of the run when the failure happened.
    context: ErrorContext,
    /// The original failure.
    #[source]
    source: BoxError,
  },
}

impl DiffError {
  /// Wraps a collaborator failure.
  pub fn upstream(stage: FailureStage, context: ErrorContext, source: BoxError) -> Self {
    Self::Upstream {
      stage,
      context,
      source,
    }
  }

  /// Like [`DiffError::upstream`], but passes a boxed `DiffError` through unchanged
  /// so that e.g. [`DiffError::InvalidExtraction`] raised by an extractor keeps its kind.
  pub fn from_upstream(stage: FailureStage, context: ErrorContext, source: BoxError) -> Self {
    match source.downcast::<DiffError>() {
      Ok(inner) => *inner,
      Err(source) => Self::upstream(stage, context, source),
    }
  }

  /// Returns `true` for [`DiffError::Upstream`].
  pub fn is_upstream(&self) -> bool {
    matches!(self, Self::Upstream { .. })
  }

  /// The failure stage, for upstream failures.
  pub fn stage(&self) -> Option<FailureStage> {
    match self {
      Self::Upstream { stage, .. } => Some(*stage),
      _ => None,
    }
  }

  /// The run context, for upstream failures.
  pub fn context(&self) -> Option<&ErrorContext> {
    match self {
      Self::Upstream { context, .. } => Some(context),
      _ => None,
    }
  }
}

/// The part of a merge step in which an upstream failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
  /// Pulling the next element from one side.
  Pull(Side),
  /// Running the comparator.
  Compare,
  /// Running the extractor.
  Extract,
}

impl fmt::Display for FailureStage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FailureStage::Pull(side) => write!(f, "{} pull", side),
      FailureStage::Compare => write!(f, "compare"),
      FailureStage::Extract => write!(f, "extract"),
    }
  }
}

/// Context information about when and where an upstream failure occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorContext {
  /// When the failure was observed.
  pub timestamp: chrono::DateTime<chrono::Utc>,
  /// The engine that observed it.
  pub component: ComponentInfo,
  /// Number of records accumulated before the failure.
  pub emitted: usize,
}

impl ErrorContext {
  /// Creates a context stamped with the current time.
  pub fn new(component: ComponentInfo, emitted: usize) -> Self {
    Self {
      timestamp: chrono::Utc::now(),
      component,
      emitted,
    }
  }
}

impl Default for ErrorContext {
  fn default() -> Self {
    Self::new(ComponentInfo::default(), 0)
  }
}

/// Identifying information about an engine, used in logs and errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentInfo {
  /// The configured name of the component.
  pub name: String,
  /// The Rust type name of the component.
  pub type_name: String,
}

impl Default for ComponentInfo {
  fn default() -> Self {
    Self {
      name: "default".to_string(),
      type_name: "default".to_string(),
    }
  }
}

impl ComponentInfo {
  /// Creates a new `ComponentInfo` with the given name and type name.
  pub fn new(name: String, type_name: String) -> Self {
    Self { name, type_name }
  }
}

impl fmt::Display for ComponentInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.name, self.type_name)
  }
}

/// A simple error type that wraps a string message.
///
/// Handy for sources and comparators that fail with a plain message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringError(pub String);

impl fmt::Display for StringError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl Error for StringError {}

impl From<&str> for StringError {
  fn from(message: &str) -> Self {
    Self(message.to_string())
  }
}

impl From<String> for StringError {
  fn from(message: String) -> Self {
    Self(message)
  }
}
