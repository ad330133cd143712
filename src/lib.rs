//! # mergediff
//!
//! Synchronized merge-diff of two lazily produced, ordered sources.
//!
//! Given two sources that are each sorted under the same comparator (paginated
//! queries, file scans, remote cursors, streams), the engine advances both in
//! lockstep and classifies every element as only in the left source, only in the
//! right source, or in both. Results accumulate in merge order and progress is
//! reported after every record.
//!
//! ## Key Features
//!
//! - **Async sources**: closures answering with values or futures, async pull
//!   objects, or any `futures::Stream`
//! - **Pluggable ordering and records**: inject a [`Comparator`] and an [`Extractor`]
//! - **Progress**: callbacks or channel streams of the accumulated records
//! - **Single-flight**: each engine runs exactly once and fails fast
//!
//! ## Quick Start
//!
//! ```rust
//! use mergediff::{MergeDiff, Provenance, SourceHandle};
//!
//! # async fn example() -> Result<(), mergediff::DiffError> {
//! let engine = MergeDiff::new();
//! let records = engine
//!   .compare(
//!     SourceHandle::from_values(vec![1, 3, 5, 7]),
//!     SourceHandle::from_values(vec![3, 4, 5, 8]),
//!   )?
//!   .await?;
//!
//! assert_eq!(records.len(), 6);
//! assert_eq!(records[1].provenance, Provenance::Both);
//! # Ok(())
//! # }
//! ```

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Comparators and the tri-state comparison outcome.
pub mod compare;
/// Engine configuration.
pub mod config;
/// The merge engine and its task.
pub mod engine;
/// Error types.
pub mod error;
/// Extractors turning merge steps into records.
pub mod extract;
/// Progress observers and channels.
pub mod progress;
/// Provenance-tagged diff records.
pub mod record;
/// Source handles and the source adapter.
pub mod source;

pub use compare::{
  ByKey, Comparator, ComparisonResult, FnComparator, NaturalOrder, PartialOrder, TryFnComparator,
};
pub use config::DiffConfig;
pub use engine::{DiffTask, EngineState, MergeDiff, diff_streams, merge_diff};
pub use error::{BoxError, DiffError, FailureStage};
pub use extract::{Extractor, FnExtractor, ProvenanceExtractor};
pub use progress::{ProgressObserver, ProgressStream};
pub use record::{DiffRecord, DiffStats, Provenance};
pub use source::{Pull, Pulled, Side, SourceAdapter, SourceHandle};

#[cfg(test)]
mod error_test;
#[cfg(test)]
mod extract_test;
#[cfg(test)]
mod source_test;
