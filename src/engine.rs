//! # Merge Engine
//!
//! [`MergeDiff`] advances two ordered sources in lockstep and classifies every
//! element as only-left, only-right or both, the way a sorted merge-join does.
//!
//! ## Algorithm
//!
//! The engine holds at most one pending element per side.
//!
//! 1. With both slots empty, both sources are pulled concurrently.
//! 2. With both elements present, the comparator decides:
//!    - `Equal`: one record for the pair, both slots cleared, back to 1
//!    - `Less`: record the left element, pull only the left source
//!    - `Greater`: record the right element, pull only the right source
//! 3. With one side exhausted, the other side drains through single-sided records.
//! 4. With both sides exhausted, the run resolves with every record in merge order.
//!
//! Every record is appended to the accumulator and the whole accumulator is
//! handed to the registered progress observers. Any failure in a pull, the
//! comparator or the extractor rejects the run at once; nothing is pulled after it.
//!
//! Both sources must already be non-decreasing under the comparator. The engine
//! neither sorts nor validates that; out-of-order input yields an unspecified diff.
//!
//! ## Lifecycle
//!
//! An engine is single-use: `Idle → Running → Resolved | Failed`. The transition
//! out of `Idle` happens synchronously inside [`MergeDiff::compare`], so a second
//! call fails with [`DiffError::AlreadyComparing`] even before the first task is
//! polled.
//!
//! ## Example
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
//! let tags: Vec<_> = records.iter().filter_map(|r| r.as_pair()).collect();
//! assert_eq!(tags[0], (Provenance::Left, &1));
//! assert_eq!(tags[1], (Provenance::Both, &3));
//! # Ok(())
//! # }
//! ```

use crate::compare::{Comparator, ComparisonResult, NaturalOrder};
use crate::config::DiffConfig;
use crate::error::{BoxError, ComponentInfo, DiffError, ErrorContext, FailureStage};
use crate::extract::{Extractor, ProvenanceExtractor};
use crate::progress::{self, FnObserver, Observers, ProgressObserver, ProgressStream};
use crate::record::DiffRecord;
use crate::source::{Side, SourceAdapter, SourceHandle};
use futures::future::{self, BoxFuture, FutureExt};
use futures::Stream;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tracing::{debug, error, info, trace, warn};

/// Lifecycle of a [`MergeDiff`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EngineState {
  /// Constructed, `compare` not yet called.
  Idle = 0,
  /// A compare task exists and has not finished.
  Running = 1,
  /// The compare task resolved with its records.
  Resolved = 2,
  /// The compare task failed.
  Failed = 3,
}

impl EngineState {
  fn from_u8(value: u8) -> Self {
    match value {
      0 => Self::Idle,
      1 => Self::Running,
      2 => Self::Resolved,
      _ => Self::Failed,
    }
  }

  /// `true` for `Resolved` and `Failed`.
  pub fn is_terminal(self) -> bool {
    matches!(self, Self::Resolved | Self::Failed)
  }
}

impl fmt::Display for EngineState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Idle => write!(f, "idle"),
      Self::Running => write!(f, "running"),
      Self::Resolved => write!(f, "resolved"),
      Self::Failed => write!(f, "failed"),
    }
  }
}

/// Single-use merge-diff engine over two ordered sources.
pub struct MergeDiff<T, C = NaturalOrder, E = ProvenanceExtractor>
where
  E: Extractor<T>,
{
  comparator: Arc<C>,
  extractor: Arc<E>,
  component: ComponentInfo,
  state: Arc<AtomicU8>,
  observers: Mutex<Observers<E::Record>>,
  _phantom: PhantomData<fn(T)>,
}

impl<T> MergeDiff<T>
where
  T: Ord + Send + 'static,
{
  /// Creates an engine with natural ordering and provenance records.
  #[must_use]
  pub fn new() -> Self {
    Self::with_config(DiffConfig::default())
  }
}

impl<T> Default for MergeDiff<T>
where
  T: Ord + Send + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}

impl<T, C, E> MergeDiff<T, C, E>
where
  T: Send + 'static,
  C: Comparator<T> + 'static,
  E: Extractor<T> + 'static,
{
  /// Creates an engine from an explicit configuration.
  #[must_use]
  pub fn with_config(config: DiffConfig<C, E>) -> Self {
    let component = config.component_info::<Self>();
    Self {
      comparator: Arc::new(config.comparator),
      extractor: Arc::new(config.extractor),
      component,
      state: Arc::new(AtomicU8::new(EngineState::Idle as u8)),
      observers: Mutex::new(Observers::default()),
      _phantom: PhantomData,
    }
  }

  /// Current lifecycle state.
  pub fn state(&self) -> EngineState {
    EngineState::from_u8(self.state.load(Ordering::Acquire))
  }

  /// Name and type of this engine.
  pub fn component_info(&self) -> ComponentInfo {
    self.component.clone()
  }

  /// Registers a progress observer. Observers registered after `compare` was
  /// called are dropped without ever being notified.
  pub fn observe<O>(&self, observer: O)
  where
    O: ProgressObserver<E::Record> + 'static,
  {
    if self.state() != EngineState::Idle {
      warn!(
        diff = %self.component.name,
        state = %self.state(),
        "progress observer registered after compare; dropping it"
      );
      return;
    }
    self
      .observers
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(Box::new(observer));
  }

  /// Registers a closure receiving the accumulated records after every step.
  pub fn on_progress<F>(&self, callback: F)
  where
    F: FnMut(&[E::Record]) + Send + 'static,
  {
    self.observe(FnObserver(callback));
  }

  /// Returns a stream of accumulated-record snapshots, one per emitted record.
  /// A stream requested after `compare` ends without yielding anything.
  pub fn subscribe(&self) -> ProgressStream<E::Record>
  where
    E::Record: Clone,
  {
    let (observer, stream) = progress::channel();
    self.observe(observer);
    stream
  }

  /// Starts the merge diff of `left` against `right`.
  ///
  /// The returned task is lazy: nothing is pulled until it is awaited or spawned.
  ///
  /// # Errors
  ///
  /// - [`DiffError::AlreadyComparing`] if `compare` was called on this engine before
  /// - [`DiffError::InvalidSourceShape`] if an erased handle holds an unsupported value;
  ///   the engine stays `Idle` in that case
  pub fn compare(
    &self,
    left: SourceHandle<T>,
    right: SourceHandle<T>,
  ) -> Result<DiffTask<E::Record>, DiffError> {
    if self.state() != EngineState::Idle {
      return Err(self.already_comparing());
    }

    let shapes = (left.shape(), right.shape());
    let left = SourceAdapter::new(Side::Left, left)?;
    let right = SourceAdapter::new(Side::Right, right)?;

    if self
      .state
      .compare_exchange(
        EngineState::Idle as u8,
        EngineState::Running as u8,
        Ordering::AcqRel,
        Ordering::Acquire,
      )
      .is_err()
    {
      return Err(self.already_comparing());
    }

    let observers = std::mem::take(
      &mut *self
        .observers
        .lock()
        .unwrap_or_else(PoisonError::into_inner),
    );
    debug!(
      diff = %self.component.name,
      left = shapes.0,
      right = shapes.1,
      observers = observers.len(),
      "merge diff started"
    );

    let run = MergeRun {
      left,
      right,
      comparator: Arc::clone(&self.comparator),
      extractor: Arc::clone(&self.extractor),
      component: self.component.clone(),
      records: Vec::new(),
      observers,
      _phantom: PhantomData,
    };
    let state = Arc::clone(&self.state);
    let task = async move {
      let result = run.run().await;
      let terminal = match result {
        Ok(_) => EngineState::Resolved,
        Err(_) => EngineState::Failed,
      };
      state.store(terminal as u8, Ordering::Release);
      result
    };
    Ok(DiffTask::new(task.boxed()))
  }

  fn already_comparing(&self) -> DiffError {
    warn!(
      diff = %self.component.name,
      state = %self.state(),
      "compare rejected, engine is single-use"
    );
    DiffError::AlreadyComparing {
      component: self.component.clone(),
    }
  }
}

impl<T, C, E> fmt::Debug for MergeDiff<T, C, E>
where
  E: Extractor<T>,
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("MergeDiff")
      .field("component", &self.component)
      .field(
        "state",
        &EngineState::from_u8(self.state.load(Ordering::Acquire)),
      )
      .finish_non_exhaustive()
  }
}

/// The future of one merge diff run, resolving to every record in merge order.
#[must_use = "a diff task does nothing unless awaited or spawned"]
pub struct DiffTask<R> {
  inner: BoxFuture<'static, Result<Vec<R>, DiffError>>,
}

impl<R> DiffTask<R> {
  fn new(inner: BoxFuture<'static, Result<Vec<R>, DiffError>>) -> Self {
    Self { inner }
  }
}

impl<R: Send + 'static> DiffTask<R> {
  /// Runs the task on the current tokio runtime.
  pub fn spawn(self) -> tokio::task::JoinHandle<Result<Vec<R>, DiffError>> {
    tokio::spawn(self)
  }
}

impl<R> Future for DiffTask<R> {
  type Output = Result<Vec<R>, DiffError>;

  fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
    self.inner.poll_unpin(cx)
  }
}

impl<R> fmt::Debug for DiffTask<R> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DiffTask").finish_non_exhaustive()
  }
}

/// State owned by one running compare.
struct MergeRun<T, C, E>
where
  E: Extractor<T>,
{
  left: SourceAdapter<T>,
  right: SourceAdapter<T>,
  comparator: Arc<C>,
  extractor: Arc<E>,
  component: ComponentInfo,
  records: Vec<E::Record>,
  observers: Observers<E::Record>,
  _phantom: PhantomData<fn(T)>,
}

impl<T, C, E> MergeRun<T, C, E>
where
  T: Send + 'static,
  C: Comparator<T>,
  E: Extractor<T>,
{
  async fn run(mut self) -> Result<Vec<E::Record>, DiffError> {
    match self.merge().await {
      Ok(()) => {
        info!(
          diff = %self.component.name,
          records = self.records.len(),
          left_pulls = self.left.pulls(),
          right_pulls = self.right.pulls(),
          "merge diff resolved"
        );
        Ok(self.records)
      }
      Err(e) => {
        error!(
          diff = %self.component.name,
          records = self.records.len(),
          error = %e,
          "merge diff failed"
        );
        Err(e)
      }
    }
  }

  async fn merge(&mut self) -> Result<(), DiffError> {
    let (mut left, mut right) = self.pull_both().await?;
    loop {
      (left, right) = match (left, right) {
        (None, None) => return Ok(()),
        (Some(l), None) => {
          self.emit(Some(l), None, ComparisonResult::Less)?;
          (self.pull(Side::Left).await?, None)
        }
        (None, Some(r)) => {
          self.emit(None, Some(r), ComparisonResult::Greater)?;
          (None, self.pull(Side::Right).await?)
        }
        (Some(l), Some(r)) => match self.order(&l, &r)? {
          ComparisonResult::Equal => {
            self.emit(Some(l), Some(r), ComparisonResult::Equal)?;
            self.pull_both().await?
          }
          ComparisonResult::Less => {
            self.emit(Some(l), None, ComparisonResult::Less)?;
            (self.pull(Side::Left).await?, Some(r))
          }
          ComparisonResult::Greater => {
            self.emit(None, Some(r), ComparisonResult::Greater)?;
            (Some(l), self.pull(Side::Right).await?)
          }
        },
      };
    }
  }

  async fn pull_both(&mut self) -> Result<(Option<T>, Option<T>), DiffError> {
    trace!(diff = %self.component.name, "pulling both sides");
    let left = &mut self.left;
    let right = &mut self.right;
    let result = future::try_join(
      async move { left.fetch().await.map_err(|e| (Side::Left, e)) },
      async move { right.fetch().await.map_err(|e| (Side::Right, e)) },
    )
    .await;
    result.map_err(|(side, e)| self.upstream(FailureStage::Pull(side), e))
  }

  async fn pull(&mut self, side: Side) -> Result<Option<T>, DiffError> {
    let source = match side {
      Side::Left => &mut self.left,
      Side::Right => &mut self.right,
    };
    let result = source.fetch().await;
    result.map_err(|e| self.upstream(FailureStage::Pull(side), e))
  }

  fn order(&self, left: &T, right: &T) -> Result<ComparisonResult, DiffError> {
    self
      .comparator
      .compare(left, right)
      .map_err(|e| self.upstream(FailureStage::Compare, e))
  }

  fn emit(
    &mut self,
    left: Option<T>,
    right: Option<T>,
    outcome: ComparisonResult,
  ) -> Result<(), DiffError> {
    let record = self
      .extractor
      .extract(left, right, outcome)
      .map_err(|e| self.upstream(FailureStage::Extract, e))?;
    self.records.push(record);
    trace!(
      diff = %self.component.name,
      %outcome,
      emitted = self.records.len(),
      "record emitted"
    );
    self.observers.notify(&self.records);
    Ok(())
  }

  fn upstream(&self, stage: FailureStage, source: BoxError) -> DiffError {
    DiffError::from_upstream(
      stage,
      ErrorContext::new(self.component.clone(), self.records.len()),
      source,
    )
  }
}

/// Diffs two sources with natural ordering and provenance records.
///
/// # Errors
///
/// See [`MergeDiff::compare`]; upstream failures surface as [`DiffError::Upstream`].
pub async fn merge_diff<T>(
  left: SourceHandle<T>,
  right: SourceHandle<T>,
) -> Result<Vec<DiffRecord<T>>, DiffError>
where
  T: Ord + Send + 'static,
{
  MergeDiff::new().compare(left, right)?.await
}

/// Diffs two sorted streams with natural ordering and provenance records.
///
/// # Errors
///
/// See [`merge_diff`].
pub async fn diff_streams<T, A, B>(left: A, right: B) -> Result<Vec<DiffRecord<T>>, DiffError>
where
  T: Ord + Send + 'static,
  A: Stream<Item = T> + Send + 'static,
  B: Stream<Item = T> + Send + 'static,
{
  merge_diff(SourceHandle::from_stream(left), SourceHandle::from_stream(right)).await
}
