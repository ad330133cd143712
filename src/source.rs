//! # Sources
//!
//! A source is an ordered, possibly asynchronous producer of elements that the
//! merge engine pulls one at a time. Callers hand the engine a [`SourceHandle`],
//! and the [`SourceAdapter`] normalizes it into a single async `fetch` operation.
//!
//! ## Shapes
//!
//! - **Closure**: a zero-argument `FnMut() -> Pulled<T>`. A closure may answer with
//!   a ready value ([`Pulled::Ready`]) or a future ([`Pulled::Pending`]); ready
//!   values are wrapped into completed futures, so the engine never cares which.
//! - **Object**: anything implementing the async [`Pull`] trait.
//! - **Erased**: a `Box<dyn Any + Send>` holding one of the shapes above, for
//!   sources assembled dynamically. Anything else is rejected with
//!   [`DiffError::InvalidSourceShape`] before a single pull happens.
//!
//! ## Exhaustion
//!
//! Every pull yields `Ok(Some(item))` while elements remain and `Ok(None)` once the
//! source is exhausted. `0`, `""` and other "empty looking" values are ordinary
//! items. An exhausted source is never pulled again by the engine.
//!
//! ## Example
//!
//! ```rust
//! use mergediff::source::{Pulled, SourceHandle};
//!
//! // Ready values.
//! let mut next = 0;
//! let counting = SourceHandle::<u32>::from_fn(move || {
//!   next += 1;
//!   (next <= 3).then_some(next)
//! });
//!
//! // Futures.
//! let remote = SourceHandle::<u32>::from_fn(|| {
//!   Pulled::pending(async { Ok::<_, std::io::Error>(None) })
//! });
//! # let _ = (counting, remote);
//! ```

use crate::error::{BoxError, DiffError};
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use futures::{Stream, StreamExt};
use std::any::Any;
use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tracing::trace;

/// One of the two slots of a merge diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
  /// Source A.
  Left,
  /// Source B.
  Right,
}

impl fmt::Display for Side {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Side::Left => write!(f, "left"),
      Side::Right => write!(f, "right"),
    }
  }
}

/// Future returned by a single pull.
pub type PullFuture<T> = BoxFuture<'static, Result<Option<T>, BoxError>>;

/// Closure-shaped source.
pub type PullFn<T> = Box<dyn FnMut() -> Pulled<T> + Send>;

/// The answer of a closure-shaped source to one pull: either already resolved or still pending.
pub enum Pulled<T> {
  /// The pull resolved synchronously.
  Ready(Result<Option<T>, BoxError>),
  /// The pull resolves later.
  Pending(PullFuture<T>),
}

impl<T: Send + 'static> Pulled<T> {
  /// A ready element.
  pub fn item(item: T) -> Self {
    Self::Ready(Ok(Some(item)))
  }

  /// The source has no more elements.
  pub fn exhausted() -> Self {
    Self::Ready(Ok(None))
  }

  /// The pull failed synchronously.
  pub fn failed<E: Into<BoxError>>(error: E) -> Self {
    Self::Ready(Err(error.into()))
  }

  /// The pull resolves once `future` completes.
  pub fn pending<F, E>(future: F) -> Self
  where
    F: Future<Output = Result<Option<T>, E>> + Send + 'static,
    E: Into<BoxError>,
  {
    Self::Pending(future.map(|result| result.map_err(Into::into)).boxed())
  }

  /// Returns `true` if the pull is already resolved.
  pub fn is_ready(&self) -> bool {
    matches!(self, Self::Ready(_))
  }

  /// Normalizes the answer into a future; ready values become completed futures.
  pub fn into_future(self) -> PullFuture<T> {
    match self {
      Self::Ready(result) => future::ready(result).boxed(),
      Self::Pending(future) => future,
    }
  }
}

impl<T> From<Option<T>> for Pulled<T> {
  fn from(item: Option<T>) -> Self {
    Self::Ready(Ok(item))
  }
}

impl<T> fmt::Debug for Pulled<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Ready(Ok(Some(_))) => write!(f, "Pulled::Ready(item)"),
      Self::Ready(Ok(None)) => write!(f, "Pulled::Ready(exhausted)"),
      Self::Ready(Err(e)) => write!(f, "Pulled::Ready(error: {})", e),
      Self::Pending(_) => write!(f, "Pulled::Pending"),
    }
  }
}

/// Object-shaped source: anything that can asynchronously pull its next element.
///
/// Paginated queries and remote cursors usually implement this directly since
/// `pull_next` may borrow the cursor state across awaits.
#[async_trait]
pub trait Pull<T>: Send {
  /// Pulls the next element, `Ok(None)` once exhausted.
  async fn pull_next(&mut self) -> Result<Option<T>, BoxError>;
}

/// Adapts a `Stream` of results into a [`Pull`] object.
pub struct StreamPull<S> {
  stream: Pin<Box<S>>,
}

impl<S> StreamPull<S> {
  /// Wraps `stream`.
  pub fn new(stream: S) -> Self {
    Self {
      stream: Box::pin(stream),
    }
  }
}

#[async_trait]
impl<T, E, S> Pull<T> for StreamPull<S>
where
  S: Stream<Item = Result<T, E>> + Send + 'static,
  T: Send + 'static,
  E: Into<BoxError> + Send + 'static,
{
  async fn pull_next(&mut self) -> Result<Option<T>, BoxError> {
    self.stream.next().await.transpose().map_err(Into::into)
  }
}

/// A source as handed to the engine.
pub enum SourceHandle<T> {
  /// Closure-shaped source.
  Closure(PullFn<T>),
  /// Object-shaped source.
  Object(Box<dyn Pull<T>>),
  /// A source whose shape is only known at runtime.
  Erased(Box<dyn Any + Send>),
}

impl<T: Send + 'static> SourceHandle<T> {
  /// Builds a closure-shaped source. The closure may return `Option<T>` or [`Pulled<T>`].
  pub fn from_fn<F, P>(mut pull: F) -> Self
  where
    F: FnMut() -> P + Send + 'static,
    P: Into<Pulled<T>>,
  {
    Self::Closure(Box::new(move || pull().into()))
  }

  /// Builds an object-shaped source.
  pub fn from_pull<P>(pull: P) -> Self
  where
    P: Pull<T> + 'static,
  {
    Self::Object(Box::new(pull))
  }

  /// Builds a source over an in-memory sequence.
  pub fn from_values<I>(values: I) -> Self
  where
    I: IntoIterator<Item = T>,
    I::IntoIter: Send + 'static,
  {
    let mut values = values.into_iter();
    Self::from_fn(move || values.next())
  }

  /// Builds a source over an infallible stream.
  pub fn from_stream<S>(stream: S) -> Self
  where
    S: Stream<Item = T> + Send + 'static,
  {
    Self::from_pull(StreamPull::new(stream.map(Ok::<T, Infallible>)))
  }

  /// Builds a source over a fallible stream; the first `Err` fails the run.
  pub fn from_try_stream<S, E>(stream: S) -> Self
  where
    S: Stream<Item = Result<T, E>> + Send + 'static,
    E: Into<BoxError> + Send + 'static,
  {
    Self::from_pull(StreamPull::new(stream))
  }

  /// Erases the shape of `value`. The adapter accepts it if `value` is a
  /// [`PullFn<T>`], a `Box<dyn Pull<T>>` or another `SourceHandle<T>`.
  pub fn erased<A: Any + Send>(value: A) -> Self {
    Self::Erased(Box::new(value))
  }

  /// Short name of the shape, for logs.
  pub fn shape(&self) -> &'static str {
    match self {
      Self::Closure(_) => "closure",
      Self::Object(_) => "object",
      Self::Erased(_) => "erased",
    }
  }
}

impl<T> fmt::Debug for SourceHandle<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Closure(_) => write!(f, "SourceHandle::Closure"),
      Self::Object(_) => write!(f, "SourceHandle::Object"),
      Self::Erased(_) => write!(f, "SourceHandle::Erased"),
    }
  }
}

enum Shape<T> {
  Closure(PullFn<T>),
  Object(Box<dyn Pull<T>>),
}

/// Uniform "fetch next element" over any supported source shape.
pub struct SourceAdapter<T> {
  side: Side,
  shape: Shape<T>,
  pulls: usize,
}

impl<T: Send + 'static> SourceAdapter<T> {
  /// Resolves `handle` into an adapter for `side`.
  ///
  /// # Errors
  ///
  /// [`DiffError::InvalidSourceShape`] if `handle` is erased and holds an unsupported value.
  pub fn new(side: Side, handle: SourceHandle<T>) -> Result<Self, DiffError> {
    let shape = match handle {
      SourceHandle::Closure(pull) => Shape::Closure(pull),
      SourceHandle::Object(pull) => Shape::Object(pull),
      SourceHandle::Erased(value) => return Self::from_erased(side, value),
    };
    Ok(Self {
      side,
      shape,
      pulls: 0,
    })
  }

  fn from_erased(side: Side, value: Box<dyn Any + Send>) -> Result<Self, DiffError> {
    let value = match value.downcast::<PullFn<T>>() {
      Ok(pull) => return Self::new(side, SourceHandle::Closure(*pull)),
      Err(value) => value,
    };
    let value = match value.downcast::<Box<dyn Pull<T>>>() {
      Ok(pull) => return Self::new(side, SourceHandle::Object(*pull)),
      Err(value) => value,
    };
    match value.downcast::<SourceHandle<T>>() {
      Ok(handle) => Self::new(side, *handle),
      Err(_) => Err(DiffError::InvalidSourceShape { side }),
    }
  }

  /// The slot this adapter feeds.
  pub fn side(&self) -> Side {
    self.side
  }

  /// Number of pulls issued so far.
  pub fn pulls(&self) -> usize {
    self.pulls
  }

  /// Fetches the next element, `Ok(None)` once the source is exhausted.
  ///
  /// # Errors
  ///
  /// Whatever the underlying source fails with.
  pub async fn fetch(&mut self) -> Result<Option<T>, BoxError> {
    self.pulls += 1;
    let pending: BoxFuture<'_, Result<Option<T>, BoxError>> = match &mut self.shape {
      Shape::Closure(pull) => pull().into_future(),
      Shape::Object(pull) => pull.pull_next(),
    };
    let next = pending.await?;
    trace!(
      side = %self.side,
      pull = self.pulls,
      exhausted = next.is_none(),
      "pulled"
    );
    Ok(next)
  }
}

impl<T> fmt::Debug for SourceAdapter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SourceAdapter")
      .field("side", &self.side)
      .field("pulls", &self.pulls)
      .finish_non_exhaustive()
  }
}
