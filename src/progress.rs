//! # Progress
//!
//! Observers registered on an engine before `compare` see the full list of
//! records accumulated so far after every emitted record. The list only grows;
//! records are never retracted, so the last notification of a successful run
//! equals its result. A run that fails keeps whatever its observers already saw.
//!
//! Two observer flavours ship with the crate:
//!
//! - any `FnMut(&[R]) + Send` closure, via [`FnObserver`]
//! - [`ChannelObserver`], which forwards owned snapshots to a [`ProgressStream`]
//!
//! ```rust
//! use futures::StreamExt;
//! use mergediff::progress;
//!
//! # async fn example() {
//! let (observer, mut snapshots) = progress::channel::<u32>();
//! # drop(observer);
//! while let Some(snapshot) = snapshots.next().await {
//!   println!("{} records so far", snapshot.len());
//! }
//! # }
//! ```

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::warn;

/// Receives the accumulated records after every merge step that emitted one.
pub trait ProgressObserver<R>: Send {
  /// Called with every record accumulated so far, in merge order.
  fn on_progress(&mut self, records: &[R]);
}

/// Observer backed by a closure.
pub struct FnObserver<F>(pub F);

impl<F, R> ProgressObserver<R> for FnObserver<F>
where
  F: FnMut(&[R]) + Send,
{
  fn on_progress(&mut self, records: &[R]) {
    (self.0)(records)
  }
}

/// Stream of progress snapshots.
pub type ProgressStream<R> = UnboundedReceiverStream<Vec<R>>;

/// Observer forwarding owned snapshots into a channel.
///
/// A dropped receiver does not affect the run; the observer just stops sending.
pub struct ChannelObserver<R> {
  sender: Option<mpsc::UnboundedSender<Vec<R>>>,
}

impl<R: Clone + Send> ProgressObserver<R> for ChannelObserver<R> {
  fn on_progress(&mut self, records: &[R]) {
    let Some(sender) = &self.sender else {
      return;
    };
    if sender.send(records.to_vec()).is_err() {
      warn!(
        emitted = records.len(),
        "progress receiver dropped, no further snapshots will be sent"
      );
      self.sender = None;
    }
  }
}

/// Creates a channel observer and the stream of snapshots it feeds.
pub fn channel<R: Clone + Send>() -> (ChannelObserver<R>, ProgressStream<R>) {
  let (sender, receiver) = mpsc::unbounded_channel();
  (
    ChannelObserver {
      sender: Some(sender),
    },
    UnboundedReceiverStream::new(receiver),
  )
}

/// The observers attached to one run.
pub(crate) struct Observers<R> {
  observers: Vec<Box<dyn ProgressObserver<R>>>,
}

impl<R> Default for Observers<R> {
  fn default() -> Self {
    Self {
      observers: Vec::new(),
    }
  }
}

impl<R> Observers<R> {
  pub(crate) fn push(&mut self, observer: Box<dyn ProgressObserver<R>>) {
    self.observers.push(observer);
  }

  pub(crate) fn len(&self) -> usize {
    self.observers.len()
  }

  pub(crate) fn notify(&mut self, records: &[R]) {
    for observer in &mut self.observers {
      observer.on_progress(records);
    }
  }
}
