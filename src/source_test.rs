//! Tests for source handles and the source adapter.

use crate::error::{BoxError, DiffError, StringError};
use crate::source::{Pull, PullFn, Pulled, Side, SourceAdapter, SourceHandle};
use async_trait::async_trait;
use futures::stream;

/// Paginated cursor: serves `pages` one element at a time, fetching a page per await.
struct PagedCursor {
  pages: Vec<Vec<u32>>,
  page: usize,
  offset: usize,
}

#[async_trait]
impl Pull<u32> for PagedCursor {
  async fn pull_next(&mut self) -> Result<Option<u32>, BoxError> {
    loop {
      let Some(page) = self.pages.get(self.page) else {
        return Ok(None);
      };
      if let Some(item) = page.get(self.offset) {
        self.offset += 1;
        return Ok(Some(*item));
      }
      tokio::task::yield_now().await;
      self.page += 1;
      self.offset = 0;
    }
  }
}

async fn drain<T: Send + 'static>(adapter: &mut SourceAdapter<T>) -> Vec<T> {
  let mut items = Vec::new();
  while let Some(item) = adapter.fetch().await.unwrap() {
    items.push(item);
  }
  items
}

#[tokio::test]
async fn test_pulled_ready_becomes_completed_future() {
  assert_eq!(Pulled::item(7).into_future().await.unwrap(), Some(7));
  assert_eq!(Pulled::<u8>::exhausted().into_future().await.unwrap(), None);
  assert!(Pulled::<u8>::from(Some(1)).is_ready());

  let failed = Pulled::<u8>::failed(StringError::from("gone"));
  assert_eq!(failed.into_future().await.unwrap_err().to_string(), "gone");
}

#[tokio::test]
async fn test_pulled_pending_resolves() {
  let pending = Pulled::pending(async {
    tokio::task::yield_now().await;
    Ok::<_, std::io::Error>(Some("page"))
  });
  assert!(!pending.is_ready());
  assert_eq!(pending.into_future().await.unwrap(), Some("page"));
}

#[tokio::test]
async fn test_closure_source_with_ready_values() {
  let mut next = 0u32;
  let handle = SourceHandle::<u32>::from_fn(move || {
    next += 1;
    (next <= 3).then_some(next)
  });
  assert_eq!(handle.shape(), "closure");

  let mut adapter = SourceAdapter::new(Side::Left, handle).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![1, 2, 3]);
  assert_eq!(adapter.pulls(), 4);
  assert_eq!(adapter.side(), Side::Left);
}

#[tokio::test]
async fn test_closure_source_with_futures() {
  let mut remaining = vec![30u32, 20, 10];
  let handle = SourceHandle::from_fn(move || {
    let next = remaining.pop();
    Pulled::pending(async move {
      tokio::task::yield_now().await;
      Ok::<_, StringError>(next)
    })
  });

  let mut adapter = SourceAdapter::new(Side::Right, handle).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![10, 20, 30]);
}

#[tokio::test]
async fn test_closure_source_mixing_shapes() {
  let mut calls = 0u32;
  let handle = SourceHandle::from_fn(move || {
    calls += 1;
    match calls {
      1 => Pulled::item(1),
      2 => Pulled::pending(async { Ok::<_, StringError>(Some(2)) }),
      _ => Pulled::exhausted(),
    }
  });

  let mut adapter = SourceAdapter::new(Side::Left, handle).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![1, 2]);
}

#[tokio::test]
async fn test_object_source() {
  let cursor = PagedCursor {
    pages: vec![vec![1, 2], vec![], vec![3]],
    page: 0,
    offset: 0,
  };
  let handle = SourceHandle::<u32>::from_pull(cursor);
  assert_eq!(handle.shape(), "object");

  let mut adapter = SourceAdapter::new(Side::Left, handle).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_stream_sources() {
  let chars = SourceHandle::from_stream(stream::iter(vec!['a', 'b']));
  let mut adapter = SourceAdapter::new(Side::Left, chars).unwrap();
  assert_eq!(drain(&mut adapter).await, vec!['a', 'b']);

  let failing = stream::iter(vec![Ok(1), Err(StringError::from("broken page")), Ok(3)]);
  let mut adapter =
    SourceAdapter::new(Side::Right, SourceHandle::from_try_stream(failing)).unwrap();
  assert_eq!(adapter.fetch().await.unwrap(), Some(1));
  assert_eq!(
    adapter.fetch().await.unwrap_err().to_string(),
    "broken page"
  );
}

#[tokio::test]
async fn test_falsy_values_are_not_exhaustion() {
  let mut adapter =
    SourceAdapter::new(Side::Left, SourceHandle::from_values(vec![0, 0, 1])).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![0, 0, 1]);

  let mut adapter = SourceAdapter::new(
    Side::Left,
    SourceHandle::from_values(vec![String::new(), "x".to_string()]),
  )
  .unwrap();
  assert_eq!(drain(&mut adapter).await, vec![String::new(), "x".to_string()]);
}

#[tokio::test]
async fn test_erased_closure_and_object_are_accepted() {
  let mut values = vec![2u32, 1].into_iter();
  let pull: PullFn<u32> = Box::new(move || values.next().into());
  let mut adapter = SourceAdapter::new(Side::Left, SourceHandle::<u32>::erased(pull)).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![2, 1]);

  let object: Box<dyn Pull<u32>> = Box::new(PagedCursor {
    pages: vec![vec![5]],
    page: 0,
    offset: 0,
  });
  let mut adapter = SourceAdapter::new(Side::Right, SourceHandle::<u32>::erased(object)).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![5]);

  let nested = SourceHandle::<u32>::from_values(vec![8]);
  let mut adapter = SourceAdapter::new(Side::Right, SourceHandle::<u32>::erased(nested)).unwrap();
  assert_eq!(drain(&mut adapter).await, vec![8]);
}

#[test]
fn test_erased_unsupported_shape_is_rejected() {
  let handle = SourceHandle::<u32>::erased(vec![1u32, 2, 3]);
  assert_eq!(handle.shape(), "erased");

  let error = SourceAdapter::new(Side::Right, handle).unwrap_err();
  assert!(matches!(
    error,
    DiffError::InvalidSourceShape { side: Side::Right }
  ));
}

#[test]
fn test_side_display() {
  assert_eq!(Side::Left.to_string(), "left");
  assert_eq!(Side::Right.to_string(), "right");
}
