//! # Error Handling Test Suite
//!
//! Covers `DiffError` formatting and classification, upstream wrapping and
//! unwrapping, `ErrorContext`, `ComponentInfo` and `StringError`.

use crate::error::{BoxError, ComponentInfo, DiffError, ErrorContext, FailureStage, StringError};
use crate::source::Side;
use std::error::Error;

fn component() -> ComponentInfo {
  ComponentInfo::new("orders".to_string(), "MergeDiff".to_string())
}

#[test]
fn test_component_info_default() {
  let info = ComponentInfo::default();
  assert_eq!(info.name, "default");
  assert_eq!(info.type_name, "default");
}

#[test]
fn test_component_info_display() {
  assert_eq!(component().to_string(), "orders (MergeDiff)");
}

#[test]
fn test_error_context_new() {
  let before = chrono::Utc::now();
  let context = ErrorContext::new(component(), 4);
  let after = chrono::Utc::now();

  assert_eq!(context.component, component());
  assert_eq!(context.emitted, 4);
  assert!(context.timestamp >= before && context.timestamp <= after);
}

#[test]
fn test_error_context_default() {
  let context = ErrorContext::default();
  assert_eq!(context.component, ComponentInfo::default());
  assert_eq!(context.emitted, 0);
}

#[test]
fn test_failure_stage_display() {
  assert_eq!(FailureStage::Pull(Side::Left).to_string(), "left pull");
  assert_eq!(FailureStage::Pull(Side::Right).to_string(), "right pull");
  assert_eq!(FailureStage::Compare.to_string(), "compare");
  assert_eq!(FailureStage::Extract.to_string(), "extract");
}

#[test]
fn test_already_comparing_display() {
  let error = DiffError::AlreadyComparing {
    component: component(),
  };
  assert_eq!(
    error.to_string(),
    "orders (MergeDiff) already ran a compare; merge diff instances are single-use"
  );
  assert!(!error.is_upstream());
  assert_eq!(error.stage(), None);
}

#[test]
fn test_invalid_source_shape_display() {
  let error = DiffError::InvalidSourceShape { side: Side::Right };
  assert_eq!(
    error.to_string(),
    "invalid right source: expected a pull closure or a pull object"
  );
}

#[test]
fn test_upstream_keeps_source() {
  let error = DiffError::upstream(
    FailureStage::Pull(Side::Left),
    ErrorContext::new(component(), 2),
    Box::new(StringError::from("cursor closed")),
  );

  assert!(error.is_upstream());
  assert_eq!(error.stage(), Some(FailureStage::Pull(Side::Left)));
  assert_eq!(error.context().map(|c| c.emitted), Some(2));
  assert_eq!(
    error.to_string(),
    "upstream failure during left pull in orders (MergeDiff): cursor closed"
  );
  assert_eq!(
    error.source().map(|source| source.to_string()),
    Some("cursor closed".to_string())
  );
}

#[test]
fn test_from_upstream_unwraps_diff_errors() {
  let boxed: BoxError = Box::new(DiffError::InvalidExtraction);
  let error = DiffError::from_upstream(FailureStage::Extract, ErrorContext::default(), boxed);
  assert!(matches!(error, DiffError::InvalidExtraction));
}

#[test]
fn test_from_upstream_wraps_foreign_errors() {
  let boxed: BoxError = Box::new(std::io::Error::other("disk gone"));
  let error = DiffError::from_upstream(FailureStage::Compare, ErrorContext::default(), boxed);
  assert_eq!(error.stage(), Some(FailureStage::Compare));
}

#[test]
fn test_string_error() {
  let error = StringError::from("boom".to_string());
  assert_eq!(error.to_string(), "boom");
  assert_eq!(error, StringError("boom".to_string()));
  assert!(error.source().is_none());
}
