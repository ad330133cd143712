//! Tests for extractors, `DiffRecord` and `DiffStats`.

use crate::compare::ComparisonResult;
use crate::error::DiffError;
use crate::extract::{Extractor, FnExtractor, ProvenanceExtractor};
use crate::record::{DiffRecord, DiffStats, Provenance};

#[test]
fn test_provenance_extractor_tags() {
  let both = ProvenanceExtractor
    .extract(Some(3), Some(3), ComparisonResult::Equal)
    .unwrap();
  let left = ProvenanceExtractor
    .extract(Some(1), None, ComparisonResult::Less)
    .unwrap();
  let right = ProvenanceExtractor
    .extract(None, Some(4), ComparisonResult::Greater)
    .unwrap();

  assert_eq!(both, DiffRecord::both(3, 3));
  assert_eq!(left, DiffRecord::left(1));
  assert_eq!(right, DiffRecord::right(4));
}

#[test]
fn test_provenance_extractor_rejects_empty_step() {
  let error = Extractor::<i32>::extract(&ProvenanceExtractor, None, None, ComparisonResult::Equal)
    .unwrap_err();
  let error = error.downcast::<DiffError>().unwrap();
  assert!(matches!(*error, DiffError::InvalidExtraction));
}

#[test]
fn test_falsy_values_are_records() {
  let zero = ProvenanceExtractor
    .extract(Some(0), None, ComparisonResult::Less)
    .unwrap();
  let empty = ProvenanceExtractor
    .extract(None, Some(String::new()), ComparisonResult::Greater)
    .unwrap();

  assert_eq!(zero.as_pair(), Some((Provenance::Left, &0)));
  assert_eq!(empty.as_pair(), Some((Provenance::Right, &String::new())));
}

#[test]
fn test_fn_extractor_structural_delta() {
  let delta = FnExtractor::new(
    |left: Option<(u32, i64)>, right: Option<(u32, i64)>, outcome: ComparisonResult| {
      Ok(match (left, right) {
        (Some((id, old)), Some((_, new))) => (id, new - old, outcome),
        (Some((id, old)), None) => (id, -old, outcome),
        (None, Some((id, new))) => (id, new, outcome),
        (None, None) => return Err(DiffError::InvalidExtraction.into()),
      })
    },
  );

  assert_eq!(
    delta
      .extract(Some((1, 10)), Some((1, 15)), ComparisonResult::Equal)
      .unwrap(),
    (1, 5, ComparisonResult::Equal)
  );
  assert_eq!(
    delta
      .extract(Some((2, 7)), None, ComparisonResult::Less)
      .unwrap(),
    (2, -7, ComparisonResult::Less)
  );
}

#[test]
fn test_record_value_prefers_left() {
  let record = DiffRecord::both("a".to_string(), "A".to_string());
  assert_eq!(record.value(), Some(&"a".to_string()));
  assert_eq!(record.into_value(), Some("a".to_string()));
  assert_eq!(DiffRecord::right(9).into_value(), Some(9));
}

#[test]
fn test_record_serializes_with_lowercase_tags() {
  let records = vec![DiffRecord::left(1), DiffRecord::both(3, 3), DiffRecord::right(4)];
  let json = serde_json::to_string(&records).unwrap();
  assert_eq!(
    json,
    concat!(
      r#"[{"provenance":"left","left":1},"#,
      r#"{"provenance":"both","left":3,"right":3},"#,
      r#"{"provenance":"right","right":4}]"#
    )
  );

  let decoded: Vec<DiffRecord<i32>> = serde_json::from_str(&json).unwrap();
  assert_eq!(decoded, records);
}

#[test]
fn test_diff_stats() {
  let records = vec![
    DiffRecord::left(1),
    DiffRecord::both(3, 3),
    DiffRecord::right(4),
    DiffRecord::both(5, 5),
  ];
  let stats = DiffStats::from_records(&records);

  assert_eq!(
    stats,
    DiffStats {
      left: 1,
      right: 1,
      both: 2
    }
  );
  assert_eq!(stats.total(), 4);
  assert!(!stats.is_identical());
  assert_eq!(stats.to_string(), "1 left, 1 right, 2 both");
  assert!(DiffStats::from_records::<i32>(&[]).is_identical());
}
