//! Configuration for a merge diff engine.
//!
//! The comparator and extractor are explicit configuration values. Defaults are
//! [`NaturalOrder`] and [`ProvenanceExtractor`]; nothing is looked up from global
//! state.
//!
//! ```rust
//! use mergediff::compare::ByKey;
//! use mergediff::config::DiffConfig;
//!
//! let config = DiffConfig::default()
//!   .with_comparator(ByKey::new(|row: &(u64, String)| row.0))
//!   .with_name("accounts".to_string());
//! assert_eq!(config.name(), Some("accounts".to_string()));
//! ```

use crate::compare::NaturalOrder;
use crate::error::ComponentInfo;
use crate::extract::ProvenanceExtractor;

/// Name used in logs and errors when none is configured.
pub const DEFAULT_NAME: &str = "merge_diff";

/// Comparator, extractor and naming for a [`crate::MergeDiff`].
#[derive(Debug, Clone, PartialEq)]
pub struct DiffConfig<C = NaturalOrder, E = ProvenanceExtractor> {
  /// Orders the pending left and right elements.
  pub comparator: C,
  /// Turns each merge step into a record.
  pub extractor: E,
  /// Optional name for identifying the engine in logs and errors.
  pub name: Option<String>,
}

impl Default for DiffConfig {
  fn default() -> Self {
    Self::new(NaturalOrder, ProvenanceExtractor)
  }
}

impl<C, E> DiffConfig<C, E> {
  /// Creates a configuration from an explicit comparator and extractor.
  pub fn new(comparator: C, extractor: E) -> Self {
    Self {
      comparator,
      extractor,
      name: None,
    }
  }

  /// Replaces the comparator.
  #[must_use]
  pub fn with_comparator<C2>(self, comparator: C2) -> DiffConfig<C2, E> {
    DiffConfig {
      comparator,
      extractor: self.extractor,
      name: self.name,
    }
  }

  /// Replaces the extractor.
  #[must_use]
  pub fn with_extractor<E2>(self, extractor: E2) -> DiffConfig<C, E2> {
    DiffConfig {
      comparator: self.comparator,
      extractor,
      name: self.name,
    }
  }

  /// Sets the name for this configuration.
  #[must_use]
  pub fn with_name(mut self, name: String) -> Self {
    self.name = Some(name);
    self
  }

  /// Returns the current name, if set.
  pub fn name(&self) -> Option<String> {
    self.name.clone()
  }

  /// Component information for an engine of type `Engine` using this configuration.
  pub fn component_info<Engine>(&self) -> ComponentInfo {
    ComponentInfo {
      name: self
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_NAME.to_string()),
      type_name: std::any::type_name::<Engine>().to_string(),
    }
  }
}
