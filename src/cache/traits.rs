//! Core traits for cached entities.

use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities held in the cache.
///
/// Ids are assigned by the server and unique within their collection.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Server-assigned identifier
  fn id(&self) -> u64;

  /// Entity type name for logging (e.g., "client", "time_entry")
  fn entity_type() -> &'static str;
}
