//! Request bodies for time-entry writes.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeEntry {
  pub task_id: u64,
  pub comment: String,
  pub start: String,
  pub end: String,
}

/// Partial update; fields left as `None` are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntryUpdate {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub task_id: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub comment: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub start: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub end: Option<String>,
}

impl TimeEntryUpdate {
  pub fn is_empty(&self) -> bool {
    self.task_id.is_none() && self.comment.is_none() && self.start.is_none() && self.end.is_none()
  }
}
