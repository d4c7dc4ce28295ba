//! Entities served by the time-tracking API.
//!
//! Wire format is camelCase JSON. Child collections (`projects`, `tasks`) are
//! owned by the cache and never travel over the wire.

use chrono::{DateTime, Duration};
use serde::{Deserialize, Serialize};

use crate::cache::{Branch, Entity};

/// Lifecycle status shared by clients, projects and tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
  InProgress,
  #[default]
  Pending,
  Completed,
  /// Any value this build doesn't know about
  #[serde(other)]
  Unknown,
}

impl Status {
  pub fn as_str(&self) -> &'static str {
    match self {
      Status::InProgress => "in-progress",
      Status::Pending => "pending",
      Status::Completed => "completed",
      Status::Unknown => "unknown",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
  pub id: u64,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub status: Status,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
  #[serde(skip)]
  pub projects: Branch<Project>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  pub id: u64,
  pub client_id: u64,
  pub name: String,
  #[serde(default)]
  pub status: Status,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
  #[serde(skip)]
  pub tasks: Branch<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
  pub id: u64,
  #[serde(alias = "parent")]
  pub project_id: u64,
  pub name: String,
  #[serde(default)]
  pub status: Status,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
  pub id: u64,
  pub task_id: u64,
  #[serde(default)]
  pub comment: String,
  /// ISO 8601
  pub start: String,
  /// ISO 8601
  pub end: String,
  #[serde(default)]
  pub created_at: String,
  #[serde(default)]
  pub updated_at: String,
}

impl TimeEntry {
  /// Time between `start` and `end`, if both parse and are ordered.
  pub fn duration(&self) -> Option<Duration> {
    let start = DateTime::parse_from_rfc3339(&self.start).ok()?;
    let end = DateTime::parse_from_rfc3339(&self.end).ok()?;
    let duration = end.signed_duration_since(start);
    (duration >= Duration::zero()).then_some(duration)
  }
}

impl Entity for Client {
  fn id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "client"
  }
}

impl Entity for Project {
  fn id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "project"
  }
}

impl Entity for Task {
  fn id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "task"
  }
}

impl Entity for TimeEntry {
  fn id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "time_entry"
  }
}
