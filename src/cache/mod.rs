//! Incrementally hydrated, paginated cache of the remote entity graph.
//!
//! This module provides the API-agnostic pieces:
//! - `Branch`: one paginated sequence with its own cursor and load status
//! - `BranchKey`: names a branch, its API path and where it lives in the graph
//! - `Graph`: the nested entity graph with an id index
//! - `Store`: fetches pages and applies writes, reporting through a `Notifier`

mod branch;
mod graph;
mod keys;
mod store;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use branch::{Branch, LoadStatus};
pub use graph::Graph;
pub use keys::{BranchKey, Clients, PageQuery, ProjectsOf, Sort, SortOrder, TasksOf, TimeEntries};
pub use store::{Store, PAGE_SIZE};
pub use traits::Entity;
