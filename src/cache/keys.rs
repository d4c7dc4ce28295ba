//! Keys naming each paginated branch, and the page query sent for them.

use std::fmt;

use crate::api::types::{Client, Project, Task, TimeEntry};

use super::branch::Branch;
use super::graph::Graph;
use super::traits::Entity;

/// Identifies one fetchable, appendable sequence in the graph.
pub trait BranchKey: fmt::Display + Send + Sync {
  type Item: Entity;

  /// API path serving this branch's pages
  fn path(&self) -> String;

  fn branch<'g>(&self, graph: &'g Graph) -> Option<&'g Branch<Self::Item>>;

  /// `None` when the owning entity isn't cached.
  fn branch_mut<'g>(&self, graph: &'g mut Graph) -> Option<&'g mut Branch<Self::Item>>;

  /// Index items appended at `from..`.
  fn index_appended(&self, _graph: &mut Graph, _from: usize) {}
}

/// Top-level clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clients;

/// Projects of one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectsOf(pub u64);

/// Tasks of one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TasksOf(pub u64);

/// Top-level time entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEntries;

impl fmt::Display for Clients {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("clients")
  }
}

impl fmt::Display for ProjectsOf {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "projects of client {}", self.0)
  }
}

impl fmt::Display for TasksOf {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "tasks of project {}", self.0)
  }
}

impl fmt::Display for TimeEntries {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("time entries")
  }
}

impl BranchKey for Clients {
  type Item = Client;

  fn path(&self) -> String {
    "/clients".to_string()
  }

  fn branch<'g>(&self, graph: &'g Graph) -> Option<&'g Branch<Client>> {
    Some(&graph.clients)
  }

  fn branch_mut<'g>(&self, graph: &'g mut Graph) -> Option<&'g mut Branch<Client>> {
    Some(&mut graph.clients)
  }

  fn index_appended(&self, graph: &mut Graph, from: usize) {
    graph.index_clients(from);
  }
}

impl BranchKey for ProjectsOf {
  type Item = Project;

  fn path(&self) -> String {
    format!("/clients/{}/projects", self.0)
  }

  fn branch<'g>(&self, graph: &'g Graph) -> Option<&'g Branch<Project>> {
    graph.projects_branch(self.0)
  }

  fn branch_mut<'g>(&self, graph: &'g mut Graph) -> Option<&'g mut Branch<Project>> {
    graph.projects_branch_mut(self.0)
  }

  fn index_appended(&self, graph: &mut Graph, from: usize) {
    graph.index_projects(self.0, from);
  }
}

impl BranchKey for TasksOf {
  type Item = Task;

  fn path(&self) -> String {
    format!("/projects/{}/tasks", self.0)
  }

  fn branch<'g>(&self, graph: &'g Graph) -> Option<&'g Branch<Task>> {
    graph.tasks_branch(self.0)
  }

  fn branch_mut<'g>(&self, graph: &'g mut Graph) -> Option<&'g mut Branch<Task>> {
    graph.tasks_branch_mut(self.0)
  }

  fn index_appended(&self, graph: &mut Graph, from: usize) {
    graph.index_tasks(self.0, from);
  }
}

impl BranchKey for TimeEntries {
  type Item = TimeEntry;

  fn path(&self) -> String {
    "/time-entries".to_string()
  }

  fn branch<'g>(&self, graph: &'g Graph) -> Option<&'g Branch<TimeEntry>> {
    Some(&graph.time_entries)
  }

  fn branch_mut<'g>(&self, graph: &'g mut Graph) -> Option<&'g mut Branch<TimeEntry>> {
    Some(&mut graph.time_entries)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
  #[default]
  Asc,
  Desc,
}

impl SortOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortOrder::Asc => "asc",
      SortOrder::Desc => "desc",
    }
  }
}

/// Server-side sort applied to a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
  pub field: String,
  pub order: SortOrder,
}

impl Sort {
  pub fn asc(field: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      order: SortOrder::Asc,
    }
  }

  pub fn desc(field: impl Into<String>) -> Self {
    Self {
      field: field.into(),
      order: SortOrder::Desc,
    }
  }
}

/// Query parameters for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery<'a> {
  pub limit: usize,
  pub offset: usize,
  pub sort: Option<&'a Sort>,
}

impl PageQuery<'_> {
  /// `sortBy`/`order` are only sent when a sort was asked for.
  pub fn params(&self) -> Vec<(String, String)> {
    let mut params = vec![
      ("limit".to_string(), self.limit.to_string()),
      ("offset".to_string(), self.offset.to_string()),
    ];
    if let Some(sort) = self.sort {
      params.push(("sortBy".to_string(), sort.field.clone()));
      params.push(("order".to_string(), sort.order.as_str().to_string()));
    }
    params
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_paths() {
    assert_eq!(Clients.path(), "/clients");
    assert_eq!(ProjectsOf(7).path(), "/clients/7/projects");
    assert_eq!(TasksOf(3).path(), "/projects/3/tasks");
    assert_eq!(TimeEntries.path(), "/time-entries");
  }

  #[test]
  fn test_page_query_without_sort() {
    let query = PageQuery {
      limit: 10,
      offset: 20,
      sort: None,
    };
    assert_eq!(
      query.params(),
      vec![
        ("limit".to_string(), "10".to_string()),
        ("offset".to_string(), "20".to_string()),
      ]
    );
  }

  #[test]
  fn test_page_query_with_sort() {
    let sort = Sort::desc("createdAt");
    let query = PageQuery {
      limit: 10,
      offset: 0,
      sort: Some(&sort),
    };
    let params = query.params();
    assert!(params.contains(&("sortBy".to_string(), "createdAt".to_string())));
    assert!(params.contains(&("order".to_string(), "desc".to_string())));
    assert_eq!(Sort::asc("name").order.as_str(), "asc");
  }
}
