//! The in-memory entity graph: clients → projects → tasks, plus time entries.

use std::collections::HashMap;

use crate::api::types::{Client, Project, Task, TimeEntry};

use super::branch::Branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProjectLoc {
  client: usize,
  position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskLoc {
  client: usize,
  project: usize,
  position: usize,
}

/// Id → position lookup for nested entities.
///
/// Nested branches are append-only until a full reset, so positions recorded
/// at insertion stay valid. When a page repeats an id, the first occurrence
/// wins.
#[derive(Debug, Default)]
struct GraphIndex {
  clients: HashMap<u64, usize>,
  projects: HashMap<u64, ProjectLoc>,
  tasks: HashMap<u64, TaskLoc>,
}

/// All cached entities. Exclusively owned by the store.
#[derive(Debug, Default)]
pub struct Graph {
  pub(crate) clients: Branch<Client>,
  pub(crate) time_entries: Branch<TimeEntry>,
  index: GraphIndex,
  last_token: u64,
}

impl Graph {
  pub fn clients(&self) -> &Branch<Client> {
    &self.clients
  }

  pub fn time_entries(&self) -> &Branch<TimeEntry> {
    &self.time_entries
  }

  pub fn client(&self, id: u64) -> Option<&Client> {
    let position = *self.index.clients.get(&id)?;
    self.clients.items().get(position)
  }

  pub fn project(&self, id: u64) -> Option<&Project> {
    let loc = *self.index.projects.get(&id)?;
    self
      .clients
      .items()
      .get(loc.client)?
      .projects
      .items()
      .get(loc.position)
  }

  pub fn task(&self, id: u64) -> Option<&Task> {
    let loc = *self.index.tasks.get(&id)?;
    self
      .clients
      .items()
      .get(loc.client)?
      .projects
      .items()
      .get(loc.project)?
      .tasks
      .items()
      .get(loc.position)
  }

  pub fn projects_branch(&self, client_id: u64) -> Option<&Branch<Project>> {
    self.client(client_id).map(|client| &client.projects)
  }

  pub fn projects_branch_mut(&mut self, client_id: u64) -> Option<&mut Branch<Project>> {
    let position = *self.index.clients.get(&client_id)?;
    self
      .clients
      .items_mut()
      .get_mut(position)
      .map(|client| &mut client.projects)
  }

  pub fn tasks_branch(&self, project_id: u64) -> Option<&Branch<Task>> {
    self.project(project_id).map(|project| &project.tasks)
  }

  pub fn tasks_branch_mut(&mut self, project_id: u64) -> Option<&mut Branch<Task>> {
    let loc = *self.index.projects.get(&project_id)?;
    self
      .clients
      .items_mut()
      .get_mut(loc.client)?
      .projects
      .items_mut()
      .get_mut(loc.position)
      .map(|project| &mut project.tasks)
  }

  /// Token for the next page request. Never reused, not even across resets,
  /// so a page requested before a reset cannot claim a branch created after it.
  pub(crate) fn next_fetch_token(&mut self) -> u64 {
    self.last_token += 1;
    self.last_token
  }

  /// Record clients appended at `from..`.
  pub(crate) fn index_clients(&mut self, from: usize) {
    for (position, client) in self.clients.items().iter().enumerate().skip(from) {
      self.index.clients.entry(client.id).or_insert(position);
    }
  }

  /// Record projects appended to `client_id`'s branch at `from..`.
  pub(crate) fn index_projects(&mut self, client_id: u64, from: usize) {
    let Some(&client) = self.index.clients.get(&client_id) else {
      return;
    };
    let Some(owner) = self.clients.items().get(client) else {
      return;
    };
    for (position, project) in owner.projects.items().iter().enumerate().skip(from) {
      self
        .index
        .projects
        .entry(project.id)
        .or_insert(ProjectLoc { client, position });
    }
  }

  /// Record tasks appended to `project_id`'s branch at `from..`.
  pub(crate) fn index_tasks(&mut self, project_id: u64, from: usize) {
    let Some(&ProjectLoc {
      client,
      position: project,
    }) = self.index.projects.get(&project_id)
    else {
      return;
    };
    let Some(owner) = self
      .clients
      .items()
      .get(client)
      .and_then(|c| c.projects.items().get(project))
    else {
      return;
    };
    for (position, task) in owner.tasks.items().iter().enumerate().skip(from) {
      self.index.tasks.entry(task.id).or_insert(TaskLoc {
        client,
        project,
        position,
      });
    }
  }

  /// Drop every client (and with them all projects and tasks).
  pub fn reset_clients(&mut self) {
    self.clients.reset();
    self.index = GraphIndex::default();
  }

  pub fn reset_time_entries(&mut self) {
    self.time_entries.reset();
  }
}
