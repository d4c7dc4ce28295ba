//! Paginated collection cache over the remote API.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::api::payloads::{NewTimeEntry, TimeEntryUpdate};
use crate::api::types::{Client, Project, Task, TimeEntry};
use crate::api::{Api, Transport, TransportError};
use crate::notify::Notifier;

use super::branch::LoadStatus;
use super::graph::Graph;
use super::keys::{BranchKey, Clients, PageQuery, ProjectsOf, Sort, TasksOf, TimeEntries};
use super::traits::Entity;

/// Items requested per page unless configured otherwise.
pub const PAGE_SIZE: usize = 10;

/// Client-side cache of the clients → projects → tasks graph and the time
/// entry collection.
///
/// Each branch is fetched lazily, one page at a time. The graph lock is only
/// taken between awaits, so every mutation lands atomically once a response
/// has arrived. Clones share the same graph.
pub struct Store<T> {
  api: Api<T>,
  graph: Arc<Mutex<Graph>>,
  notifier: Notifier,
  page_size: usize,
}

/// A branch's claim on its in-flight page request.
///
/// If the fetch future is dropped before the response arrives, the claim is
/// handed back on drop so the branch does not stay loading forever.
struct FetchClaim<'a, K: BranchKey> {
  graph: &'a Mutex<Graph>,
  key: &'a K,
  token: u64,
  armed: bool,
}

impl<K: BranchKey> FetchClaim<'_, K> {
  /// The response arrived; the caller settles the branch itself.
  fn disarm(mut self) {
    self.armed = false;
  }
}

impl<K: BranchKey> Drop for FetchClaim<'_, K> {
  fn drop(&mut self) {
    if !self.armed {
      return;
    }
    let mut graph = self.graph.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(branch) = self.key.branch_mut(&mut graph) {
      if branch.fail(self.token) {
        debug!(branch = %self.key, "page fetch cancelled, branch released");
      }
    }
  }
}

impl<T: Clone> Clone for Store<T> {
  fn clone(&self) -> Self {
    Self {
      api: self.api.clone(),
      graph: Arc::clone(&self.graph),
      notifier: self.notifier.clone(),
      page_size: self.page_size,
    }
  }
}

impl<T: Transport> Store<T> {
  pub fn new(transport: T, notifier: Notifier) -> Self {
    Self {
      api: Api::new(transport),
      graph: Arc::new(Mutex::new(Graph::default())),
      notifier,
      page_size: PAGE_SIZE,
    }
  }

  pub fn with_page_size(mut self, page_size: usize) -> Self {
    self.page_size = page_size.max(1);
    self
  }

  pub fn page_size(&self) -> usize {
    self.page_size
  }

  pub fn notifier(&self) -> &Notifier {
    &self.notifier
  }

  fn lock(&self) -> MutexGuard<'_, Graph> {
    self.graph.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Fetch the next page of `key`'s branch and append it.
  ///
  /// No request is made when the branch is exhausted, already has a request
  /// in flight, or belongs to an entity that isn't cached. On failure the
  /// cursor is left where it was, `failure_message` is shown if the error has
  /// no message of its own, and the error is returned. Dropping the returned
  /// future mid-request releases the branch for the next call.
  pub async fn fetch_next_page<K: BranchKey>(
    &self,
    key: &K,
    sort: Option<&Sort>,
    failure_message: &str,
  ) -> Result<(), TransportError> {
    let entity = K::Item::entity_type();
    let (offset, token) = {
      let mut graph = self.lock();
      let token = graph.next_fetch_token();
      let Some(branch) = key.branch_mut(&mut graph) else {
        warn!(branch = %key, entity, "owner not cached, skipping page fetch");
        return Ok(());
      };
      match branch.begin_fetch(token) {
        Some(offset) => (offset, token),
        None => {
          debug!(branch = %key, entity, has_more = branch.has_more(), "page fetch skipped");
          return Ok(());
        }
      }
    };
    let claim = FetchClaim {
      graph: &self.graph,
      key,
      token,
      armed: true,
    };

    let query = PageQuery {
      limit: self.page_size,
      offset,
      sort,
    };
    let result = self
      .api
      .get::<Vec<K::Item>>(&key.path(), query.params())
      .await;
    claim.disarm();

    let mut graph = self.lock();
    match result {
      Ok(page) => {
        let count = page.len();
        let appended = key.branch_mut(&mut graph).and_then(|branch| {
          let from = branch.complete(token, page, self.page_size)?;
          Some((from, branch.has_more()))
        });
        match appended {
          Some((from, has_more)) => {
            key.index_appended(&mut graph, from);
            debug!(branch = %key, entity, offset, count, has_more, "page appended");
          }
          None => {
            warn!(branch = %key, entity, count, "branch reset while fetching, page dropped");
          }
        }
        Ok(())
      }
      Err(err) => {
        if let Some(branch) = key.branch_mut(&mut graph) {
          branch.fail(token);
        }
        drop(graph);
        warn!(
          branch = %key,
          entity,
          offset,
          status = err.status,
          error = %err,
          "page fetch failed"
        );
        self.notifier.error(err.message_or(failure_message));
        Err(err)
      }
    }
  }

  pub async fn fetch_clients(&self, sort: Option<&Sort>) -> Result<(), TransportError> {
    self
      .fetch_next_page(&Clients, sort, "Failed to fetch clients")
      .await
  }

  /// First call for a client loads its first page of projects; later calls advance.
  pub async fn fetch_projects(
    &self,
    client_id: u64,
    sort: Option<&Sort>,
  ) -> Result<(), TransportError> {
    self
      .fetch_next_page(&ProjectsOf(client_id), sort, "Failed to fetch projects")
      .await
  }

  pub async fn fetch_tasks(
    &self,
    project_id: u64,
    sort: Option<&Sort>,
  ) -> Result<(), TransportError> {
    self
      .fetch_next_page(&TasksOf(project_id), sort, "Failed to fetch tasks")
      .await
  }

  pub async fn fetch_time_entries(&self, sort: Option<&Sort>) -> Result<(), TransportError> {
    self
      .fetch_next_page(&TimeEntries, sort, "Failed to fetch time entries")
      .await
  }

  /// Create a time entry and put it at the front of the collection.
  pub async fn create_time_entry(&self, entry: &NewTimeEntry) -> Result<TimeEntry, TransportError> {
    let created: TimeEntry = self
      .api
      .post(&TimeEntries.path(), entry)
      .await
      .map_err(|err| self.report_failure(err, "Failed to create time entry"))?;

    self.lock().time_entries.prepend(created.clone());
    debug!(id = created.id, "time entry created");
    self.notifier.success("Time entry created successfully");
    Ok(created)
  }

  /// Update a time entry, overwriting the cached copy in place if there is one.
  pub async fn update_time_entry(
    &self,
    id: u64,
    update: &TimeEntryUpdate,
  ) -> Result<TimeEntry, TransportError> {
    let updated: TimeEntry = self
      .api
      .put(&entry_path(id), update)
      .await
      .map_err(|err| self.report_failure(err, "Failed to update time entry"))?;

    let replaced = self.lock().time_entries.replace(id, updated.clone());
    debug!(id, replaced, "time entry updated");
    self.notifier.success("Time entry updated successfully");
    Ok(updated)
  }

  /// Delete a time entry remotely, then drop it from the collection.
  pub async fn delete_time_entry(&self, id: u64) -> Result<(), TransportError> {
    self
      .api
      .delete::<serde_json::Value>(&entry_path(id))
      .await
      .map_err(|err| self.report_failure(err, "Failed to delete time entry"))?;

    let removed = self.lock().time_entries.remove(id).is_some();
    debug!(id, removed, "time entry deleted");
    self.notifier.success("Time entry deleted successfully");
    Ok(())
  }

  fn report_failure(&self, err: TransportError, fallback: &str) -> TransportError {
    warn!(status = err.status, error = %err, "{}", fallback);
    self.notifier.error(err.message_or(fallback));
    err
  }

  /// Run `f` against the graph under the lock.
  pub fn read<R>(&self, f: impl FnOnce(&Graph) -> R) -> R {
    f(&*self.lock())
  }

  pub fn clients(&self) -> Vec<Client> {
    self.read(|graph| graph.clients().items().to_vec())
  }

  pub fn time_entries(&self) -> Vec<TimeEntry> {
    self.read(|graph| graph.time_entries().items().to_vec())
  }

  pub fn client(&self, id: u64) -> Option<Client> {
    self.read(|graph| graph.client(id).cloned())
  }

  pub fn project(&self, id: u64) -> Option<Project> {
    self.read(|graph| graph.project(id).cloned())
  }

  pub fn task(&self, id: u64) -> Option<Task> {
    self.read(|graph| graph.task(id).cloned())
  }

  /// Items of a branch, `None` if its owner isn't cached.
  pub fn items<K: BranchKey>(&self, key: &K) -> Option<Vec<K::Item>> {
    self.read(|graph| key.branch(graph).map(|b| b.items().to_vec()))
  }

  pub fn status<K: BranchKey>(&self, key: &K) -> Option<LoadStatus> {
    self.read(|graph| key.branch(graph).map(|b| b.status()))
  }

  pub fn has_more<K: BranchKey>(&self, key: &K) -> bool {
    self.read(|graph| key.branch(graph).is_some_and(|b| b.has_more()))
  }

  pub fn is_loading<K: BranchKey>(&self, key: &K) -> bool {
    self.read(|graph| key.branch(graph).is_some_and(|b| b.is_loading()))
  }

  pub fn offset<K: BranchKey>(&self, key: &K) -> Option<usize> {
    self.read(|graph| key.branch(graph).map(|b| b.offset()))
  }

  /// Forget every client, project and task.
  pub fn reset_clients(&self) {
    self.lock().reset_clients();
  }

  pub fn reset_time_entries(&self) {
    self.lock().reset_time_entries();
  }
}

fn entry_path(id: u64) -> String {
  format!("{}/{}", TimeEntries.path(), id)
}
