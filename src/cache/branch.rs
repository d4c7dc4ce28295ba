//! One independently paginated sequence of entities.

use super::traits::Entity;

/// Whether a branch has ever been fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
  /// Never requested
  #[default]
  NotLoaded,
  /// First page requested, not yet arrived
  Loading,
  /// At least one page has arrived (possibly empty)
  Loaded,
}

/// Items of a branch together with its pagination cursor.
///
/// Offset, `has_more` and the in-flight token live in the same record as the
/// items so they can never drift apart. The token identifies the one request
/// allowed to finish the current fetch; a result carrying any other token is
/// stale and gets dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch<T> {
  items: Vec<T>,
  offset: usize,
  has_more: bool,
  in_flight: Option<u64>,
  status: LoadStatus,
}

impl<T> Default for Branch<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      offset: 0,
      has_more: true,
      in_flight: None,
      status: LoadStatus::NotLoaded,
    }
  }
}

impl<T: Entity> Branch<T> {
  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn items_mut(&mut self) -> &mut [T] {
    &mut self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  /// Number of items already fetched through pagination.
  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn has_more(&self) -> bool {
    self.has_more
  }

  pub fn is_loading(&self) -> bool {
    self.in_flight.is_some()
  }

  pub fn status(&self) -> LoadStatus {
    self.status
  }

  /// Claim the branch for a page request identified by `token`.
  ///
  /// A branch that was never loaded is initialized first, so an untouched
  /// branch always gets its first page. Returns the offset to request, or
  /// `None` when there is nothing more to fetch or a request is already in
  /// flight.
  pub fn begin_fetch(&mut self, token: u64) -> Option<usize> {
    if self.status == LoadStatus::NotLoaded {
      self.items.clear();
      self.offset = 0;
      self.has_more = true;
      self.status = LoadStatus::Loading;
    }

    if !self.has_more || self.in_flight.is_some() {
      return None;
    }

    self.in_flight = Some(token);
    Some(self.offset)
  }

  /// Append a fetched page. Returns the index of the first appended item, or
  /// `None` (leaving the branch untouched) when `token` no longer owns it.
  pub fn complete(&mut self, token: u64, page: Vec<T>, page_size: usize) -> Option<usize> {
    if self.in_flight != Some(token) {
      return None;
    }

    let from = self.items.len();
    let count = page.len();

    self.items.extend(page);
    self.offset += count;
    self.has_more = count == page_size;
    self.in_flight = None;
    self.status = LoadStatus::Loaded;

    Some(from)
  }

  /// Release the branch after a failed or abandoned request. The cursor is
  /// left as it was. Returns false when `token` no longer owns the branch.
  pub fn fail(&mut self, token: u64) -> bool {
    if self.in_flight != Some(token) {
      return false;
    }

    self.in_flight = None;
    if self.status == LoadStatus::Loading {
      self.status = LoadStatus::NotLoaded;
    }
    true
  }

  /// Insert at the front without moving the cursor.
  pub fn prepend(&mut self, item: T) {
    self.items.insert(0, item);
  }

  pub fn get(&self, id: u64) -> Option<&T> {
    self.items.iter().find(|item| item.id() == id)
  }

  pub fn position(&self, id: u64) -> Option<usize> {
    self.items.iter().position(|item| item.id() == id)
  }

  /// Overwrite the item with `id` in place. Returns false if it isn't cached.
  pub fn replace(&mut self, id: u64, item: T) -> bool {
    match self.items.iter_mut().find(|existing| existing.id() == id) {
      Some(existing) => {
        *existing = item;
        true
      }
      None => false,
    }
  }

  pub fn remove(&mut self, id: u64) -> Option<T> {
    let position = self.position(id)?;
    Some(self.items.remove(position))
  }

  /// Back to the never-fetched state. A request still in flight loses its
  /// claim, so its page is dropped when it lands.
  pub fn reset(&mut self) {
    *self = Self::default();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::types::TimeEntry;

  fn entry(id: u64) -> TimeEntry {
    TimeEntry {
      id,
      task_id: 1,
      comment: format!("entry {}", id),
      start: "2024-01-01T00:00:00Z".into(),
      end: "2024-01-01T01:00:00Z".into(),
      created_at: String::new(),
      updated_at: String::new(),
    }
  }

  fn page(ids: std::ops::Range<u64>) -> Vec<TimeEntry> {
    ids.map(entry).collect()
  }

  /// Run one whole fetch cycle.
  fn load(branch: &mut Branch<TimeEntry>, ids: std::ops::Range<u64>, page_size: usize) {
    assert!(branch.begin_fetch(1).is_some());
    assert!(branch.complete(1, page(ids), page_size).is_some());
  }

  #[test]
  fn test_first_fetch_initializes() {
    let mut branch: Branch<TimeEntry> = Branch::default();
    assert_eq!(branch.status(), LoadStatus::NotLoaded);

    assert_eq!(branch.begin_fetch(1), Some(0));
    assert_eq!(branch.status(), LoadStatus::Loading);
    assert!(branch.is_loading());
    assert!(branch.is_empty());
  }

  #[test]
  fn test_page_advances_cursor() {
    let mut branch = Branch::default();

    branch.begin_fetch(1);
    assert_eq!(branch.complete(1, page(0..10), 10), Some(0));
    assert_eq!(branch.offset(), 10);
    assert!(branch.has_more());
    assert!(!branch.is_loading());
    assert_eq!(branch.status(), LoadStatus::Loaded);

    assert_eq!(branch.begin_fetch(2), Some(10));
    assert_eq!(branch.complete(2, page(10..14), 10), Some(10));
    assert_eq!(branch.offset(), 14);
    assert!(!branch.has_more());
    assert_eq!(branch.len(), 14);
  }

  #[test]
  fn test_exhausted_branch_refuses_fetch() {
    let mut branch = Branch::default();
    load(&mut branch, 0..3, 10);

    let before = branch.clone();
    assert_eq!(branch.begin_fetch(7), None);
    assert_eq!(branch, before);
  }

  #[test]
  fn test_exact_page_needs_one_empty_fetch() {
    let mut branch = Branch::default();
    load(&mut branch, 0..10, 10);
    assert!(branch.has_more());

    assert_eq!(branch.begin_fetch(2), Some(10));
    branch.complete(2, Vec::new(), 10);
    assert!(!branch.has_more());
    assert_eq!(branch.offset(), 10);
  }

  #[test]
  fn test_in_flight_guard() {
    let mut branch: Branch<TimeEntry> = Branch::default();
    assert_eq!(branch.begin_fetch(1), Some(0));
    assert_eq!(branch.begin_fetch(2), None);

    // The refused claim cannot finish the fetch either
    assert_eq!(branch.complete(2, page(0..3), 10), None);
    assert!(branch.is_loading());
  }

  #[test]
  fn test_failure_keeps_cursor() {
    let mut branch = Branch::default();
    load(&mut branch, 0..10, 10);

    branch.begin_fetch(2);
    assert!(branch.fail(2));
    assert!(!branch.is_loading());
    assert_eq!(branch.offset(), 10);
    assert!(branch.has_more());
    assert_eq!(branch.status(), LoadStatus::Loaded);
    assert_eq!(branch.begin_fetch(3), Some(10));
  }

  #[test]
  fn test_failed_first_fetch_returns_to_not_loaded() {
    let mut branch: Branch<TimeEntry> = Branch::default();
    branch.begin_fetch(1);
    branch.fail(1);
    assert_eq!(branch.status(), LoadStatus::NotLoaded);
    assert_eq!(branch.begin_fetch(2), Some(0));
  }

  #[test]
  fn test_page_from_before_reset_is_dropped() {
    let mut branch = Branch::default();
    assert_eq!(branch.begin_fetch(1), Some(0));

    branch.reset();
    assert_eq!(branch.begin_fetch(2), Some(0));

    assert_eq!(branch.complete(1, page(0..10), 10), None);
    assert!(!branch.fail(1));
    assert!(branch.is_empty());
    assert!(branch.is_loading());

    assert_eq!(branch.complete(2, page(100..110), 10), Some(0));
    assert_eq!(branch.offset(), 10);
    assert_eq!(branch.items()[0].id, 100);
  }

  #[test]
  fn test_duplicates_are_kept() {
    let mut branch = Branch::default();
    load(&mut branch, 0..2, 2);
    load(&mut branch, 1..3, 2);

    let ids: Vec<u64> = branch.items().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![0, 1, 1, 2]);
  }

  #[test]
  fn test_prepend_does_not_move_cursor() {
    let mut branch = Branch::default();
    load(&mut branch, 0..2, 10);

    branch.prepend(entry(99));
    assert_eq!(branch.items()[0].id, 99);
    assert_eq!(branch.offset(), 2);
  }

  #[test]
  fn test_replace_and_remove() {
    let mut branch = Branch::default();
    load(&mut branch, 0..3, 10);

    let mut changed = entry(1);
    changed.comment = "changed".into();
    assert!(branch.replace(1, changed));
    assert_eq!(branch.items()[1].comment, "changed");
    assert_eq!(branch.get(1).map(|e| e.comment.as_str()), Some("changed"));
    assert!(!branch.replace(42, entry(42)));
    assert_eq!(branch.len(), 3);

    assert_eq!(branch.remove(1).map(|e| e.id), Some(1));
    assert_eq!(branch.remove(1), None);
    assert_eq!(branch.get(1), None);
    assert_eq!(branch.len(), 2);
  }

  #[test]
  fn test_reset() {
    let mut branch = Branch::default();
    load(&mut branch, 0..3, 10);

    branch.reset();
    assert_eq!(branch, Branch::default());
  }
}
