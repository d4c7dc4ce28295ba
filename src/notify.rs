//! User-facing status messages.
//!
//! A single slot holds the latest notification. Writers replace whatever is
//! showing; any number of observers can read or watch the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Success,
  Error,
  Warning,
  Info,
}

impl Severity {
  /// How long a notification of this severity stays up by default.
  pub fn default_timeout(&self) -> Duration {
    match self {
      Severity::Success => Duration::from_millis(3000),
      Severity::Error | Severity::Warning | Severity::Info => Duration::from_millis(5000),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Severity::Success => "success",
      Severity::Error => "error",
      Severity::Warning => "warning",
      Severity::Info => "info",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  /// Sequence number, increasing per notifier
  pub id: u64,
  pub message: String,
  pub severity: Severity,
  pub timeout: Duration,
}

/// Shared handle to the notification slot. Clones write to the same slot.
#[derive(Clone)]
pub struct Notifier {
  slot: Arc<watch::Sender<Option<Notification>>>,
  next_id: Arc<AtomicU64>,
}

impl Default for Notifier {
  fn default() -> Self {
    Self::new()
  }
}

impl Notifier {
  pub fn new() -> Self {
    let (tx, _rx) = watch::channel(None);
    Self {
      slot: Arc::new(tx),
      next_id: Arc::new(AtomicU64::new(1)),
    }
  }

  /// Replace the current notification, using the severity's default timeout.
  pub fn show(&self, message: impl Into<String>, severity: Severity) -> u64 {
    self.show_with_timeout(message, severity, severity.default_timeout())
  }

  pub fn show_with_timeout(
    &self,
    message: impl Into<String>,
    severity: Severity,
    timeout: Duration,
  ) -> u64 {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let notification = Notification {
      id,
      message: message.into(),
      severity,
      timeout,
    };
    debug!(id, severity = severity.as_str(), message = %notification.message, "notify");
    self.slot.send_replace(Some(notification));
    id
  }

  pub fn success(&self, message: impl Into<String>) -> u64 {
    self.show(message, Severity::Success)
  }

  pub fn error(&self, message: impl Into<String>) -> u64 {
    self.show(message, Severity::Error)
  }

  pub fn warning(&self, message: impl Into<String>) -> u64 {
    self.show(message, Severity::Warning)
  }

  pub fn info(&self, message: impl Into<String>) -> u64 {
    self.show(message, Severity::Info)
  }

  pub fn clear(&self) {
    self.slot.send_replace(None);
  }

  /// Clear only if notification `id` is still the one showing.
  pub fn dismiss(&self, id: u64) -> bool {
    self.slot.send_if_modified(|current| {
      if current.as_ref().is_some_and(|n| n.id == id) {
        *current = None;
        true
      } else {
        false
      }
    })
  }

  pub fn current(&self) -> Option<Notification> {
    self.slot.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
    self.slot.subscribe()
  }

  /// Spawn a task that clears each notification once its timeout elapses.
  ///
  /// A notification replaced before its timeout is never cleared by its own
  /// timer. The task runs until aborted through the returned handle.
  pub fn spawn_auto_dismiss(&self) -> JoinHandle<()> {
    let notifier = self.clone();
    let mut rx = self.subscribe();

    tokio::spawn(async move {
      loop {
        let current = rx.borrow_and_update().clone();
        if let Some(notification) = current {
          tokio::select! {
            _ = tokio::time::sleep(notification.timeout) => {
              notifier.dismiss(notification.id);
            }
            changed = rx.changed() => {
              if changed.is_err() {
                break;
              }
              continue;
            }
          }
        }
        if rx.changed().await.is_err() {
          break;
        }
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_timeouts() {
    assert_eq!(Severity::Success.default_timeout(), Duration::from_millis(3000));
    assert_eq!(Severity::Error.default_timeout(), Duration::from_millis(5000));
    assert_eq!(Severity::Warning.default_timeout(), Duration::from_millis(5000));
    assert_eq!(Severity::Info.default_timeout(), Duration::from_millis(5000));
  }

  #[test]
  fn test_show_replaces_without_queueing() {
    let notifier = Notifier::new();
    notifier.error("first");
    notifier.success("second");

    let current = notifier.current().unwrap();
    assert_eq!(current.message, "second");
    assert_eq!(current.severity, Severity::Success);
    assert_eq!(current.timeout, Duration::from_millis(3000));
  }

  #[test]
  fn test_clones_share_the_slot() {
    let notifier = Notifier::new();
    let other = notifier.clone();
    other.info("hello");
    assert_eq!(notifier.current().map(|n| n.message), Some("hello".into()));

    notifier.clear();
    assert!(other.current().is_none());
  }

  #[test]
  fn test_dismiss_only_matching_id() {
    let notifier = Notifier::new();
    let first = notifier.warning("one");
    let second = notifier.warning("two");
    assert!(second > first);

    assert!(!notifier.dismiss(first));
    assert_eq!(notifier.current().map(|n| n.id), Some(second));
    assert!(notifier.dismiss(second));
    assert!(notifier.current().is_none());
  }

  #[tokio::test]
  async fn test_subscribers_see_latest() {
    let notifier = Notifier::new();
    let mut rx = notifier.subscribe();

    notifier.error("boom");
    rx.changed().await.unwrap();
    assert_eq!(
      rx.borrow_and_update().as_ref().map(|n| n.severity),
      Some(Severity::Error)
    );
  }

  #[tokio::test(start_paused = true)]
  async fn test_auto_dismiss_after_timeout() {
    let notifier = Notifier::new();
    let handle = notifier.spawn_auto_dismiss();

    notifier.success("saved");
    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(notifier.current().is_some());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(notifier.current().is_none());

    handle.abort();
  }

  #[tokio::test(start_paused = true)]
  async fn test_replacement_restarts_timer() {
    let notifier = Notifier::new();
    let handle = notifier.spawn_auto_dismiss();

    notifier.success("first");
    tokio::time::sleep(Duration::from_millis(2000)).await;
    notifier.error("second");

    // first's timer would have fired at 3000ms
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(notifier.current().map(|n| n.message), Some("second".into()));

    tokio::time::sleep(Duration::from_millis(4000)).await;
    assert!(notifier.current().is_none());

    handle.abort();
  }
}
