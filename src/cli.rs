//! Command-line front end over the cache.

use chrono::{SecondsFormat, Utc};
use clap::{Args, Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use futures::future::join_all;
use std::path::PathBuf;

use crate::api::payloads::{NewTimeEntry, TimeEntryUpdate};
use crate::api::types::{Client, Project, Task, TimeEntry};
use crate::api::Transport;
use crate::cache::{BranchKey, Clients, ProjectsOf, Sort, Store, TasksOf, TimeEntries};
use crate::notify::Notification;

#[derive(Parser, Debug)]
#[command(name = "timetrack")]
#[command(about = "Browse clients, projects and tasks, and keep time entries")]
#[command(version)]
pub struct Cli {
  /// Path to config file (default: $XDG_CONFIG_HOME/timetrack/config.yaml)
  #[arg(short, long, global = true)]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List clients
  Clients(PageArgs),

  /// List the projects of a client
  Projects {
    /// Client id
    #[arg(required_unless_present = "all")]
    client_id: Option<u64>,

    /// First page of projects for every listed client
    #[arg(long)]
    all: bool,

    #[command(flatten)]
    page: PageArgs,
  },

  /// List the tasks of a project
  Tasks {
    client_id: u64,
    project_id: u64,

    #[command(flatten)]
    page: PageArgs,
  },

  /// List time entries
  Entries(PageArgs),

  /// Record a time entry
  Log(LogArgs),

  /// Change a time entry
  Edit(EditArgs),

  /// Delete a time entry
  Rm {
    /// Time entry id
    id: u64,
  },
}

#[derive(Args, Debug, Clone)]
pub struct PageArgs {
  /// Number of pages to fetch
  #[arg(long, default_value_t = 1)]
  pub pages: usize,

  /// Field to sort by on the server
  #[arg(long)]
  pub sort_by: Option<String>,

  /// Sort descending (only with --sort-by)
  #[arg(long, requires = "sort_by")]
  pub desc: bool,
}

impl PageArgs {
  fn sort(&self) -> Option<Sort> {
    self.sort_by.as_ref().map(|field| {
      if self.desc {
        Sort::desc(field.clone())
      } else {
        Sort::asc(field.clone())
      }
    })
  }
}

#[derive(Args, Debug)]
pub struct LogArgs {
  /// Task the time was spent on
  #[arg(long)]
  pub task: u64,

  #[arg(long, default_value = "")]
  pub comment: String,

  /// RFC 3339 start time (default: now)
  #[arg(long)]
  pub start: Option<String>,

  /// RFC 3339 end time (default: now)
  #[arg(long)]
  pub end: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
  /// Time entry id
  pub id: u64,

  #[arg(long)]
  pub task: Option<u64>,

  #[arg(long)]
  pub comment: Option<String>,

  #[arg(long)]
  pub start: Option<String>,

  #[arg(long)]
  pub end: Option<String>,
}

/// Execute one command against the store and print the result.
pub async fn run<T: Transport>(store: &Store<T>, command: Command) -> Result<()> {
  let result = dispatch(store, command).await;
  if let Some(notification) = store.notifier().current() {
    print_notification(&notification);
  }
  result
}

async fn dispatch<T: Transport>(store: &Store<T>, command: Command) -> Result<()> {
  match command {
    Command::Clients(page) => {
      fetch_pages(store, &Clients, &page, "Failed to fetch clients").await?;
      store.clients().iter().for_each(print_client);
      print_more(store, &Clients);
    }
    Command::Projects {
      client_id: Some(client_id),
      all: false,
      page,
    } => {
      find_client(store, client_id).await?;
      let key = ProjectsOf(client_id);
      fetch_pages(store, &key, &page, "Failed to fetch projects").await?;
      store.items(&key).unwrap_or_default().iter().for_each(print_project);
      print_more(store, &key);
    }
    Command::Projects { page, .. } => {
      fetch_pages(store, &Clients, &page, "Failed to fetch clients").await?;
      let clients = store.clients();
      let sort = page.sort();

      // Each client's projects are an independent branch
      let results = join_all(
        clients
          .iter()
          .map(|client| store.fetch_projects(client.id, sort.as_ref())),
      )
      .await;
      let failed = results.iter().filter(|r| r.is_err()).count();

      for client in store.clients() {
        print_client(&client);
        client.projects.items().iter().for_each(|p| {
          print!("  ");
          print_project(p);
        });
      }
      if failed > 0 {
        return Err(eyre!("{} of {} project fetches failed", failed, results.len()));
      }
    }
    Command::Tasks {
      client_id,
      project_id,
      page,
    } => {
      find_client(store, client_id).await?;
      find_project(store, client_id, project_id).await?;
      let key = TasksOf(project_id);
      fetch_pages(store, &key, &page, "Failed to fetch tasks").await?;
      store.items(&key).unwrap_or_default().iter().for_each(print_task);
      print_more(store, &key);
    }
    Command::Entries(page) => {
      fetch_pages(store, &TimeEntries, &page, "Failed to fetch time entries").await?;
      store.time_entries().iter().for_each(print_entry);
      print_more(store, &TimeEntries);
    }
    Command::Log(args) => {
      let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
      let entry = NewTimeEntry {
        task_id: args.task,
        comment: args.comment,
        start: args.start.unwrap_or_else(|| now.clone()),
        end: args.end.unwrap_or(now),
      };
      let created = store.create_time_entry(&entry).await?;
      print_entry(&created);
    }
    Command::Edit(args) => {
      let update = TimeEntryUpdate {
        task_id: args.task,
        comment: args.comment,
        start: args.start,
        end: args.end,
      };
      if update.is_empty() {
        return Err(eyre!("Nothing to change. Pass at least one of --task, --comment, --start, --end."));
      }
      let updated = store.update_time_entry(args.id, &update).await?;
      print_entry(&updated);
    }
    Command::Rm { id } => {
      store.delete_time_entry(id).await?;
    }
  }
  Ok(())
}

/// Fetch up to `page.pages` pages, stopping early once the branch is exhausted.
async fn fetch_pages<T: Transport, K: BranchKey>(
  store: &Store<T>,
  key: &K,
  page: &PageArgs,
  failure_message: &str,
) -> Result<()> {
  let sort = page.sort();
  for _ in 0..page.pages.max(1) {
    if !store.has_more(key) {
      break;
    }
    store
      .fetch_next_page(key, sort.as_ref(), failure_message)
      .await?;
  }
  Ok(())
}

/// Page through clients until `client_id` shows up.
async fn find_client<T: Transport>(store: &Store<T>, client_id: u64) -> Result<Client> {
  loop {
    if let Some(client) = store.client(client_id) {
      return Ok(client);
    }
    if !store.has_more(&Clients) {
      return Err(eyre!("Client {} not found", client_id));
    }
    store.fetch_clients(None).await?;
  }
}

/// Page through `client_id`'s projects until `project_id` shows up there.
async fn find_project<T: Transport>(
  store: &Store<T>,
  client_id: u64,
  project_id: u64,
) -> Result<Project> {
  let key = ProjectsOf(client_id);
  loop {
    let owned = store.read(|graph| {
      graph
        .projects_branch(client_id)
        .and_then(|projects| projects.get(project_id))
        .cloned()
    });
    if let Some(project) = owned {
      return Ok(project);
    }
    if !store.has_more(&key) {
      return Err(eyre!("Project {} not found for client {}", project_id, client_id));
    }
    store.fetch_projects(client_id, None).await?;
  }
}

fn print_client(client: &Client) {
  println!(
    "{:>6}  {:<12} {}",
    client.id,
    client.status.as_str(),
    client.name
  );
}

fn print_project(project: &Project) {
  println!(
    "{:>6}  {:<12} {}",
    project.id,
    project.status.as_str(),
    project.name
  );
}

fn print_task(task: &Task) {
  println!("{:>6}  {:<12} {}", task.id, task.status.as_str(), task.name);
}

fn print_entry(entry: &TimeEntry) {
  let duration = entry
    .duration()
    .map(|d| format!("{}h{:02}m", d.num_hours(), d.num_minutes() % 60))
    .unwrap_or_else(|| "-".to_string());
  println!(
    "{:>6}  task {:<6} {} .. {}  {:>7}  {}",
    entry.id, entry.task_id, entry.start, entry.end, duration, entry.comment
  );
}

fn print_more<T: Transport, K: BranchKey>(store: &Store<T>, key: &K) {
  if store.has_more(key) {
    println!("(more {} available, use --pages)", key);
  }
}

fn print_notification(notification: &Notification) {
  eprintln!(
    "[{}] {}",
    notification.severity.as_str(),
    notification.message
  );
}
