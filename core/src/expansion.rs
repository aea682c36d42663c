use std::{collections::BTreeSet, sync::Arc};

use crate::{
  models::TreeCommand,
  path_index::{depth, prefixes, ROOT_PATH},
  search_index::SearchIndex,
};

/// Inputs the open/closed resolution needs besides the overrides.
#[derive(Debug, Clone, Copy)]
pub struct OpenContext<'a> {
  pub query_active: bool,
  pub index: &'a SearchIndex,
  pub active_path: Option<&'a str>,
  pub default_open_depth: usize,
}

/// Per-path open/closed overrides set by the user.
///
/// `forced_open` and `forced_closed` are disjoint. Both are shared snapshots:
/// mutation goes through `Arc::make_mut`, so a snapshot handed out earlier is
/// never changed underneath its holder.
#[derive(Debug, Clone, Default)]
pub struct ExpansionState {
  forced_open: Arc<BTreeSet<String>>,
  forced_closed: Arc<BTreeSet<String>>,
  revision: u64,
}

impl ExpansionState {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn forced_open(&self) -> Arc<BTreeSet<String>> {
    self.forced_open.clone()
  }

  pub fn forced_closed(&self) -> Arc<BTreeSet<String>> {
    self.forced_closed.clone()
  }

  /// Bumped on every mutation.
  pub fn revision(&self) -> u64 {
    self.revision
  }

  /// Resolve whether `path` renders expanded.
  ///
  /// Precedence: forced open, forced closed, then search reveal while a query
  /// is active, then the default depth rule.
  pub fn is_open(&self, path: &str, ctx: &OpenContext<'_>) -> bool {
    if self.forced_open.contains(path) {
      return true;
    }
    if self.forced_closed.contains(path) {
      return false;
    }
    if ctx.query_active {
      if ctx.index.auto_open_set.contains(path) {
        return true;
      }
      return match ctx.active_path {
        Some(active) => prefixes(active).iter().any(|p| p == path),
        None => false,
      };
    }
    depth(path) < ctx.default_open_depth
  }

  /// Flip `path` relative to its currently resolved state. Returns the new state.
  pub fn toggle(&mut self, path: &str, ctx: &OpenContext<'_>) -> bool {
    let open_now = self.is_open(path, ctx);
    if open_now {
      Arc::make_mut(&mut self.forced_open).remove(path);
      Arc::make_mut(&mut self.forced_closed).insert(path.to_string());
    } else {
      Arc::make_mut(&mut self.forced_closed).remove(path);
      Arc::make_mut(&mut self.forced_open).insert(path.to_string());
    }
    self.revision += 1;
    !open_now
  }

  /// Apply a bulk command over the document's container paths.
  ///
  /// The root always stays open so the top-level structure remains visible.
  pub fn apply(&mut self, command: TreeCommand, container_paths: &[String]) {
    match command {
      TreeCommand::ExpandAll => {
        self.forced_closed = Arc::new(BTreeSet::new());
        self.forced_open = Arc::new(container_paths.iter().cloned().collect());
      }
      TreeCommand::CollapseAll => {
        self.forced_open = Arc::new(BTreeSet::from([ROOT_PATH.to_string()]));
        self.forced_closed = Arc::new(
          container_paths
            .iter()
            .filter(|p| p.as_str() != ROOT_PATH)
            .cloned()
            .collect(),
        );
      }
    }
    self.revision += 1;
  }

  /// A live search gets to reveal matches the user collapsed earlier.
  /// Explicitly opened paths are kept.
  pub fn on_query_changed(&mut self, query_active: bool) {
    if query_active && !self.forced_closed.is_empty() {
      self.forced_closed = Arc::new(BTreeSet::new());
      self.revision += 1;
    }
  }

  /// Drop every override; paths from a previous document mean nothing now.
  pub fn reset(&mut self) {
    self.forced_open = Arc::new(BTreeSet::new());
    self.forced_closed = Arc::new(BTreeSet::new());
    self.revision += 1;
  }
}
