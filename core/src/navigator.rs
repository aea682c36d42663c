use crate::models::MatchPosition;

/// Cyclic cursor over the ordered match list.
#[derive(Debug, Clone, Default)]
pub struct MatchNavigator {
  paths: Vec<String>,
  active_index: usize,
}

impl MatchNavigator {
  pub fn new(paths: Vec<String>) -> Self {
    Self {
      paths,
      active_index: 0,
    }
  }

  /// Replace the match list, keeping the cursor where it was if still in range.
  pub fn set_matches(&mut self, paths: Vec<String>) {
    self.paths = paths;
    self.clamp();
  }

  /// Back to the first match; used when the query text changes.
  pub fn reset(&mut self) {
    self.active_index = 0;
  }

  pub fn next(&mut self) {
    let n = self.paths.len();
    if n == 0 {
      return;
    }
    self.active_index = (self.active_index + 1) % n;
  }

  pub fn prev(&mut self) {
    let n = self.paths.len();
    if n == 0 {
      return;
    }
    self.active_index = (self.active_index + n - 1) % n;
  }

  pub fn active_index(&self) -> usize {
    self.active_index
  }

  pub fn active_path(&self) -> Option<&str> {
    self.paths.get(self.active_index).map(String::as_str)
  }

  pub fn paths(&self) -> &[String] {
    &self.paths
  }

  pub fn position(&self) -> MatchPosition {
    MatchPosition {
      total: self.paths.len(),
      active_index: self.active_index,
    }
  }

  fn clamp(&mut self) {
    if self.paths.is_empty() {
      self.active_index = 0;
    } else if self.active_index >= self.paths.len() {
      self.active_index = self.paths.len() - 1;
    }
  }
}
