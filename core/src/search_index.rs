use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::{
  path_index::{ancestors, child_index_path, child_key_path, ROOT_PATH},
  search_match::PreparedSearch,
};

/// Result of searching one document for one query.
///
/// - `match_paths`: matches in first-discovery order (depth-first, entry order)
/// - `match_set`: the same paths as a set
/// - `auto_open_set`: every ancestor of every match
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchIndex {
  pub match_paths: Vec<String>,
  pub match_set: BTreeSet<String>,
  pub auto_open_set: BTreeSet<String>,
}

impl SearchIndex {
  pub fn is_empty(&self) -> bool {
    self.match_paths.is_empty()
  }

  pub fn len(&self) -> usize {
    self.match_paths.len()
  }

  fn add_match(&mut self, path: String) {
    if self.match_set.contains(&path) {
      return;
    }
    self.auto_open_set.extend(ancestors(&path));
    self.match_set.insert(path.clone());
    self.match_paths.push(path);
  }
}

/// Search `value` for `query`. A blank query yields an empty index.
pub fn build_search_index(value: &Value, query: &str) -> SearchIndex {
  let mut index = SearchIndex::default();
  let Some(prepared) = PreparedSearch::new(query) else {
    return index;
  };
  walk(value, ROOT_PATH, &prepared, &mut index);
  index
}

fn walk(value: &Value, path: &str, q: &PreparedSearch, index: &mut SearchIndex) {
  match value {
    Value::Object(map) => {
      for (k, v) in map {
        let child = child_key_path(path, k);
        if q.matches_key(k) {
          index.add_match(child.clone());
        }
        walk(v, &child, q, index);
      }
    }
    Value::Array(items) => {
      for (i, v) in items.iter().enumerate() {
        walk(v, &child_index_path(path, i), q, index);
      }
    }
    Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
      if q.matches_scalar(value) {
        index.add_match(path.to_string());
      }
    }
  }
}
