use serde_json::Value;

use crate::models::PathStep;

/// Path of the document root. Every other path starts with it.
pub const ROOT_PATH: &str = "root";

pub fn child_key_path(parent: &str, key: &str) -> String {
  format!("{}.{}", parent, key)
}

pub fn child_index_path(parent: &str, index: usize) -> String {
  format!("{}.[{}]", parent, index)
}

/// Build the path reached by walking `steps` from the root.
pub fn path_of(steps: &[PathStep]) -> String {
  let mut path = ROOT_PATH.to_string();
  for step in steps {
    path = match step {
      PathStep::Key(k) => child_key_path(&path, k),
      PathStep::Index(i) => child_index_path(&path, *i),
    };
  }
  path
}

/// Every prefix of `path` split on `.`, root first, `path` itself last.
///
/// Keys that contain a `.` produce extra prefixes; paths are addresses for the
/// tree renderer, not a reversible encoding.
pub fn prefixes(path: &str) -> Vec<String> {
  let mut out = Vec::new();
  let mut cur = String::with_capacity(path.len());
  for (i, part) in path.split('.').enumerate() {
    if i > 0 {
      cur.push('.');
    }
    cur.push_str(part);
    out.push(cur.clone());
  }
  out
}

/// Proper prefixes of `path` (its ancestors), root first.
pub fn ancestors(path: &str) -> Vec<String> {
  let mut out = prefixes(path);
  out.pop();
  out
}

/// Number of `.`-separated segments minus one; the root has depth 0.
pub fn depth(path: &str) -> usize {
  path.split('.').count().saturating_sub(1)
}

/// Depth-first, entry-order list of every object/array path under `value`.
pub fn list_container_paths(value: &Value) -> Vec<String> {
  let mut out = Vec::new();
  collect_containers(value, ROOT_PATH.to_string(), &mut out);
  out
}

fn collect_containers(value: &Value, path: String, out: &mut Vec<String>) {
  match value {
    Value::Object(map) => {
      out.push(path.clone());
      for (k, v) in map {
        collect_containers(v, child_key_path(&path, k), out);
      }
    }
    Value::Array(items) => {
      out.push(path.clone());
      for (i, v) in items.iter().enumerate() {
        collect_containers(v, child_index_path(&path, i), out);
      }
    }
    Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
  }
}
