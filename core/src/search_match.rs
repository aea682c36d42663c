use serde_json::Value;

/// A query normalized once (trimmed + lowercased) and reused for every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PreparedSearch {
  pub(crate) q: String,
}

/// Lowercase first, then trim, so whitespace produced by case folding is
/// dropped as well.
pub fn normalize_query(query: &str) -> String {
  query.to_lowercase().trim().to_string()
}

impl PreparedSearch {
  /// `None` when the query is blank, i.e. search is inactive.
  pub(crate) fn new(query: &str) -> Option<Self> {
    let q = normalize_query(query);
    if q.is_empty() {
      return None;
    }
    Some(Self { q })
  }

  /// Key rule: the lowercased key equals the query or starts with it.
  ///
  /// This is narrower than whole-word matching (`banana` does not match
  /// `ana`) and must stay that way.
  pub(crate) fn matches_key(&self, key: &str) -> bool {
    key.to_lowercase().starts_with(&self.q)
  }

  /// Value rule: case-insensitive substring over the scalar's text form.
  /// Containers never match by value.
  pub(crate) fn matches_scalar(&self, value: &Value) -> bool {
    match scalar_text(value) {
      Some(text) => text.to_lowercase().contains(&self.q),
      None => false,
    }
  }
}

/// Text form of a scalar as a user would read it: strings without quotes,
/// numbers in their JSON spelling, `true`/`false`, `null`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
  match value {
    Value::Null => Some("null".to_string()),
    Value::Bool(b) => Some(b.to_string()),
    Value::Number(n) => Some(n.to_string()),
    Value::String(s) => Some(s.clone()),
    Value::Array(_) | Value::Object(_) => None,
  }
}
