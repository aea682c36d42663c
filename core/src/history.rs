use serde::Serialize;
use serde_json::Value;

use crate::{
  engine::CoreError,
  models::{HeaderRow, HistoryEntry},
};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Methods that carry a JSON body.
pub fn method_has_body(method: &str) -> bool {
  matches!(method, "POST" | "PUT" | "PATCH")
}

/// Trim rows, drop empty keys, collapse case-insensitive duplicate keys to the
/// last value. A collapsed key keeps the position of its first occurrence.
pub fn normalize_header_rows(rows: &[HeaderRow]) -> Vec<HeaderRow> {
  let mut out: Vec<HeaderRow> = Vec::new();
  for r in rows {
    let key = r.key.trim();
    if key.is_empty() {
      continue;
    }
    let value = r.value.trim();
    let lower = key.to_lowercase();
    match out.iter_mut().find(|h| h.key.to_lowercase() == lower) {
      Some(existing) => {
        existing.key = key.to_string();
        existing.value = value.to_string();
      }
      None => out.push(HeaderRow::new(key, value)),
    }
  }
  out
}

/// `(lowercased key, value)` pairs sorted by key.
pub fn headers_signature(rows: &[HeaderRow]) -> Vec<(String, String)> {
  let mut pairs: Vec<(String, String)> = normalize_header_rows(rows)
    .into_iter()
    .map(|h| (h.key.to_lowercase(), h.value))
    .collect();
  pairs.sort_by(|a, b| a.0.cmp(&b.0));
  pairs
}

/// Compact re-serialization of the body for body-bearing methods, empty otherwise.
///
/// Invalid JSON is a validation error for the caller to surface before any
/// network call.
pub fn canonical_body(method: &str, body: &str) -> Result<String, CoreError> {
  if !method_has_body(method) {
    return Ok(String::new());
  }
  let trimmed = body.trim();
  if trimmed.is_empty() {
    return Ok(String::new());
  }
  let parsed: Value =
    serde_json::from_str(trimmed).map_err(|e| CoreError::InvalidBody(e.to_string()))?;
  Ok(serde_json::to_string(&parsed)?)
}

/// Pretty form of a canonical body, as shown in the history list.
pub fn display_body(canonical: &str) -> String {
  if canonical.is_empty() {
    return String::new();
  }
  serde_json::from_str::<Value>(canonical)
    .and_then(|v| serde_json::to_string_pretty(&v))
    .unwrap_or_else(|_| canonical.to_string())
}

#[derive(Serialize)]
struct SignatureParts<'a> {
  url: &'a str,
  method: &'a str,
  headers: Vec<(String, String)>,
  body: &'a str,
}

/// Canonical identity of a request. Two requests are the same iff their
/// signatures are equal.
pub fn request_signature(
  url: &str,
  method: &str,
  headers_rows: &[HeaderRow],
  canonical_body: &str,
) -> String {
  let parts = SignatureParts {
    url: url.trim(),
    method: &method.to_uppercase(),
    headers: headers_signature(headers_rows),
    body: canonical_body,
  };
  // Plain strings and string pairs always serialize.
  serde_json::to_string(&parts).unwrap_or_default()
}

/// Ordered, capped log of successful requests, newest first.
#[derive(Debug, Clone)]
pub struct HistoryLog {
  entries: Vec<HistoryEntry>,
  limit: usize,
}

impl Default for HistoryLog {
  fn default() -> Self {
    Self::new(DEFAULT_HISTORY_LIMIT)
  }
}

impl HistoryLog {
  pub fn new(limit: usize) -> Self {
    Self {
      entries: Vec::new(),
      limit: limit.max(1),
    }
  }

  /// Rebuild from persisted entries, enforcing the limit and signature
  /// uniqueness in case the stored list was edited by hand.
  pub fn from_entries(entries: Vec<HistoryEntry>, limit: usize) -> Self {
    let mut log = Self::new(limit);
    for e in entries {
      if log.entries.len() >= log.limit {
        break;
      }
      if log.entries.iter().any(|x| x.signature == e.signature) {
        continue;
      }
      log.entries.push(e);
    }
    log
  }

  /// Insert-or-promote: drop any entry with the same signature, prepend, truncate.
  /// Returns true when an existing entry was promoted rather than added.
  pub fn record(&mut self, entry: HistoryEntry) -> bool {
    let before = self.entries.len();
    self.entries.retain(|x| x.signature != entry.signature);
    let promoted = self.entries.len() != before;
    self.entries.insert(0, entry);
    self.entries.truncate(self.limit);
    promoted
  }

  pub fn remove(&mut self, id: &str) -> bool {
    let before = self.entries.len();
    self.entries.retain(|x| x.id != id);
    self.entries.len() != before
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
    self.entries.iter().find(|x| x.id == id)
  }

  pub fn entries(&self) -> &[HistoryEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn limit(&self) -> usize {
    self.limit
  }
}
