use serde::{Deserialize, Serialize};

/// One traversal step from a node to a child.
///
/// Untagged so a caller can pass a plain array like `["user", 0, "name"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum PathStep {
  Key(String),
  Index(usize),
}

/// Bulk expand/collapse request. Each value handed to the engine is applied
/// exactly once, even when it repeats the previous command.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TreeCommand {
  ExpandAll,
  CollapseAll,
}

/// "k/total" counter for the search bar.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MatchPosition {
  pub total: usize,
  pub active_index: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
  Object,
  Array,
  String,
  Number,
  Boolean,
  Null,
}

impl NodeKind {
  pub fn is_container(self) -> bool {
    matches!(self, NodeKind::Object | NodeKind::Array)
  }
}

/// Render instruction for one visible node of the response tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderNode {
  pub path: String,
  /// `root`, the object key, or `[i]` for array elements.
  pub label: String,
  pub depth: usize,
  pub kind: NodeKind,
  /// Meaningful for containers only; scalars are always `false`.
  pub open: bool,
  pub matched: bool,
  /// The navigator's current match; the renderer scrolls it into view.
  pub active: bool,
  /// `{ 3 keys }`, `[ 2 items ]`, or the scalar's display text.
  pub preview: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct HeaderRow {
  #[serde(default)]
  pub key: String,
  #[serde(default)]
  pub value: String,
}

impl HeaderRow {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      value: value.into(),
    }
  }
}

/// Raw request as typed into the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RequestDraft {
  pub url: String,
  pub method: String,
  #[serde(default)]
  pub headers_rows: Vec<HeaderRow>,
  #[serde(default)]
  pub body: String,
}

/// A successfully completed request, as kept in the history log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
  pub id: String,
  pub signature: String,
  pub method: String,
  pub url: String,
  pub headers_rows: Vec<HeaderRow>,
  pub canonical_body: String,
  /// Canonical body pretty-printed for display and for reloading the form.
  pub display_body: String,
  pub timestamp_ms: i64,
}

impl HistoryEntry {
  /// Turn the entry back into a form draft for replay.
  pub fn to_draft(&self) -> RequestDraft {
    RequestDraft {
      url: self.url.clone(),
      method: self.method.clone(),
      headers_rows: self.headers_rows.clone(),
      body: self.display_body.clone(),
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
  #[default]
  Dark,
  Light,
}

impl Theme {
  pub fn as_str(self) -> &'static str {
    match self {
      Theme::Dark => "dark",
      Theme::Light => "light",
    }
  }

  /// Unknown or missing values fall back to dark.
  pub fn parse_or_default(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      Some("light") => Theme::Light,
      _ => Theme::Dark,
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Theme::Dark => Theme::Light,
      Theme::Light => Theme::Dark,
    }
  }
}

/// What the fetch collaborator observed for one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FetchOutcome {
  /// The server answered, whatever the status.
  Response {
    status: u16,
    #[serde(default)]
    status_text: String,
    #[serde(default)]
    content_type: String,
    body: String,
    elapsed_ms: u64,
  },
  /// Transport failure: DNS, refused connection, blocked by the browser, ...
  Network { message: String },
  /// The collaborator aborted the request.
  Cancelled,
}

/// What the response panel shows after a request settles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ResponseView {
  pub status: Option<u16>,
  pub elapsed_ms: Option<u64>,
  /// Pretty-printed JSON, or the raw text for non-JSON bodies.
  pub body_text: String,
  pub error: Option<String>,
  /// True when the body was JSON and the tree view now shows it.
  pub document_loaded: bool,
  /// True when the request was written to history.
  pub recorded: bool,
  /// Set when the history entry was recorded but could not be persisted.
  #[serde(default)]
  pub persist_error: Option<String>,
}
