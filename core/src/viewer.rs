use serde_json::Value;

use crate::{
  expansion::{ExpansionState, OpenContext},
  models::{MatchPosition, NodeKind, RenderNode, TreeCommand},
  navigator::MatchNavigator,
  path_index::{child_index_path, child_key_path, list_container_paths, ROOT_PATH},
  search_index::{build_search_index, SearchIndex},
  search_match::{normalize_query, scalar_text},
};

/// One response document plus everything the tree view derives from it.
#[derive(Debug, Clone)]
pub struct JsonViewer {
  document: Option<Value>,
  query: String,
  index: SearchIndex,
  expansion: ExpansionState,
  navigator: MatchNavigator,
  container_paths: Vec<String>,
  default_open_depth: usize,
}

impl JsonViewer {
  pub fn new(default_open_depth: usize) -> Self {
    Self {
      document: None,
      query: String::new(),
      index: SearchIndex::default(),
      expansion: ExpansionState::new(),
      navigator: MatchNavigator::default(),
      container_paths: Vec::new(),
      default_open_depth,
    }
  }

  pub fn document(&self) -> Option<&Value> {
    self.document.as_ref()
  }

  pub fn query(&self) -> &str {
    &self.query
  }

  pub fn query_active(&self) -> bool {
    !normalize_query(&self.query).is_empty()
  }

  pub fn index(&self) -> &SearchIndex {
    &self.index
  }

  pub fn expansion(&self) -> &ExpansionState {
    &self.expansion
  }

  pub fn container_paths(&self) -> &[String] {
    &self.container_paths
  }

  /// Replace the document. Overrides are dropped; the query is kept and
  /// re-run against the new document.
  pub fn set_document(&mut self, document: Option<Value>) {
    self.container_paths = document.as_ref().map(list_container_paths).unwrap_or_default();
    self.document = document;
    self.expansion.reset();
    self.reindex();
  }

  pub fn set_query(&mut self, query: &str) {
    if query == self.query {
      return;
    }
    self.query = query.to_string();
    self.reindex();
    self.navigator.reset();
    self.expansion.on_query_changed(self.query_active());
    tracing::debug!(matches = self.index.len(), "query changed");
  }

  pub fn next_match(&mut self) -> Option<&str> {
    self.navigator.next();
    self.navigator.active_path()
  }

  pub fn prev_match(&mut self) -> Option<&str> {
    self.navigator.prev();
    self.navigator.active_path()
  }

  /// Current match, while a query is active.
  pub fn active_path(&self) -> Option<&str> {
    self.navigator.active_path()
  }

  pub fn position(&self) -> MatchPosition {
    self.navigator.position()
  }

  pub fn is_open(&self, path: &str) -> bool {
    self.expansion.is_open(path, &self.open_context())
  }

  pub fn toggle(&mut self, path: &str) -> bool {
    let ctx = OpenContext {
      query_active: self.query_active(),
      index: &self.index,
      active_path: self.navigator.active_path(),
      default_open_depth: self.default_open_depth,
    };
    self.expansion.toggle(path, &ctx)
  }

  pub fn apply(&mut self, command: TreeCommand) {
    self.expansion.apply(command, &self.container_paths);
  }

  /// Visible nodes in depth-first order. Children of closed containers are
  /// not emitted.
  pub fn render(&self) -> Vec<RenderNode> {
    let mut out = Vec::new();
    if let Some(doc) = &self.document {
      let ctx = self.open_context();
      self.render_node(ROOT_PATH, ROOT_PATH.to_string(), doc, 0, &ctx, &mut out);
    }
    out
  }

  fn render_node(
    &self,
    label: &str,
    path: String,
    value: &Value,
    depth: usize,
    ctx: &OpenContext<'_>,
    out: &mut Vec<RenderNode>,
  ) {
    let kind = node_kind(value);
    let open = kind.is_container() && self.expansion.is_open(&path, ctx);
    out.push(RenderNode {
      label: label.to_string(),
      depth,
      kind,
      open,
      matched: ctx.query_active && self.index.match_set.contains(&path),
      active: ctx.active_path == Some(path.as_str()),
      preview: preview(value),
      path: path.clone(),
    });
    if !open {
      return;
    }
    match value {
      Value::Object(map) => {
        for (k, v) in map {
          self.render_node(k, child_key_path(&path, k), v, depth + 1, ctx, out);
        }
      }
      Value::Array(items) => {
        for (i, v) in items.iter().enumerate() {
          let label = format!("[{}]", i);
          self.render_node(&label, child_index_path(&path, i), v, depth + 1, ctx, out);
        }
      }
      Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
  }

  fn open_context(&self) -> OpenContext<'_> {
    OpenContext {
      query_active: self.query_active(),
      index: &self.index,
      active_path: self.navigator.active_path(),
      default_open_depth: self.default_open_depth,
    }
  }

  fn reindex(&mut self) {
    self.index = match &self.document {
      Some(doc) => build_search_index(doc, &self.query),
      None => SearchIndex::default(),
    };
    self.navigator.set_matches(self.index.match_paths.clone());
  }
}

fn node_kind(value: &Value) -> NodeKind {
  match value {
    Value::Object(_) => NodeKind::Object,
    Value::Array(_) => NodeKind::Array,
    Value::String(_) => NodeKind::String,
    Value::Number(_) => NodeKind::Number,
    Value::Bool(_) => NodeKind::Boolean,
    Value::Null => NodeKind::Null,
  }
}

fn preview(value: &Value) -> String {
  match value {
    Value::Object(m) => format!("{{ {} {} }}", m.len(), plural(m.len(), "key", "keys")),
    Value::Array(a) => format!("[ {} {} ]", a.len(), plural(a.len(), "item", "items")),
    Value::String(s) => format!("\"{}\"", s),
    other => scalar_text(other).unwrap_or_default(),
  }
}

fn plural(n: usize, one: &'static str, many: &'static str) -> &'static str {
  if n == 1 {
    one
  } else {
    many
  }
}
