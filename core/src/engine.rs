use std::{env, path::PathBuf, sync::Arc};

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
  history::{display_body, HistoryLog, DEFAULT_HISTORY_LIMIT},
  models::{
    FetchOutcome, HistoryEntry, MatchPosition, RenderNode, RequestDraft, ResponseView, Theme,
    TreeCommand,
  },
  request::{
    http_error_message, is_json_content_type, is_success_status, network_error_message,
    prepare_request, PreparedRequest, CANCELLED_MESSAGE,
  },
  storage::{self, KvStore, Storage, StorageOptions},
  tasks::{now_ms, RequestTicket, RequestTracker},
  viewer::JsonViewer,
};

#[derive(Debug, Error)]
pub enum CoreError {
  #[error("invalid url: {0}")]
  InvalidUrl(String),
  #[error("invalid JSON body: {0}")]
  InvalidBody(String),
  #[error("request superseded: {0}")]
  Superseded(String),
  #[error("invalid argument: {0}")]
  InvalidArg(String),
  #[error("storage error: {0}")]
  Storage(String),
  #[error("json error: {0}")]
  Serde(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct CoreOptions {
  pub history_limit: usize,
  /// Without a query, containers shallower than this render open.
  pub default_open_depth: usize,
  pub storage: StorageOptions,
}

impl Default for CoreOptions {
  fn default() -> Self {
    Self {
      history_limit: DEFAULT_HISTORY_LIMIT,
      default_open_depth: 2,
      storage: StorageOptions::default(),
    }
  }
}

impl CoreOptions {
  /// Defaults overridden by `AP_HISTORY_LIMIT`, `AP_DEFAULT_OPEN_DEPTH` and
  /// `AP_STORAGE_PATH`. Unparseable values are logged and ignored.
  pub fn from_env() -> Self {
    let mut opts = Self::default();
    if let Some(v) = env_parse("AP_HISTORY_LIMIT") {
      opts.history_limit = v;
    }
    if let Some(v) = env_parse("AP_DEFAULT_OPEN_DEPTH") {
      opts.default_open_depth = v;
    }
    if let Ok(path) = env::var("AP_STORAGE_PATH") {
      if !path.trim().is_empty() {
        opts.storage.sqlite_path = Some(PathBuf::from(path));
      }
    }
    opts
  }
}

fn env_parse(name: &str) -> Option<usize> {
  let raw = env::var(name).ok()?;
  match raw.trim().parse() {
    Ok(v) => Some(v),
    Err(_) => {
      tracing::warn!(var = name, value = %raw, "invalid value, using default");
      None
    }
  }
}

struct SessionState {
  viewer: JsonViewer,
  history: HistoryLog,
  theme: Theme,
  last_response: Option<ResponseView>,
}

/// One user session: the response tree, search, history and theme.
///
/// Cloning shares the session.
#[derive(Clone)]
pub struct CoreEngine {
  options: CoreOptions,
  state: Arc<Mutex<SessionState>>,
  requests: RequestTracker,
  store: Arc<dyn KvStore>,
}

impl CoreEngine {
  /// Open the SQLite store from `options.storage` and load persisted state.
  pub fn new(options: CoreOptions) -> Result<Self, CoreError> {
    let storage = Storage::new(options.storage.clone()).map_err(CoreError::Storage)?;
    Ok(Self::with_store(options, Arc::new(storage)))
  }

  /// Use a caller-provided store. History and theme are loaded once, here.
  pub fn with_store(options: CoreOptions, store: Arc<dyn KvStore>) -> Self {
    let history = storage::load_history(store.as_ref(), options.history_limit);
    let theme = storage::load_theme(store.as_ref());
    tracing::debug!(entries = history.len(), theme = theme.as_str(), "session loaded");
    let state = SessionState {
      viewer: JsonViewer::new(options.default_open_depth),
      history,
      theme,
      last_response: None,
    };
    Self {
      options,
      state: Arc::new(Mutex::new(state)),
      requests: RequestTracker::new(),
      store,
    }
  }

  pub fn options(&self) -> &CoreOptions {
    &self.options
  }

  // ---- requests ----

  /// Validate a draft and register it as the in-flight request, superseding
  /// any earlier one. Validation failures touch nothing.
  pub fn begin_request(
    &self,
    draft: &RequestDraft,
  ) -> Result<(RequestTicket, PreparedRequest), CoreError> {
    let prepared = prepare_request(draft)?;
    let ticket = self.requests.begin(prepared.clone());
    Ok((ticket, prepared))
  }

  /// Replay a history entry as a new request.
  pub fn replay(&self, history_id: &str) -> Result<(RequestTicket, PreparedRequest), CoreError> {
    let draft = self
      .state
      .lock()
      .history
      .get(history_id)
      .map(HistoryEntry::to_draft)
      .ok_or_else(|| CoreError::InvalidArg(format!("unknown history entry: {history_id}")))?;
    self.begin_request(&draft)
  }

  pub fn in_flight(&self) -> Option<RequestTicket> {
    self.requests.in_flight()
  }

  /// Whether `ticket` is still the request whose outcome will be shown.
  pub fn is_current(&self, ticket: &RequestTicket) -> bool {
    self.requests.is_current(ticket)
  }

  /// Commit the outcome of `ticket`.
  ///
  /// A superseded ticket is rejected with `CoreError::Superseded` and changes
  /// nothing. Only 2xx responses reach history. The session is always fully
  /// committed; a failed history write is logged and reported in
  /// `ResponseView::persist_error`.
  pub fn complete_request(
    &self,
    ticket: &RequestTicket,
    outcome: FetchOutcome,
  ) -> Result<ResponseView, CoreError> {
    let Some(request) = self.requests.settle(ticket) else {
      tracing::debug!(seq = ticket.seq, "discarding result of superseded request");
      return Err(CoreError::Superseded(ticket.id.clone()));
    };

    let mut state = self.state.lock();
    let mut view = ResponseView::default();
    let mut document: Option<Value> = None;

    match outcome {
      FetchOutcome::Response {
        status,
        status_text,
        content_type,
        body,
        elapsed_ms,
      } => {
        view.status = Some(status);
        view.elapsed_ms = Some(elapsed_ms);
        if is_success_status(status) {
          let entry = history_entry(&request);
          let promoted = state.history.record(entry);
          tracing::debug!(method = %request.method, url = %request.url, promoted, "history updated");
          view.recorded = true;
          if let Err(e) = storage::save_history(self.store.as_ref(), &state.history) {
            tracing::warn!(error = %e, "failed to persist history");
            view.persist_error = Some(e);
          }

          let parsed = if is_json_content_type(&content_type) {
            serde_json::from_str::<Value>(&body).ok()
          } else {
            None
          };
          match parsed {
            Some(v) => {
              view.body_text = serde_json::to_string_pretty(&v).unwrap_or_else(|_| body.clone());
              view.document_loaded = true;
              document = Some(v);
            }
            None => view.body_text = body,
          }
        } else {
          view.error = Some(http_error_message(status, &status_text, &content_type, &body));
        }
      }
      FetchOutcome::Network { message } => {
        view.error = Some(network_error_message(&message));
      }
      FetchOutcome::Cancelled => {
        view.error = Some(CANCELLED_MESSAGE.to_string());
      }
    }

    state.viewer.set_document(document);
    state.last_response = Some(view.clone());
    Ok(view)
  }

  pub fn last_response(&self) -> Option<ResponseView> {
    self.state.lock().last_response.clone()
  }

  /// Clear the response panel and the tree.
  pub fn clear_response(&self) {
    let mut state = self.state.lock();
    state.last_response = None;
    state.viewer.set_document(None);
  }

  // ---- tree view ----

  /// Show a document directly, e.g. one parsed by the host.
  pub fn set_document(&self, document: Option<Value>) {
    self.state.lock().viewer.set_document(document);
  }

  pub fn set_query(&self, query: &str) -> MatchPosition {
    let mut state = self.state.lock();
    state.viewer.set_query(query);
    state.viewer.position()
  }

  pub fn next_match(&self) -> Option<String> {
    self.state.lock().viewer.next_match().map(str::to_string)
  }

  pub fn prev_match(&self) -> Option<String> {
    self.state.lock().viewer.prev_match().map(str::to_string)
  }

  pub fn active_path(&self) -> Option<String> {
    self.state.lock().viewer.active_path().map(str::to_string)
  }

  pub fn match_position(&self) -> MatchPosition {
    self.state.lock().viewer.position()
  }

  pub fn toggle(&self, path: &str) -> bool {
    self.state.lock().viewer.toggle(path)
  }

  pub fn dispatch(&self, command: TreeCommand) {
    self.state.lock().viewer.apply(command);
  }

  pub fn is_open(&self, path: &str) -> bool {
    self.state.lock().viewer.is_open(path)
  }

  pub fn render(&self) -> Vec<RenderNode> {
    self.state.lock().viewer.render()
  }

  /// Run `f` against the viewer under the session lock.
  pub fn with_viewer<R>(&self, f: impl FnOnce(&JsonViewer) -> R) -> R {
    f(&self.state.lock().viewer)
  }

  // ---- history ----

  pub fn history(&self) -> Vec<HistoryEntry> {
    self.state.lock().history.entries().to_vec()
  }

  // Edits below are persisted before they replace the session copy, so a
  // failed write leaves the session unchanged.

  pub fn remove_history(&self, id: &str) -> Result<bool, CoreError> {
    let mut state = self.state.lock();
    let mut next = state.history.clone();
    if !next.remove(id) {
      return Ok(false);
    }
    storage::save_history(self.store.as_ref(), &next).map_err(CoreError::Storage)?;
    state.history = next;
    Ok(true)
  }

  pub fn clear_history(&self) -> Result<(), CoreError> {
    let mut state = self.state.lock();
    let mut next = state.history.clone();
    next.clear();
    storage::save_history(self.store.as_ref(), &next).map_err(CoreError::Storage)?;
    state.history = next;
    Ok(())
  }

  // ---- theme ----

  pub fn theme(&self) -> Theme {
    self.state.lock().theme
  }

  pub fn set_theme(&self, theme: Theme) -> Result<(), CoreError> {
    let mut state = self.state.lock();
    storage::save_theme(self.store.as_ref(), theme).map_err(CoreError::Storage)?;
    state.theme = theme;
    Ok(())
  }

  pub fn toggle_theme(&self) -> Result<Theme, CoreError> {
    let mut state = self.state.lock();
    let next = state.theme.toggled();
    storage::save_theme(self.store.as_ref(), next).map_err(CoreError::Storage)?;
    state.theme = next;
    Ok(next)
  }
}

fn history_entry(request: &PreparedRequest) -> HistoryEntry {
  HistoryEntry {
    id: Uuid::new_v4().to_string(),
    signature: request.signature.clone(),
    method: request.method.clone(),
    url: request.url.clone(),
    headers_rows: request.headers_rows.clone(),
    canonical_body: request.canonical_body.clone(),
    display_body: display_body(&request.canonical_body),
    timestamp_ms: now_ms(),
  }
}
