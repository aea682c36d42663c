mod engine;
mod expansion;
mod history;
mod models;
mod navigator;
mod path_index;
mod request;
mod search_index;
mod search_match;
mod storage;
mod tasks;
mod viewer;

pub use crate::engine::{CoreEngine, CoreError, CoreOptions};
pub use crate::expansion::{ExpansionState, OpenContext};
pub use crate::history::{
  canonical_body, display_body, headers_signature, method_has_body, normalize_header_rows,
  request_signature, HistoryLog, DEFAULT_HISTORY_LIMIT,
};
pub use crate::models::{
  FetchOutcome, HeaderRow, HistoryEntry, MatchPosition, NodeKind, PathStep, RenderNode,
  RequestDraft, ResponseView, Theme, TreeCommand,
};
pub use crate::navigator::MatchNavigator;
pub use crate::path_index::{
  ancestors, child_index_path, child_key_path, depth, list_container_paths, path_of, prefixes,
  ROOT_PATH,
};
pub use crate::request::{prepare_request, PreparedRequest};
pub use crate::search_index::{build_search_index, SearchIndex};
pub use crate::search_match::normalize_query;
pub use crate::storage::{KvStore, MemoryStore, Storage, StorageOptions, HISTORY_KEY, THEME_KEY};
pub use crate::tasks::{RequestTicket, RequestTracker};
pub use crate::viewer::JsonViewer;
