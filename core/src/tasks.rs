use std::{
  sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
  },
  time::{SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::PreparedRequest;

/// Handle for one in-flight request. The collaborator hands it back together
/// with the outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestTicket {
  pub id: String,
  pub seq: u64,
  pub started_at_ms: i64,
}

#[derive(Debug)]
struct InFlight {
  ticket: RequestTicket,
  request: PreparedRequest,
}

/// Tracks the most recently issued request. Issuing a new one supersedes the
/// previous; only the current ticket may commit its result.
#[derive(Clone, Default)]
pub struct RequestTracker {
  seq: Arc<AtomicU64>,
  current: Arc<Mutex<Option<InFlight>>>,
}

impl RequestTracker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn begin(&self, request: PreparedRequest) -> RequestTicket {
    let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
    let ticket = RequestTicket {
      id: Uuid::new_v4().to_string(),
      seq,
      started_at_ms: now_ms(),
    };
    let prev = self.current.lock().replace(InFlight {
      ticket: ticket.clone(),
      request,
    });
    if let Some(prev) = prev {
      tracing::debug!(superseded = prev.ticket.seq, by = seq, "request superseded");
    }
    ticket
  }

  pub fn is_current(&self, ticket: &RequestTicket) -> bool {
    self
      .current
      .lock()
      .as_ref()
      .is_some_and(|f| f.ticket == *ticket)
  }

  /// Take the request behind `ticket` if it is still the current one.
  ///
  /// After this the ticket is settled: a second call returns `None`.
  pub(crate) fn settle(&self, ticket: &RequestTicket) -> Option<PreparedRequest> {
    let mut current = self.current.lock();
    if current.as_ref().is_some_and(|f| f.ticket == *ticket) {
      current.take().map(|f| f.request)
    } else {
      None
    }
  }

  pub fn in_flight(&self) -> Option<RequestTicket> {
    self.current.lock().as_ref().map(|f| f.ticket.clone())
  }
}

pub(crate) fn now_ms() -> i64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .unwrap_or_default()
    .as_millis() as i64
}
