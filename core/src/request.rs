use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{
  engine::CoreError,
  history::{canonical_body, method_has_body, normalize_header_rows, request_signature},
  models::{HeaderRow, RequestDraft},
};

const ERROR_DETAIL_MAX_CHARS: usize = 800;

/// A validated request, ready for the fetch collaborator.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PreparedRequest {
  pub url: String,
  pub method: String,
  /// Normalized rows as the user entered them; kept for history.
  pub headers_rows: Vec<HeaderRow>,
  /// Headers to send: `headers_rows` plus a default content type for JSON bodies.
  pub headers: Vec<HeaderRow>,
  /// `None` for methods without a body.
  pub body: Option<String>,
  pub canonical_body: String,
  pub signature: String,
}

/// Validate and canonicalize a draft. Nothing is sent and nothing is recorded
/// when this fails.
pub fn prepare_request(draft: &RequestDraft) -> Result<PreparedRequest, CoreError> {
  let url = draft.url.trim().to_string();
  validate_http_url(&url)?;

  let method = draft.method.trim().to_uppercase();
  if method.is_empty() {
    return Err(CoreError::InvalidArg("method is empty".into()));
  }

  let headers_rows = normalize_header_rows(&draft.headers_rows);
  let canonical = canonical_body(&method, &draft.body)?;

  let has_body = method_has_body(&method);
  let mut headers = headers_rows.clone();
  if has_body
    && !headers
      .iter()
      .any(|h| h.key.eq_ignore_ascii_case("content-type"))
  {
    headers.push(HeaderRow::new("Content-Type", "application/json"));
  }

  let signature = request_signature(&url, &method, &headers_rows, &canonical);
  Ok(PreparedRequest {
    url,
    method,
    headers_rows,
    headers,
    body: has_body.then(|| canonical.clone()),
    canonical_body: canonical,
    signature,
  })
}

fn validate_http_url(raw: &str) -> Result<(), CoreError> {
  if raw.is_empty() {
    return Err(CoreError::InvalidUrl("url is empty".into()));
  }
  let parsed = Url::parse(raw).map_err(|e| CoreError::InvalidUrl(format!("{raw}: {e}")))?;
  match parsed.scheme() {
    "http" | "https" => Ok(()),
    other => Err(CoreError::InvalidUrl(format!(
      "{raw}: unsupported scheme {other} (expected http or https)"
    ))),
  }
}

pub fn is_success_status(status: u16) -> bool {
  (200..300).contains(&status)
}

pub fn is_json_content_type(content_type: &str) -> bool {
  content_type.to_ascii_lowercase().contains("application/json")
}

/// Message for a non-2xx answer: `HTTP 404 Not Found - <detail>`.
///
/// For JSON bodies the detail prefers a `message` or `error` field and falls
/// back to the pretty-printed body.
pub fn http_error_message(status: u16, status_text: &str, content_type: &str, body: &str) -> String {
  let mut detail = body.to_string();
  if is_json_content_type(content_type) {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
      detail = match (v.get("message"), v.get("error")) {
        (Some(Value::String(m)), _) if !m.is_empty() => m.clone(),
        (_, Some(Value::String(e))) if !e.is_empty() => e.clone(),
        _ => serde_json::to_string_pretty(&v).unwrap_or(detail),
      };
    }
  }
  let detail: String = detail.chars().take(ERROR_DETAIL_MAX_CHARS).collect();
  let head = format!("HTTP {} {}", status, status_text.trim());
  format!("{} - {}", head.trim_end(), detail)
}

pub fn network_error_message(message: &str) -> String {
  if message.contains("Failed to fetch") {
    "network error: request blocked (often CORS) or server unreachable".to_string()
  } else {
    format!("network error: {message}")
  }
}

pub const CANCELLED_MESSAGE: &str = "request cancelled";
