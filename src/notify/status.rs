use serde_json::Value;

use crate::render::html::escape_html;

/// Failure body from the server, kept losslessly.
///
/// JSON bodies are stored as-is (any shape, not only `{error}`); anything
/// else is stored as the raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorPayload {
    Json(Value),
    Text(String),
}

impl ErrorPayload {
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value @ (Value::Object(_) | Value::Array(_))) => ErrorPayload::Json(value),
            _ => ErrorPayload::Text(body.to_string()),
        }
    }

    pub fn text(msg: impl Into<String>) -> Self {
        ErrorPayload::Text(msg.into())
    }

    /// One-line description: the `error` field when present.
    pub fn summary(&self) -> String {
        match self {
            ErrorPayload::Json(value) => value
                .get("error")
                .and_then(|e| match e {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .unwrap_or_else(|| value.to_string()),
            ErrorPayload::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    "empty response".to_string()
                } else {
                    trimmed.to_string()
                }
            }
        }
    }

    /// Pretty-printed body for display.
    pub fn pretty(&self) -> String {
        match self {
            ErrorPayload::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ErrorPayload::Text(text) => text.clone(),
        }
    }

    /// Whether the body carries more than a bare `{error}` summary.
    pub fn has_detail(&self) -> bool {
        match self {
            ErrorPayload::Json(Value::Object(map)) => map.keys().any(|k| k != "error"),
            ErrorPayload::Json(_) => true,
            ErrorPayload::Text(_) => false,
        }
    }
}

/// Persistent status line next to a form.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InlineStatus {
    #[default]
    Idle,
    Busy(String),
    Success(String),
    Error(ErrorPayload),
}

impl InlineStatus {
    pub fn is_busy(&self) -> bool {
        matches!(self, InlineStatus::Busy(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InlineStatus::Error(_))
    }

    /// Plain-text rendering, as shown in a terminal.
    pub fn render_text(&self) -> String {
        match self {
            InlineStatus::Idle => String::new(),
            InlineStatus::Busy(msg) => format!("\u{23f3} {}", msg),
            InlineStatus::Success(msg) => format!("\u{2713} {}", msg),
            InlineStatus::Error(payload) => {
                let mut out = format!("\u{2717} {}", payload.summary());
                if payload.has_detail() {
                    out.push('\n');
                    out.push_str(&payload.pretty());
                }
                out
            }
        }
    }

    /// Escaped HTML fragment. Payload text is never interpreted as markup.
    pub fn render_html(&self, form_id: &str) -> String {
        let (class, body) = match self {
            InlineStatus::Idle => ("idle", String::new()),
            InlineStatus::Busy(msg) => ("busy", escape_html(msg)),
            InlineStatus::Success(msg) => ("success", escape_html(msg)),
            InlineStatus::Error(payload) => {
                let mut body = format!("<strong>{}</strong>", escape_html(&payload.summary()));
                if payload.has_detail() {
                    body.push_str(&format!("<pre>{}</pre>", escape_html(&payload.pretty())));
                }
                ("error", body)
            }
        };
        format!(
            "<div class=\"status {}\" data-form=\"{}\">{}</div>",
            class,
            escape_html(form_id),
            body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_keeps_full_structure() {
        let payload = ErrorPayload::from_body(r#"{"error":"ComfyUI failed","detail":{"code":502}}"#);
        assert_eq!(payload.summary(), "ComfyUI failed");
        assert!(payload.has_detail());
        assert!(payload.pretty().contains("\"code\": 502"));
    }

    #[test]
    fn non_json_body_is_kept_as_text() {
        let payload = ErrorPayload::from_body("<html>502 Bad Gateway</html>");
        assert_eq!(payload, ErrorPayload::Text("<html>502 Bad Gateway</html>".into()));
        let html = InlineStatus::Error(payload).render_html("form2");
        assert!(html.contains("&lt;html&gt;502 Bad Gateway&lt;/html&gt;"));
        assert!(!html.contains("<html>"));
    }

    #[test]
    fn bare_json_string_is_text() {
        assert!(matches!(ErrorPayload::from_body("\"oops\""), ErrorPayload::Text(_)));
    }

    #[test]
    fn error_without_error_key_summarises_whole_body() {
        let payload = ErrorPayload::Json(json!({"message": "quota"}));
        assert_eq!(payload.summary(), r#"{"message":"quota"}"#);
    }
}
