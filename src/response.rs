//! Response shapes produced by a dispatch.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status used when the last handler does not pick one.
pub const DEFAULT_SUCCESS_STATUS_CODE: u16 = 200;
/// Status used when the error handler does not pick one.
pub const DEFAULT_ERROR_STATUS_CODE: u16 = 500;

/// Final `{statusCode, body}` pair handed back to the host adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub body: Value,
}

impl Response {
    #[must_use]
    pub fn new(status_code: u16, body: Value) -> Self {
        Self { status_code, body }
    }

    /// Shape the return value of the last handler in a chain.
    ///
    /// A positive integer `statusCode` field selects that status and the
    /// `body` field (`null` when absent). Anything else becomes the body of a
    /// 200 response as-is.
    #[must_use]
    pub fn from_handler_output(output: Value) -> Self {
        match explicit_status(&output) {
            Some(status_code) => {
                let body = output.get("body").cloned().unwrap_or(Value::Null);
                Self { status_code, body }
            }
            None => Self {
                status_code: DEFAULT_SUCCESS_STATUS_CODE,
                body: output,
            },
        }
    }
}

fn explicit_status(output: &Value) -> Option<u16> {
    output
        .get("statusCode")?
        .as_u64()
        .filter(|code| *code > 0)
        .and_then(|code| u16::try_from(code).ok())
}

/// What an error handler returns. Missing fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: Option<u16>,
    pub body: Option<Value>,
}

impl ErrorResponse {
    #[must_use]
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Fill in defaults: 500, and the reason phrase of the chosen status.
    #[must_use]
    pub fn into_response(self) -> Response {
        let status_code = self.status_code.unwrap_or(DEFAULT_ERROR_STATUS_CODE);
        let body = self.body.unwrap_or_else(|| reason_phrase(status_code));
        Response { status_code, body }
    }
}

fn reason_phrase(status_code: u16) -> Value {
    http::StatusCode::from_u16(status_code)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map_or(Value::Null, |reason| Value::String(reason.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explicit_status_and_body() {
        let resp = Response::from_handler_output(json!({"statusCode": 201, "body": {"created": true}}));
        assert_eq!(resp, Response::new(201, json!({"created": true})));
    }

    #[test]
    fn test_plain_output_becomes_body() {
        let resp = Response::from_handler_output(json!({"one": 1}));
        assert_eq!(resp, Response::new(200, json!({"one": 1})));
    }

    #[test]
    fn test_status_without_body() {
        let resp = Response::from_handler_output(json!({"statusCode": 204}));
        assert_eq!(resp, Response::new(204, Value::Null));
    }

    #[test]
    fn test_nothing_returned() {
        assert_eq!(Response::from_handler_output(Value::Null), Response::new(200, Value::Null));
    }

    #[test]
    fn test_zero_or_non_numeric_status_is_ignored() {
        let out = json!({"statusCode": 0, "body": "x"});
        assert_eq!(Response::from_handler_output(out.clone()), Response::new(200, out));
        let out = json!({"statusCode": "201"});
        assert_eq!(Response::from_handler_output(out.clone()), Response::new(200, out));
    }

    #[test]
    fn test_error_response_defaults() {
        assert_eq!(
            ErrorResponse::default().into_response(),
            Response::new(500, json!("Internal Server Error"))
        );
        assert_eq!(
            ErrorResponse::status(404).into_response(),
            Response::new(404, json!("Not Found"))
        );
        assert_eq!(
            ErrorResponse::status(401).with_body("Unauthorized").into_response(),
            Response::new(401, json!("Unauthorized"))
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(Response::new(200, json!({"ok": true}))).unwrap();
        assert_eq!(value, json!({"statusCode": 200, "body": {"ok": true}}));
    }
}
