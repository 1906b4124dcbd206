//! HTTP mapping of pipeline responses

use axum::{
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use processor::RelayResponse;

/// A pipeline response as an HTTP response
pub struct Reply(pub RelayResponse);

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let content_type = if is_json(&self.0.body) {
            "application/json"
        } else {
            "text/plain; charset=utf-8"
        };

        (status, [(CONTENT_TYPE, content_type)], self.0.body).into_response()
    }
}

fn is_json(body: &str) -> bool {
    let trimmed = body.trim_start();
    (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(body).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_content_type() {
        let resp = Reply(RelayResponse::new(401, "incorrect token")).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        let resp = Reply(RelayResponse::ok(r#"{"_id":"1"}"#)).into_response();
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_out_of_range_status_becomes_500() {
        let resp = Reply(RelayResponse::new(42, "odd")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
