//! Multipart field extraction

use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use common::{Error, Result};
use tracing::debug;

/// Field the e-signature provider puts its JSON in
const PAYLOAD_FIELD: &str = "json";

/// Pull the payload field out of a multipart body.
///
/// Returns the field named `json`, otherwise the first field.
pub async fn extract_field(content_type: &str, body: Vec<u8>) -> Result<Vec<u8>> {
    let request = Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|e| Error::MalformedBody(format!("invalid multipart request: {}", e)))?;

    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| Error::MalformedBody(format!("invalid multipart request: {}", e)))?;

    let mut first = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::MalformedBody(format!("invalid multipart body: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| Error::MalformedBody(format!("invalid multipart field: {}", e)))?;

        debug!("Multipart field {:?} ({} bytes)", name, bytes.len());
        if name.as_deref() == Some(PAYLOAD_FIELD) {
            return Ok(bytes.to_vec());
        }
        if first.is_none() {
            first = Some(bytes.to_vec());
        }
    }

    first.ok_or_else(|| Error::MalformedBody("multipart body has no fields".into()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BOUNDARY: &str = "relay-boundary";

    pub(crate) fn form_body(fields: &[(&str, &str)]) -> Vec<u8> {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            ));
        }
        body.push_str(&format!("--{}--\r\n", BOUNDARY));
        body.into_bytes()
    }

    pub(crate) fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    #[tokio::test]
    async fn test_extracts_named_field() {
        let body = form_body(&[("other", "x"), ("json", r#"{"event":{}}"#)]);
        let field = extract_field(&content_type(), body).await.unwrap();
        assert_eq!(field, br#"{"event":{}}"#);
    }

    #[tokio::test]
    async fn test_falls_back_to_first_field() {
        let body = form_body(&[("payload", "first"), ("extra", "second")]);
        let field = extract_field(&content_type(), body).await.unwrap();
        assert_eq!(field, b"first");
    }

    #[tokio::test]
    async fn test_missing_boundary_is_malformed() {
        let body = form_body(&[("json", "{}")]);
        let err = extract_field("multipart/form-data", body).await.unwrap_err();
        assert!(matches!(err, Error::MalformedBody(_)));
    }

    #[tokio::test]
    async fn test_empty_form_is_malformed() {
        let body = format!("--{}--\r\n", BOUNDARY).into_bytes();
        let err = extract_field(&content_type(), body).await.unwrap_err();
        assert!(matches!(err, Error::MalformedBody(_)));
    }
}
