//! Inbound request validation

use common::{Error, InboundEvent, Result};
use tracing::warn;

/// Header carrying the shared secret when it is not in the query string
pub const TOKEN_HEADER: &str = "x-relay-token";

/// Check the presented token against the shared secret.
///
/// The token is read from the `token` query parameter, then the
/// [`TOKEN_HEADER`] header. An unset secret rejects every caller.
pub fn verify_shared_secret(event: &InboundEvent, secret: Option<&str>) -> Result<()> {
    let presented = event
        .query_param("token")
        .or_else(|| event.header(TOKEN_HEADER));

    match (presented, secret) {
        (Some(token), Some(secret)) if token == secret => Ok(()),
        _ => {
            warn!("Attempt to call with incorrect token");
            Err(Error::validation("incorrect token", 401))
        }
    }
}

/// Check that a field belongs to a fixed set, case-insensitively.
///
/// Returns the lowercased value on success.
pub fn verify_enumerated(field: &str, value: Option<&str>, accepted: &[String]) -> Result<String> {
    let lowered = value.unwrap_or_default().to_lowercase();
    if accepted.iter().any(|a| a.eq_ignore_ascii_case(&lowered)) {
        return Ok(lowered);
    }

    warn!("Called with unrecognized {}: {}", field, lowered);
    Err(Error::validation(
        format!("{} not recognized: {}", field, lowered),
        400,
    ))
}

/// Check that a header carries exactly the expected value
pub fn verify_header(
    event: &InboundEvent,
    name: &str,
    expected: &str,
    mismatch_status: u16,
) -> Result<()> {
    if event.header(name) == Some(expected) {
        return Ok(());
    }

    warn!("{} header check failed", name);
    Err(Error::validation("Bad request.", mismatch_status))
}
