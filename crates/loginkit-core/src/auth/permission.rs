//! Role resolution for permission checks.
//!
//! Tokens are opaque to the client. When a token happens to be JWT-shaped,
//! its `role` claim is read without verifying the signature; the server
//! remains the authority and this check only gates client-side actions.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct Claims {
    role: Option<String>,
}

/// Read the `role` claim from a `header.payload.signature` token.
/// Returns `None` for anything that does not decode.
pub fn role_from_token(token: &str) -> Option<String> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    // Some issuers pad the segments anyway
    let bytes = match URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')) {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(error = %e, "Token payload is not base64url");
            return None;
        }
    };

    match serde_json::from_slice::<Claims>(&bytes) {
        Ok(claims) => claims.role,
        Err(e) => {
            debug!(error = %e, "Token payload is not a claims object");
            None
        }
    }
}

/// Exact, case-sensitive role comparison. No role means no permission.
pub fn role_matches(role: Option<&str>, required_role: &str) -> bool {
    role.is_some_and(|role| role == required_role)
}

#[cfg(test)]
pub(crate) fn make_token(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
