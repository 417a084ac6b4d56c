use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use uuid::Uuid;

/// Header under which the id is mirrored into each request.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Random bytes drawn per token, and the token's final length.
pub const TOKEN_LEN: usize = 16;

/// Caller-supplied replacement for the built-in token generator.
pub type IdGenerator = Arc<dyn Fn() -> String + Send + Sync>;

// A simple extension to store the request ID in a request or span.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Base64 encoding of `TOKEN_LEN` random bytes, truncated to `TOKEN_LEN` characters.
pub fn generate_request_id() -> String {
    let bytes: [u8; TOKEN_LEN] = rand::random();
    let mut token = STANDARD.encode(bytes);
    token.truncate(TOKEN_LEN);
    token
}

/// Alternate generator for callers that want globally unique ids over short ones.
pub fn uuid_request_id() -> String {
    Uuid::new_v4().to_string()
}
