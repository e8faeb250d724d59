use ring::rand::SecureRandom;

use super::AuthError;

/// Mint an opaque bearer token: 32 random bytes, base64url.
pub fn generate_token() -> Result<String, AuthError> {
    let rng = ring::rand::SystemRandom::new();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes).map_err(|_| AuthError::TokenGeneration)?;
    Ok(base64_url_encode(&bytes))
}

/// Digest a bearer token for session storage. Raw tokens are never
/// persisted.
pub fn token_digest(token: &str) -> String {
    let digest = ring::digest::digest(&ring::digest::SHA256, token.as_bytes());
    base64_url_encode(digest.as_ref())
}

fn base64_url_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}
