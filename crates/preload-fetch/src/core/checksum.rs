use crate::error::{FetchError, Result};

/// Parse a hex-encoded SHA-256 digest.
pub fn parse_sha256(digest: &str) -> Result<[u8; 32]> {
    let mut out = [0u8; 32];
    hex::decode_to_slice(digest.trim(), &mut out)
        .map_err(|_| FetchError::InvalidChecksum(digest.to_string()))?;
    Ok(out)
}
