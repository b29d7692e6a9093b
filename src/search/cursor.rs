//! Opaque pagination cursor.
//!
//! The cursor wraps a single offset in a small versioned envelope before
//! base64url encoding, so future fields can be added without invalidating
//! tokens already handed to clients. Decoding rejects anything that is not a
//! well-formed envelope of the current version; corrupted or tampered tokens
//! surface as `Error::InvalidCursor`, never as an arbitrary offset.

use crate::{Error, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

const CURSOR_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    v: u8,
    o: u64,
}

/// Encode an offset as an opaque token.
pub fn encode(offset: u64) -> String {
    let envelope = Envelope {
        v: CURSOR_VERSION,
        o: offset,
    };
    // Envelope serialization cannot fail for these field types.
    let raw = serde_json::to_vec(&envelope).expect("cursor envelope serializes");
    URL_SAFE_NO_PAD.encode(raw)
}

/// Decode a token back to its offset.
pub fn decode(token: &str) -> Result<u64> {
    let raw = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|_| Error::InvalidCursor)?;
    let envelope: Envelope = serde_json::from_slice(&raw).map_err(|_| Error::InvalidCursor)?;
    if envelope.v != CURSOR_VERSION {
        return Err(Error::InvalidCursor);
    }
    Ok(envelope.o)
}
