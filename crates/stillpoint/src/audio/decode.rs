//! Base64 payload decoding
//!
//! Narration audio arrives from the speech API as base64 text. This module
//! turns that text back into raw bytes, rejecting anything outside the
//! standard padded alphabet. Pure function, no audio device involved.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{AudioError, Result};

/// Decode a standard-alphabet base64 string into raw bytes.
///
/// Invalid characters and bad padding yield [`AudioError::MalformedEncoding`]
/// with the decoder's detail message. An empty input decodes to an empty
/// vector, not an error.
pub fn decode_base64(input: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(input)
        .map_err(|e| AudioError::MalformedEncoding(e.to_string()))
}
