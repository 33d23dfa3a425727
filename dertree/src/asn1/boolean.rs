//! ASN.1 `BOOLEAN` content octets.

use crate::{ErrorKind, Result, Tag};

/// Decode `BOOLEAN` content octets.
///
/// BER permits any non-zero octet for TRUE (X.690 Section 8.2.2); only
/// the length is checked here.
pub fn decode(content: &[u8]) -> Result<bool> {
    match content {
        [0x00] => Ok(false),
        [_] => Ok(true),
        _ => Err(ErrorKind::Value { tag: Tag::BOOLEAN }.into()),
    }
}

/// Encode a `BOOLEAN` as its single DER content octet (X.690 Section
/// 11.1: TRUE is 0xFF).
pub fn encode(value: bool) -> [u8; 1] {
    [if value { 0xFF } else { 0x00 }]
}
