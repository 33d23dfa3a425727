//! ASN.1 `NULL` content octets.

use crate::{ErrorKind, Result, Tag};

/// Decode `NULL` content octets: the content must be empty.
pub fn decode(content: &[u8]) -> Result<()> {
    if content.is_empty() {
        Ok(())
    } else {
        Err(ErrorKind::Value { tag: Tag::NULL }.into())
    }
}
