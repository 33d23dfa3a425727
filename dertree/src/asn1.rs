//! Content-octet codecs for the universal primitive types.
//!
//! Each module decodes the content octets of one universal type into its
//! natural value and encodes the value back in the canonical DER form.
//! Decoding tolerates the BER laxities the toolkit accepts (redundant
//! INTEGER padding, non-zero ignored bits, byte-order marks, surrogate
//! pairs); encoding never produces them.

pub mod bit_string;
pub mod boolean;
pub mod integer;
pub mod null;
pub mod strings;
pub mod time;

use crate::{ErrorKind, Oid, Result, Tag};

/// Canonicalise the content octets of a universal primitive value:
/// parse them as the type `tag` identifies and re-encode in the strict
/// DER form. Times are re-emitted as their canonical Zulu strings.
/// Types without extra canonical rules pass through unchanged;
/// primitive SEQUENCE/SET tags are rejected.
pub(crate) fn canonical_value(tag: Tag, content: &[u8]) -> Result<Vec<u8>> {
    match tag.number {
        1 => Ok(boolean::encode(boolean::decode(content)?).to_vec()),
        2 | 10 => Ok(integer::encode(&integer::decode(content)?)),
        3 => {
            let (unused, payload) = bit_string::decode(content)?;
            bit_string::encode(unused, payload)
        }
        5 => {
            null::decode(content)?;
            Ok(Vec::new())
        }
        6 => Ok(Oid::from_content(content)?.to_content()),
        12 | 18 | 19 | 20 | 22 | 27 | 28 | 30 => {
            strings::encode(tag, &strings::decode(tag, content)?)
        }
        16 | 17 => Err(ErrorKind::NotConstructed { tag }.into()),
        23 => {
            let instant = parse_time_content(tag, content, time::parse_utc_time)?;
            Ok(time::utc_time_string(&instant)?.into_bytes())
        }
        24 => {
            let instant = parse_time_content(tag, content, time::parse_generalized_time)?;
            Ok(time::generalized_time_string(&instant)?.into_bytes())
        }
        _ => Ok(content.to_vec()),
    }
}

/// Decode time content octets as ASCII and parse with `parse`.
pub(crate) fn parse_time_content<T>(
    tag: Tag,
    content: &[u8],
    parse: fn(&str) -> Result<T>,
) -> Result<T> {
    let s = core::str::from_utf8(content).map_err(|_| ErrorKind::Value { tag })?;
    parse(s)
}
