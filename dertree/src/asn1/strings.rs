//! Content octets for the restricted character string types.
//!
//! Eight universal string types are supported, each with its own
//! character repertoire and wire form:
//!
//! - `NumericString` (18): digits and space, one octet per character.
//! - `PrintableString` (19): the X.680 printable subset, one octet each.
//! - `IA5String` (22): ISO 646 / ASCII, one octet each.
//! - `TeletexString` (20) and `GeneralString` (27): treated as Latin-1
//!   by long-standing convention.
//! - `UTF8String` (12): UTF-8; a leading byte order mark is stripped and
//!   surrogate pairs (CESU-8 style) are reassembled on input.
//! - `BMPString` (30): UTF-16, big-endian unless a byte order mark says
//!   otherwise.
//! - `UniversalString` (28): UTF-32, likewise, with surrogate pairs in
//!   the code units reassembled on input.
//!
//! Output is always the canonical form: big-endian, no byte order mark,
//! no surrogates.

use crate::{Error, ErrorKind, Result, Tag};

/// Is `tag` one of the universal restricted character string types?
pub fn is_string_tag(tag: Tag) -> bool {
    tag.class == crate::Class::Universal
        && matches!(tag.number, 12 | 18 | 19 | 20 | 22 | 27 | 28 | 30)
}

fn value_error(tag: Tag) -> Error {
    ErrorKind::Value { tag }.into()
}

/// Decode the content octets of the string type identified by `tag`.
pub fn decode(tag: Tag, content: &[u8]) -> Result<String> {
    match tag.number {
        12 => decode_utf8(tag, content),
        18 => decode_ascii(tag, content, is_numeric_char),
        19 => decode_ascii(tag, content, is_printable_char),
        20 | 27 => Ok(content.iter().map(|&b| char::from(b)).collect()),
        22 => decode_ascii(tag, content, |b| b < 0x80),
        28 => decode_utf32(tag, content),
        30 => decode_utf16(tag, content),
        _ => Err(value_error(tag)),
    }
}

/// Encode `s` as the canonical content octets of the string type
/// identified by `tag`, checking the type's character repertoire.
pub fn encode(tag: Tag, s: &str) -> Result<Vec<u8>> {
    match tag.number {
        12 => Ok(s.as_bytes().to_vec()),
        18 => encode_ascii(tag, s, is_numeric_char),
        19 => encode_ascii(tag, s, is_printable_char),
        20 | 27 => s
            .chars()
            .map(|c| u8::try_from(u32::from(c)).map_err(|_| value_error(tag)))
            .collect(),
        22 => encode_ascii(tag, s, |b| b < 0x80),
        28 => Ok(s.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect()),
        30 => Ok(s.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        _ => Err(value_error(tag)),
    }
}

fn is_numeric_char(b: u8) -> bool {
    b.is_ascii_digit() || b == b' '
}

/// The X.680 PrintableString repertoire.
fn is_printable_char(b: u8) -> bool {
    matches!(b,
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9'
        | b' ' | b'\'' | b'(' | b')' | b'+' | b',' | b'-' | b'.' | b'/'
        | b':' | b'=' | b'?')
}

fn decode_ascii(tag: Tag, content: &[u8], permitted: fn(u8) -> bool) -> Result<String> {
    if content.iter().all(|&b| permitted(b)) {
        Ok(content.iter().map(|&b| char::from(b)).collect())
    } else {
        Err(value_error(tag))
    }
}

fn encode_ascii(tag: Tag, s: &str, permitted: fn(u8) -> bool) -> Result<Vec<u8>> {
    let bytes = s.as_bytes();
    if s.chars().all(|c| u32::from(c) < 0x80) && bytes.iter().all(|&b| permitted(b)) {
        Ok(bytes.to_vec())
    } else {
        Err(value_error(tag))
    }
}

/// Push one code unit into the pending surrogate state machine shared by
/// the UTF-8 and UTF-32 decoders.
fn push_code_point(tag: Tag, out: &mut String, pending: &mut Option<u32>, cp: u32) -> Result<()> {
    match (*pending, cp) {
        (Some(high), 0xDC00..=0xDFFF) => {
            let combined = 0x10000 + ((high - 0xD800) << 10) + (cp - 0xDC00);
            out.push(char::from_u32(combined).ok_or_else(|| value_error(tag))?);
            *pending = None;
            Ok(())
        }
        (Some(_), _) => Err(value_error(tag)),
        (None, 0xD800..=0xDBFF) => {
            *pending = Some(cp);
            Ok(())
        }
        (None, 0xDC00..=0xDFFF) => Err(value_error(tag)),
        (None, _) => {
            out.push(char::from_u32(cp).ok_or_else(|| value_error(tag))?);
            Ok(())
        }
    }
}

fn decode_utf8(tag: Tag, content: &[u8]) -> Result<String> {
    let content = content
        .strip_prefix(&[0xEF, 0xBB, 0xBF][..])
        .unwrap_or(content);

    let mut out = String::with_capacity(content.len());
    let mut pending = None;
    let mut i = 0;

    while i < content.len() {
        let b0 = content[i];
        let (len, min, mut cp) = match b0 {
            0x00..=0x7F => (1, 0, u32::from(b0)),
            0xC0..=0xDF => (2, 0x80, u32::from(b0 & 0x1F)),
            0xE0..=0xEF => (3, 0x800, u32::from(b0 & 0x0F)),
            0xF0..=0xF7 => (4, 0x10000, u32::from(b0 & 0x07)),
            _ => return Err(value_error(tag)),
        };

        for k in 1..len {
            let b = *content.get(i + k).ok_or_else(|| value_error(tag))?;
            if b & 0xC0 != 0x80 {
                return Err(value_error(tag));
            }
            cp = (cp << 6) | u32::from(b & 0x3F);
        }

        // Overlong encodings are not among the tolerated laxities.
        if cp < min || cp > 0x10FFFF {
            return Err(value_error(tag));
        }

        push_code_point(tag, &mut out, &mut pending, cp)?;
        i += len;
    }

    if pending.is_some() {
        return Err(value_error(tag));
    }

    Ok(out)
}

fn decode_utf16(tag: Tag, content: &[u8]) -> Result<String> {
    let (content, big_endian) = match content {
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        _ => (content, true),
    };

    if content.len() % 2 != 0 {
        return Err(value_error(tag));
    }

    let units: Vec<u16> = content
        .chunks_exact(2)
        .map(|pair| {
            let bytes = [pair[0], pair[1]];
            if big_endian {
                u16::from_be_bytes(bytes)
            } else {
                u16::from_le_bytes(bytes)
            }
        })
        .collect();

    String::from_utf16(&units).map_err(|_| value_error(tag))
}

fn decode_utf32(tag: Tag, content: &[u8]) -> Result<String> {
    let (content, big_endian) = match content {
        [0x00, 0x00, 0xFE, 0xFF, rest @ ..] => (rest, true),
        [0xFF, 0xFE, 0x00, 0x00, rest @ ..] => (rest, false),
        _ => (content, true),
    };

    if content.len() % 4 != 0 {
        return Err(value_error(tag));
    }

    let mut out = String::with_capacity(content.len() / 4);
    let mut pending = None;

    for quad in content.chunks_exact(4) {
        let bytes = [quad[0], quad[1], quad[2], quad[3]];
        let cp = if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        };
        push_code_point(tag, &mut out, &mut pending, cp)?;
    }

    if pending.is_some() {
        return Err(value_error(tag));
    }

    Ok(out)
}
