//! Input sniffing: raw BER, Base64 or PEM armour.

use base64ct::{Base64, Encoding};

/// Extract the BER object from `input`.
///
/// Tried in order: the input as-is; a PEM document (the Base64 between
/// the first `-----BEGIN …-----`/`-----END …-----` boundary lines); the
/// whole input as whitespace-tolerant Base64. A candidate counts only
/// if it actually decodes as BER, so `None` means no BER object could
/// be located.
pub fn extract(input: &[u8]) -> Option<Vec<u8>> {
    if dertree::decode(input).is_ok() {
        log::debug!("input is raw BER ({} bytes)", input.len());
        return Some(input.to_vec());
    }

    if let Some(bytes) = pem_body(input).and_then(|body| decode_base64(&body)) {
        if dertree::decode(&bytes).is_ok() {
            log::debug!("input is PEM ({} encapsulated bytes)", bytes.len());
            return Some(bytes);
        }
    }

    if let Some(bytes) = decode_base64(input) {
        if dertree::decode(&bytes).is_ok() {
            log::debug!("input is bare Base64 ({} decoded bytes)", bytes.len());
            return Some(bytes);
        }
    }

    None
}

/// The encapsulated text between the first pair of PEM boundary lines,
/// with the boundaries stripped.
fn pem_body(input: &[u8]) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    let mut inside = false;

    for line in input.split(|&b| b == b'\n') {
        let line = trim_ascii(line);
        if !inside {
            if line.starts_with(b"-----BEGIN ") && line.ends_with(b"-----") {
                inside = true;
            }
        } else {
            if line.starts_with(b"-----END ") && line.ends_with(b"-----") {
                return Some(body);
            }
            body.extend_from_slice(line);
        }
    }

    None
}

fn decode_base64(input: &[u8]) -> Option<Vec<u8>> {
    let compact: Vec<u8> = input
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let text = core::str::from_utf8(&compact).ok()?;

    if text.is_empty() {
        return None;
    }

    Base64::decode_vec(text).ok()
}

fn trim_ascii(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &line[start..end]
}
