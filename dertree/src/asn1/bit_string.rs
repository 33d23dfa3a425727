//! ASN.1 `BIT STRING` content octets.

use crate::{ErrorKind, Result, Tag};

fn value_error() -> crate::Error {
    ErrorKind::Value {
        tag: Tag::BIT_STRING,
    }
    .into()
}

/// Decode `BIT STRING` content octets into the ignored-bit count and the
/// bit payload.
///
/// The leading content octet gives the number of unused trailing bits in
/// the final payload octet (X.690 Section 8.6.2). Non-zero values in the
/// ignored bits are tolerated on input; [`encode`] forces them to zero.
pub fn decode(content: &[u8]) -> Result<(u8, &[u8])> {
    let (&unused, payload) = content.split_first().ok_or_else(value_error)?;

    if unused > 7 || (payload.is_empty() && unused != 0) {
        return Err(value_error());
    }

    Ok((unused, payload))
}

/// Encode a `BIT STRING` from the ignored-bit count and payload,
/// zeroing the ignored bits of the final octet (X.690 Section 11.2.1).
pub fn encode(unused: u8, payload: &[u8]) -> Result<Vec<u8>> {
    if unused > 7 || (payload.is_empty() && unused != 0) {
        return Err(value_error());
    }

    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(unused);
    out.extend_from_slice(payload);

    if unused > 0 {
        if let Some(last) = out.last_mut() {
            *last &= 0xFF << unused;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use hex_literal::hex;

    #[test]
    fn round_trip() {
        let content = hex!("04 B0");
        let (unused, payload) = decode(&content).unwrap();
        assert_eq!(unused, 4);
        assert_eq!(payload, hex!("B0"));
        assert_eq!(encode(unused, payload).unwrap(), content);
    }

    #[test]
    fn ignored_bits_zeroed_on_output() {
        // 0xB7 with four ignored bits: low nibble is noise.
        let (unused, payload) = decode(&hex!("04 B7")).unwrap();
        assert_eq!(encode(unused, payload).unwrap(), hex!("04 B0"));
    }

    #[test]
    fn empty_bit_string() {
        let (unused, payload) = decode(&[0x00]).unwrap();
        assert_eq!((unused, payload), (0, &[][..]));
        assert_eq!(encode(0, &[]).unwrap(), vec![0x00]);
    }

    #[test]
    fn rejects() {
        assert!(decode(&[]).is_err());
        assert!(decode(&[0x08, 0xFF]).is_err());
        assert!(decode(&[0x01]).is_err());
        assert!(encode(8, &[0xFF]).is_err());
    }
}
