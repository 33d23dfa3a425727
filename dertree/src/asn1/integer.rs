//! ASN.1 `INTEGER` / `ENUMERATED` content octets.

use crate::{ErrorKind, Result, Tag};
use num_bigint::BigInt;
use num_traits::Zero;

/// Decode `INTEGER` content octets: big-endian two's complement of any
/// length. Redundant leading 0x00 / 0xFF octets are tolerated on input.
pub fn decode(content: &[u8]) -> Result<BigInt> {
    if content.is_empty() {
        return Err(ErrorKind::Value { tag: Tag::INTEGER }.into());
    }

    Ok(BigInt::from_signed_bytes_be(content))
}

/// Encode an `INTEGER` in the minimal signed big-endian form (X.690
/// Section 8.3.2: at least one octet, no redundant leading octets).
pub fn encode(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return vec![0x00];
    }

    value.to_signed_bytes_be()
}

#[cfg(test)]
mod tests {
    use super::{decode, encode};
    use hex_literal::hex;
    use num_bigint::BigInt;

    #[test]
    fn round_trip_small() {
        for n in [-129i64, -128, -1, 0, 1, 127, 128, 255, 256] {
            let value = BigInt::from(n);
            assert_eq!(decode(&encode(&value)).unwrap(), value);
        }
    }

    #[test]
    fn minimal_forms() {
        assert_eq!(encode(&BigInt::from(0)), hex!("00"));
        assert_eq!(encode(&BigInt::from(127)), hex!("7F"));
        assert_eq!(encode(&BigInt::from(128)), hex!("00 80"));
        assert_eq!(encode(&BigInt::from(-128)), hex!("80"));
        assert_eq!(encode(&BigInt::from(-129)), hex!("FF 7F"));
    }

    #[test]
    fn redundant_padding_tolerated() {
        assert_eq!(decode(&hex!("00 00 7F")).unwrap(), BigInt::from(127));
        assert_eq!(decode(&hex!("FF FF 80")).unwrap(), BigInt::from(-128));
    }

    #[test]
    fn large_unsigned() {
        let value = decode(&hex!("00 FF FF FF FF FF FF FF FF")).unwrap();
        assert_eq!(value.to_string(), "18446744073709551615");
        assert_eq!(encode(&value), hex!("00 FF FF FF FF FF FF FF FF"));
    }

    #[test]
    fn empty_content_rejected() {
        assert!(decode(&[]).is_err());
    }
}
