//! Length octets for encoded ASN.1 elements.

use crate::{ErrorKind, Result};
use core::fmt;

/// Decoded length of an element's content octets.
///
/// BER permits three encodings (X.690 Section 8.1.3): the short definite
/// form (one octet, 0..=127), the long definite form (a length-of-length
/// octet followed by 1..=126 big-endian length octets), and the
/// indefinite form (0x80, content terminated by an end-of-contents
/// marker). Decoding accepts all three, including non-minimal long
/// forms; encoding always emits the minimal definite form, as DER
/// requires (Section 10.1).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Length {
    /// Definite length in octets.
    Definite(usize),

    /// Indefinite length; only valid for constructed elements.
    Indefinite,
}

impl Length {
    /// Decode length octets from the start of `bytes`, returning the
    /// length and the number of octets consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<(Length, usize)> {
        let first = *bytes.first().ok_or(ErrorKind::Truncated)?;

        if first < 0x80 {
            return Ok((Length::Definite(usize::from(first)), 1));
        }

        let octets = usize::from(first & 0x7F);
        match octets {
            0 => Ok((Length::Indefinite, 1)),
            0x7F => Err(ErrorKind::ReservedLength.into()),
            _ => {
                let mut value: usize = 0;
                for i in 0..octets {
                    let octet = *bytes.get(1 + i).ok_or(ErrorKind::Truncated)?;
                    value = value
                        .checked_mul(256)
                        .and_then(|v| v.checked_add(usize::from(octet)))
                        .ok_or(ErrorKind::Length)?;
                }
                Ok((Length::Definite(value), 1 + octets))
            }
        }
    }

    /// Append the minimal definite-form length octets for `len` to `out`.
    pub fn write(len: usize, out: &mut Vec<u8>) {
        if len <= 0x7F {
            out.push(len as u8);
            return;
        }

        let buf = len.to_be_bytes();
        let skip = buf.iter().position(|b| *b != 0).unwrap_or(buf.len() - 1);
        out.push(0x80 | (buf.len() - skip) as u8);
        out.extend_from_slice(&buf[skip..]);
    }

    /// Number of octets [`Length::write`] will emit for `len`.
    pub fn encoded_len(len: usize) -> usize {
        if len <= 0x7F {
            1
        } else {
            let buf = len.to_be_bytes();
            let skip = buf.iter().position(|b| *b != 0).unwrap_or(buf.len() - 1);
            1 + buf.len() - skip
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Definite(len) => write!(f, "{}", len),
            Length::Indefinite => f.write_str("indefinite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Length;
    use crate::ErrorKind;

    #[test]
    fn short_form() {
        assert_eq!(Length::from_bytes(&[0x00]).unwrap(), (Length::Definite(0), 1));
        assert_eq!(
            Length::from_bytes(&[0x7F]).unwrap(),
            (Length::Definite(127), 1)
        );
    }

    #[test]
    fn long_form() {
        assert_eq!(
            Length::from_bytes(&[0x81, 0x80]).unwrap(),
            (Length::Definite(128), 2)
        );
        assert_eq!(
            Length::from_bytes(&[0x82, 0x01, 0x00]).unwrap(),
            (Length::Definite(256), 3)
        );
    }

    #[test]
    fn non_minimal_long_form_accepted() {
        // Length 5 padded out to three octets; fine for BER input.
        assert_eq!(
            Length::from_bytes(&[0x83, 0x00, 0x00, 0x05]).unwrap(),
            (Length::Definite(5), 4)
        );
    }

    #[test]
    fn indefinite_and_reserved() {
        assert_eq!(Length::from_bytes(&[0x80]).unwrap(), (Length::Indefinite, 1));
        assert_eq!(
            Length::from_bytes(&[0xFF]).unwrap_err().kind(),
            ErrorKind::ReservedLength
        );
    }

    #[test]
    fn truncated_long_form() {
        assert_eq!(
            Length::from_bytes(&[0x82, 0x01]).unwrap_err().kind(),
            ErrorKind::Truncated
        );
    }

    #[test]
    fn minimal_encoding() {
        for len in [0usize, 1, 127, 128, 255, 256, 65535, 65536] {
            let mut out = Vec::new();
            Length::write(len, &mut out);
            assert_eq!(out.len(), Length::encoded_len(len));

            let (decoded, used) = Length::from_bytes(&out).unwrap();
            assert_eq!(decoded, Length::Definite(len));
            assert_eq!(used, out.len());
        }
    }
}
