//! Object identifiers.

use crate::{ErrorKind, Result};
use core::fmt;
use core::str::FromStr;

/// An `OBJECT IDENTIFIER`: a sequence of at least two integer arcs.
///
/// The first arc is 0, 1 or 2, and the second is below 40 when the
/// first is 0 or 1 (X.660's registration-tree rule, which the combined
/// leading subidentifier of the wire form depends on). Arcs are held as
/// `u64`, which covers every registered OID.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Oid {
    arcs: Vec<u64>,
}

impl Oid {
    /// Create an [`Oid`] from its arcs, checking the first-pair rule.
    pub fn new(arcs: Vec<u64>) -> Result<Oid> {
        match arcs.as_slice() {
            [0..=1, second, ..] if *second < 40 => {}
            [2, second, ..] if *second <= u64::MAX - 80 => {}
            _ => return Err(ErrorKind::Oid.into()),
        }

        Ok(Oid { arcs })
    }

    /// The arcs of this OID.
    pub fn arcs(&self) -> &[u64] {
        &self.arcs
    }

    /// Decode an OID from its content octets.
    ///
    /// Subidentifiers are base-128 with the high bit as a continuation
    /// marker; the first subidentifier combines the first two arcs as
    /// `40 * first + second`. Non-minimal subidentifier encodings
    /// (leading zero septets) are accepted.
    pub fn from_content(content: &[u8]) -> Result<Oid> {
        if content.is_empty() {
            return Err(ErrorKind::Oid.into());
        }

        let mut subids = Vec::new();
        let mut value: u64 = 0;
        let mut in_progress = false;

        for &octet in content {
            value = value
                .checked_mul(128)
                .and_then(|v| v.checked_add(u64::from(octet & 0x7F)))
                .ok_or(ErrorKind::Oid)?;
            in_progress = true;

            if octet & 0x80 == 0 {
                subids.push(value);
                value = 0;
                in_progress = false;
            }
        }

        if in_progress {
            return Err(ErrorKind::Oid.into());
        }

        let leading = subids[0];
        let (first, second) = match leading {
            0..=39 => (0, leading),
            40..=79 => (1, leading - 40),
            _ => (2, leading - 80),
        };

        let mut arcs = Vec::with_capacity(subids.len() + 1);
        arcs.push(first);
        arcs.push(second);
        arcs.extend_from_slice(&subids[1..]);
        Oid::new(arcs)
    }

    /// Encode this OID as its content octets, each subidentifier in the
    /// minimal base-128 form.
    pub fn to_content(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_subid(40 * self.arcs[0] + self.arcs[1], &mut out);
        for &arc in &self.arcs[2..] {
            write_subid(arc, &mut out);
        }
        out
    }
}

fn write_subid(mut value: u64, out: &mut Vec<u8>) {
    let mut septets = [0u8; 10];
    let mut count = 0;
    loop {
        septets[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }

    for i in (0..count).rev() {
        let continuation = if i == 0 { 0 } else { 0x80 };
        out.push(septets[i] | continuation);
    }
}

impl FromStr for Oid {
    type Err = crate::Error;

    /// Parse a dotted-decimal OID.
    ///
    /// Valid inputs contain only digits and dots, no leading, trailing
    /// or adjacent dots, and at least one dot. Redundant leading zeros
    /// per component are stripped, so `2.05.4` canonicalises to `2.5.4`.
    fn from_str(s: &str) -> Result<Oid> {
        if s.is_empty() || !s.contains('.') {
            return Err(ErrorKind::Oid.into());
        }

        let mut arcs = Vec::new();
        for component in s.split('.') {
            if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ErrorKind::Oid.into());
            }

            let trimmed = component.trim_start_matches('0');
            let arc = if trimmed.is_empty() {
                0
            } else {
                trimmed.parse::<u64>().map_err(|_| ErrorKind::Oid)?
            };
            arcs.push(arc);
        }

        Oid::new(arcs)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Oid;
    use hex_literal::hex;

    #[test]
    fn parse_and_display() {
        let oid: Oid = "1.2.840.113549.1.1.5".parse().unwrap();
        assert_eq!(oid.arcs(), &[1, 2, 840, 113549, 1, 1, 5]);
        assert_eq!(oid.to_string(), "1.2.840.113549.1.1.5");
    }

    #[test]
    fn leading_zeros_canonicalised() {
        let oid: Oid = "2.05.004.03".parse().unwrap();
        assert_eq!(oid.to_string(), "2.5.4.3");

        let zero: Oid = "0.0".parse().unwrap();
        assert_eq!(zero.to_string(), "0.0");
    }

    #[test]
    fn syntax_rejected() {
        for bad in ["", "1", "1.", ".1", "1..2", "1.2.x", "3.1", "1.40", "0.40.1"] {
            assert!(bad.parse::<Oid>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn content_round_trip() {
        let oid: Oid = "2.5.4.3".parse().unwrap();
        assert_eq!(oid.to_content(), hex!("55 04 03"));
        assert_eq!(Oid::from_content(&hex!("55 04 03")).unwrap(), oid);

        let oid: Oid = "1.2.840.113549.1.1.5".parse().unwrap();
        assert_eq!(oid.to_content(), hex!("2A 86 48 86 F7 0D 01 01 05"));
        assert_eq!(Oid::from_content(&oid.to_content()).unwrap(), oid);
    }

    #[test]
    fn large_second_arc_under_joint_root() {
        let oid: Oid = "2.999.1".parse().unwrap();
        let content = oid.to_content();
        assert_eq!(Oid::from_content(&content).unwrap(), oid);
    }

    #[test]
    fn non_minimal_subid_accepted() {
        // 0x80 0x01 is a padded encoding of 1 (i.e. 0.1).
        let oid = Oid::from_content(&hex!("80 01")).unwrap();
        assert_eq!(oid.to_string(), "0.1");
        assert_eq!(oid.to_content(), hex!("01"));
    }

    #[test]
    fn malformed_content_rejected() {
        assert!(Oid::from_content(&[]).is_err());
        assert!(Oid::from_content(&hex!("55 84")).is_err());
    }
}
