//! Strict DER encoder.

use crate::{asn1, Class, Element, ErrorKind, Length, Result, SetSort};

/// Encode `element` as strict DER.
///
/// Children are encoded first, primitive content octets are
/// canonicalised through the per-type codecs, and the minimal
/// identifier and length octets are prepended. The result is the
/// canonical DER form of the element's public view: decoding a lax BER
/// variant and re-encoding it yields the DER the variant denoted.
pub fn encode(element: &Element) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_element(element, &mut out)?;
    Ok(out)
}

fn write_element(element: &Element, out: &mut Vec<u8>) -> Result<()> {
    let content = content_octets(element)?;
    element.tag().write(element.is_constructed(), out);
    Length::write(content.len(), out);
    out.extend_from_slice(&content);
    Ok(())
}

fn content_octets(element: &Element) -> Result<Vec<u8>> {
    if let Some(value) = element.value() {
        return if element.class() == Class::Universal {
            asn1::canonical_value(element.tag(), value)
        } else {
            Ok(value.to_vec())
        };
    }

    match element.set_sort() {
        SetSort::Keep => {
            let mut content = Vec::new();
            for child in element.children() {
                write_element(child, &mut content)?;
            }
            Ok(content)
        }
        SetSort::ByEncoding => {
            let mut encodings = element
                .children()
                .iter()
                .map(encode)
                .collect::<Result<Vec<_>>>()?;
            encodings.sort();
            encodings.dedup();
            Ok(encodings.concat())
        }
        SetSort::ByTag => {
            let mut children: Vec<_> = element
                .children()
                .iter()
                .map(|child| encode(child).map(|encoding| (child.tag(), encoding)))
                .collect::<Result<Vec<_>>>()?;
            children.sort_by(|a, b| a.0.cmp(&b.0));

            for pair in children.windows(2) {
                if pair[0].0 == pair[1].0 {
                    return Err(ErrorKind::SetDuplicate { tag: pair[0].0 }.into());
                }
            }

            Ok(children.into_iter().flat_map(|(_, encoding)| encoding).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::encode;
    use crate::{decode, Element, ErrorKind, Tag};
    use hex_literal::hex;

    #[test]
    fn primitive_round_trip() {
        let der = hex!("01 01 FF");
        assert_eq!(encode(&decode(&der).unwrap()).unwrap(), der);
    }

    #[test]
    fn canonicalises_lax_input() {
        // Non-minimal length, BOOLEAN TRUE as 0x01, padded INTEGER.
        assert_eq!(
            encode(&decode(&hex!("01 81 01 01")).unwrap()).unwrap(),
            hex!("01 01 FF")
        );
        assert_eq!(
            encode(&decode(&hex!("02 02 00 07")).unwrap()).unwrap(),
            hex!("02 01 07")
        );
    }

    #[test]
    fn time_offsets_normalise_to_zulu() {
        // UTCTime 23:45:40 at -07:00 denotes 06:45:40 the next day in
        // UTC; re-encoding emits the canonical Zulu string.
        let lax = b"910506234540-0700";
        let mut der = vec![0x17, lax.len() as u8];
        der.extend_from_slice(lax);

        assert_eq!(
            encode(&decode(&der).unwrap()).unwrap(),
            b"\x17\x0D910507064540Z"
        );
    }

    #[test]
    fn indefinite_becomes_definite() {
        assert_eq!(
            encode(&decode(&hex!("30 80 02 01 05 00 00")).unwrap()).unwrap(),
            hex!("30 03 02 01 05")
        );
    }

    #[test]
    fn set_of_sorts_and_merges() {
        let element = Element::set_of(vec![
            Element::octet_string(hex!("02").to_vec()),
            Element::octet_string(hex!("01").to_vec()),
            Element::octet_string(hex!("02").to_vec()),
        ]);
        assert_eq!(encode(&element).unwrap(), hex!("31 06 04 01 01 04 01 02"));
    }

    #[test]
    fn plain_set_keeps_order() {
        let element = Element::set(vec![
            Element::octet_string(hex!("02").to_vec()),
            Element::octet_string(hex!("01").to_vec()),
        ]);
        assert_eq!(encode(&element).unwrap(), hex!("31 06 04 02 04 01"));
    }

    #[test]
    fn set_der_sorts_by_tag() {
        let element = Element::set_der(vec![
            Element::integer(1),
            Element::boolean(true),
            Element::octet_string(hex!("AA").to_vec()).retag(Tag::context(0)),
        ]);
        assert_eq!(
            encode(&element).unwrap(),
            hex!("31 09 01 01 FF 02 01 01 80 01 AA")
        );
    }

    #[test]
    fn set_der_duplicate_tag_fails() {
        let element = Element::set_der(vec![Element::integer(1), Element::integer(2)]);
        assert_eq!(
            encode(&element).unwrap_err().kind(),
            ErrorKind::SetDuplicate { tag: Tag::INTEGER }
        );
    }

    #[test]
    fn implicit_tag_override() {
        let element = Element::string(Tag::IA5_STRING, "foo")
            .unwrap()
            .retag(Tag::context(0));
        assert_eq!(encode(&element).unwrap(), hex!("80 03 66 6F 6F"));
    }
}
