//! BER decoder.

use crate::{Element, ErrorKind, Length, Result, Tag};
use bytes::Bytes;

/// Maximum nesting depth the decoder will follow.
///
/// Length declarations are cross-checked against the remaining buffer
/// at every descent, so memory use is bounded by the input size; the
/// depth cap bounds stack use against pathologically nested inputs.
pub const DEPTH_LIMIT: usize = 256;

/// Decode a single element from `input`, which must contain exactly one
/// BER-encoded object.
///
/// The accepted encoding is BER with the usual laxities: non-minimal
/// tag and length forms and indefinite-length constructed values.
/// Primitive content octets are taken as-is; their type-specific
/// laxities are resolved when the value is used or re-encoded.
///
/// The input is copied once; every element in the returned tree records
/// its encoded span as a zero-copy slice of that single buffer.
pub fn decode(input: &[u8]) -> Result<Element> {
    let mut reader = Reader {
        buf: Bytes::copy_from_slice(input),
        pos: 0,
    };

    let element = reader.read_element(DEPTH_LIMIT)?;

    if reader.pos != reader.buf.len() {
        return Err(ErrorKind::TrailingData {
            decoded: reader.pos,
            remaining: reader.buf.len() - reader.pos,
        }
        .at(reader.pos));
    }

    Ok(element)
}

struct Reader {
    buf: Bytes,
    pos: usize,
}

impl Reader {
    fn read_element(&mut self, depth: usize) -> Result<Element> {
        if depth == 0 {
            return Err(ErrorKind::DepthLimit.at(self.pos));
        }

        let start = self.pos;
        let (tag, constructed, used) =
            Tag::from_bytes(&self.buf[self.pos..]).map_err(|e| e.kind().at(self.pos))?;
        self.pos += used;

        // Universal tag 0 is reserved for the end-of-contents marker.
        if tag == Tag::universal(0) && !constructed {
            return Err(ErrorKind::UnexpectedEndOfContents.at(start));
        }

        if (tag == Tag::SEQUENCE || tag == Tag::SET) && !constructed {
            return Err(ErrorKind::NotConstructed { tag }.at(start));
        }

        let (length, used) =
            Length::from_bytes(&self.buf[self.pos..]).map_err(|e| e.kind().at(self.pos))?;
        self.pos += used;

        let element = match (constructed, length) {
            (false, Length::Definite(len)) => {
                let end = self.content_end(len)?;
                let value = self.buf.slice(self.pos..end);
                self.pos = end;
                Element::primitive(tag, value)
            }
            (false, Length::Indefinite) => {
                return Err(ErrorKind::IndefinitePrimitive.at(start));
            }
            (true, Length::Definite(len)) => {
                let end = self.content_end(len)?;
                let mut children = Vec::new();
                while self.pos < end {
                    children.push(self.read_element(depth - 1)?);
                }
                if self.pos != end {
                    return Err(ErrorKind::Length.at(end));
                }
                Element::constructed(tag, children)
            }
            (true, Length::Indefinite) => {
                let mut children = Vec::new();
                while !self.at_end_of_contents()? {
                    children.push(self.read_element(depth - 1)?);
                }
                self.pos += 2;
                Element::constructed(tag, children)
            }
        };

        Ok(element.with_source(self.buf.slice(start..self.pos)))
    }

    fn content_end(&self, len: usize) -> Result<usize> {
        self.pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| ErrorKind::Length.at(self.pos))
    }

    fn at_end_of_contents(&self) -> Result<bool> {
        match self.buf.get(self.pos) {
            None => Err(ErrorKind::Truncated.at(self.pos)),
            Some(0x00) => match self.buf.get(self.pos + 1) {
                None => Err(ErrorKind::Truncated.at(self.pos)),
                Some(0x00) => Ok(true),
                // A zero identifier octet is only valid as part of the
                // end-of-contents marker.
                Some(_) => Err(ErrorKind::UnexpectedEndOfContents.at(self.pos)),
            },
            Some(_) => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::decode;
    use crate::{Element, ErrorKind, Tag};
    use hex_literal::hex;

    #[test]
    fn primitive() {
        let element = decode(&hex!("01 01 FF")).unwrap();
        assert_eq!(element, Element::boolean(true));
        assert_eq!(element.source(), Some(&hex!("01 01 FF")[..]));
    }

    #[test]
    fn nested_sequence() {
        let element = decode(&hex!("30 06 02 01 01 02 01 02")).unwrap();
        assert_eq!(
            element,
            Element::sequence(vec![Element::integer(1), Element::integer(2)])
        );
        assert_eq!(element.children()[1].source(), Some(&hex!("02 01 02")[..]));
    }

    #[test]
    fn indefinite_length() {
        let element = decode(&hex!("30 80 02 01 05 00 00")).unwrap();
        assert_eq!(element, Element::sequence(vec![Element::integer(5)]));
    }

    #[test]
    fn indefinite_primitive_rejected() {
        assert_eq!(
            decode(&hex!("04 80 00 00")).unwrap_err().kind(),
            ErrorKind::IndefinitePrimitive
        );
    }

    #[test]
    fn primitive_sequence_rejected() {
        assert_eq!(
            decode(&hex!("10 00")).unwrap_err().kind(),
            ErrorKind::NotConstructed { tag: Tag::SEQUENCE }
        );
    }

    #[test]
    fn length_beyond_buffer() {
        assert_eq!(
            decode(&hex!("04 05 01 02")).unwrap_err().kind(),
            ErrorKind::Length
        );
    }

    #[test]
    fn trailing_data_rejected() {
        let err = decode(&hex!("05 00 05 00")).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::TrailingData {
                decoded: 2,
                remaining: 2
            }
        );
    }

    #[test]
    fn child_overruns_parent() {
        // SEQUENCE claims 3 content octets but its child takes 4.
        assert!(decode(&hex!("30 03 04 02 AA BB")).is_err());
    }

    #[test]
    fn stray_end_of_contents() {
        assert_eq!(
            decode(&hex!("30 04 00 00 05 00")).unwrap_err().kind(),
            ErrorKind::UnexpectedEndOfContents
        );
    }

    #[test]
    fn depth_limit_enforced() {
        // 300 nested SEQUENCEs around a NULL.
        let mut input = hex!("05 00").to_vec();
        for _ in 0..300 {
            let mut wrapped = vec![0x30];
            crate::Length::write(input.len(), &mut wrapped);
            wrapped.extend_from_slice(&input);
            input = wrapped;
        }
        assert_eq!(decode(&input).unwrap_err().kind(), ErrorKind::DepthLimit);
    }
}
