//! The ASN.1 element tree.

use crate::asn1::{self, bit_string, boolean, integer, strings, time};
use crate::{Class, Oid, Result, Tag};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use core::fmt;
use num_bigint::BigInt;

/// Ordering discipline applied to a SET's children at encoding time.
///
/// Decoded elements and `sequence`/`set` built from text keep their
/// children in the order given, so re-encoding reproduces the input.
/// The `setof` and `setder` text keywords build elements that defer
/// their DER ordering obligations to the encoder.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SetSort {
    /// Children are emitted in the order they are held.
    Keep,

    /// SET OF: children are emitted in the lexicographic order of their
    /// DER encodings; children with identical encodings are merged.
    ByEncoding,

    /// DER SET: children are emitted sorted by (class, tag number);
    /// two children with the same tag make encoding fail.
    ByTag,
}

#[derive(Clone, PartialEq)]
enum Content {
    Primitive(Bytes),
    Constructed(Vec<Element>),
}

/// One node of an ASN.1 value: a tag, the constructed flag, and either
/// raw content octets or an ordered list of children.
///
/// Elements are immutable once constructed. An element produced by
/// [`decode`][`crate::decode`] additionally records the exact encoded
/// span it came from (identifier, length and content octets) as a
/// zero-copy slice of the decode buffer; elements built any other way
/// carry no source span and encode fresh.
#[derive(Clone)]
pub struct Element {
    tag: Tag,
    constructed: bool,
    content: Content,
    set_sort: SetSort,
    source: Option<Bytes>,
}

impl Element {
    /// Create a primitive element with raw content octets.
    pub fn primitive(tag: Tag, value: impl Into<Bytes>) -> Element {
        Element {
            tag,
            constructed: false,
            content: Content::Primitive(value.into()),
            set_sort: SetSort::Keep,
            source: None,
        }
    }

    /// Create a constructed element from its children.
    pub fn constructed(tag: Tag, children: Vec<Element>) -> Element {
        Element {
            tag,
            constructed: true,
            content: Content::Constructed(children),
            set_sort: SetSort::Keep,
            source: None,
        }
    }

    /// `BOOLEAN`.
    pub fn boolean(value: bool) -> Element {
        Element::primitive(Tag::BOOLEAN, boolean::encode(value).to_vec())
    }

    /// `INTEGER`.
    pub fn integer(value: impl Into<BigInt>) -> Element {
        Element::primitive(Tag::INTEGER, integer::encode(&value.into()))
    }

    /// `ENUMERATED`.
    pub fn enumerated(value: impl Into<BigInt>) -> Element {
        Element::primitive(Tag::ENUMERATED, integer::encode(&value.into()))
    }

    /// `BIT STRING` from the ignored-bit count and payload.
    pub fn bit_string(unused: u8, payload: &[u8]) -> Result<Element> {
        Ok(Element::primitive(
            Tag::BIT_STRING,
            bit_string::encode(unused, payload)?,
        ))
    }

    /// `OCTET STRING`.
    pub fn octet_string(value: impl Into<Bytes>) -> Element {
        Element::primitive(Tag::OCTET_STRING, value)
    }

    /// `NULL`.
    pub fn null() -> Element {
        Element::primitive(Tag::NULL, Bytes::new())
    }

    /// `OBJECT IDENTIFIER`.
    pub fn oid(value: &Oid) -> Element {
        Element::primitive(Tag::OBJECT_IDENTIFIER, value.to_content())
    }

    /// A restricted character string of the type identified by `tag`,
    /// which must be one of the eight supported string tags.
    pub fn string(tag: Tag, value: &str) -> Result<Element> {
        Ok(Element::primitive(tag, strings::encode(tag, value)?))
    }

    /// `UTCTime` from its string form, which must parse; the stored
    /// content is the canonical Zulu string for the denoted instant.
    pub fn utc_time(value: &str) -> Result<Element> {
        Element::utc_time_from(&time::parse_utc_time(value)?)
    }

    /// `GeneralizedTime` from its string form, which must parse; the
    /// stored content is the canonical Zulu string for the denoted
    /// instant.
    pub fn generalized_time(value: &str) -> Result<Element> {
        Element::generalized_time_from(&time::parse_generalized_time(value)?)
    }

    /// `UTCTime` in the canonical form for an instant.
    pub fn utc_time_from(value: &DateTime<Utc>) -> Result<Element> {
        Ok(Element::primitive(
            Tag::UTC_TIME,
            time::utc_time_string(value)?.into_bytes(),
        ))
    }

    /// `GeneralizedTime` in the canonical form for an instant.
    pub fn generalized_time_from(value: &DateTime<Utc>) -> Result<Element> {
        Ok(Element::primitive(
            Tag::GENERALIZED_TIME,
            time::generalized_time_string(value)?.into_bytes(),
        ))
    }

    /// `SEQUENCE` with children in the given order.
    pub fn sequence(children: Vec<Element>) -> Element {
        Element::constructed(Tag::SEQUENCE, children)
    }

    /// `SET` with children in the given order.
    pub fn set(children: Vec<Element>) -> Element {
        Element::constructed(Tag::SET, children)
    }

    /// `SET OF`: children are value-sorted and deduplicated when the
    /// element is encoded.
    pub fn set_of(children: Vec<Element>) -> Element {
        let mut element = Element::constructed(Tag::SET, children);
        element.set_sort = SetSort::ByEncoding;
        element
    }

    /// DER `SET`: children are tag-sorted when the element is encoded,
    /// and duplicate tags make encoding fail.
    pub fn set_der(children: Vec<Element>) -> Element {
        let mut element = Element::constructed(Tag::SET, children);
        element.set_sort = SetSort::ByTag;
        element
    }

    /// Replace this element's tag (an implicit tag override), keeping
    /// the content and the constructed flag.
    pub fn retag(mut self, tag: Tag) -> Element {
        self.tag = tag;
        self.source = None;
        self
    }

    pub(crate) fn with_source(mut self, source: Bytes) -> Element {
        self.source = Some(source);
        self
    }

    /// The element's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// The element's tag class.
    pub fn class(&self) -> Class {
        self.tag.class
    }

    /// The element's tag number.
    pub fn number(&self) -> u32 {
        self.tag.number
    }

    /// Is this the constructed form?
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// The raw content octets of a primitive element.
    pub fn value(&self) -> Option<&[u8]> {
        match &self.content {
            Content::Primitive(value) => Some(value),
            Content::Constructed(_) => None,
        }
    }

    /// The children of a constructed element (empty for primitives).
    pub fn children(&self) -> &[Element] {
        match &self.content {
            Content::Primitive(_) => &[],
            Content::Constructed(children) => children,
        }
    }

    /// The SET ordering discipline.
    pub fn set_sort(&self) -> SetSort {
        self.set_sort
    }

    /// The encoded span this element was decoded from, when it was
    /// produced by the decoder.
    pub fn source(&self) -> Option<&[u8]> {
        self.source.as_deref()
    }

    /// Decode a single element from strict or lax BER.
    pub fn from_der(input: &[u8]) -> Result<Element> {
        crate::decode(input)
    }

    /// Encode this element as strict DER.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        crate::encode(self)
    }

    /// Rebuild this element from scratch through the canonical value
    /// codecs, without consulting any memoised source span.
    ///
    /// The result encodes to the canonical DER for the element's public
    /// view, which is what the pretty-printer compares against original
    /// bytes before presenting a nested decode as structural.
    pub fn duplicate(&self) -> Result<Element> {
        let content = match &self.content {
            Content::Constructed(children) => Content::Constructed(
                children
                    .iter()
                    .map(Element::duplicate)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Content::Primitive(value) => {
                let canonical = if self.tag.class == Class::Universal {
                    asn1::canonical_value(self.tag, value)?
                } else {
                    value.to_vec()
                };
                Content::Primitive(canonical.into())
            }
        };

        Ok(Element {
            tag: self.tag,
            constructed: self.constructed,
            content,
            set_sort: self.set_sort,
            source: None,
        })
    }
}

/// Equality of the public view: the memoised source span does not
/// participate.
impl PartialEq for Element {
    fn eq(&self, other: &Element) -> bool {
        self.tag == other.tag
            && self.constructed == other.constructed
            && self.set_sort == other.set_sort
            && self.content == other.content
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.content {
            Content::Primitive(value) => {
                write!(f, "Element({}, {} bytes)", self.tag, value.len())
            }
            Content::Constructed(children) => {
                write!(f, "Element({}, {:?})", self.tag, children)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Element;
    use crate::{Oid, Tag};
    use hex_literal::hex;

    #[test]
    fn typed_constructors() {
        assert_eq!(Element::boolean(true).value(), Some(&hex!("FF")[..]));
        assert_eq!(Element::integer(256).value(), Some(&hex!("01 00")[..]));
        assert_eq!(Element::null().value(), Some(&[][..]));

        let oid: Oid = "2.5.4.3".parse().unwrap();
        assert_eq!(Element::oid(&oid).value(), Some(&hex!("55 04 03")[..]));

        let s = Element::string(Tag::IA5_STRING, "foo").unwrap();
        assert_eq!(s.tag(), Tag::IA5_STRING);
        assert_eq!(s.value(), Some(&b"foo"[..]));
    }

    #[test]
    fn retag_keeps_shape() {
        let element = Element::string(Tag::IA5_STRING, "foo")
            .unwrap()
            .retag(Tag::context(0));
        assert_eq!(element.tag(), Tag::context(0));
        assert!(!element.is_constructed());
        assert_eq!(element.value(), Some(&b"foo"[..]));
    }

    #[test]
    fn source_ignored_by_equality() {
        let decoded = Element::from_der(&hex!("01 01 FF")).unwrap();
        assert!(decoded.source().is_some());
        assert_eq!(decoded, Element::boolean(true));
    }

    #[test]
    fn times_are_stored_canonically() {
        let utc = Element::utc_time("910506234540-0700").unwrap();
        assert_eq!(utc.value(), Some(&b"910507064540Z"[..]));

        let gen = Element::generalized_time("19910506234540.500Z").unwrap();
        assert_eq!(gen.value(), Some(&b"19910506234540.5Z"[..]));
    }

    #[test]
    fn duplicate_canonicalises() {
        // Non-minimal INTEGER content survives decoding but not a
        // duplicate walk.
        let decoded = Element::from_der(&hex!("02 02 00 05")).unwrap();
        assert_eq!(decoded.value(), Some(&hex!("00 05")[..]));

        let rebuilt = decoded.duplicate().unwrap();
        assert_eq!(rebuilt.value(), Some(&hex!("05")[..]));
        assert!(rebuilt.source().is_none());
    }
}
