//! End-to-end decode/encode tests over a certificate-shaped value.

use dertree::{decode, encode, Element, Oid, Tag};
use hex_literal::hex;

fn name(attribute: &str, value: &str) -> Element {
    Element::sequence(vec![
        Element::oid(&dertree::registry::to_oid(attribute).unwrap()),
        Element::string(Tag::PRINTABLE_STRING, value).unwrap(),
    ])
}

#[test]
fn certificate_shaped_round_trip() {
    let tbs = Element::sequence(vec![
        Element::integer(1),
        Element::sequence(vec![
            Element::oid(&"1.2.840.113549.1.1.11".parse::<Oid>().unwrap()),
            Element::null(),
        ]),
        Element::sequence(vec![Element::set(vec![name("commonName", "Test CA")])]),
        Element::sequence(vec![
            Element::utc_time("230101000000Z").unwrap(),
            Element::utc_time("240101000000Z").unwrap(),
        ]),
        Element::bit_string(0, &hex!("AA BB CC")).unwrap(),
    ]);

    let der = encode(&tbs).unwrap();
    let decoded = decode(&der).unwrap();
    assert_eq!(decoded, tbs);
    assert_eq!(encode(&decoded).unwrap(), der);

    // The whole tree shares one buffer: every source span is a slice of
    // the decode input.
    assert_eq!(decoded.source(), Some(&der[..]));
    let serial = &decoded.children()[0];
    assert_eq!(serial.source(), Some(&hex!("02 01 01")[..]));
}

#[test]
fn strict_der_input_reencodes_identically() {
    // SEQUENCE { OID 2.5.4.3, PrintableString "AB" }
    let der = hex!("30 09 06 03 55 04 03 13 02 41 42");
    let decoded = decode(&der).unwrap();
    assert_eq!(encode(&decoded).unwrap(), der);
}

#[test]
fn lax_string_content_canonicalised() {
    // BMPString "hi" carrying a little-endian BOM.
    let lax = hex!("1E 06 FF FE 68 00 69 00");
    let decoded = decode(&lax).unwrap();
    assert_eq!(encode(&decoded).unwrap(), hex!("1E 04 00 68 00 69"));
}

#[test]
fn context_tags_pass_through() {
    // [0] { INTEGER 2 } as found in certificate version fields.
    let der = hex!("A0 03 02 01 02");
    let decoded = decode(&der).unwrap();
    assert_eq!(decoded.tag(), Tag::context(0));
    assert!(decoded.is_constructed());
    assert_eq!(encode(&decoded).unwrap(), der);
}
