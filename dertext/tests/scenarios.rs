//! End-to-end build / match / print scenarios.

use dertext::{build, matches, print, PrintOptions, Value};
use dertree::{decode, encode, Element, Tag};
use hex_literal::hex;
use num_bigint::BigInt;

fn build_der(spec: &str, params: &[Value]) -> Vec<u8> {
    encode(&build(spec, params).unwrap().expect("absent")).unwrap()
}

fn one_line() -> PrintOptions {
    PrintOptions {
        numeric_oid: false,
        indent: None,
    }
}

#[test]
fn boolean_both_ways() {
    assert_eq!(build_der("(bool true)", &[]), hex!("01 01 FF"));
    let element = decode(&hex!("01 01 FF")).unwrap();
    assert_eq!(
        print(&element, &PrintOptions::default()).unwrap(),
        "(bool true)"
    );
}

#[test]
fn large_integer_both_ways() {
    let der = hex!("02 09 00 FF FF FF FF FF FF FF FF");
    assert_eq!(build_der("(int 18446744073709551615)", &[]), der);
    assert_eq!(
        print(&decode(&der).unwrap(), &PrintOptions::default()).unwrap(),
        "(int 18446744073709551615)"
    );
}

#[test]
fn oid_naming_modes() {
    let der = hex!("06 03 55 04 03");
    assert_eq!(build_der("(oid id-at-commonName)", &[]), der);
    assert_eq!(build_der("(oid 2.5.4.3)", &[]), der);

    let element = decode(&der).unwrap();
    assert_eq!(
        print(&element, &PrintOptions::default()).unwrap(),
        "(oid id-at-commonName)"
    );
    assert_eq!(
        print(
            &element,
            &PrintOptions {
                numeric_oid: true,
                ..PrintOptions::default()
            }
        )
        .unwrap(),
        "(oid 2.5.4.3)"
    );
}

#[test]
fn set_of_sorts_its_children() {
    assert_eq!(
        build_der("(setof (blob 02) (blob 01))", &[]),
        hex!("31 06 04 01 01 04 01 02")
    );
}

#[test]
fn implicit_tag_override() {
    let element = build("([0] ia5 \"foo\")", &[]).unwrap().unwrap();
    assert_eq!(element.tag(), Tag::context(0));
    assert!(!element.is_constructed());
    assert_eq!(element.value(), Some(&b"foo"[..]));
    assert_eq!(encode(&element).unwrap(), hex!("80 03 66 6F 6F"));
}

#[test]
fn optional_with_replacement() {
    let element = build("(sequence (int 1))", &[]).unwrap().unwrap();
    let mut params = Vec::new();
    matches(
        "(sequence (int %0) ?(bool %1):(%1 (bool false)))",
        &element,
        &mut params,
    )
    .unwrap();

    assert_eq!(params[0], Value::Big(BigInt::from(1)));
    assert_eq!(params[1], Value::Bool(false));
}

#[test]
fn explicit_tag_wrapper() {
    let der = build_der("([2] tag (int 5))", &[]);
    assert_eq!(der, hex!("A2 03 02 01 05"));

    let mut params = Vec::new();
    matches("([2] tag (int %0))", &decode(&der).unwrap(), &mut params).unwrap();
    assert_eq!(params[0], Value::Big(BigInt::from(5)));
}

#[test]
fn null_parameters_propagate_absence() {
    assert!(build("(bool %0)", &[Value::Null]).unwrap().is_none());

    // A parent skips absent children.
    assert_eq!(
        build_der("(sequence (int 1) ?(bool %0))", &[Value::Null]),
        hex!("30 03 02 01 01")
    );

    // An empty -nz constructed becomes absent itself.
    assert!(build("(sequence-nz (bool %0))", &[Value::Null])
        .unwrap()
        .is_none());
}

#[test]
fn build_iterates_lists_in_lockstep() {
    let params = vec![
        Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        Value::List(vec![Value::Str("a".into()), Value::Str("b".into())]),
    ];
    // Two full steps: the shorter list is exhausted first.
    assert_eq!(
        build_der("(sequence *(sequence (int %0) (ia5 %1)))", &params),
        hex!("30 10 30 06 02 01 01 16 01 61 30 06 02 01 02 16 01 62")
    );
}

#[test]
fn plus_requires_one() {
    let empty = [Value::List(Vec::new())];
    assert!(build("(sequence +(int %0))", &empty).is_err());
    assert!(build("(sequence *(int %0))", &empty)
        .unwrap()
        .is_some());
}

#[test]
fn match_accumulates_into_lists() {
    let element = build("(sequence (int 1) (int 2) (int 3))", &[])
        .unwrap()
        .unwrap();

    let mut params = Vec::new();
    matches("(sequence *(int %0))", &element, &mut params).unwrap();
    assert_eq!(
        params[0],
        Value::List(vec![
            Value::Big(BigInt::from(1)),
            Value::Big(BigInt::from(2)),
            Value::Big(BigInt::from(3)),
        ])
    );

    // *%N captures all remaining children as elements.
    let mut params = Vec::new();
    matches("(sequence (int 1) *%0)", &element, &mut params).unwrap();
    match &params[0] {
        Value::List(items) => assert_eq!(items.len(), 2),
        other => panic!("expected a list, got {:?}", other),
    }
}

#[test]
fn match_failures_keep_prior_captures() {
    let element = build("(sequence (int 7) (ia5 \"x\"))", &[]).unwrap().unwrap();

    let mut params = Vec::new();
    let err = matches("(sequence (int %0) (bool %1))", &element, &mut params).unwrap_err();
    assert!(err.is_match());
    assert_eq!(params[0], Value::Big(BigInt::from(7)));
}

#[test]
fn trailing_children_are_match_failures() {
    let element = build("(sequence (int 1) (int 2))", &[]).unwrap().unwrap();
    let mut params = Vec::new();
    let err = matches("(sequence (int %0))", &element, &mut params).unwrap_err();
    assert!(err.is_match());
}

#[test]
fn blob_string_parameter_is_reparsed_as_spec() {
    let der = build_der("(blob %0)", &[Value::Str("(int 5)".into())]);
    // The blob's content is the DER of (int 5).
    assert_eq!(der, hex!("04 03 02 01 05"));
}

#[test]
fn bits_nested_payload_requires_zero_unused() {
    assert_eq!(
        build_der("(bits 0 (bool true))", &[]),
        hex!("03 04 00 01 01 FF")
    );
    assert!(build("(bits 4 (bool true))", &[]).is_err());
}

#[test]
fn setder_rejects_duplicate_tags() {
    let element = build("(setder (int 1) (int 2))", &[]).unwrap().unwrap();
    assert!(encode(&element).is_err());

    assert_eq!(
        build_der("(setder (bool true) (int 2))", &[]),
        hex!("31 06 01 01 FF 02 01 02")
    );
}

#[test]
fn printer_round_trips_a_tree() {
    let tbs = Element::sequence(vec![
        Element::integer(42),
        Element::sequence(vec![
            Element::oid(&"1.2.840.113549.1.1.11".parse().unwrap()),
            Element::null(),
        ]),
        Element::set(vec![Element::sequence(vec![
            Element::oid(&"2.5.4.3".parse().unwrap()),
            Element::string(Tag::PRINTABLE_STRING, "Test CA").unwrap(),
        ])]),
        Element::utc_time("230101000000Z").unwrap(),
        Element::bit_string(0, &hex!("AA BB")).unwrap(),
        Element::octet_string(hex!("01 02 03").to_vec()).retag(Tag::context(7)),
    ]);
    let der = encode(&tbs).unwrap();

    for options in [PrintOptions::default(), one_line()] {
        let text = print(&decode(&der).unwrap(), &options).unwrap();
        let rebuilt = build(&text, &[]).unwrap().expect("absent");
        assert_eq!(encode(&rebuilt).unwrap(), der, "spec was:\n{}", text);
    }
}

#[test]
fn printer_descends_only_when_reencodable() {
    // Canonical DER payload: presented as a nested object.
    let blob = Element::octet_string(encode(&Element::integer(5)).unwrap());
    assert_eq!(
        print(&blob, &one_line()).unwrap(),
        "(blob (int 5))"
    );

    // A BER variant (non-minimal INTEGER) decodes but does not
    // re-encode identically, so it stays hex.
    let lax = Element::octet_string(hex!("02 02 00 05").to_vec());
    assert_eq!(
        print(&lax, &one_line()).unwrap(),
        "(blob 02 02 00 05)"
    );
}

#[test]
fn printer_ascii_peek_and_time_comment() {
    let blob = Element::octet_string(b"hi".to_vec());
    assert_eq!(
        print(&blob, &PrintOptions::default()).unwrap(),
        "(blob 68 69 { \"hi\" })"
    );
    // Comments are suppressed on one-line output.
    assert_eq!(print(&blob, &one_line()).unwrap(), "(blob 68 69)");

    let utc = Element::utc_time("230101000000Z").unwrap();
    assert_eq!(
        print(&utc, &PrintOptions::default()).unwrap(),
        "(utc 230101000000Z { 2023-01-01 00:00:00 UTC })"
    );
    assert_eq!(print(&utc, &one_line()).unwrap(), "(utc 230101000000Z)");
}

#[test]
fn build_match_duality() {
    let spec = "(sequence (int %0) (ia5 %1) (setof (blob %2)))";
    let params = vec![
        Value::Int(300),
        Value::Str("duality".into()),
        Value::Bytes(vec![0xAB, 0xCD]),
    ];
    let element = build(spec, &params).unwrap().unwrap();

    let mut captured = Vec::new();
    matches(spec, &element, &mut captured).unwrap();
    assert_eq!(captured[0], Value::Big(BigInt::from(300)));
    assert_eq!(captured[1], Value::Str("duality".into()));
    assert_eq!(captured[2], Value::Bytes(vec![0xAB, 0xCD]));
}

#[test]
fn comments_can_disable_regions() {
    let der = build_der(
        "(sequence (int 1) { ?(bool %0) is off \"}\" stays off } (int 2) ; tail\n)",
        &[],
    );
    assert_eq!(der, hex!("30 06 02 01 01 02 01 02"));
}

#[test]
fn tag_parameters() {
    // Tag number supplied as a parameter.
    let der = build_der("([%0] ia5 \"x\")", &[Value::Int(3)]);
    assert_eq!(der, hex!("83 01 78"));

    // A null tag parameter makes the node absent.
    assert_eq!(
        build_der("(sequence ([%0] ia5 \"x\") (int 1))", &[Value::Null]),
        hex!("30 03 02 01 01")
    );
}

#[test]
fn match_captures_tag_number() {
    let element = build("([5] blob AA)", &[]).unwrap().unwrap();
    let mut params = Vec::new();
    matches("([%0] blob %1)", &element, &mut params).unwrap();
    assert_eq!(params[0], Value::Int(5));
    assert_eq!(params[1], Value::Bytes(vec![0xAA]));
}
