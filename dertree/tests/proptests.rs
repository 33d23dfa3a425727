//! Round-trip properties for the decoder and encoder.

use dertree::{decode, encode, Element};
use proptest::prelude::*;

fn arb_element() -> impl Strategy<Value = Element> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Element::boolean),
        any::<i64>().prop_map(|n| Element::integer(n)),
        proptest::collection::vec(any::<u8>(), 0..32).prop_map(Element::octet_string),
        Just(Element::null()),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Element::sequence),
            proptest::collection::vec(inner, 0..4).prop_map(Element::set_of),
        ]
    })
}

proptest! {
    #[test]
    fn encode_decode_round_trip(element in arb_element()) {
        let der = encode(&element).unwrap();
        let decoded = decode(&der).unwrap();
        prop_assert_eq!(encode(&decoded).unwrap(), der);
    }

    #[test]
    fn decoded_elements_compare_equal(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
        let element = Element::octet_string(bytes);
        let der = encode(&element).unwrap();
        prop_assert_eq!(decode(&der).unwrap(), element);
    }

    #[test]
    fn set_of_is_order_independent(
        mut children in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..8),
            0..6,
        )
    ) {
        let forward = Element::set_of(
            children.iter().cloned().map(Element::octet_string).collect(),
        );
        children.reverse();
        let backward = Element::set_of(
            children.into_iter().map(Element::octet_string).collect(),
        );
        prop_assert_eq!(encode(&forward).unwrap(), encode(&backward).unwrap());
    }

    #[test]
    fn integer_content_is_minimal(n in any::<i64>()) {
        let der = encode(&Element::integer(n)).unwrap();
        // Identifier, length, then at most eight content octets for an
        // i64 plus one possible sign octet.
        prop_assert!(der.len() <= 2 + 9);
        prop_assert_eq!(encode(&decode(&der).unwrap()).unwrap(), der);
    }
}
