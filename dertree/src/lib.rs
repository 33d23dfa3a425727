//! ASN.1 element trees with a BER decoder and a strict DER encoder.
//!
//! This crate is the binary substrate of the toolkit: an in-memory
//! [`Element`] tree, the identifier/length framing of X.690, value
//! codecs for the universal primitive types, and a name registry for
//! well-known OBJECT IDENTIFIERs.
//!
//! # Decoding and encoding
//!
//! [`decode`] accepts BER, including the variants strict DER forbids:
//! non-minimal tag and length encodings, indefinite-length constructed
//! values, sloppy BOOLEAN and INTEGER content, noise in the ignored
//! bits of a BIT STRING, byte order marks and surrogate pairs in the
//! Unicode string types. [`encode`] always produces strict DER, so a
//! decode/encode round trip canonicalises:
//!
//! ```
//! use dertree::{decode, encode};
//!
//! // BOOLEAN TRUE with a non-minimal length and a lax content octet.
//! let lax = [0x01, 0x81, 0x01, 0x01];
//! let element = decode(&lax)?;
//! assert_eq!(encode(&element)?, [0x01, 0x01, 0xFF]);
//! # Ok::<(), dertree::Error>(())
//! ```
//!
//! Decoded elements keep a zero-copy reference to the span of the
//! input buffer they came from (see [`Element::source`]); elements
//! built programmatically encode fresh.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod asn1;
pub mod registry;

mod decode;
mod element;
mod encode;
mod error;
mod length;
mod oid;
mod tag;

pub use crate::{
    decode::{decode, DEPTH_LIMIT},
    element::{Element, SetSort},
    encode::encode,
    error::{Error, ErrorKind, Result},
    length::Length,
    oid::Oid,
    tag::{Class, Tag},
};
