//! Shared plumbing for the `dder` and `mder` command-line tools.
//!
//! The library half is the input sniffer: given bytes that may be raw
//! BER, Base64 or PEM, find the BER object inside.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod sniff;
