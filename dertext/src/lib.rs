//! A parenthesised text format for ASN.1 BER/DER values.
//!
//! The format is isomorphic to the DER it describes. [`print`] renders
//! a [`dertree::Element`] as a spec; [`build`] turns a spec (plus a
//! vector of [`Value`] parameters for its `%N` slots) back into an
//! element; [`matches`] walks a spec against an existing element and
//! extracts typed fields into the parameters.
//!
//! ```
//! use dertext::{build, matches, Value};
//!
//! // Build: parameters are read.
//! let spec = "(sequence (int %0) (ia5 %1))";
//! let params = vec![Value::Int(7), Value::Str("hi".into())];
//! let element = build(spec, &params)?.expect("not absent");
//! assert_eq!(element.to_der().unwrap(), b"\x30\x07\x02\x01\x07\x16\x02hi");
//!
//! // Match: parameters are written.
//! let mut captured = Vec::new();
//! matches(spec, &element, &mut captured)?;
//! assert_eq!(captured[1], Value::Str("hi".into()));
//! # Ok::<(), dertext::Error>(())
//! ```
//!
//! The grammar: `;` line comments and nested `{ … }` block comments,
//! `"…"` literals with `\xNN`/`\uNNNN`/`\UNNNNNN` escapes, hex blob
//! runs, `[class value]` implicit-tag overrides, `*`/`+` repetition,
//! `?` optionality with `:(…)` replacement actions.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod build;
mod error;
mod keyword;
mod matcher;
mod printer;
mod spec;
mod token;
mod value;

pub use crate::{
    build::build,
    error::{Error, ErrorKind, Result},
    matcher::matches,
    printer::{print, PrintOptions},
    value::Value,
};
