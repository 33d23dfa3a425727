//! The pretty-printer: element tree to text spec.

use crate::{ErrorKind, Result};
use dertree::asn1::{bit_string, boolean, integer, strings, time};
use dertree::{registry, Class, Element, Oid, SetSort, Tag};
use std::fmt::Write;

/// Rendering policies.
#[derive(Clone, Debug)]
pub struct PrintOptions {
    /// Always print OIDs numerically instead of trying the name
    /// registry first.
    pub numeric_oid: bool,

    /// Per-depth indentation prefix. `None` renders everything on one
    /// line with single-space separators and drops the informational
    /// comments.
    pub indent: Option<String>,
}

impl Default for PrintOptions {
    fn default() -> PrintOptions {
        PrintOptions {
            numeric_oid: false,
            indent: Some("    ".to_string()),
        }
    }
}

/// Render `element` as a text spec that builds back to an element with
/// the same DER encoding.
pub fn print(element: &Element, options: &PrintOptions) -> Result<String> {
    let mut printer = Printer {
        out: String::new(),
        options,
    };
    printer.node(element, 0)?;
    Ok(printer.out)
}

/// Keyword for a primitive universal tag number.
fn primitive_keyword(number: u32) -> Option<&'static str> {
    Some(match number {
        1 => "bool",
        2 => "int",
        3 => "bits",
        4 => "blob",
        5 => "null",
        6 => "oid",
        10 => "enum",
        12 => "utf8",
        18 => "numeric",
        19 => "printable",
        20 => "teletex",
        22 => "ia5",
        23 => "utc",
        24 => "gentime",
        27 => "general",
        28 => "utf32",
        30 => "bmp",
        _ => return None,
    })
}

struct Printer<'o> {
    out: String,
    options: &'o PrintOptions,
}

impl Printer<'_> {
    fn node(&mut self, element: &Element, depth: usize) -> Result<()> {
        let tag = element.tag();

        if (tag == Tag::SEQUENCE || tag == Tag::SET) && !element.is_constructed() {
            return Err(ErrorKind::Tree(dertree::ErrorKind::NotConstructed { tag }).into());
        }

        // Pick the keyword and the tag it naturally carries; when the
        // element's tag differs, an implicit-tag bracket restores it.
        let (keyword, natural) = if element.is_constructed() {
            match element.set_sort() {
                SetSort::ByEncoding => ("setof", Tag::SET),
                SetSort::ByTag => ("setder", Tag::SET),
                SetSort::Keep if tag == Tag::SET => ("set", Tag::SET),
                SetSort::Keep => ("sequence", Tag::SEQUENCE),
            }
        } else {
            match tag.class {
                Class::Universal => match primitive_keyword(tag.number) {
                    Some(keyword) => (keyword, tag),
                    None => ("blob", Tag::OCTET_STRING),
                },
                _ => ("blob", Tag::OCTET_STRING),
            }
        };

        self.out.push('(');
        if tag != natural {
            self.bracket(tag);
            self.out.push(' ');
        }
        self.out.push_str(keyword);

        if element.is_constructed() {
            for child in element.children() {
                self.separator(depth + 1);
                self.node(child, depth + 1)?;
            }
            self.out.push(')');
            return Ok(());
        }

        let value = element.value().unwrap_or_default();
        if tag != natural {
            // Foreign tag: raw octets under the blob keyword.
            self.hex_payload(value, depth, true)?;
        } else {
            self.primitive_value(tag, value, depth)?;
        }

        self.out.push(')');
        Ok(())
    }

    fn primitive_value(&mut self, tag: Tag, value: &[u8], depth: usize) -> Result<()> {
        match tag.number {
            1 => {
                let decoded = boolean::decode(value)?;
                self.out
                    .push_str(if decoded { " true" } else { " false" });
            }
            2 | 10 => {
                let decoded = integer::decode(value)?;
                write!(self.out, " {}", decoded).expect("writing to a string");
            }
            3 => {
                let (unused, payload) = bit_string::decode(value)?;
                write!(self.out, " {}", unused).expect("writing to a string");
                self.hex_payload(payload, depth, unused == 0)?;
            }
            4 => {
                self.hex_payload(value, depth, true)?;
            }
            5 => {
                dertree::asn1::null::decode(value)?;
            }
            6 => {
                let oid = Oid::from_content(value)?;
                if self.options.numeric_oid {
                    write!(self.out, " {}", oid).expect("writing to a string");
                } else {
                    write!(self.out, " {}", registry::to_name(&oid))
                        .expect("writing to a string");
                }
            }
            23 | 24 => {
                let text = core::str::from_utf8(value)
                    .map_err(|_| ErrorKind::Tree(dertree::ErrorKind::Value { tag }))?;
                let instant = if tag.number == 23 {
                    time::parse_utc_time(text)?
                } else {
                    time::parse_generalized_time(text)?
                };

                write!(self.out, " {}", text).expect("writing to a string");
                if self.options.indent.is_some() {
                    write!(self.out, " {{ {} }}", time::format_instant(&instant))
                        .expect("writing to a string");
                }
            }
            _ => {
                // The remaining primitive keywords are the string
                // types.
                let decoded = strings::decode(tag, value)?;
                self.out.push(' ');
                self.quoted(&decoded);
            }
        }

        Ok(())
    }

    /// Render a blob or bit-string payload: as a nested object when
    /// that is provably safe, as hex octets otherwise.
    fn hex_payload(&mut self, bytes: &[u8], depth: usize, try_nested: bool) -> Result<()> {
        if try_nested {
            if let Some(nested) = reencodable(bytes) {
                self.out.push(' ');
                return self.node(&nested, depth);
            }
        }

        if bytes.is_empty() {
            return Ok(());
        }

        if self.options.indent.is_some() && bytes.len() > 16 {
            for chunk in bytes.chunks(16) {
                self.separator(depth + 1);
                self.hex_octets(chunk);
            }
        } else {
            self.out.push(' ');
            self.hex_octets(bytes);
        }

        if self.options.indent.is_some() && is_ascii_peekable(bytes) {
            self.out.push_str(" { ");
            self.quoted(&bytes.iter().map(|&b| char::from(b)).collect::<String>());
            self.out.push_str(" }");
        }

        Ok(())
    }

    fn hex_octets(&mut self, bytes: &[u8]) {
        for (i, byte) in bytes.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            write!(self.out, "{:02X}", byte).expect("writing to a string");
        }
    }

    fn quoted(&mut self, s: &str) {
        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 || c == '\u{7f}' => {
                    write!(self.out, "\\x{:02X}", c as u32).expect("writing to a string");
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }

    fn bracket(&mut self, tag: Tag) {
        match tag.class {
            Class::Universal => {
                write!(self.out, "[universal {}]", tag.number).expect("writing to a string");
            }
            Class::Application => {
                write!(self.out, "[application {}]", tag.number).expect("writing to a string");
            }
            Class::ContextSpecific => {
                write!(self.out, "[{}]", tag.number).expect("writing to a string");
            }
            Class::Private => {
                write!(self.out, "[private {}]", tag.number).expect("writing to a string");
            }
        }
    }

    fn separator(&mut self, depth: usize) {
        match &self.options.indent {
            Some(prefix) => {
                self.out.push('\n');
                for _ in 0..depth {
                    self.out.push_str(prefix);
                }
            }
            None => self.out.push(' '),
        }
    }
}

/// Attempt the tentative sub-object decode: the payload must decode as
/// BER *and* re-encode to exactly the original bytes. The re-encoding
/// check goes through [`Element::duplicate`], never the memoised source
/// span, so lax BER that would not survive the text round trip is never
/// presented as structure.
fn reencodable(bytes: &[u8]) -> Option<Element> {
    let decoded = dertree::decode(bytes).ok()?;
    let rebuilt = decoded.duplicate().ok()?;
    let reencoded = dertree::encode(&rebuilt).ok()?;
    (reencoded == bytes).then_some(decoded)
}

fn is_ascii_peekable(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && bytes
            .iter()
            .all(|&b| matches!(b, b'\t' | b'\n' | b'\r' | 0x20..=0x7E))
}
