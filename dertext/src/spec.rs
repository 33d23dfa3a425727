//! The parsed form of a text spec.
//!
//! The tokenizer feeds one parser, and the parser feeds both engines:
//! build mode walks the resulting [`SpecNode`] tree reading parameters
//! and producing an element, match mode walks it alongside an element
//! tree writing parameters. Everything the two modes share — grammar,
//! keyword dispatch, tag overrides, hex blobs, replacement actions —
//! lives in this representation.

use crate::keyword::Keyword;
use crate::token::{Token, Tokenizer};
use crate::value::{parse_bool_word, parse_class_word, Value};
use crate::{ErrorKind, Result};
use dertree::asn1::time;
use dertree::{registry, Class, Tag};
use num_bigint::BigInt;

/// Recursion cap for spec parsing and both engine walks.
pub(crate) const DEPTH_LIMIT: usize = 256;

/// One node of a spec.
#[derive(Clone, Debug)]
pub(crate) enum SpecNode {
    /// `( [tagspec] keyword body )`
    Object(Box<ObjectSpec>),

    /// A bare `%N`: a whole element, supplied or captured.
    Param(usize),

    /// `.`: consume and ignore (match mode only).
    Ignore,

    /// `*spec` / `+spec`
    Repeat {
        min_one: bool,
        inner: Box<SpecNode>,
    },

    /// `?spec` with an optional `:(…)` replacement action.
    Optional {
        inner: Box<SpecNode>,
        replacement: Vec<(usize, Value)>,
    },
}

#[derive(Clone, Debug)]
pub(crate) struct ObjectSpec {
    /// Byte offset of the opening parenthesis, for error reporting.
    pub pos: usize,

    /// The `[class value]` override, if any.
    pub tag: Option<TagSpec>,

    pub keyword: Keyword,
    pub body: Body,
}

/// A `[class value]` tag override.
#[derive(Clone, Debug)]
pub(crate) struct TagSpec {
    pub class: Option<ClassSpec>,
    pub value: ValueSpec,
}

#[derive(Clone, Debug)]
pub(crate) enum ClassSpec {
    Literal(Class),
    Param(usize),
}

#[derive(Clone, Debug)]
pub(crate) enum ValueSpec {
    /// A bare integer; implies CONTEXT when no class is given.
    Number(u32),

    /// A symbolic universal type keyword; implies UNIVERSAL.
    Universal(u32),

    /// A parameter; implies CONTEXT when no class is given.
    Param(usize),
}

/// A primitive value position: a literal, a parameter, or `.`.
#[derive(Clone, Debug)]
pub(crate) enum Slot<T> {
    Literal(T),
    Param(usize),
    Ignore,
}

/// The payload position of `bits` and `blob`.
#[derive(Clone, Debug)]
pub(crate) enum BlobBody {
    Hex(Vec<u8>),
    Nested(Box<SpecNode>),
    Param(usize),
    Ignore,
}

#[derive(Clone, Debug)]
pub(crate) enum Body {
    Bool(Slot<bool>),
    Int(Slot<BigInt>),
    Bits {
        unused: Slot<u8>,
        payload: BlobBody,
    },
    Blob(BlobBody),
    Null,
    Oid(Slot<String>),
    Str(Slot<String>),
    Time(Slot<String>),
    Children(Vec<SpecNode>),
    Wrap(Box<SpecNode>),
}

/// Parse a complete spec: exactly one node, nothing after it.
pub(crate) fn parse_spec(text: &str) -> Result<SpecNode> {
    let mut lex = Tokenizer::new(text);
    let node = parse_node(&mut lex, DEPTH_LIMIT)?;

    if lex.peek()?.is_some() {
        return Err(ErrorKind::Expected {
            what: "end of spec",
        }
        .at(lex.last_pos()));
    }

    Ok(node)
}

fn parse_node(lex: &mut Tokenizer<'_>, depth: usize) -> Result<SpecNode> {
    if depth == 0 {
        return Err(ErrorKind::DepthLimit.at(lex.last_pos()));
    }

    let token = lex.next()?.ok_or(ErrorKind::UnexpectedEnd)?;
    match token {
        Token::Star => Ok(SpecNode::Repeat {
            min_one: false,
            inner: Box::new(parse_node(lex, depth - 1)?),
        }),
        Token::Word(w) if w == "+" => Ok(SpecNode::Repeat {
            min_one: true,
            inner: Box::new(parse_node(lex, depth - 1)?),
        }),
        Token::Question => {
            let inner = Box::new(parse_node(lex, depth - 1)?);
            let replacement = if matches!(lex.peek()?, Some(Token::Colon)) {
                lex.next()?;
                parse_replacement(lex, depth - 1)?
            } else {
                Vec::new()
            };
            Ok(SpecNode::Optional { inner, replacement })
        }
        Token::Param(index) => Ok(SpecNode::Param(index)),
        Token::Word(w) if w == "." => Ok(SpecNode::Ignore),
        Token::LParen => parse_object(lex, depth),
        _ => Err(ErrorKind::Expected {
            what: "a sub-object",
        }
        .at(lex.last_pos())),
    }
}

/// Parse an object after its opening parenthesis, through the closing
/// one.
fn parse_object(lex: &mut Tokenizer<'_>, depth: usize) -> Result<SpecNode> {
    let pos = lex.last_pos();

    let tag = if matches!(lex.peek()?, Some(Token::LBracket)) {
        lex.next()?;
        Some(parse_tag_spec(lex)?)
    } else {
        None
    };

    let keyword = match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::Word(word) => Keyword::lookup(&word)
            .ok_or_else(|| ErrorKind::UnknownKeyword { word }.at(lex.last_pos()))?,
        _ => {
            return Err(ErrorKind::Expected {
                what: "an object keyword",
            }
            .at(lex.last_pos()))
        }
    };

    let body = match keyword {
        Keyword::Bool => Body::Bool(parse_slot(lex, |word, pos| {
            parse_bool_word(word).ok_or_else(|| {
                ErrorKind::Expected {
                    what: "a boolean literal",
                }
                .at(pos)
            })
        })?),
        Keyword::Int | Keyword::Enum => Body::Int(parse_slot(lex, parse_int_literal)?),
        Keyword::Bits => {
            let unused = parse_slot(lex, |word, pos| {
                word.parse::<u8>().ok().filter(|n| *n <= 7).ok_or_else(|| {
                    ErrorKind::Expected {
                        what: "an ignored-bit count",
                    }
                    .at(pos)
                })
            })?;
            let payload = parse_blob_body(lex, depth)?;
            Body::Bits { unused, payload }
        }
        Keyword::Blob => Body::Blob(parse_blob_body(lex, depth)?),
        Keyword::Null => Body::Null,
        Keyword::Oid => match lex.peek()? {
            Some(Token::Str(_)) => match lex.next()? {
                Some(Token::Str(s)) => Body::Oid(Slot::Literal(s)),
                _ => unreachable!("peeked a string literal"),
            },
            _ => Body::Oid(parse_slot(lex, |word, _| Ok(word.to_string()))?),
        },
        Keyword::Utc | Keyword::GenTime => match lex.peek()? {
            Some(Token::Str(_)) => match lex.next()? {
                Some(Token::Str(s)) => Body::Time(Slot::Literal(s)),
                _ => unreachable!("peeked a string literal"),
            },
            _ => Body::Time(parse_slot(lex, |word, _| Ok(word.to_string()))?),
        },
        _ if keyword.is_string() => {
            let slot = match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
                Token::Str(s) => Slot::Literal(s),
                Token::Param(index) => Slot::Param(index),
                Token::Word(w) if w == "." => Slot::Ignore,
                _ => {
                    return Err(ErrorKind::Expected {
                        what: "a string literal",
                    }
                    .at(lex.last_pos()))
                }
            };
            Body::Str(slot)
        }
        Keyword::Tag => {
            if tag.is_none() {
                return Err(ErrorKind::MissingTag.at(pos));
            }
            Body::Wrap(Box::new(parse_node(lex, depth - 1)?))
        }
        _ => {
            // Constructed keywords: children until the closing paren.
            let mut children = Vec::new();
            while !matches!(lex.peek()?, Some(Token::RParen) | None) {
                children.push(parse_node(lex, depth - 1)?);
            }
            Body::Children(children)
        }
    };

    expect_rparen(lex)?;

    Ok(SpecNode::Object(Box::new(ObjectSpec {
        pos,
        tag,
        keyword,
        body,
    })))
}

/// Parse a primitive value slot: a literal word (handed to `literal`),
/// a parameter, or `.`.
fn parse_slot<T>(
    lex: &mut Tokenizer<'_>,
    literal: impl FnOnce(&str, usize) -> Result<T>,
) -> Result<Slot<T>> {
    match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::Word(word) if word != "." => Ok(Slot::Literal(literal(&word, lex.last_pos())?)),
        Token::Word(_) => Ok(Slot::Ignore),
        Token::Param(index) => Ok(Slot::Param(index)),
        _ => Err(ErrorKind::Expected {
            what: "a value, parameter or .",
        }
        .at(lex.last_pos())),
    }
}

fn parse_int_literal(word: &str, pos: usize) -> Result<BigInt> {
    word.parse().map_err(|_| {
        ErrorKind::Expected {
            what: "an integer literal",
        }
        .at(pos)
    })
}

fn parse_blob_body(lex: &mut Tokenizer<'_>, depth: usize) -> Result<BlobBody> {
    match lex.peek()? {
        Some(Token::Param(_)) => match lex.next()? {
            Some(Token::Param(index)) => Ok(BlobBody::Param(index)),
            _ => unreachable!("peeked a parameter"),
        },
        Some(Token::Word(w)) if w == "." => {
            lex.next()?;
            Ok(BlobBody::Ignore)
        }
        Some(Token::LParen) => Ok(BlobBody::Nested(Box::new(parse_node(lex, depth - 1)?))),
        _ => Ok(BlobBody::Hex(parse_hex_run(lex)?)),
    }
}

/// Parse a run of whitespace- and colon-separated hex octets, up to
/// (not consuming) the closing parenthesis. The run may be empty; an
/// odd total number of digits is an error.
fn parse_hex_run(lex: &mut Tokenizer<'_>) -> Result<Vec<u8>> {
    let mut digits = Vec::new();

    loop {
        match lex.peek()? {
            Some(Token::RParen) | None => break,
            Some(Token::Colon) => {
                lex.next()?;
            }
            Some(Token::Word(_)) => {
                let word = match lex.next()? {
                    Some(Token::Word(word)) => word,
                    _ => unreachable!("peeked a word"),
                };
                for c in word.chars() {
                    let digit = c.to_digit(16).ok_or_else(|| {
                        ErrorKind::Expected { what: "hex octets" }.at(lex.last_pos())
                    })?;
                    digits.push(digit as u8);
                }
            }
            _ => {
                return Err(ErrorKind::Expected { what: "hex octets" }.at(lex.last_pos()));
            }
        }
    }

    if digits.len() % 2 != 0 {
        return Err(ErrorKind::OddHexDigits.at(lex.last_pos()));
    }

    Ok(digits.chunks_exact(2).map(|d| (d[0] << 4) | d[1]).collect())
}

/// Parse a `[class value]` after its opening bracket, through the
/// closing one.
fn parse_tag_spec(lex: &mut Tokenizer<'_>) -> Result<TagSpec> {
    let mut items = Vec::new();
    loop {
        match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
            Token::RBracket => break,
            token @ (Token::Word(_) | Token::Param(_)) => items.push(token),
            _ => return Err(ErrorKind::BadTagSpec.at(lex.last_pos())),
        }
        if items.len() > 2 {
            return Err(ErrorKind::BadTagSpec.at(lex.last_pos()));
        }
    }

    let (class_token, value_token) = match items.len() {
        1 => (None, items.remove(0)),
        2 => {
            let value = items.pop();
            (items.pop(), value.expect("two items collected"))
        }
        _ => return Err(ErrorKind::BadTagSpec.at(lex.last_pos())),
    };

    let class = match class_token {
        None => None,
        Some(Token::Param(index)) => Some(ClassSpec::Param(index)),
        Some(Token::Word(word)) => Some(ClassSpec::Literal(
            parse_class_word(&word).ok_or_else(|| ErrorKind::BadTagSpec.at(lex.last_pos()))?,
        )),
        _ => return Err(ErrorKind::BadTagSpec.at(lex.last_pos())),
    };

    let value = match value_token {
        Token::Param(index) => ValueSpec::Param(index),
        Token::Word(word) => {
            if word.bytes().all(|b| b.is_ascii_digit()) {
                let number: u32 = word
                    .parse()
                    .ok()
                    .filter(|n| *n <= Tag::MAX_NUMBER)
                    .ok_or_else(|| ErrorKind::BadTagSpec.at(lex.last_pos()))?;
                ValueSpec::Number(number)
            } else {
                let number = Keyword::lookup(&word)
                    .and_then(Keyword::tag_value_number)
                    .ok_or_else(|| ErrorKind::BadTagSpec.at(lex.last_pos()))?;
                ValueSpec::Universal(number)
            }
        }
        _ => return Err(ErrorKind::BadTagSpec.at(lex.last_pos())),
    };

    Ok(TagSpec { class, value })
}

/// Parse a `:(…)` replacement action after the colon: a parenthesised
/// sequence of `%N (type literal)` pairs, evaluated eagerly into the
/// values that seed the parameters when the optional match skips.
fn parse_replacement(lex: &mut Tokenizer<'_>, depth: usize) -> Result<Vec<(usize, Value)>> {
    match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::LParen => {}
        _ => {
            return Err(ErrorKind::Expected {
                what: "( after :",
            }
            .at(lex.last_pos()))
        }
    }

    let mut seeds = Vec::new();
    loop {
        let index = match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
            Token::RParen => break,
            Token::Param(index) => index,
            _ => {
                return Err(ErrorKind::Expected {
                    what: "a parameter reference",
                }
                .at(lex.last_pos()))
            }
        };

        match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
            Token::LParen => {}
            _ => {
                return Err(ErrorKind::Expected {
                    what: "a (type literal) pair",
                }
                .at(lex.last_pos()))
            }
        }

        let value = parse_seed(lex, depth)?;
        expect_rparen(lex)?;
        seeds.push((index, value));
    }

    Ok(seeds)
}

fn parse_seed(lex: &mut Tokenizer<'_>, depth: usize) -> Result<Value> {
    let type_pos = lex.last_pos();
    let word = match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::Word(word) => word,
        _ => {
            return Err(ErrorKind::Expected {
                what: "a replacement type",
            }
            .at(lex.last_pos()))
        }
    };

    if word.eq_ignore_ascii_case("asn") {
        let node = parse_node(lex, depth - 1)?;
        let element = crate::build::build_standalone(&node)?;
        return Ok(Value::Elem(element));
    }

    let keyword = Keyword::lookup(&word)
        .ok_or_else(|| ErrorKind::UnknownKeyword { word }.at(type_pos))?;

    match keyword {
        Keyword::Bool => {
            let literal = expect_word(lex)?;
            parse_bool_word(&literal).map(Value::Bool).ok_or_else(|| {
                ErrorKind::Expected {
                    what: "a boolean literal",
                }
                .at(lex.last_pos())
            })
        }
        Keyword::Int | Keyword::Enum => {
            let literal = expect_word(lex)?;
            parse_int_literal(&literal, lex.last_pos()).map(Value::Big)
        }
        Keyword::Blob => parse_hex_run(lex).map(Value::Bytes),
        Keyword::Oid => {
            let literal = expect_word(lex)?;
            let oid = registry::to_oid(&literal)
                .map_err(|_| ErrorKind::Tree(dertree::ErrorKind::Oid).at(lex.last_pos()))?;
            Ok(Value::Str(oid.to_string()))
        }
        Keyword::Utc => {
            let literal = expect_word_or_string(lex)?;
            Ok(Value::Time(time::parse_utc_time(&literal)?))
        }
        Keyword::GenTime => {
            let literal = expect_word_or_string(lex)?;
            Ok(Value::Time(time::parse_generalized_time(&literal)?))
        }
        _ if keyword.is_string() => match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
            Token::Str(s) => Ok(Value::Str(s)),
            _ => Err(ErrorKind::Expected {
                what: "a string literal",
            }
            .at(lex.last_pos())),
        },
        _ => Err(ErrorKind::Expected {
            what: "a replacement type",
        }
        .at(type_pos)),
    }
}

fn expect_word(lex: &mut Tokenizer<'_>) -> Result<String> {
    match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::Word(word) => Ok(word),
        _ => Err(ErrorKind::Expected { what: "a literal" }.at(lex.last_pos())),
    }
}

fn expect_word_or_string(lex: &mut Tokenizer<'_>) -> Result<String> {
    match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::Word(word) => Ok(word),
        Token::Str(s) => Ok(s),
        _ => Err(ErrorKind::Expected { what: "a literal" }.at(lex.last_pos())),
    }
}

fn expect_rparen(lex: &mut Tokenizer<'_>) -> Result<()> {
    match lex.next()?.ok_or(ErrorKind::UnexpectedEnd)? {
        Token::RParen => Ok(()),
        _ => Err(ErrorKind::Expected { what: ")" }.at(lex.last_pos())),
    }
}

fn push_unique(out: &mut Vec<usize>, index: usize) {
    if !out.contains(&index) {
        out.push(index);
    }
}

/// Collect every parameter index referenced anywhere inside `node`.
/// The repetition markers use this to find their iterables.
pub(crate) fn collect_params(node: &SpecNode, out: &mut Vec<usize>) {
    match node {
        SpecNode::Param(index) => push_unique(out, *index),
        SpecNode::Ignore => {}
        SpecNode::Repeat { inner, .. } => collect_params(inner, out),
        SpecNode::Optional { inner, replacement } => {
            collect_params(inner, out);
            for (index, _) in replacement {
                push_unique(out, *index);
            }
        }
        SpecNode::Object(obj) => {
            if let Some(tag) = &obj.tag {
                if let Some(ClassSpec::Param(index)) = &tag.class {
                    push_unique(out, *index);
                }
                if let ValueSpec::Param(index) = &tag.value {
                    push_unique(out, *index);
                }
            }

            match &obj.body {
                Body::Bool(slot) => collect_slot(slot, out),
                Body::Int(slot) => collect_slot(slot, out),
                Body::Oid(slot) => collect_slot(slot, out),
                Body::Str(slot) => collect_slot(slot, out),
                Body::Time(slot) => collect_slot(slot, out),
                Body::Bits { unused, payload } => {
                    collect_slot(unused, out);
                    collect_blob(payload, out);
                }
                Body::Blob(payload) => collect_blob(payload, out),
                Body::Null => {}
                Body::Children(children) => {
                    for child in children {
                        collect_params(child, out);
                    }
                }
                Body::Wrap(inner) => collect_params(inner, out),
            }
        }
    }
}

fn collect_slot<T>(slot: &Slot<T>, out: &mut Vec<usize>) {
    if let Slot::Param(index) = slot {
        push_unique(out, *index);
    }
}

fn collect_blob(body: &BlobBody, out: &mut Vec<usize>) {
    match body {
        BlobBody::Param(index) => push_unique(out, *index),
        BlobBody::Nested(inner) => collect_params(inner, out),
        BlobBody::Hex(_) | BlobBody::Ignore => {}
    }
}
