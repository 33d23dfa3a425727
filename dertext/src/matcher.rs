//! Match mode: walk a spec and an element tree in parallel, writing
//! captured values into the parameter vector.

use crate::keyword::Keyword;
use crate::spec::{
    collect_params, parse_spec, BlobBody, Body, ClassSpec, ObjectSpec, Slot, SpecNode, TagSpec,
    ValueSpec, DEPTH_LIMIT,
};
use crate::value::Value;
use crate::{ErrorKind, Result};
use dertree::asn1::{bit_string, boolean, integer, strings, time};
use dertree::{Class, Element, Oid, Tag};

/// Match `element` against a text spec, writing captures into `params`.
///
/// The vector grows as needed; slots never stored stay [`Value::Null`].
/// On a match failure, captures stored before the failing point are
/// retained — partial side effects are part of the contract, so a
/// caller probing with several specs should pass a fresh vector each
/// time.
pub fn matches(spec_text: &str, element: &Element, params: &mut Vec<Value>) -> Result<()> {
    let node = parse_spec(spec_text)?;
    let mut matcher = Matcher {
        params,
        accumulate: false,
    };

    let children = core::slice::from_ref(element);
    let mut offset = 0;
    matcher.node(&node, children, &mut offset, DEPTH_LIMIT)?;

    if offset != 1 {
        return Err(ErrorKind::MissingChild.into());
    }

    Ok(())
}

struct Matcher<'p> {
    params: &'p mut Vec<Value>,

    /// Inside `*`/`+`, stores append to lists instead of overwriting.
    accumulate: bool,
}

impl Matcher<'_> {
    /// Each call consumes one child (or none, for a skipping optional)
    /// and advances the offset.
    fn node(
        &mut self,
        node: &SpecNode,
        children: &[Element],
        offset: &mut usize,
        depth: usize,
    ) -> Result<()> {
        if depth == 0 {
            return Err(ErrorKind::DepthLimit.into());
        }

        match node {
            SpecNode::Param(index) => {
                let child = children.get(*offset).ok_or(ErrorKind::MissingChild)?;
                self.store(*index, Value::Elem(child.clone()));
                *offset += 1;
                Ok(())
            }
            SpecNode::Ignore => {
                if children.get(*offset).is_none() {
                    return Err(ErrorKind::MissingChild.into());
                }
                *offset += 1;
                Ok(())
            }
            SpecNode::Optional { inner, replacement } => {
                let saved = *offset;
                match self.node(inner, children, offset, depth - 1) {
                    Ok(()) => Ok(()),
                    Err(err) if err.is_match() => {
                        *offset = saved;
                        for (index, seed) in replacement {
                            self.store(*index, seed.clone());
                        }
                        Ok(())
                    }
                    Err(err) => Err(err),
                }
            }
            SpecNode::Repeat { min_one, inner } => {
                self.repeat(*min_one, inner, children, offset, depth)
            }
            SpecNode::Object(obj) => self.object(obj, children, offset, depth),
        }
    }

    fn repeat(
        &mut self,
        min_one: bool,
        inner: &SpecNode,
        children: &[Element],
        offset: &mut usize,
        depth: usize,
    ) -> Result<()> {
        // Every parameter inside the repetition accumulates into a
        // list, present even when zero iterations match.
        let mut indices = Vec::new();
        collect_params(inner, &mut indices);
        for index in indices {
            self.reserve(index);
            if !matches!(self.params[index], Value::List(_)) {
                self.params[index] = Value::List(Vec::new());
            }
        }

        let outer = self.accumulate;
        self.accumulate = true;

        let mut count = 0usize;
        let result = loop {
            let saved = *offset;
            match self.node(inner, children, offset, depth - 1) {
                Ok(()) => {
                    count += 1;
                    // An inner spec that consumed nothing would loop
                    // forever; a skipping optional is the only way.
                    if *offset == saved {
                        break Ok(());
                    }
                }
                Err(err) if err.is_match() => {
                    *offset = saved;
                    break Ok(());
                }
                Err(err) => break Err(err),
            }
        };

        self.accumulate = outer;
        result?;

        if min_one && count == 0 {
            return Err(ErrorKind::RepetitionEmpty.into());
        }

        Ok(())
    }

    fn object(
        &mut self,
        obj: &ObjectSpec,
        children: &[Element],
        offset: &mut usize,
        depth: usize,
    ) -> Result<()> {
        let child = children
            .get(*offset)
            .ok_or_else(|| ErrorKind::MissingChild.at(obj.pos))?;

        self.check_tag(obj, child)?;

        match &obj.body {
            Body::Bool(slot) => {
                let decoded = boolean::decode(primitive_value(child)?)?;
                self.primitive_slot(slot, decoded, Value::Bool)?;
            }
            Body::Int(slot) => {
                let decoded = integer::decode(primitive_value(child)?)?;
                self.primitive_slot(slot, decoded, Value::Big)?;
            }
            Body::Bits { unused, payload } => {
                let (count, bits) = bit_string::decode(primitive_value(child)?)?;
                self.primitive_slot(unused, count, |n| Value::Int(i64::from(n)))?;
                self.match_payload(payload, bits, depth)?;
            }
            Body::Blob(payload) => {
                let bytes = primitive_value(child)?;
                self.match_payload(payload, bytes, depth)?;
            }
            Body::Null => {
                dertree::asn1::null::decode(primitive_value(child)?)?;
            }
            Body::Oid(slot) => {
                let decoded = Oid::from_content(primitive_value(child)?)?;
                match slot {
                    Slot::Literal(word) => {
                        let expected = dertree::registry::to_oid(word)?;
                        if expected != decoded {
                            return Err(ErrorKind::ValueMismatch.at(obj.pos));
                        }
                    }
                    Slot::Param(index) => {
                        self.store(*index, Value::Str(decoded.to_string()));
                    }
                    Slot::Ignore => {}
                }
            }
            Body::Str(slot) => {
                let natural = match obj.keyword.universal_tag() {
                    Some(tag) => tag,
                    None => unreachable!("string keywords carry a universal tag"),
                };
                let decoded = strings::decode(natural, primitive_value(child)?)?;
                self.primitive_slot(slot, decoded, Value::Str)?;
            }
            Body::Time(slot) => {
                let content = primitive_value(child)?;
                let tag = match obj.keyword {
                    Keyword::Utc => Tag::UTC_TIME,
                    _ => Tag::GENERALIZED_TIME,
                };
                let text = core::str::from_utf8(content)
                    .map_err(|_| ErrorKind::Tree(dertree::ErrorKind::Value { tag }))?;
                let instant = match obj.keyword {
                    Keyword::Utc => time::parse_utc_time(text)?,
                    _ => time::parse_generalized_time(text)?,
                };

                match slot {
                    Slot::Literal(word) => {
                        let expected = match obj.keyword {
                            Keyword::Utc => time::parse_utc_time(word)?,
                            _ => time::parse_generalized_time(word)?,
                        };
                        if expected != instant {
                            return Err(ErrorKind::ValueMismatch.at(obj.pos));
                        }
                    }
                    Slot::Param(index) => self.store(*index, Value::Time(instant)),
                    Slot::Ignore => {}
                }
            }
            Body::Children(specs) => {
                let grandchildren = child.children();
                let empty_forbidden = matches!(
                    obj.keyword,
                    Keyword::SequenceNz
                        | Keyword::SetNz
                        | Keyword::SetDerNz
                        | Keyword::SetOfNz
                );
                if empty_forbidden && grandchildren.is_empty() {
                    return Err(ErrorKind::EmptyConstructed.at(obj.pos));
                }

                let mut inner_offset = 0;
                for spec in specs {
                    self.node(spec, grandchildren, &mut inner_offset, depth - 1)?;
                }
                if inner_offset != grandchildren.len() {
                    return Err(ErrorKind::TrailingChildren.at(obj.pos));
                }
            }
            Body::Wrap(inner) => {
                let grandchildren = child.children();
                let mut inner_offset = 0;
                self.node(inner, grandchildren, &mut inner_offset, depth - 1)?;
                if inner_offset != grandchildren.len() {
                    return Err(ErrorKind::TrailingChildren.at(obj.pos));
                }
            }
        }

        *offset += 1;
        Ok(())
    }

    /// Check the child's tag and constructed flag against what the spec
    /// requires. A parameter in a tag position captures the observed
    /// class or number instead of constraining it.
    fn check_tag(&mut self, obj: &ObjectSpec, child: &Element) -> Result<()> {
        let constructed = obj.keyword.constructed();
        if child.is_constructed() != constructed {
            return Err(ErrorKind::TagMismatch {
                expected: expected_tag(obj).unwrap_or(child.tag()),
                actual: child.tag(),
            }
            .at(obj.pos));
        }

        match &obj.tag {
            None => {
                if let Some(natural) = obj.keyword.universal_tag() {
                    if child.tag() != natural {
                        return Err(ErrorKind::TagMismatch {
                            expected: natural,
                            actual: child.tag(),
                        }
                        .at(obj.pos));
                    }
                }
            }
            Some(spec) => {
                self.check_tag_override(spec, child, obj.pos)?;
            }
        }

        Ok(())
    }

    fn check_tag_override(&mut self, spec: &TagSpec, child: &Element, pos: usize) -> Result<()> {
        let implied_class = match spec.value {
            ValueSpec::Universal(_) => Class::Universal,
            _ => Class::ContextSpecific,
        };

        match &spec.class {
            Some(ClassSpec::Literal(class)) => {
                if child.class() != *class {
                    return Err(mismatch(child, *class, child.number()).at(pos));
                }
            }
            Some(ClassSpec::Param(index)) => {
                self.store(*index, Value::Str(class_word(child.class()).to_string()));
            }
            None => {
                if child.class() != implied_class {
                    return Err(mismatch(child, implied_class, child.number()).at(pos));
                }
            }
        }

        match &spec.value {
            ValueSpec::Number(number) | ValueSpec::Universal(number) => {
                if child.number() != *number {
                    return Err(mismatch(child, child.class(), *number).at(pos));
                }
            }
            ValueSpec::Param(index) => {
                self.store(*index, Value::Int(i64::from(child.number())));
            }
        }

        Ok(())
    }

    /// Handle a literal/parameter/ignore slot for a decoded primitive
    /// value.
    fn primitive_slot<T: PartialEq>(
        &mut self,
        slot: &Slot<T>,
        decoded: T,
        wrap: impl FnOnce(T) -> Value,
    ) -> Result<()> {
        match slot {
            Slot::Literal(expected) => {
                if *expected != decoded {
                    return Err(ErrorKind::ValueMismatch.into());
                }
                Ok(())
            }
            Slot::Param(index) => {
                self.store(*index, wrap(decoded));
                Ok(())
            }
            Slot::Ignore => Ok(()),
        }
    }

    fn match_payload(&mut self, payload: &BlobBody, bytes: &[u8], depth: usize) -> Result<()> {
        match payload {
            BlobBody::Ignore => Ok(()),
            BlobBody::Hex(expected) => {
                if expected != bytes {
                    return Err(ErrorKind::ValueMismatch.into());
                }
                Ok(())
            }
            BlobBody::Param(index) => {
                self.store(*index, Value::Bytes(bytes.to_vec()));
                Ok(())
            }
            BlobBody::Nested(inner) => {
                let nested = dertree::decode(bytes)?;
                let children = core::slice::from_ref(&nested);
                let mut offset = 0;
                self.node(inner, children, &mut offset, depth - 1)?;
                if offset != 1 {
                    return Err(ErrorKind::MissingChild.into());
                }
                Ok(())
            }
        }
    }

    fn reserve(&mut self, index: usize) {
        if index >= self.params.len() {
            self.params.resize(index + 1, Value::Null);
        }
    }

    /// Store a capture, appending to a list when inside a repetition.
    fn store(&mut self, index: usize, value: Value) {
        self.reserve(index);

        if self.accumulate {
            match &mut self.params[index] {
                Value::List(items) => items.push(value),
                slot => *slot = Value::List(vec![value]),
            }
        } else {
            self.params[index] = value;
        }
    }
}

fn primitive_value(child: &Element) -> Result<&[u8]> {
    child.value().ok_or_else(|| ErrorKind::ValueMismatch.into())
}

/// The fully-known tag a spec requires, for error reporting; `None`
/// when a tag component is a capturing parameter.
fn expected_tag(obj: &ObjectSpec) -> Option<Tag> {
    let spec = match &obj.tag {
        Some(spec) => spec,
        None => return obj.keyword.universal_tag(),
    };

    let number = match spec.value {
        ValueSpec::Number(number) | ValueSpec::Universal(number) => number,
        ValueSpec::Param(_) => return obj.keyword.universal_tag(),
    };

    let class = match &spec.class {
        Some(ClassSpec::Literal(class)) => *class,
        Some(ClassSpec::Param(_)) => Class::ContextSpecific,
        None => match spec.value {
            ValueSpec::Universal(_) => Class::Universal,
            _ => Class::ContextSpecific,
        },
    };

    Some(Tag { class, number })
}

fn mismatch(child: &Element, class: Class, number: u32) -> ErrorKind {
    ErrorKind::TagMismatch {
        expected: Tag { class, number },
        actual: child.tag(),
    }
}

fn class_word(class: Class) -> &'static str {
    match class {
        Class::Universal => "universal",
        Class::Application => "application",
        Class::ContextSpecific => "context",
        Class::Private => "private",
    }
}
