//! Build mode: turn a spec plus parameters into an element.

use crate::keyword::Keyword;
use crate::spec::{
    collect_params, parse_spec, BlobBody, Body, ClassSpec, ObjectSpec, Slot, SpecNode, TagSpec,
    ValueSpec, DEPTH_LIMIT,
};
use crate::value::Value;
use crate::{ErrorKind, Result};
use dertree::{registry, Class, Element, Oid, Tag};
use num_bigint::BigInt;

/// Build an element from a text spec.
///
/// Parameters are read through the `%N` slots and never written. The
/// result is `None` when the whole spec turns out absent: a node whose
/// keyword value, tag parameter or BIT STRING ignored-bit count is a
/// null parameter disappears, and a parent constructed node simply
/// skips absent children.
pub fn build(spec_text: &str, params: &[Value]) -> Result<Option<Element>> {
    let node = parse_spec(spec_text)?;
    let mut builder = Builder {
        params,
        overlay: Vec::new(),
    };

    match builder.node(&node, DEPTH_LIMIT)? {
        Out::One(element) => Ok(Some(element)),
        Out::Absent => Ok(None),
        Out::Many(_) => Err(ErrorKind::Expected {
            what: "a single top-level object",
        }
        .into()),
    }
}

/// Build a spec node that may not reference any parameters; used for
/// the `asn` replacement seeds.
pub(crate) fn build_standalone(node: &SpecNode) -> Result<Element> {
    let mut builder = Builder {
        params: &[],
        overlay: Vec::new(),
    };

    match builder.node(node, DEPTH_LIMIT)? {
        Out::One(element) => Ok(element),
        _ => Err(ErrorKind::Expected {
            what: "a single object",
        }
        .into()),
    }
}

/// What building one spec node produced.
enum Out {
    One(Element),
    Absent,
    Many(Vec<Element>),
}

struct Builder<'p> {
    params: &'p [Value],

    /// Per-iteration bindings pushed by the repetition markers; looked
    /// up before the base parameters, innermost first.
    overlay: Vec<(usize, Value)>,
}

impl Builder<'_> {
    fn param(&self, index: usize) -> Result<&Value> {
        if let Some((_, value)) = self.overlay.iter().rev().find(|(i, _)| *i == index) {
            return Ok(value);
        }

        self.params
            .get(index)
            .ok_or_else(|| ErrorKind::ParamIndex { index }.into())
    }

    fn node(&mut self, node: &SpecNode, depth: usize) -> Result<Out> {
        if depth == 0 {
            return Err(ErrorKind::DepthLimit.into());
        }

        match node {
            SpecNode::Param(index) => match self.param(*index)? {
                Value::Null => Ok(Out::Absent),
                Value::Elem(element) => Ok(Out::One(element.clone())),
                _ => Err(ErrorKind::ParamType {
                    index: *index,
                    expected: "an element",
                }
                .into()),
            },
            SpecNode::Ignore => Err(ErrorKind::Expected {
                what: "a buildable sub-object, not .",
            }
            .into()),
            // Replacement actions only fire in match mode.
            SpecNode::Optional { inner, .. } => self.node(inner, depth - 1),
            SpecNode::Repeat { min_one, inner } => self.repeat(*min_one, inner, depth),
            SpecNode::Object(obj) => self.object(obj, depth),
        }
    }

    /// Expand `*spec` / `+spec`: every parameter inside the spec whose
    /// value is a list iterates in lockstep, one copy of the spec per
    /// step, stopping at the shortest list.
    fn repeat(&mut self, min_one: bool, inner: &SpecNode, depth: usize) -> Result<Out> {
        let mut indices = Vec::new();
        collect_params(inner, &mut indices);

        let mut lists: Vec<(usize, Vec<Value>)> = Vec::new();
        for index in indices {
            if let Value::List(items) = self.param(index)? {
                lists.push((index, items.clone()));
            }
        }

        let mut children = Vec::new();
        if !lists.is_empty() {
            let count = lists
                .iter()
                .map(|(_, items)| items.len())
                .min()
                .unwrap_or(0);

            for i in 0..count {
                let mark = self.overlay.len();
                for (index, items) in &lists {
                    self.overlay.push((*index, items[i].clone()));
                }

                let out = self.node(inner, depth - 1);
                self.overlay.truncate(mark);

                match out? {
                    Out::One(element) => children.push(element),
                    Out::Absent => {}
                    Out::Many(mut elements) => children.append(&mut elements),
                }
            }
        }

        if min_one && children.is_empty() {
            return Err(ErrorKind::RepetitionEmpty.into());
        }

        Ok(Out::Many(children))
    }

    fn object(&mut self, obj: &ObjectSpec, depth: usize) -> Result<Out> {
        let tag = match &obj.tag {
            None => None,
            Some(spec) => match self.resolve_tag(spec)? {
                None => return Ok(Out::Absent),
                Some(tag) => Some(tag),
            },
        };

        let element = match &obj.body {
            Body::Bool(slot) => match self.slot_bool(slot)? {
                None => return Ok(Out::Absent),
                Some(value) => Element::boolean(value),
            },
            Body::Int(slot) => match self.slot_big(slot)? {
                None => return Ok(Out::Absent),
                Some(value) => {
                    if obj.keyword == Keyword::Enum {
                        Element::enumerated(value)
                    } else {
                        Element::integer(value)
                    }
                }
            },
            Body::Bits { unused, payload } => {
                let count = match self.slot_bit_count(unused)? {
                    None => return Ok(Out::Absent),
                    Some(count) => count,
                };
                let (bytes, structured) = match self.payload_bytes(payload, depth, false)? {
                    None => return Ok(Out::Absent),
                    Some(payload) => payload,
                };
                if structured && count != 0 {
                    return Err(ErrorKind::Tree(dertree::ErrorKind::Value {
                        tag: Tag::BIT_STRING,
                    })
                    .into());
                }
                Element::bit_string(count, &bytes)?
            }
            Body::Blob(payload) => match self.payload_bytes(payload, depth, true)? {
                None => return Ok(Out::Absent),
                Some((bytes, _)) => Element::octet_string(bytes),
            },
            Body::Null => Element::null(),
            Body::Oid(slot) => match self.slot_oid(slot)? {
                None => return Ok(Out::Absent),
                Some(oid) => Element::oid(&oid),
            },
            Body::Str(slot) => {
                let natural = match obj.keyword.universal_tag() {
                    Some(tag) => tag,
                    None => unreachable!("string keywords carry a universal tag"),
                };
                match self.slot_str(slot)? {
                    None => return Ok(Out::Absent),
                    Some(value) => Element::string(natural, &value)?,
                }
            }
            Body::Time(slot) => match self.time_element(obj.keyword, slot)? {
                None => return Ok(Out::Absent),
                Some(element) => element,
            },
            Body::Children(children) => {
                let mut built = Vec::new();
                for child in children {
                    match self.node(child, depth - 1)? {
                        Out::One(element) => built.push(element),
                        Out::Absent => {}
                        Out::Many(mut elements) => built.append(&mut elements),
                    }
                }

                let empty_is_absent = matches!(
                    obj.keyword,
                    Keyword::SequenceNz
                        | Keyword::SetNz
                        | Keyword::SetDerNz
                        | Keyword::SetOfNz
                );
                if empty_is_absent && built.is_empty() {
                    return Ok(Out::Absent);
                }

                match obj.keyword {
                    Keyword::Sequence | Keyword::SequenceNz => Element::sequence(built),
                    Keyword::Set | Keyword::SetNz => Element::set(built),
                    Keyword::SetOf | Keyword::SetOfNz => Element::set_of(built),
                    Keyword::SetDer | Keyword::SetDerNz => Element::set_der(built),
                    _ => unreachable!("children bodies belong to constructed keywords"),
                }
            }
            Body::Wrap(inner) => {
                // Explicit tag: a constructed wrapper around one
                // sub-object; the override is the wrapper's own tag.
                let wrapper = match tag {
                    Some(tag) => tag,
                    None => return Err(ErrorKind::MissingTag.at(obj.pos)),
                };
                return match self.node(inner, depth - 1)? {
                    Out::One(element) => {
                        Ok(Out::One(Element::constructed(wrapper, vec![element])))
                    }
                    Out::Absent => Ok(Out::Absent),
                    Out::Many(_) => Err(ErrorKind::Expected {
                        what: "a single wrapped object",
                    }
                    .into()),
                };
            }
        };

        Ok(Out::One(match tag {
            Some(tag) => element.retag(tag),
            None => element,
        }))
    }

    fn resolve_tag(&self, spec: &TagSpec) -> Result<Option<Tag>> {
        let number = match &spec.value {
            ValueSpec::Number(number) | ValueSpec::Universal(number) => *number,
            ValueSpec::Param(index) => match self.param(*index)? {
                Value::Null => return Ok(None),
                value => value.as_tag_number(*index)?,
            },
        };

        let class = match &spec.class {
            Some(ClassSpec::Literal(class)) => *class,
            Some(ClassSpec::Param(index)) => match self.param(*index)? {
                Value::Null => return Ok(None),
                value => value.as_tag_class(*index)?,
            },
            None => match spec.value {
                ValueSpec::Universal(_) => Class::Universal,
                _ => Class::ContextSpecific,
            },
        };

        Ok(Some(Tag { class, number }))
    }

    fn slot_bool(&self, slot: &Slot<bool>) -> Result<Option<bool>> {
        match slot {
            Slot::Literal(value) => Ok(Some(*value)),
            Slot::Param(index) => {
                let value = self.param(*index)?;
                if value.is_null() {
                    Ok(None)
                } else {
                    value.as_bool(*index).map(Some)
                }
            }
            Slot::Ignore => Err(build_time_ignore()),
        }
    }

    fn slot_big(&self, slot: &Slot<BigInt>) -> Result<Option<BigInt>> {
        match slot {
            Slot::Literal(value) => Ok(Some(value.clone())),
            Slot::Param(index) => {
                let value = self.param(*index)?;
                if value.is_null() {
                    Ok(None)
                } else {
                    value.as_big(*index).map(Some)
                }
            }
            Slot::Ignore => Err(build_time_ignore()),
        }
    }

    fn slot_bit_count(&self, slot: &Slot<u8>) -> Result<Option<u8>> {
        match slot {
            Slot::Literal(value) => Ok(Some(*value)),
            Slot::Param(index) => {
                let value = self.param(*index)?;
                if value.is_null() {
                    Ok(None)
                } else {
                    value.as_bit_count(*index).map(Some)
                }
            }
            Slot::Ignore => Err(build_time_ignore()),
        }
    }

    fn slot_str(&self, slot: &Slot<String>) -> Result<Option<String>> {
        match slot {
            Slot::Literal(value) => Ok(Some(value.clone())),
            Slot::Param(index) => {
                let value = self.param(*index)?;
                if value.is_null() {
                    Ok(None)
                } else {
                    value.as_str(*index).map(|s| Some(s.to_string()))
                }
            }
            Slot::Ignore => Err(build_time_ignore()),
        }
    }

    fn slot_oid(&self, slot: &Slot<String>) -> Result<Option<Oid>> {
        match slot {
            Slot::Literal(value) => registry::to_oid(value).map(Some).map_err(Into::into),
            Slot::Param(index) => match self.param(*index)? {
                Value::Null => Ok(None),
                Value::Str(s) => registry::to_oid(s).map(Some).map_err(Into::into),
                Value::Elem(element) => {
                    if element.tag() != Tag::OBJECT_IDENTIFIER {
                        return Err(ErrorKind::ParamType {
                            index: *index,
                            expected: "an OBJECT IDENTIFIER",
                        }
                        .into());
                    }
                    let content = element.value().ok_or(ErrorKind::ParamType {
                        index: *index,
                        expected: "an OBJECT IDENTIFIER",
                    })?;
                    Oid::from_content(content).map(Some).map_err(Into::into)
                }
                _ => Err(ErrorKind::ParamType {
                    index: *index,
                    expected: "an OID",
                }
                .into()),
            },
            Slot::Ignore => Err(build_time_ignore()),
        }
    }

    fn time_element(&self, keyword: Keyword, slot: &Slot<String>) -> Result<Option<Element>> {
        let from_str = |s: &str| -> Result<Element> {
            match keyword {
                Keyword::Utc => Element::utc_time(s).map_err(Into::into),
                _ => Element::generalized_time(s).map_err(Into::into),
            }
        };

        match slot {
            Slot::Literal(value) => from_str(value).map(Some),
            Slot::Param(index) => match self.param(*index)? {
                Value::Null => Ok(None),
                Value::Str(s) => from_str(s).map(Some),
                Value::Time(instant) => {
                    if *instant == Value::UNSET_TIME {
                        return Ok(None);
                    }
                    let element = match keyword {
                        Keyword::Utc => Element::utc_time_from(instant)?,
                        _ => Element::generalized_time_from(instant)?,
                    };
                    Ok(Some(element))
                }
                _ => Err(ErrorKind::ParamType {
                    index: *index,
                    expected: "a time",
                }
                .into()),
            },
            Slot::Ignore => Err(build_time_ignore()),
        }
    }

    /// Resolve a blob or bits payload to content bytes. The flag in the
    /// result records whether the payload is a structured object (a
    /// nested spec or an element parameter), which a bits payload
    /// requires an ignored-bit count of zero for. `allow_spec_string`
    /// enables the blob-only rule that a string parameter is re-parsed
    /// as a nested text spec and built recursively.
    fn payload_bytes(
        &mut self,
        body: &BlobBody,
        depth: usize,
        allow_spec_string: bool,
    ) -> Result<Option<(Vec<u8>, bool)>> {
        match body {
            BlobBody::Hex(bytes) => Ok(Some((bytes.clone(), false))),
            BlobBody::Ignore => Err(build_time_ignore()),
            BlobBody::Nested(inner) => match self.node(inner, depth - 1)? {
                Out::One(element) => Ok(Some((element.to_der()?, true))),
                Out::Absent => Ok(None),
                Out::Many(_) => Err(ErrorKind::Expected {
                    what: "a single payload object",
                }
                .into()),
            },
            BlobBody::Param(index) => {
                let value = self.param(*index)?.clone();
                match value {
                    Value::Null => Ok(None),
                    Value::Bytes(bytes) => Ok(Some((bytes, false))),
                    Value::Elem(element) => Ok(Some((element.to_der()?, true))),
                    Value::Str(s) if allow_spec_string => {
                        let node = parse_spec(&s)?;
                        match self.node(&node, depth - 1)? {
                            Out::One(element) => Ok(Some((element.to_der()?, true))),
                            Out::Absent => Ok(None),
                            Out::Many(_) => Err(ErrorKind::Expected {
                                what: "a single payload object",
                            }
                            .into()),
                        }
                    }
                    _ => Err(ErrorKind::ParamType {
                        index: *index,
                        expected: "a payload",
                    }
                    .into()),
                }
            }
        }
    }
}

fn build_time_ignore() -> crate::Error {
    ErrorKind::Expected {
        what: "a value (. only matches)",
    }
    .into()
}
