//! Error types.

use crate::Tag;
use core::fmt;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// Kind of error.
    kind: ErrorKind,

    /// Byte offset inside the encoded message where the error occurred.
    position: Option<usize>,
}

impl Error {
    /// Create a new [`Error`] annotated with a position.
    pub fn new(kind: ErrorKind, position: usize) -> Error {
        Error {
            kind,
            position: Some(position),
        }
    }

    /// Get the [`ErrorKind`] which occurred.
    pub fn kind(&self) -> ErrorKind {
        self.kind.clone()
    }

    /// Get the byte offset inside the message where the error occurred.
    pub fn position(&self) -> Option<usize> {
        self.position
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(pos) = self.position {
            write!(f, " at byte {}", pos)?;
        }

        Ok(())
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            position: None,
        }
    }
}

impl std::error::Error for Error {}

/// Error kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input ended before a complete element was read.
    Truncated,

    /// Tag number does not fit the supported range (0..2^31).
    TagOverflow,

    /// Length octets declare more content than the buffer holds, or a
    /// length that does not fit in `usize`.
    Length,

    /// Reserved length form (initial octet 0xFF).
    ReservedLength,

    /// Indefinite length on a primitive element.
    IndefinitePrimitive,

    /// End-of-contents marker outside of an indefinite-length element.
    UnexpectedEndOfContents,

    /// Nesting deeper than [`crate::decode::DEPTH_LIMIT`].
    DepthLimit,

    /// Undecoded trailing data after the end of the element.
    TrailingData {
        /// Length of the decoded element.
        decoded: usize,

        /// Bytes left over in the buffer.
        remaining: usize,
    },

    /// Universal SEQUENCE or SET with the primitive bit set.
    NotConstructed {
        /// Offending tag.
        tag: Tag,
    },

    /// Content octets are invalid for the type identified by the tag.
    Value {
        /// Tag of the malformed value.
        tag: Tag,
    },

    /// Malformed OBJECT IDENTIFIER: bad dotted-decimal syntax, an arc
    /// outside the supported range, or a first pair violating the
    /// `first in 0..=2, second < 40 if first < 2` rule.
    Oid,

    /// Two children of a DER-sorted SET share a (class, number) pair.
    SetDuplicate {
        /// The duplicated tag.
        tag: Tag,
    },

    /// An OID name was registered twice (startup-time configuration
    /// error).
    DuplicateName {
        /// The name, in normalised form.
        name: String,
    },
}

impl ErrorKind {
    /// Annotate this [`ErrorKind`] with the position where it occurred,
    /// returning an error.
    pub fn at(self, position: usize) -> Error {
        Error::new(self, position)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Truncated => write!(f, "encoded message is truncated"),
            ErrorKind::TagOverflow => write!(f, "tag number exceeds the supported range"),
            ErrorKind::Length => write!(f, "length exceeds the remaining input"),
            ErrorKind::ReservedLength => write!(f, "reserved length form"),
            ErrorKind::IndefinitePrimitive => {
                write!(f, "indefinite length on a primitive element")
            }
            ErrorKind::UnexpectedEndOfContents => {
                write!(f, "unexpected end-of-contents marker")
            }
            ErrorKind::DepthLimit => write!(f, "nesting depth limit exceeded"),
            ErrorKind::TrailingData { decoded, remaining } => write!(
                f,
                "trailing data at end of message: decoded {} bytes, {} bytes remaining",
                decoded, remaining
            ),
            ErrorKind::NotConstructed { tag } => {
                write!(f, "{} must use the constructed form", tag)
            }
            ErrorKind::Value { tag } => write!(f, "malformed value for {}", tag),
            ErrorKind::Oid => write!(f, "malformed OBJECT IDENTIFIER"),
            ErrorKind::SetDuplicate { tag } => {
                write!(f, "duplicate tag {} in DER-sorted SET", tag)
            }
            ErrorKind::DuplicateName { name } => {
                write!(f, "OID name {:?} registered twice", name)
            }
        }
    }
}
