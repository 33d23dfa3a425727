//! Error types.
//!
//! Failures split into two families with different handling: *format*
//! errors (broken grammar, unknown keywords, parameter index or type
//! problems) abort the whole operation, while *match* errors (the tree
//! does not fit the spec) are what `?`-marked sub-specs catch and turn
//! into a skip. [`Error::is_match`] is the dividing line.

use core::fmt;
use dertree::Tag;

/// Result type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// Kind of error.
    kind: ErrorKind,

    /// Byte offset inside the spec text where the error occurred.
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

    /// Get the byte offset inside the spec text where the error
    /// occurred.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Is this a match failure (as opposed to a format or value
    /// error)? Optional sub-specs recover from match failures only.
    pub fn is_match(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::TagMismatch { .. }
                | ErrorKind::ValueMismatch
                | ErrorKind::MissingChild
                | ErrorKind::TrailingChildren
                | ErrorKind::EmptyConstructed
                | ErrorKind::RepetitionEmpty
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(pos) = self.position {
            write!(f, " at offset {}", pos)?;
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

impl From<dertree::Error> for Error {
    fn from(err: dertree::Error) -> Error {
        ErrorKind::Tree(err.kind()).into()
    }
}

impl std::error::Error for Error {}

/// Error kinds.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Input ended in the middle of a spec.
    UnexpectedEnd,

    /// A token other than the expected one.
    Expected {
        /// What the parser was looking for.
        what: &'static str,
    },

    /// A byte that starts no token.
    UnexpectedByte {
        /// The offending byte.
        byte: u8,
    },

    /// A word in keyword position that names no known object type.
    UnknownKeyword {
        /// The word as written.
        word: String,
    },

    /// String literal with no closing quote.
    UnterminatedString,

    /// Block comment with no closing brace.
    UnterminatedComment,

    /// Unknown or malformed escape sequence in a string literal.
    InvalidEscape,

    /// Spec text that is not valid UTF-8 where characters are needed.
    InvalidUtf8,

    /// A hex blob with an odd number of hex digits.
    OddHexDigits,

    /// Malformed `[class value]` tag specification.
    BadTagSpec,

    /// The `tag` keyword used without an outer `[class value]`.
    MissingTag,

    /// Parameter index beyond the supplied vector.
    ParamIndex {
        /// The out-of-range index.
        index: usize,
    },

    /// Parameter value of an unusable type for its slot.
    ParamType {
        /// The parameter index.
        index: usize,

        /// What the slot accepts.
        expected: &'static str,
    },

    /// Spec nesting deeper than the engine's recursion cap.
    DepthLimit,

    /// A value error from the element layer (malformed content octets,
    /// character repertoire violations, encode failures).
    Tree(dertree::ErrorKind),

    /// Match: the child's tag is not the one the spec requires.
    TagMismatch {
        /// Tag required by the spec.
        expected: Tag,

        /// Tag found on the child.
        actual: Tag,
    },

    /// Match: a primitive literal expectation did not hold.
    ValueMismatch,

    /// Match: the spec requires a child the tree does not have.
    MissingChild,

    /// Match: the tree has children the spec does not describe.
    TrailingChildren,

    /// Match: a `-nz` constructed keyword met an empty constructed
    /// element.
    EmptyConstructed,

    /// A `+` repetition produced or consumed no elements.
    RepetitionEmpty,
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
            ErrorKind::UnexpectedEnd => write!(f, "unexpected end of spec"),
            ErrorKind::Expected { what } => write!(f, "expected {}", what),
            ErrorKind::UnexpectedByte { byte } => {
                write!(f, "unexpected character 0x{:02x}", byte)
            }
            ErrorKind::UnknownKeyword { word } => write!(f, "unknown keyword {:?}", word),
            ErrorKind::UnterminatedString => write!(f, "unterminated string literal"),
            ErrorKind::UnterminatedComment => write!(f, "unterminated block comment"),
            ErrorKind::InvalidEscape => write!(f, "invalid string escape"),
            ErrorKind::InvalidUtf8 => write!(f, "spec text is not valid UTF-8"),
            ErrorKind::OddHexDigits => write!(f, "odd number of hex digits"),
            ErrorKind::BadTagSpec => write!(f, "malformed [class value] tag specification"),
            ErrorKind::MissingTag => {
                write!(f, "the tag keyword requires an explicit [class value]")
            }
            ErrorKind::ParamIndex { index } => {
                write!(f, "parameter %{} is out of range", index)
            }
            ErrorKind::ParamType { index, expected } => {
                write!(f, "parameter %{} cannot be used as {}", index, expected)
            }
            ErrorKind::DepthLimit => write!(f, "spec nesting depth limit exceeded"),
            ErrorKind::Tree(kind) => write!(f, "{}", kind),
            ErrorKind::TagMismatch { expected, actual } => {
                write!(f, "tag mismatch: spec requires {}, found {}", expected, actual)
            }
            ErrorKind::ValueMismatch => write!(f, "value does not match the spec literal"),
            ErrorKind::MissingChild => write!(f, "spec requires a child that is not present"),
            ErrorKind::TrailingChildren => {
                write!(f, "element has children the spec does not describe")
            }
            ErrorKind::EmptyConstructed => {
                write!(f, "non-empty constructed element required")
            }
            ErrorKind::RepetitionEmpty => {
                write!(f, "repetition with a + marker produced no elements")
            }
        }
    }
}
