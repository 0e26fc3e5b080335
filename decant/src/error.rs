//! Error types for decoder compilation and decoding.

use core::fmt::{self, Display};

use decant_core::Shape;

use crate::any::AnyKind;
use crate::iter::ValueKind;

/// One step on the path from the root type to the shape that failed to
/// compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Breadcrumb {
    /// The root pointer
    Ptr,
    /// Element of a `Vec`
    Slice,
    /// Value of a map
    Map,
    /// Inner value of an `Option`
    Optional,
    /// Pointee of a `Box`
    Box,
    /// Named field of a struct
    Field(&'static str),
}

impl Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breadcrumb::Ptr => f.write_str("ptr"),
            Breadcrumb::Slice => f.write_str("[slice]"),
            Breadcrumb::Map => f.write_str("[map]"),
            Breadcrumb::Optional => f.write_str("[optional]"),
            Breadcrumb::Box => f.write_str("[box]"),
            Breadcrumb::Field(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// No decoder can be built for a type.
///
/// Carries the breadcrumbs leading to the offending shape, outermost first:
/// `ptr: [slice]: {events}: unsupported type: Sender<i32>`.
#[derive(Debug, Clone)]
pub struct CompileError {
    /// What went wrong
    pub kind: CompileErrorKind,
    /// Where it went wrong, outermost first
    pub breadcrumbs: Vec<Breadcrumb>,
}

impl CompileError {
    pub(crate) fn new(kind: CompileErrorKind) -> Self {
        CompileError {
            kind,
            breadcrumbs: Vec::new(),
        }
    }

    /// Records that the failure happened inside `crumb`.
    pub(crate) fn within(mut self, crumb: Breadcrumb) -> Self {
        self.breadcrumbs.insert(0, crumb);
        self
    }

    /// The breadcrumbs joined the way they are displayed, e.g. `ptr: [map]`.
    pub fn path(&self) -> String {
        self.breadcrumbs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ")
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for crumb in &self.breadcrumbs {
            write!(f, "{crumb}: ")?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for CompileError {}

/// Specific compile error kinds
#[derive(Debug, Clone)]
pub enum CompileErrorKind {
    /// The root type is not a pointer, so there is nowhere to write to
    InvalidTarget {
        /// The root shape that was given
        shape: &'static Shape,
    },
    /// The shape has no decoder (channels, function pointers, nested raw
    /// pointers, ...)
    UnsupportedType {
        /// The offending shape
        shape: &'static Shape,
    },
    /// A map whose keys are not `String`
    UnsupportedKeyType {
        /// The map shape
        map: &'static Shape,
        /// Its key shape
        key: &'static Shape,
    },
}

impl Display for CompileErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileErrorKind::InvalidTarget { shape } => {
                write!(f, "can only decode into a pointer, got {shape}")
            }
            CompileErrorKind::UnsupportedType { shape } => write!(f, "unsupported type: {shape}"),
            CompileErrorKind::UnsupportedKeyType { map, key } => {
                write!(f, "unsupported map key type: {key} in {map}, keys must be String")
            }
        }
    }
}

/// Error raised while decoding, kept in the [`JsonIter`](crate::JsonIter)
/// error slot.
#[derive(Debug, Clone)]
pub struct DecodeError {
    /// The specific kind of error
    pub kind: DecodeErrorKind,
    /// Byte offset in the input where the error was noticed
    pub offset: usize,
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.kind, self.offset)
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            DecodeErrorKind::Compile(err) => Some(err),
            _ => None,
        }
    }
}

/// Specific decode error kinds
#[derive(Debug, Clone)]
pub enum DecodeErrorKind {
    /// Malformed JSON
    Syntax {
        /// What the decoder was looking for
        expected: &'static str,
        /// The byte found instead
        found: char,
    },
    /// Input ended in the middle of a value
    UnexpectedEof {
        /// What the decoder was looking for
        expected: &'static str,
    },
    /// A value of this kind cannot be represented by the target
    UnexpectedValueKind {
        /// The kind that was found
        kind: ValueKind,
    },
    /// The number literal does not fit the target type
    MalformedNumber {
        /// The literal as it appeared in the input
        literal: String,
        /// The type it was parsed as
        target: &'static str,
    },
    /// A string is not valid UTF-8
    InvalidUtf8,
    /// Unknown escape sequence or lone surrogate in a string
    InvalidEscape {
        /// The escape sequence, without the leading backslash
        escape: String,
    },
    /// Arrays and objects are nested deeper than the configured limit
    DepthLimitExceeded {
        /// The configured limit
        limit: usize,
    },
    /// Non-whitespace input after the value
    TrailingCharacters,
    /// Reading from the underlying reader failed
    Io(String),
    /// No decoder could be built for the destination type
    Compile(CompileError),
    /// Reported by a user-registered decoder
    Custom(String),
}

impl Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::Syntax { expected, found } => {
                write!(f, "expected {expected}, found {found:?}")
            }
            DecodeErrorKind::UnexpectedEof { expected } => {
                write!(f, "unexpected end of input, expected {expected}")
            }
            DecodeErrorKind::UnexpectedValueKind { kind } => {
                write!(f, "unexpected value kind: {kind}")
            }
            DecodeErrorKind::MalformedNumber { literal, target } => {
                write!(f, "cannot parse {literal:?} as {target}")
            }
            DecodeErrorKind::InvalidUtf8 => write!(f, "invalid UTF-8 in string"),
            DecodeErrorKind::InvalidEscape { escape } => {
                write!(f, "invalid escape sequence \\{escape}")
            }
            DecodeErrorKind::DepthLimitExceeded { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
            DecodeErrorKind::TrailingCharacters => write!(f, "trailing characters after value"),
            DecodeErrorKind::Io(msg) => write!(f, "I/O error: {msg}"),
            DecodeErrorKind::Compile(err) => write!(f, "{err}"),
            DecodeErrorKind::Custom(msg) => f.write_str(msg),
        }
    }
}

/// An [`Any`](crate::Any) accessor was called on the wrong variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeMismatch {
    /// The variant the accessor reads
    pub expected: AnyKind,
    /// The variant actually stored
    pub found: AnyKind,
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type mismatch: expected {}, found {}", self.expected, self.found)
    }
}

impl std::error::Error for TypeMismatch {}
