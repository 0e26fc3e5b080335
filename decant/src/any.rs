//! Schema-less JSON values.

use core::alloc::Layout;
use core::fmt;

use indexmap::IndexMap;

use decant_core::{ConstTypeId, Def, Reflect, Shape, ValueVTable};

use crate::error::{DecodeError, DecodeErrorKind, TypeMismatch};
use crate::iter::{JsonIter, NumberHint, ValueKind};

/// A decoded JSON value of unknown shape.
///
/// Numbers are classified once, from the literal alone: a `.`, `e` or `E`
/// makes an [`Any::F64`], otherwise a `-` makes an [`Any::I64`], and anything
/// else is an [`Any::U64`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Any {
    /// `null`
    #[default]
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Negative integer literal
    I64(i64),
    /// Integer literal without sign
    U64(u64),
    /// Literal with a fraction or exponent
    F64(f64),
    /// String
    String(String),
    /// Array, in document order
    Array(Vec<Any>),
    /// Object, in document order; a repeated key keeps its first position
    /// and its last value
    Object(IndexMap<String, Any>),
}

/// Variant of an [`Any`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyKind {
    /// [`Any::Null`]
    Null,
    /// [`Any::Bool`]
    Bool,
    /// [`Any::I64`]
    I64,
    /// [`Any::U64`]
    U64,
    /// [`Any::F64`]
    F64,
    /// [`Any::String`]
    String,
    /// [`Any::Array`]
    Array,
    /// [`Any::Object`]
    Object,
}

impl fmt::Display for AnyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnyKind::Null => "null",
            AnyKind::Bool => "bool",
            AnyKind::I64 => "i64",
            AnyKind::U64 => "u64",
            AnyKind::F64 => "f64",
            AnyKind::String => "string",
            AnyKind::Array => "array",
            AnyKind::Object => "object",
        })
    }
}

impl Any {
    /// Parses a whole document.
    pub fn parse(input: &str) -> Result<Any, DecodeError> {
        let mut iter = JsonIter::new(input);
        let value = iter.read_any();
        iter.finish();
        match iter.take_error() {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    /// The variant stored.
    pub fn kind(&self) -> AnyKind {
        match self {
            Any::Null => AnyKind::Null,
            Any::Bool(_) => AnyKind::Bool,
            Any::I64(_) => AnyKind::I64,
            Any::U64(_) => AnyKind::U64,
            Any::F64(_) => AnyKind::F64,
            Any::String(_) => AnyKind::String,
            Any::Array(_) => AnyKind::Array,
            Any::Object(_) => AnyKind::Object,
        }
    }

    /// Returns true for [`Any::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Any::Null)
    }

    fn mismatch(&self, expected: AnyKind) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// The boolean stored in [`Any::Bool`].
    pub fn as_bool(&self) -> Result<bool, TypeMismatch> {
        match self {
            Any::Bool(b) => Ok(*b),
            _ => Err(self.mismatch(AnyKind::Bool)),
        }
    }

    /// The integer stored in [`Any::I64`].
    pub fn as_i64(&self) -> Result<i64, TypeMismatch> {
        match self {
            Any::I64(n) => Ok(*n),
            _ => Err(self.mismatch(AnyKind::I64)),
        }
    }

    /// The integer stored in [`Any::U64`].
    pub fn as_u64(&self) -> Result<u64, TypeMismatch> {
        match self {
            Any::U64(n) => Ok(*n),
            _ => Err(self.mismatch(AnyKind::U64)),
        }
    }

    /// The float stored in [`Any::F64`].
    pub fn as_f64(&self) -> Result<f64, TypeMismatch> {
        match self {
            Any::F64(n) => Ok(*n),
            _ => Err(self.mismatch(AnyKind::F64)),
        }
    }

    /// The text stored in [`Any::String`].
    pub fn as_str(&self) -> Result<&str, TypeMismatch> {
        match self {
            Any::String(s) => Ok(s),
            _ => Err(self.mismatch(AnyKind::String)),
        }
    }

    /// The elements stored in [`Any::Array`].
    pub fn as_array(&self) -> Result<&[Any], TypeMismatch> {
        match self {
            Any::Array(items) => Ok(items),
            _ => Err(self.mismatch(AnyKind::Array)),
        }
    }

    /// The entries stored in [`Any::Object`].
    pub fn as_object(&self) -> Result<&IndexMap<String, Any>, TypeMismatch> {
        match self {
            Any::Object(map) => Ok(map),
            _ => Err(self.mismatch(AnyKind::Object)),
        }
    }

    /// Looks up `key` in an object; `None` for missing keys and non-objects.
    pub fn get(&self, key: &str) -> Option<&Any> {
        match self {
            Any::Object(map) => map.get(key),
            _ => None,
        }
    }
}

impl JsonIter<'_> {
    /// Reads the next value, whatever its kind.
    ///
    /// On error the partial value is returned and the error is left in the
    /// error slot.
    pub fn read_any(&mut self) -> Any {
        match self.what_is_next() {
            ValueKind::String => Any::String(self.read_string()),
            ValueKind::Number => self.read_number(),
            ValueKind::Null => {
                self.read_null();
                Any::Null
            }
            ValueKind::Bool => Any::Bool(self.read_bool()),
            ValueKind::Array => {
                let mut items = Vec::new();
                if !self.descend() {
                    return Any::Array(items);
                }
                let mut more = self.begin_array();
                while more {
                    items.push(self.read_any());
                    more = self.next_element();
                }
                self.ascend();
                Any::Array(items)
            }
            ValueKind::Object => {
                let mut map = IndexMap::new();
                if !self.descend() {
                    return Any::Object(map);
                }
                let mut field = self.begin_object();
                while let Some(key) = field {
                    let value = self.read_any();
                    if self.has_error() {
                        break;
                    }
                    map.insert(key, value);
                    field = self.next_field();
                }
                self.ascend();
                Any::Object(map)
            }
            ValueKind::Invalid => {
                self.report(DecodeErrorKind::UnexpectedValueKind {
                    kind: ValueKind::Invalid,
                });
                Any::Null
            }
        }
    }

    fn read_number(&mut self) -> Any {
        use lexical_parse_float::FromLexical as _;
        use lexical_parse_integer::FromLexical as _;

        let Some(hint) = self.scan_number() else {
            return Any::Null;
        };
        let literal = self.number_literal();
        let (parsed, target) = match hint {
            NumberHint::Float => (f64::from_lexical(literal).ok().map(Any::F64), "f64"),
            NumberHint::Signed => (i64::from_lexical(literal).ok().map(Any::I64), "i64"),
            NumberHint::Unsigned => (u64::from_lexical(literal).ok().map(Any::U64), "u64"),
        };
        match parsed {
            Some(value) => value,
            None => {
                self.malformed_number(target);
                Any::Null
            }
        }
    }
}

/// Parses the next value of `iter` into an [`Any`].
pub fn parse_any(iter: &mut JsonIter<'_>) -> Result<Any, DecodeError> {
    let value = iter.read_any();
    match iter.take_error() {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

unsafe impl Reflect for Any {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Any>(),
            layout: Layout::new::<Any>(),
            type_identifier: "Any",
            type_params: &[],
            def: Def::DynamicValue,
            vtable: ValueVTable::with_default::<Any>(),
        }
    };
}
