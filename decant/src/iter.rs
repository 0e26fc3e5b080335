//! The token source: pulls JSON tokens out of a byte slice or a reader.

use std::borrow::Cow;
use std::fmt;
use std::io::Read;

use crate::error::{DecodeError, DecodeErrorKind};

/// Default size of the refill buffer when reading from a [`Read`]
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Default limit on array/object nesting
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Options for a [`JsonIter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterOptions {
    /// Bytes requested from the reader per refill. Ignored for slices.
    pub buffer_capacity: usize,
    /// How deeply arrays and objects may nest before decoding fails with
    /// [`DecodeErrorKind::DepthLimitExceeded`].
    pub max_depth: usize,
}

impl Default for IterOptions {
    fn default() -> Self {
        IterOptions {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl IterOptions {
    /// Sets the refill buffer size (at least one byte).
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }

    /// Sets the nesting limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Kind of the next JSON value, as told by its first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Not the start of any value, or end of input
    Invalid,
    /// `"..."`
    String,
    /// `-`, `0`-`9`
    Number,
    /// `null`
    Null,
    /// `true` or `false`
    Bool,
    /// `[...]`
    Array,
    /// `{...}`
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Invalid => "invalid",
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        })
    }
}

/// Lexical class of a number literal: `.`, `e` or `E` make it a float,
/// otherwise a `-` makes it signed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberHint {
    Unsigned,
    Signed,
    Float,
}

/// Pull-based JSON reader.
///
/// Reads never fail loudly: the first error is stored in the iterator's error
/// slot and every later error is dropped. Once an error is stored, the
/// array and object readers report no further elements, so decoders unwind
/// quickly. Check
/// [`error`](Self::error) after decoding.
pub struct JsonIter<'a> {
    buf: Cow<'a, [u8]>,
    head: usize,
    tail: usize,
    /// `None` for slices, and once the reader is exhausted
    reader: Option<Box<dyn Read + 'a>>,
    /// bytes dropped from the front of `buf` by refills
    consumed: usize,
    depth: usize,
    options: IterOptions,
    /// number literal being scanned
    scratch: Vec<u8>,
    error: Option<DecodeError>,
}

impl fmt::Debug for JsonIter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonIter")
            .field("offset", &self.offset())
            .field("buffered", &(self.tail - self.head))
            .field("streaming", &self.reader.is_some())
            .field("depth", &self.depth)
            .field("error", &self.error)
            .finish()
    }
}

impl<'a> JsonIter<'a> {
    /// Reads from an in-memory document.
    pub fn new<S: AsRef<[u8]> + ?Sized>(input: &'a S) -> Self {
        let input = input.as_ref();
        JsonIter {
            buf: Cow::Borrowed(input),
            head: 0,
            tail: input.len(),
            reader: None,
            consumed: 0,
            depth: 0,
            options: IterOptions::default(),
            scratch: Vec::new(),
            error: None,
        }
    }

    /// Reads from `reader`, refilling an internal buffer as values are
    /// consumed.
    pub fn from_reader<R: Read + 'a>(reader: R) -> Self {
        JsonIter {
            buf: Cow::Owned(Vec::new()),
            head: 0,
            tail: 0,
            reader: Some(Box::new(reader)),
            consumed: 0,
            depth: 0,
            options: IterOptions::default(),
            scratch: Vec::new(),
            error: None,
        }
    }

    /// Replaces the options.
    pub fn with_options(mut self, options: IterOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in effect.
    pub fn options(&self) -> &IterOptions {
        &self.options
    }

    /// Absolute offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.consumed + self.head
    }

    //////////////////////////////////////////////////////////////////////
    // Error slot
    //////////////////////////////////////////////////////////////////////

    /// The first error reported, if any.
    pub fn error(&self) -> Option<&DecodeError> {
        self.error.as_ref()
    }

    /// Returns true once an error has been reported.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Removes and returns the stored error, re-arming the slot.
    pub fn take_error(&mut self) -> Option<DecodeError> {
        self.error.take()
    }

    /// Stores an error unless one is already stored.
    pub fn report(&mut self, kind: DecodeErrorKind) {
        if self.error.is_some() {
            trace!(error = %kind, "dropping error, slot already taken");
            return;
        }
        let offset = self.offset();
        debug!(offset, error = %kind, "decode error");
        self.error = Some(DecodeError { kind, offset });
    }

    /// Reports a [`DecodeErrorKind::Custom`] error, for registered decoders.
    pub fn report_custom(&mut self, message: impl Into<String>) {
        self.report(DecodeErrorKind::Custom(message.into()));
    }

    fn unexpected(&mut self, expected: &'static str, found: Option<u8>) {
        let kind = match found {
            Some(b) => DecodeErrorKind::Syntax {
                expected,
                found: b as char,
            },
            None => DecodeErrorKind::UnexpectedEof { expected },
        };
        self.report(kind);
    }

    //////////////////////////////////////////////////////////////////////
    // Buffer
    //////////////////////////////////////////////////////////////////////

    /// Refills the buffer from the reader. Returns false at end of input, for
    /// slices, or when the reader fails (which also reports an error).
    ///
    /// Only called once every buffered byte has been consumed.
    pub fn load_more(&mut self) -> bool {
        debug_assert_eq!(self.head, self.tail, "refill with unread bytes");
        let Some(reader) = self.reader.as_mut() else {
            return false;
        };
        let buf = self.buf.to_mut();
        let capacity = self.options.buffer_capacity.max(1);
        if buf.len() != capacity {
            buf.resize(capacity, 0);
        }
        self.consumed += self.tail;
        self.head = 0;
        self.tail = 0;

        loop {
            match reader.read(buf) {
                Ok(0) => {
                    trace!(offset = self.consumed, "reader exhausted");
                    self.reader = None;
                    return false;
                }
                Ok(n) => {
                    self.tail = n;
                    return true;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.reader = None;
                    self.report(DecodeErrorKind::Io(e.to_string()));
                    return false;
                }
            }
        }
    }

    #[inline]
    fn next_byte(&mut self) -> Option<u8> {
        if self.head == self.tail && !self.load_more() {
            return None;
        }
        let b = self.buf[self.head];
        self.head += 1;
        Some(b)
    }

    /// Steps back over the byte just returned by `next_byte`/`next_token`.
    #[inline]
    fn unread_byte(&mut self) {
        debug_assert!(self.head > 0);
        self.head -= 1;
    }

    /// Next byte that is not JSON whitespace.
    fn next_token(&mut self) -> Option<u8> {
        loop {
            while self.head < self.tail {
                let b = self.buf[self.head];
                self.head += 1;
                if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                    return Some(b);
                }
            }
            if !self.load_more() {
                return None;
            }
        }
    }

    fn peek_token(&mut self) -> Option<u8> {
        let b = self.next_token()?;
        self.unread_byte();
        Some(b)
    }

    fn expect_literal(&mut self, rest: &[u8], expected: &'static str) -> bool {
        for &want in rest {
            match self.next_byte() {
                Some(b) if b == want => {}
                found => {
                    self.unexpected(expected, found);
                    return false;
                }
            }
        }
        true
    }

    /// Consumes the opening `"` of a scalar carried inside a string. The
    /// scalar must start right after the quote.
    pub(crate) fn open_quoted(&mut self) -> bool {
        match self.next_token() {
            Some(b'"') => {}
            found => {
                self.unexpected("'\"'", found);
                return false;
            }
        }
        match self.next_byte() {
            Some(b) if !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'"') => {
                self.unread_byte();
                true
            }
            found => {
                self.unexpected("a value right after '\"'", found);
                false
            }
        }
    }

    /// Consumes the closing `"` right after a quoted scalar.
    pub(crate) fn close_quoted(&mut self) -> bool {
        match self.next_byte() {
            Some(b'"') => true,
            found => {
                self.unexpected("'\"'", found);
                false
            }
        }
    }

    pub(crate) fn descend(&mut self) -> bool {
        if self.depth >= self.options.max_depth {
            let limit = self.options.max_depth;
            self.report(DecodeErrorKind::DepthLimitExceeded { limit });
            return false;
        }
        self.depth += 1;
        true
    }

    pub(crate) fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    //////////////////////////////////////////////////////////////////////
    // Tokens
    //////////////////////////////////////////////////////////////////////

    /// Peeks at the kind of the next value without consuming it.
    pub fn what_is_next(&mut self) -> ValueKind {
        match self.peek_token() {
            Some(b'"') => ValueKind::String,
            Some(b'-' | b'0'..=b'9') => ValueKind::Number,
            Some(b'n') => ValueKind::Null,
            Some(b't' | b'f') => ValueKind::Bool,
            Some(b'[') => ValueKind::Array,
            Some(b'{') => ValueKind::Object,
            _ => ValueKind::Invalid,
        }
    }

    /// Consumes `null` if it comes next. Returns false, consuming nothing,
    /// for any other value.
    pub fn read_null(&mut self) -> bool {
        match self.next_token() {
            Some(b'n') => {
                self.expect_literal(b"ull", "null");
                true
            }
            Some(_) => {
                self.unread_byte();
                false
            }
            None => false,
        }
    }

    /// Reads `true` or `false`.
    pub fn read_bool(&mut self) -> bool {
        match self.next_token() {
            Some(b't') => {
                self.expect_literal(b"rue", "true");
                true
            }
            Some(b'f') => {
                self.expect_literal(b"alse", "false");
                false
            }
            found => {
                self.unexpected("true or false", found);
                false
            }
        }
    }

    /// Reads a string, decoding escape sequences. `null` reads as an empty
    /// string.
    pub fn read_string(&mut self) -> String {
        match self.next_token() {
            Some(b'"') => self.read_string_body(),
            Some(b'n') => {
                self.expect_literal(b"ull", "null");
                String::new()
            }
            found => {
                self.unexpected("a string", found);
                String::new()
            }
        }
    }

    /// Reads the rest of a string whose opening quote was consumed.
    fn read_string_body(&mut self) -> String {
        let mut out = Vec::new();
        loop {
            let start = self.head;
            let chunk = &self.buf[start..self.tail];
            match chunk
                .iter()
                .position(|&b| b == b'"' || b == b'\\' || b < 0x20)
            {
                Some(i) => {
                    out.extend_from_slice(&chunk[..i]);
                    let b = chunk[i];
                    self.head = start + i + 1;
                    match b {
                        b'"' => break,
                        b'\\' => {
                            if !self.read_escape(&mut out) {
                                return String::new();
                            }
                        }
                        _ => {
                            self.unexpected("an escaped control character", Some(b));
                            return String::new();
                        }
                    }
                }
                None => {
                    out.extend_from_slice(chunk);
                    self.head = self.tail;
                    if !self.load_more() {
                        self.unexpected("'\"'", None);
                        return String::new();
                    }
                }
            }
        }

        match String::from_utf8(out) {
            Ok(s) => s,
            Err(_) => {
                self.report(DecodeErrorKind::InvalidUtf8);
                String::new()
            }
        }
    }

    fn read_escape(&mut self, out: &mut Vec<u8>) -> bool {
        let escape = self.next_byte();
        self.apply_escape(escape, out)
    }

    /// Decodes the escape whose backslash was consumed and whose next byte
    /// is `escape`.
    fn apply_escape(&mut self, escape: Option<u8>, out: &mut Vec<u8>) -> bool {
        let unescaped = match escape {
            Some(b'"') => b'"',
            Some(b'\\') => b'\\',
            Some(b'/') => b'/',
            Some(b'b') => 0x08,
            Some(b'f') => 0x0c,
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(b'u') => return self.read_unicode_escape(out),
            Some(other) => {
                self.report(DecodeErrorKind::InvalidEscape {
                    escape: (other as char).to_string(),
                });
                return false;
            }
            None => {
                self.unexpected("an escape sequence", None);
                return false;
            }
        };
        out.push(unescaped);
        true
    }

    /// Decodes `XXXX` after `\u`, pairing UTF-16 surrogates. Unpaired
    /// surrogates decode to U+FFFD.
    fn read_unicode_escape(&mut self, out: &mut Vec<u8>) -> bool {
        let Some(first) = self.read_hex4() else {
            return false;
        };

        let c = match first {
            0xD800..=0xDBFF => {
                match self.next_byte() {
                    Some(b'\\') => {}
                    Some(_) => {
                        self.unread_byte();
                        push_char(out, char::REPLACEMENT_CHARACTER);
                        return true;
                    }
                    None => {
                        push_char(out, char::REPLACEMENT_CHARACTER);
                        return true;
                    }
                }
                let escape = self.next_byte();
                if escape != Some(b'u') {
                    push_char(out, char::REPLACEMENT_CHARACTER);
                    return self.apply_escape(escape, out);
                }
                let Some(second) = self.read_hex4() else {
                    return false;
                };
                if (0xDC00..=0xDFFF).contains(&second) {
                    let code = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                    char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
                } else {
                    // a second high surrogate is not paired again
                    push_char(out, char::REPLACEMENT_CHARACTER);
                    char::from_u32(second).unwrap_or(char::REPLACEMENT_CHARACTER)
                }
            }
            _ => char::from_u32(first).unwrap_or(char::REPLACEMENT_CHARACTER),
        };
        push_char(out, c);
        true
    }

    fn read_hex4(&mut self) -> Option<u32> {
        let mut code = 0u32;
        let mut seen = String::from("u");
        for _ in 0..4 {
            let Some(b) = self.next_byte() else {
                self.unexpected("four hex digits", None);
                return None;
            };
            seen.push(b as char);
            match (b as char).to_digit(16) {
                Some(digit) => code = code * 16 + digit,
                None => {
                    self.report(DecodeErrorKind::InvalidEscape { escape: seen });
                    return None;
                }
            }
        }
        Some(code)
    }

    /// Opens an array. Returns true when a first element follows; an empty
    /// array is consumed whole. `null` reads as an empty array.
    ///
    /// After each element, call [`next_element`](Self::next_element).
    pub fn begin_array(&mut self) -> bool {
        if self.has_error() {
            return false;
        }
        match self.next_token() {
            Some(b'[') => match self.next_token() {
                Some(b']') => false,
                Some(_) => {
                    self.unread_byte();
                    true
                }
                None => {
                    self.unexpected("a value or ']'", None);
                    false
                }
            },
            Some(b'n') => {
                self.expect_literal(b"ull", "null");
                false
            }
            found => {
                self.unexpected("'['", found);
                false
            }
        }
    }

    /// Moves past the `,` after an element and returns true, or consumes the
    /// closing `]` and returns false.
    pub fn next_element(&mut self) -> bool {
        if self.has_error() {
            return false;
        }
        match self.next_token() {
            Some(b',') => true,
            Some(b']') => false,
            found => {
                self.unexpected("',' or ']'", found);
                false
            }
        }
    }

    /// Opens an object and returns its first field name with the `:`
    /// consumed, or `None` for `{}`. `null` reads as an empty object.
    ///
    /// After each field value, call [`next_field`](Self::next_field).
    pub fn begin_object(&mut self) -> Option<String> {
        if self.has_error() {
            return None;
        }
        match self.next_token() {
            Some(b'{') => match self.next_token() {
                Some(b'"') => self.read_field_name(),
                Some(b'}') => None,
                found => {
                    self.unexpected("a field name or '}'", found);
                    None
                }
            },
            Some(b'n') => {
                self.expect_literal(b"ull", "null");
                None
            }
            found => {
                self.unexpected("'{'", found);
                None
            }
        }
    }

    /// Moves past the `,` after a field value and returns the next field
    /// name, or consumes the closing `}` and returns `None`.
    pub fn next_field(&mut self) -> Option<String> {
        if self.has_error() {
            return None;
        }
        match self.next_token() {
            Some(b',') => match self.next_token() {
                Some(b'"') => self.read_field_name(),
                found => {
                    self.unexpected("a field name", found);
                    None
                }
            },
            Some(b'}') => None,
            found => {
                self.unexpected("',' or '}'", found);
                None
            }
        }
    }

    fn read_field_name(&mut self) -> Option<String> {
        let name = self.read_string_body();
        if self.has_error() {
            return None;
        }
        match self.next_token() {
            Some(b':') => Some(name),
            found => {
                self.unexpected("':'", found);
                None
            }
        }
    }

    /// Consumes and discards the next value, whatever its kind.
    pub fn skip(&mut self) {
        match self.what_is_next() {
            ValueKind::String => {
                self.read_string();
            }
            ValueKind::Number => {
                use lexical_parse_float::FromLexical as _;
                if self.scan_number().is_some() && f64::from_lexical(&self.scratch).is_err() {
                    self.malformed_number("number");
                }
            }
            ValueKind::Null => {
                self.read_null();
            }
            ValueKind::Bool => {
                self.read_bool();
            }
            ValueKind::Array => {
                if !self.descend() {
                    return;
                }
                let mut more = self.begin_array();
                while more {
                    self.skip();
                    more = self.next_element();
                }
                self.ascend();
            }
            ValueKind::Object => {
                if !self.descend() {
                    return;
                }
                let mut field = self.begin_object();
                while field.is_some() {
                    self.skip();
                    field = self.next_field();
                }
                self.ascend();
            }
            ValueKind::Invalid => {
                let found = self.next_token();
                self.unexpected("a value", found);
            }
        }
    }

    /// Fails with [`DecodeErrorKind::TrailingCharacters`] unless only
    /// whitespace is left.
    pub fn finish(&mut self) {
        if self.has_error() {
            return;
        }
        if self.next_token().is_some() {
            self.unread_byte();
            self.report(DecodeErrorKind::TrailingCharacters);
        }
    }

    //////////////////////////////////////////////////////////////////////
    // Numbers
    //////////////////////////////////////////////////////////////////////

    /// Copies the next number literal into `scratch`, refilling as needed,
    /// and classifies it. The byte that ends the literal is left unread.
    pub(crate) fn scan_number(&mut self) -> Option<NumberHint> {
        match self.next_token() {
            Some(b) if b == b'-' || b.is_ascii_digit() => self.unread_byte(),
            found => {
                self.unexpected("a number", found);
                return None;
            }
        }

        self.scratch.clear();
        let mut hint = NumberHint::Unsigned;
        loop {
            let chunk = &self.buf[self.head..self.tail];
            let mut len = 0;
            for &b in chunk {
                match b {
                    b'0'..=b'9' | b'+' => {}
                    b'-' => {
                        if hint == NumberHint::Unsigned {
                            hint = NumberHint::Signed;
                        }
                    }
                    b'.' | b'e' | b'E' => hint = NumberHint::Float,
                    _ => break,
                }
                len += 1;
            }
            self.scratch.extend_from_slice(&chunk[..len]);
            self.head += len;
            if self.head < self.tail || !self.load_more() {
                break;
            }
        }
        Some(hint)
    }

    /// The literal captured by the last [`scan_number`](Self::scan_number).
    pub(crate) fn number_literal(&self) -> &[u8] {
        &self.scratch
    }

    pub(crate) fn malformed_number(&mut self, target: &'static str) {
        let literal = String::from_utf8_lossy(&self.scratch).into_owned();
        self.report(DecodeErrorKind::MalformedNumber { literal, target });
    }

    pub(crate) fn read_int<T>(&mut self) -> T
    where
        T: lexical_parse_integer::FromLexical + Default,
    {
        if self.scan_number().is_none() {
            return T::default();
        }
        match T::from_lexical(&self.scratch) {
            Ok(value) => value,
            Err(_) => {
                self.malformed_number(core::any::type_name::<T>());
                T::default()
            }
        }
    }

    pub(crate) fn read_float<T>(&mut self) -> T
    where
        T: lexical_parse_float::FromLexical + Default,
    {
        if self.scan_number().is_none() {
            return T::default();
        }
        match T::from_lexical(&self.scratch) {
            Ok(value) => value,
            Err(_) => {
                self.malformed_number(core::any::type_name::<T>());
                T::default()
            }
        }
    }
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut tmp = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
}

macro_rules! number_readers {
    ($($name:ident => $ty:ty, $via:ident;)*) => {
        impl JsonIter<'_> {
            $(
                #[doc = concat!("Reads a number as `", stringify!($ty), "`. Literals that do not fit report [`DecodeErrorKind::MalformedNumber`].")]
                pub fn $name(&mut self) -> $ty {
                    self.$via::<$ty>()
                }
            )*
        }
    };
}

number_readers! {
    read_i8 => i8, read_int;
    read_i16 => i16, read_int;
    read_i32 => i32, read_int;
    read_i64 => i64, read_int;
    read_isize => isize, read_int;
    read_u8 => u8, read_int;
    read_u16 => u16, read_int;
    read_u32 => u32, read_int;
    read_u64 => u64, read_int;
    read_usize => usize, read_int;
    read_f32 => f32, read_float;
    read_f64 => f64, read_float;
}
