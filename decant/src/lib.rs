#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

extern crate self as decant;

/// Trace-level logging macro that forwards to `tracing::trace!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

/// Trace-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Debug-level logging macro that forwards to `tracing::debug!` when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Debug-level logging macro (no-op when `tracing` feature is disabled).
#[cfg(not(feature = "tracing"))]
#[allow(unused_macros)]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

#[allow(unused_imports)]
pub(crate) use debug;
#[allow(unused_imports)]
pub(crate) use trace;

mod any;
mod cache;
mod compiler;
mod decoder;
mod engine;
mod error;
mod iter;
mod registry;

pub use any::{Any, AnyKind, parse_any};
pub use cache::DecoderCache;
pub use compiler::compile;
pub use decoder::{Decoder, DecoderRef};
pub use engine::Engine;
pub use error::{
    Breadcrumb, CompileError, CompileErrorKind, DecodeError, DecodeErrorKind, TypeMismatch,
};
pub use iter::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_DEPTH, IterOptions, JsonIter, ValueKind};
pub use registry::{DecoderFn, ExtensionFn, FieldOverride, Registry};

pub use decant_core::*;
pub use decant_macros::Reflect;

use std::io::Read;

/// Decodes a JSON document into a fresh `T`.
///
/// ```
/// #[derive(decant::Reflect)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let p: Point = decant::from_str(r#"{"x": 1, "y": -2}"#).unwrap();
/// assert_eq!((p.x, p.y), (1, -2));
/// ```
pub fn from_str<T: Reflect>(input: &str) -> Result<T, DecodeError> {
    Engine::global().from_str(input)
}

/// Decodes a JSON document given as bytes into a fresh `T`.
pub fn from_slice<T: Reflect>(input: &[u8]) -> Result<T, DecodeError> {
    Engine::global().from_slice(input)
}

/// Decodes the JSON document read from `reader` into a fresh `T`.
pub fn from_reader<T: Reflect, R: Read>(reader: R) -> Result<T, DecodeError> {
    Engine::global().from_reader(reader)
}

/// Decodes a JSON document into `dest`, overwriting only what the document
/// mentions.
pub fn unmarshal_str<T: Reflect>(input: &str, dest: &mut T) -> Result<(), DecodeError> {
    Engine::global().unmarshal_str(input, dest)
}

/// Registers `decoder` for every value of the type named `type_name`
/// (`u32`, `Vec<String>`, `Point`) with the global engine.
pub fn register_type_decoder<F>(type_name: impl Into<String>, decoder: F)
where
    F: Fn(PtrMut, &mut JsonIter<'_>) + Send + Sync + 'static,
{
    Engine::global().registry().register_type(type_name, decoder);
}

/// Registers `decoder` for field `field` of the struct named `type_name` with
/// the global engine.
pub fn register_field_decoder<F>(type_name: &str, field: &str, decoder: F)
where
    F: Fn(PtrMut, &mut JsonIter<'_>) + Send + Sync + 'static,
{
    Engine::global().registry().register_field(type_name, field, decoder);
}

/// Adds an extension to the global engine.
pub fn register_extension<F>(extension: F)
where
    F: Fn(&'static Shape, &'static Field) -> Option<FieldOverride> + Send + Sync + 'static,
{
    Engine::global().registry().register_extension(extension);
}

/// Forgets the global engine's type and field registrations.
///
/// Decoders compiled while they were registered stay cached; call
/// [`clear_cache`] as well to stop using them.
pub fn clean_decoders() {
    Engine::global().registry().reset();
}

/// Drops every decoder compiled by the global engine.
pub fn clear_cache() {
    Engine::global().cache().clear();
}
