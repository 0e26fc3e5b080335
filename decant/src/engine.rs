//! The engine ties the compiler, the decoder cache and the registry
//! together.

use std::io::Read;
use std::sync::LazyLock;

use decant_core::{PtrMut, Reflect, Shape};

use crate::JsonIter;
use crate::cache::DecoderCache;
use crate::compiler::compile;
use crate::decoder::DecoderRef;
use crate::error::{CompileError, DecodeError, DecodeErrorKind};
use crate::registry::Registry;

static GLOBAL: LazyLock<Engine> = LazyLock::new(Engine::new);

/// A decoder cache plus the overrides applied when filling it.
///
/// Most code uses the process-wide [`Engine::global`] through the crate's
/// free functions. A separate engine has its own registry and cache, which
/// keeps tests and embedders from seeing each other's registrations.
#[derive(Debug, Default)]
pub struct Engine {
    cache: DecoderCache,
    registry: Registry,
}

impl Engine {
    /// An engine with an empty cache and no registrations.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide engine.
    pub fn global() -> &'static Engine {
        &GLOBAL
    }

    /// Compiled decoders.
    pub fn cache(&self) -> &DecoderCache {
        &self.cache
    }

    /// Registered overrides and extensions.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The decoder for `root`, the shape of a raw pointer to the destination
    /// type. Compiled and cached on first use.
    ///
    /// Compile errors are returned every time; they are never cached.
    pub fn decoder_for_shape(&self, root: &'static Shape) -> Result<DecoderRef, CompileError> {
        if let Some(decoder) = self.cache.lookup(root.id) {
            debug!(shape = %root, "decoder cache hit");
            return Ok(decoder);
        }
        debug!(shape = %root, "decoder cache miss");
        let decoder = compile(root, &self.registry)?;
        self.cache.insert(root.id, decoder.clone());
        Ok(decoder)
    }

    /// Decodes the next value of `iter` into `dest`.
    ///
    /// Fields of `dest` not mentioned in the input keep their values. Errors,
    /// including a type that cannot be decoded into, end up in the iterator's
    /// error slot.
    pub fn decode_into<T: Reflect>(&self, dest: &mut T, iter: &mut JsonIter<'_>) {
        // the target shape is `*mut T`, satisfying the pointer requirement
        unsafe { self.decode_shape(<*mut T>::SHAPE, PtrMut::from_mut(dest), iter) }
    }

    /// Decodes through a type-erased pointer. `root` is the shape of a raw
    /// pointer to the value at `target`; anything else reports
    /// [`CompileErrorKind::InvalidTarget`](crate::CompileErrorKind::InvalidTarget).
    ///
    /// # Safety
    ///
    /// If `root` is `*mut T`, `target` must point at an initialized `T` with
    /// no other live reference to it.
    pub unsafe fn decode_shape(&self, root: &'static Shape, target: PtrMut, iter: &mut JsonIter<'_>) {
        match self.decoder_for_shape(root) {
            Ok(decoder) => unsafe { decoder.decode(target, iter) },
            Err(err) => iter.report(DecodeErrorKind::Compile(err)),
        }
    }

    /// Decodes `input` into a fresh `T`, starting from its zero value.
    pub fn from_slice<T: Reflect>(&self, input: &[u8]) -> Result<T, DecodeError> {
        self.decode_whole(JsonIter::new(input))
    }

    /// Decodes `input` into a fresh `T`, starting from its zero value.
    pub fn from_str<T: Reflect>(&self, input: &str) -> Result<T, DecodeError> {
        self.decode_whole(JsonIter::new(input))
    }

    /// Decodes everything `reader` yields into a fresh `T`.
    pub fn from_reader<T: Reflect, R: Read>(&self, reader: R) -> Result<T, DecodeError> {
        self.decode_whole(JsonIter::from_reader(reader))
    }

    /// Decodes `input` into the existing value `dest`.
    pub fn unmarshal_str<T: Reflect>(&self, input: &str, dest: &mut T) -> Result<(), DecodeError> {
        let mut iter = JsonIter::new(input);
        self.decode_into(dest, &mut iter);
        iter.finish();
        match iter.take_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn decode_whole<T: Reflect>(&self, mut iter: JsonIter<'_>) -> Result<T, DecodeError> {
        let mut value = T::zero();
        self.decode_into(&mut value, &mut iter);
        iter.finish();
        match iter.take_error() {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }
}

impl JsonIter<'_> {
    /// Decodes the next value into `dest` with the global engine.
    pub fn read<T: Reflect>(&mut self, dest: &mut T) {
        Engine::global().decode_into(dest, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CompileErrorKind;
    use decant_testhelpers::test;

    #[test]
    fn cache_fills_on_first_decode() {
        let engine = Engine::new();
        assert!(engine.cache().is_empty());

        let value: Vec<u32> = engine.from_str("[1, 2, 3]").unwrap();
        assert_eq!(value, [1, 2, 3]);
        assert_eq!(engine.cache().len(), 1);

        let first = engine.decoder_for_shape(<*mut Vec<u32>>::SHAPE).unwrap();
        let again = engine.decoder_for_shape(<*mut Vec<u32>>::SHAPE).unwrap();
        assert!(std::sync::Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn compile_errors_are_not_cached() {
        let engine = Engine::new();
        for _ in 0..2 {
            let err = engine.from_str::<Vec<fn()>>("[]").unwrap_err();
            let DecodeErrorKind::Compile(err) = err.kind else {
                panic!("expected a compile error");
            };
            assert_eq!(err.to_string(), "ptr: [slice]: unsupported type: fn()");
        }
        assert!(engine.cache().is_empty());
    }

    #[test]
    fn non_pointer_root_is_an_invalid_target() {
        let engine = Engine::new();
        let mut value = 0u32;
        let mut iter = JsonIter::new("7");
        unsafe { engine.decode_shape(u32::SHAPE, PtrMut::from_mut(&mut value), &mut iter) };

        let err = iter.take_error().unwrap();
        assert!(matches!(
            err.kind,
            DecodeErrorKind::Compile(CompileError {
                kind: CompileErrorKind::InvalidTarget { .. },
                ..
            })
        ));
        assert_eq!(value, 0);
    }

    #[test]
    fn unmarshal_keeps_unmentioned_state() {
        let engine = Engine::new();
        let mut value = Some(5u8);
        engine.unmarshal_str(" 9 ", &mut value).unwrap();
        assert_eq!(value, Some(9));
        engine.unmarshal_str("null", &mut value).unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn trailing_input_is_rejected() {
        let err = Engine::new().from_str::<u8>("1 2").unwrap_err();
        assert!(matches!(err.kind, DecodeErrorKind::TrailingCharacters));
        assert_eq!(err.offset, 2);
    }

    #[test]
    fn iter_read_uses_the_global_engine() {
        let mut iter = JsonIter::new("[true, false]");
        let mut flags = Vec::<bool>::new();
        iter.read(&mut flags);
        assert!(!iter.has_error());
        assert_eq!(flags, [true, false]);
    }
}
