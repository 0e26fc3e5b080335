//! Decoders: one per shape, composed into a tree by the compiler.

use std::sync::{Arc, OnceLock, Weak};

use decant_core::PtrMut;

use crate::JsonIter;
use crate::registry::DecoderFn;

mod scalar;
pub(crate) use scalar::*;

mod optional;
pub(crate) use optional::*;

mod sequence;
pub(crate) use sequence::*;

mod map;
pub(crate) use map::*;

mod structs;
pub(crate) use structs::*;

/// Decodes one specific shape.
///
/// Decoders are built once per type and shared between threads, so they
/// hold no per-call state: everything mutable lives in the destination
/// memory and in the [`JsonIter`].
pub trait Decoder: Send + Sync {
    /// Reads one value from `iter` and writes it at `ptr`. Errors go to the
    /// iterator's error slot.
    ///
    /// # Safety
    ///
    /// `ptr` must point at an initialized value of the shape this decoder was
    /// compiled for, with no other live reference to it.
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>);
}

/// Shared handle to a compiled decoder.
pub type DecoderRef = Arc<dyn Decoder>;

/// Runs a registered function.
pub(crate) struct FuncDecoder {
    pub(crate) func: DecoderFn,
}

impl Decoder for FuncDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        (self.func)(ptr, iter);
    }
}

/// Stands in for a struct decoder that is still being compiled, so that
/// `struct Node { children: Vec<Node> }` compiles to a finite tree.
///
/// Holds a weak reference: the real decoder owns this one, directly or
/// indirectly.
pub(crate) struct RecursiveDecoder {
    pub(crate) target: Arc<OnceLock<Weak<dyn Decoder>>>,
}

impl Decoder for RecursiveDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        match self.target.get().and_then(Weak::upgrade) {
            Some(decoder) => unsafe { decoder.decode(ptr, iter) },
            None => iter.report_custom("recursive decoder used outside of its tree"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decant_testhelpers::test;

    #[test]
    fn unbound_recursive_decoder_reports() {
        let decoder = RecursiveDecoder {
            target: Arc::default(),
        };
        let mut value = 0u8;
        let mut iter = JsonIter::new("1");
        unsafe { decoder.decode(PtrMut::from_mut(&mut value), &mut iter) };
        assert!(matches!(
            iter.take_error().map(|err| err.kind),
            Some(crate::DecodeErrorKind::Custom(_))
        ));
    }

    #[test]
    fn func_decoder_runs_the_function() {
        let decoder = FuncDecoder {
            func: Arc::new(|ptr: PtrMut, iter: &mut JsonIter<'_>| {
                let n = iter.read_u8();
                unsafe { *ptr.as_mut::<u8>() = n + 1 };
            }),
        };
        let mut value = 0u8;
        let mut iter = JsonIter::new("41");
        unsafe { decoder.decode(PtrMut::from_mut(&mut value), &mut iter) };
        assert_eq!(value, 42);
    }
}
