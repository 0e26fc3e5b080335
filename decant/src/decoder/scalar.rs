use core::marker::PhantomData;

use decant_core::PtrMut;

use super::Decoder;
use crate::{Any, JsonIter};

pub(crate) struct StringDecoder;

impl Decoder for StringDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        let value = iter.read_string();
        unsafe { ptr.replace::<String>(value) };
    }
}

pub(crate) struct BoolDecoder;

impl Decoder for BoolDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        let value = iter.read_bool();
        unsafe { ptr.replace::<bool>(value) };
    }
}

/// Decoder for every integer width.
pub(crate) struct IntDecoder<T>(PhantomData<fn() -> T>);

impl<T> IntDecoder<T> {
    pub(crate) fn new() -> Self {
        IntDecoder(PhantomData)
    }
}

impl<T> Decoder for IntDecoder<T>
where
    T: lexical_parse_integer::FromLexical + Default + 'static,
{
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        let value = iter.read_int::<T>();
        if !iter.has_error() {
            unsafe { ptr.replace::<T>(value) };
        }
    }
}

/// Decoder for `f32` and `f64`.
pub(crate) struct FloatDecoder<T>(PhantomData<fn() -> T>);

impl<T> FloatDecoder<T> {
    pub(crate) fn new() -> Self {
        FloatDecoder(PhantomData)
    }
}

impl<T> Decoder for FloatDecoder<T>
where
    T: lexical_parse_float::FromLexical + Default + 'static,
{
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        let value = iter.read_float::<T>();
        if !iter.has_error() {
            unsafe { ptr.replace::<T>(value) };
        }
    }
}

pub(crate) struct AnyDecoder;

impl Decoder for AnyDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        let value = iter.read_any();
        unsafe { ptr.replace::<Any>(value) };
    }
}
