use decant_core::{OptionVTable, PointerVTable, PtrMut};

use super::{Decoder, DecoderRef};
use crate::JsonIter;

/// `null` clears the option; any other value is decoded into the contained
/// value, which is created with the inner type's zero value only if the
/// option was empty. Decoding into `Some(Box<T>)` therefore keeps the box.
pub(crate) struct OptionalDecoder {
    pub(crate) vtable: &'static OptionVTable,
    pub(crate) inner: DecoderRef,
}

impl Decoder for OptionalDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        unsafe {
            if iter.read_null() {
                (self.vtable.set_none)(ptr);
                return;
            }
            let inner = (self.vtable.get_or_insert_zero)(ptr);
            self.inner.decode(inner, iter);
        }
    }
}

/// Decodes through an owning pointer into its existing pointee.
pub(crate) struct BoxDecoder {
    pub(crate) vtable: &'static PointerVTable,
    pub(crate) inner: DecoderRef,
}

impl Decoder for BoxDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        unsafe {
            match (self.vtable.deref_mut)(ptr) {
                Some(pointee) => self.inner.decode(pointee, iter),
                None => iter.report_custom("cannot decode through a null pointer"),
            }
        }
    }
}
