use decant_core::{ListVTable, PtrMut};

use super::{Decoder, DecoderRef};
use crate::JsonIter;

/// Replaces the list's contents with the array's elements, in document order.
///
/// Each element starts as the zero value, pushed in place, and is decoded
/// where it sits. On error the elements decoded so far stay in the list.
pub(crate) struct SequenceDecoder {
    pub(crate) vtable: &'static ListVTable,
    pub(crate) elem: DecoderRef,
}

impl Decoder for SequenceDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        unsafe { (self.vtable.clear)(ptr) };
        if !iter.descend() {
            return;
        }
        let mut more = iter.begin_array();
        while more {
            unsafe {
                let slot = (self.vtable.push_zero)(ptr);
                self.elem.decode(slot, iter);
            }
            more = iter.next_element();
        }
        iter.ascend();
    }
}
