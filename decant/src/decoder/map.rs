use core::mem::ManuallyDrop;

use decant_core::{HeapValue, MapVTable, PtrMut, Shape};

use super::{Decoder, DecoderRef};
use crate::JsonIter;

/// Inserts every field of the object into the map, keyed by field name.
///
/// Entries already in the map are kept; a key seen again overwrites the
/// earlier value. Each value is decoded into its own heap slot and then moved
/// into the map.
pub(crate) struct MapDecoder {
    pub(crate) vtable: &'static MapVTable,
    pub(crate) value_shape: &'static Shape,
    pub(crate) value: DecoderRef,
}

impl Decoder for MapDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        if !iter.descend() {
            return;
        }
        let mut field = iter.begin_object();
        while let Some(key) = field {
            let mut slot = HeapValue::zeroed(self.value_shape);
            unsafe { self.value.decode(slot.as_mut(), iter) };
            if iter.has_error() {
                break;
            }

            // keys are always `String`, checked when the decoder was compiled
            let mut key = ManuallyDrop::new(key);
            slot.take(|value| unsafe {
                (self.vtable.insert)(ptr, PtrMut::from_mut(&mut *key), value);
            });
            field = iter.next_field();
        }
        iter.ascend();
    }
}
