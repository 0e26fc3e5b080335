use std::collections::HashMap;

use decant_core::PtrMut;

use super::{Decoder, DecoderRef};
use crate::JsonIter;

/// One decodable field of a struct.
pub(crate) struct FieldDecoder {
    pub(crate) name: &'static str,
    pub(crate) offset: usize,
    pub(crate) decoder: DecoderRef,
}

/// Decodes an object into a struct, field by field, in document order.
///
/// Fields absent from the document keep their current values. Keys that
/// match no field are skipped.
pub(crate) struct StructDecoder {
    pub(crate) type_name: &'static str,
    keys: HashMap<String, usize>,
    fields: Vec<FieldDecoder>,
}

impl StructDecoder {
    pub(crate) fn new(type_name: &'static str) -> Self {
        StructDecoder {
            type_name,
            keys: HashMap::new(),
            fields: Vec::new(),
        }
    }

    /// Routes every key in `names` to `field`. A key already claimed by an
    /// earlier field keeps its first owner.
    pub(crate) fn add_field(&mut self, names: &[String], field: FieldDecoder) {
        let index = self.fields.len();
        for name in names {
            self.keys.entry(name.clone()).or_insert(index);
        }
        self.fields.push(field);
    }

    pub(crate) fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl Decoder for StructDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        if !iter.descend() {
            return;
        }
        let mut next = iter.begin_object();
        while let Some(key) = next {
            match self.keys.get(&key) {
                Some(&index) => {
                    let field = &self.fields[index];
                    unsafe { field.decoder.decode(ptr.field(field.offset), iter) };
                }
                None => {
                    trace!(ty = self.type_name, key = %key, "skipping unknown field");
                    iter.skip();
                }
            }
            next = iter.next_field();
        }
        iter.ascend();
    }
}

impl core::fmt::Debug for FieldDecoder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FieldDecoder")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Reads a scalar written inside a JSON string, e.g. `"100"` for an integer
/// field tagged `,string`.
pub(crate) struct StringCoercedDecoder {
    pub(crate) inner: DecoderRef,
}

impl Decoder for StringCoercedDecoder {
    unsafe fn decode(&self, ptr: PtrMut, iter: &mut JsonIter<'_>) {
        if !iter.open_quoted() {
            return;
        }
        unsafe { self.inner.decode(ptr, iter) };
        if !iter.has_error() {
            iter.close_quoted();
        }
    }
}
