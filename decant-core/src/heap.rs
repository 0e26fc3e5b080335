use crate::{PtrMut, PtrUninit, Shape, alloc_for_layout, dealloc_for_layout};

/// A heap slot holding a value of a reflected type.
///
/// Starts out holding the type's zero value. Dropping the slot drops the value
/// (unless it was moved out with [`HeapValue::take`]) and frees the memory.
pub struct HeapValue {
    ptr: PtrUninit,
    shape: &'static Shape,
    initialized: bool,
}

impl HeapValue {
    /// Allocates a slot for `shape` and writes its zero value into it.
    pub fn zeroed(shape: &'static Shape) -> Self {
        let ptr = alloc_for_layout(shape.layout);
        unsafe { (shape.vtable.default_in_place)(ptr) };
        HeapValue {
            ptr,
            shape,
            initialized: true,
        }
    }

    /// Pointer to the held value.
    ///
    /// # Panics
    ///
    /// Panics if the value was already moved out.
    pub fn as_mut(&mut self) -> PtrMut {
        assert!(self.initialized, "HeapValue used after its value was taken");
        unsafe { self.ptr.assume_init() }
    }

    /// Hands the value to `consume`, which must move it out of the pointer it
    /// receives (e.g. with [`PtrMut::read`]). The slot is freed without
    /// dropping the value.
    pub fn take(mut self, consume: impl FnOnce(PtrMut)) {
        let ptr = self.as_mut();
        self.initialized = false;
        consume(ptr);
    }
}

impl Drop for HeapValue {
    fn drop(&mut self) {
        unsafe {
            if self.initialized {
                (self.shape.vtable.drop_in_place)(self.ptr.assume_init());
            }
            dealloc_for_layout(self.ptr, self.shape.layout);
        }
    }
}

impl core::fmt::Debug for HeapValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HeapValue")
            .field("shape", &format_args!("{}", self.shape))
            .field("initialized", &self.initialized)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;
    use decant_testhelpers::test;

    #[test]
    fn zeroed_then_taken() {
        let mut slot = HeapValue::zeroed(<String as Reflect>::SHAPE);
        unsafe { slot.as_mut().replace(String::from("moved")) };
        let mut out = None;
        slot.take(|ptr| out = Some(unsafe { ptr.read::<String>() }));
        assert_eq!(out.as_deref(), Some("moved"));
    }

    #[test]
    fn dropped_while_holding_a_value() {
        let mut slot = HeapValue::zeroed(<Vec<String> as Reflect>::SHAPE);
        unsafe { slot.as_mut().as_mut::<Vec<String>>() }.push("leak-free".into());
        drop(slot);
    }
}
