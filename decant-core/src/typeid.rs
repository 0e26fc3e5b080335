use core::any::TypeId;
use core::fmt;
use core::hash::{Hash, Hasher};

/// [`TypeId`] equivalent usable in const contexts.
///
/// Shapes are built in `const` items, where `TypeId::of` cannot be called,
/// so the shape stores the function instead and calls it on demand.
#[derive(Copy, Clone)]
#[repr(C)]
pub struct ConstTypeId {
    type_id_fn: fn() -> TypeId,
}

impl ConstTypeId {
    /// Create a [`ConstTypeId`] for a type.
    #[must_use]
    pub const fn of<T: ?Sized + 'static>() -> Self {
        ConstTypeId {
            type_id_fn: TypeId::of::<T>,
        }
    }

    /// Get the underlying [`TypeId`].
    #[inline]
    pub fn get(self) -> TypeId {
        (self.type_id_fn)()
    }
}

impl fmt::Debug for ConstTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.get(), f)
    }
}

impl PartialEq for ConstTypeId {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl Eq for ConstTypeId {}

impl Hash for ConstTypeId {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        // The function pointer may be duplicated across codegen units, so
        // only the TypeId is a stable key.
        self.get().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use decant_testhelpers::test;

    #[test]
    fn equal_for_same_type() {
        assert_eq!(ConstTypeId::of::<u32>(), ConstTypeId::of::<u32>());
        assert_ne!(ConstTypeId::of::<u32>(), ConstTypeId::of::<i32>());
        assert_eq!(ConstTypeId::of::<Vec<u8>>().get(), TypeId::of::<Vec<u8>>());
    }
}
