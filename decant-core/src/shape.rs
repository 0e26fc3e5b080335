use core::alloc::Layout;
use core::fmt;

use crate::{ConstTypeId, Def, PointerKind, PtrMut, PtrUninit};

/// Schema for reflection of a type: its identity, memory layout and what it
/// is made of.
///
/// Shapes double as the type descriptor the decoder cache and registry key
/// on: two shapes are equal exactly when they describe the same Rust type.
#[derive(Clone, Copy)]
pub struct Shape {
    /// Unique type identifier, provided by the compiler.
    pub id: ConstTypeId,

    /// Size and alignment of the type.
    pub layout: Layout,

    /// Bare name of the type, without generic parameters, e.g. `Vec`.
    pub type_identifier: &'static str,

    /// Generic parameters, rendered after the identifier when the shape is
    /// displayed.
    pub type_params: &'static [&'static Shape],

    /// What the type is made of.
    pub def: Def,

    /// Functions every reflected type provides.
    pub vtable: ValueVTable,
}

impl Shape {
    /// Returns true if this shape describes `T`.
    #[inline]
    pub fn is_type<T: 'static>(&self) -> bool {
        self.id == ConstTypeId::of::<T>()
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

impl core::hash::Hash for Shape {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Def::Pointer(pd) = self.def
            && pd.kind == PointerKind::Raw
        {
            return write!(f, "*mut {}", pd.pointee);
        }
        f.write_str(self.type_identifier)?;
        if let Some((first, rest)) = self.type_params.split_first() {
            write!(f, "<{first}")?;
            for param in rest {
                write!(f, ", {param}")?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shape")
            .field("type", &format_args!("{self}"))
            .field("size", &self.layout.size())
            .field("align", &self.layout.align())
            .finish_non_exhaustive()
    }
}

/// Writes the zero value of a type into uninitialized memory.
///
/// # Safety
///
/// `target` must be valid for writes of the type and suitably aligned.
pub type DefaultInPlaceFn = unsafe fn(target: PtrUninit) -> PtrMut;

/// Drops a value in place, leaving the memory uninitialized.
///
/// # Safety
///
/// `value` must point at an initialized value of the type.
pub type DropInPlaceFn = unsafe fn(value: PtrMut) -> PtrUninit;

/// Functions every reflected type provides.
#[derive(Clone, Copy, Debug)]
pub struct ValueVTable {
    /// cf. [`DefaultInPlaceFn`]
    pub default_in_place: DefaultInPlaceFn,
    /// cf. [`DropInPlaceFn`]
    pub drop_in_place: DropInPlaceFn,
}

impl ValueVTable {
    /// Builds a vtable for `T` with the given zero-value constructor.
    pub const fn new<T>(default_in_place: DefaultInPlaceFn) -> Self {
        Self {
            default_in_place,
            drop_in_place: drop_in_place_erased::<T>,
        }
    }

    /// Builds a vtable for `T` whose zero value is `T::default()`.
    pub const fn with_default<T: Default>() -> Self {
        Self::new::<T>(default_in_place_erased::<T>)
    }
}

unsafe fn default_in_place_erased<T: Default>(target: PtrUninit) -> PtrMut {
    unsafe { target.put(T::default()) }
}

unsafe fn drop_in_place_erased<T>(value: PtrMut) -> PtrUninit {
    unsafe { core::ptr::drop_in_place(value.as_mut_byte_ptr() as *mut T) };
    value.as_uninit()
}
