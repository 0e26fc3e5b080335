#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

mod typeid;
pub use typeid::*;

mod ptr;
pub use ptr::*;

mod shape;
pub use shape::*;

mod def;
pub use def::*;

mod tag;
pub use tag::*;

mod heap;
pub use heap::*;

mod impls;

/// Allows querying the [`Shape`] of a type, which in turn lets a decoder
/// write values of that type through type-erased pointers.
///
/// # Safety
///
/// The shape must describe the type exactly: layout, field offsets and every
/// vtable entry are trusted by code that writes raw memory. Implement it with
/// `#[derive(Reflect)]` rather than by hand.
pub unsafe trait Reflect: 'static {
    /// The shape of this type
    const SHAPE: &'static Shape;

    /// Builds the zero value of this type through its shape's vtable.
    fn zero() -> Self
    where
        Self: Sized,
    {
        let mut slot = core::mem::MaybeUninit::<Self>::uninit();
        unsafe {
            (Self::SHAPE.vtable.default_in_place)(PtrUninit::new(slot.as_mut_ptr()));
            slot.assume_init()
        }
    }
}
