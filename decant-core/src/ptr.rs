//! Opaque pointers
//!
//! Type-erased pointer helpers for writing reflected values.
//!
//! # Pointer Types
//!
//! - `PtrMut` - points at an initialized value, can read and write it
//! - `PtrUninit` - points at memory that does not hold a value yet
//!
//! None of these types have lifetime parameters: safety is the caller's
//! responsibility. Only thin pointers to sized values are supported.

use core::alloc::Layout;
use core::fmt;
use core::ptr::NonNull;

/// A type-erased mutable pointer to an initialized value.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrMut(NonNull<u8>);

impl fmt::Debug for PtrMut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl PtrMut {
    /// Creates a pointer from a typed non-null pointer.
    #[inline]
    pub const fn new<T>(ptr: NonNull<T>) -> Self {
        Self(ptr.cast())
    }

    /// Creates a pointer from an exclusive reference.
    #[inline]
    pub fn from_mut<T>(value: &mut T) -> Self {
        Self(NonNull::from(value).cast())
    }

    /// Returns the address as a mutable byte pointer.
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Returns a pointer `offset` bytes past this one.
    ///
    /// This is how struct fields are reached: the base address of the struct
    /// plus the field offset recorded in its shape.
    ///
    /// # Safety
    ///
    /// The resulting address must stay inside the same allocation and point
    /// at an initialized value.
    #[inline]
    pub unsafe fn field(self, offset: usize) -> PtrMut {
        unsafe { PtrMut(self.0.add(offset)) }
    }

    /// Borrows the pointee mutably as `T`.
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointee, the memory must be
    /// initialized, and no other reference to it may be live.
    #[inline]
    pub unsafe fn as_mut<'a, T>(self) -> &'a mut T {
        unsafe { self.0.cast::<T>().as_mut() }
    }

    /// Moves the pointee out, leaving the memory logically uninitialized.
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointee, and the memory must not be
    /// dropped again afterwards.
    #[inline]
    pub unsafe fn read<T>(self) -> T {
        unsafe { self.0.cast::<T>().read() }
    }

    /// Overwrites the pointee, dropping the previous value.
    ///
    /// # Safety
    ///
    /// `T` must be the actual type of the pointee and the memory initialized.
    #[inline]
    pub unsafe fn replace<T>(self, value: T) {
        unsafe { *self.0.cast::<T>().as_mut() = value };
    }

    /// Treats the address as uninitialized, e.g. after moving the value out.
    #[inline]
    pub const fn as_uninit(self) -> PtrUninit {
        PtrUninit(self.0)
    }
}

/// A type-erased pointer to memory that does not hold a value yet.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct PtrUninit(NonNull<u8>);

impl fmt::Debug for PtrUninit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.0, f)
    }
}

impl PtrUninit {
    /// Creates a pointer from a raw pointer to (possibly uninitialized) `T`.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` is null.
    #[inline]
    pub fn new<T>(ptr: *mut T) -> Self {
        match NonNull::new(ptr) {
            Some(ptr) => Self(ptr.cast()),
            None => panic!("PtrUninit::new called with a null pointer"),
        }
    }

    /// Returns the address as a mutable byte pointer.
    #[inline]
    pub const fn as_mut_byte_ptr(self) -> *mut u8 {
        self.0.as_ptr()
    }

    /// Returns an uninitialized pointer `offset` bytes past this one.
    ///
    /// # Safety
    ///
    /// The resulting address must stay inside the same allocation.
    #[inline]
    pub unsafe fn field_uninit(self, offset: usize) -> PtrUninit {
        unsafe { PtrUninit(self.0.add(offset)) }
    }

    /// Writes `value` and returns a pointer to the now-initialized memory.
    ///
    /// # Safety
    ///
    /// The memory must be valid for writes of `T` and suitably aligned.
    #[inline]
    pub unsafe fn put<T>(self, value: T) -> PtrMut {
        unsafe { self.0.cast::<T>().write(value) };
        PtrMut(self.0)
    }

    /// Asserts the memory has been initialized.
    ///
    /// # Safety
    ///
    /// Every byte the pointee's type needs must have been written.
    #[inline]
    pub const unsafe fn assume_init(self) -> PtrMut {
        PtrMut(self.0)
    }
}

/// Allocates memory for `layout`, handling zero-sized layouts without
/// touching the allocator.
pub fn alloc_for_layout(layout: Layout) -> PtrUninit {
    if layout.size() == 0 {
        let dangling = core::ptr::without_provenance_mut::<u8>(layout.align());
        return PtrUninit::new(dangling);
    }
    // SAFETY: size is non-zero
    let raw = unsafe { std::alloc::alloc(layout) };
    if raw.is_null() {
        std::alloc::handle_alloc_error(layout);
    }
    PtrUninit::new(raw)
}

/// Releases memory obtained from [`alloc_for_layout`] with the same layout.
///
/// # Safety
///
/// `ptr` must come from `alloc_for_layout(layout)` and not be used afterwards.
pub unsafe fn dealloc_for_layout(ptr: PtrUninit, layout: Layout) {
    if layout.size() == 0 {
        return;
    }
    unsafe { std::alloc::dealloc(ptr.as_mut_byte_ptr(), layout) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use decant_testhelpers::test;

    #[repr(C)]
    struct Pair {
        a: u8,
        b: u32,
    }

    #[test]
    fn field_offsets_reach_fields() {
        let mut pair = Pair { a: 1, b: 2 };
        let base = PtrMut::from_mut(&mut pair);
        unsafe {
            *base.field(core::mem::offset_of!(Pair, b)).as_mut::<u32>() = 42;
            *base.field(core::mem::offset_of!(Pair, a)).as_mut::<u8>() = 7;
        }
        assert_eq!(pair.a, 7);
        assert_eq!(pair.b, 42);
    }

    #[test]
    fn zero_sized_alloc_is_aligned() {
        let layout = Layout::new::<[u64; 0]>();
        let ptr = alloc_for_layout(layout);
        assert_eq!(ptr.as_mut_byte_ptr() as usize % layout.align(), 0);
        unsafe { dealloc_for_layout(ptr, layout) };
    }
}
