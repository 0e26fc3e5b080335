use core::alloc::Layout;
use core::ptr::NonNull;

use crate::{
    ConstTypeId, Def, PointerDef, PointerKind, PointerVTable, PtrMut, PtrUninit, Reflect, Shape,
    ValueVTable,
};

unsafe fn raw_deref_mut<T>(pointer: PtrMut) -> Option<PtrMut> {
    let raw = unsafe { pointer.read::<*mut T>() };
    NonNull::new(raw).map(PtrMut::new)
}

unsafe fn raw_default_in_place<T>(target: PtrUninit) -> PtrMut {
    unsafe { target.put(core::ptr::null_mut::<T>()) }
}

unsafe impl<T: Reflect> Reflect for *mut T {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "*mut",
            type_params: &const { [T::SHAPE] },
            def: Def::Pointer(PointerDef {
                vtable: &const {
                    PointerVTable {
                        deref_mut: raw_deref_mut::<T>,
                    }
                },
                pointee: T::SHAPE,
                kind: PointerKind::Raw,
            }),
            vtable: ValueVTable::new::<Self>(raw_default_in_place::<T>),
        }
    };
}

unsafe fn box_deref_mut<T>(pointer: PtrMut) -> Option<PtrMut> {
    let boxed = unsafe { pointer.as_mut::<Box<T>>() };
    Some(PtrMut::from_mut(&mut **boxed))
}

unsafe fn box_default_in_place<T: Reflect>(target: PtrUninit) -> PtrMut {
    unsafe { target.put(Box::new(T::zero())) }
}

unsafe impl<T: Reflect> Reflect for Box<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "Box",
            type_params: &const { [T::SHAPE] },
            def: Def::Pointer(PointerDef {
                vtable: &const {
                    PointerVTable {
                        deref_mut: box_deref_mut::<T>,
                    }
                },
                pointee: T::SHAPE,
                kind: PointerKind::Box,
            }),
            vtable: ValueVTable::new::<Self>(box_default_in_place::<T>),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use decant_testhelpers::test;

    #[test]
    fn raw_pointer_display_and_zero() {
        let shape = <*mut Vec<u8> as Reflect>::SHAPE;
        assert_eq!(shape.to_string(), "*mut Vec<u8>");
        assert!(<*mut u8 as Reflect>::zero().is_null());
    }

    #[test]
    fn deref_follows_the_pointer() {
        let Def::Pointer(pd) = <*mut u32 as Reflect>::SHAPE.def else {
            panic!("expected a pointer def");
        };
        let mut target = 3u32;
        let mut raw: *mut u32 = &mut target;
        let mut null: *mut u32 = core::ptr::null_mut();
        unsafe {
            let inner = (pd.vtable.deref_mut)(PtrMut::from_mut(&mut raw)).unwrap();
            *inner.as_mut::<u32>() = 9;
            assert!((pd.vtable.deref_mut)(PtrMut::from_mut(&mut null)).is_none());
        }
        assert_eq!(target, 9);
    }

    #[test]
    fn box_zero_allocates() {
        let boxed = <Box<String> as Reflect>::zero();
        assert_eq!(*boxed, "");
        assert_eq!(<Box<String> as Reflect>::SHAPE.to_string(), "Box<String>");
    }
}
