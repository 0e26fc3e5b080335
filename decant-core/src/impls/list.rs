use core::alloc::Layout;

use crate::{ConstTypeId, Def, ListDef, ListVTable, PtrMut, Reflect, Shape, ValueVTable};

unsafe fn vec_clear<T>(list: PtrMut) {
    unsafe { list.as_mut::<Vec<T>>() }.clear();
}

unsafe fn vec_push_zero<T: Reflect>(list: PtrMut) -> PtrMut {
    let vec = unsafe { list.as_mut::<Vec<T>>() };
    vec.push(T::zero());
    let last = vec.len() - 1;
    PtrMut::from_mut(&mut vec[last])
}

unsafe impl<T: Reflect> Reflect for Vec<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "Vec",
            type_params: &const { [T::SHAPE] },
            def: Def::List(ListDef {
                vtable: &const {
                    ListVTable {
                        clear: vec_clear::<T>,
                        push_zero: vec_push_zero::<T>,
                    }
                },
                t: T::SHAPE,
            }),
            vtable: ValueVTable::with_default::<Self>(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use decant_testhelpers::test;

    #[test]
    fn push_zero_then_write() {
        let Def::List(ld) = <Vec<String> as Reflect>::SHAPE.def else {
            panic!("expected a list def");
        };
        let mut list = vec![String::from("old")];
        let ptr = PtrMut::from_mut(&mut list);
        unsafe {
            (ld.vtable.clear)(ptr);
            let slot = (ld.vtable.push_zero)(ptr);
            *slot.as_mut::<String>() = "a".into();
            let slot = (ld.vtable.push_zero)(ptr);
            *slot.as_mut::<String>() = "b".into();
        }
        assert_eq!(list, ["a", "b"]);
    }
}
