use core::alloc::Layout;

use crate::{ConstTypeId, Def, OptionDef, OptionVTable, PtrMut, Reflect, Shape, ValueVTable};

unsafe fn option_set_none<T>(option: PtrMut) {
    unsafe { option.replace::<Option<T>>(None) };
}

unsafe fn option_get_or_insert_zero<T: Reflect>(option: PtrMut) -> PtrMut {
    let option = unsafe { option.as_mut::<Option<T>>() };
    PtrMut::from_mut(option.get_or_insert_with(T::zero))
}

unsafe impl<T: Reflect> Reflect for Option<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "Option",
            type_params: &const { [T::SHAPE] },
            def: Def::Option(OptionDef {
                vtable: &const {
                    OptionVTable {
                        set_none: option_set_none::<T>,
                        get_or_insert_zero: option_get_or_insert_zero::<T>,
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
    fn get_or_insert_keeps_existing_value() {
        let Def::Option(od) = <Option<Box<u32>> as Reflect>::SHAPE.def else {
            panic!("expected an option def");
        };

        let mut value: Option<Box<u32>> = Some(Box::new(5));
        let before: *const u32 = &**value.as_ref().unwrap();
        let ptr = PtrMut::from_mut(&mut value);
        unsafe {
            let inner = (od.vtable.get_or_insert_zero)(ptr);
            let boxed = inner.as_mut::<Box<u32>>();
            assert_eq!(**boxed, 5);
            assert_eq!(&**boxed as *const u32, before);
            (od.vtable.set_none)(ptr);
        }
        assert!(value.is_none());
    }

    #[test]
    fn display_includes_parameter() {
        assert_eq!(
            <Option<String> as Reflect>::SHAPE.to_string(),
            "Option<String>"
        );
    }
}
