use core::alloc::Layout;

use crate::{ConstTypeId, Def, Reflect, ScalarType, Shape, ValueVTable};

macro_rules! impl_reflect_for_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            unsafe impl Reflect for $ty {
                const SHAPE: &'static Shape = &const {
                    Shape {
                        id: ConstTypeId::of::<$ty>(),
                        layout: Layout::new::<$ty>(),
                        type_identifier: stringify!($ty),
                        type_params: &[],
                        def: Def::Scalar(ScalarType::$kind),
                        vtable: ValueVTable::with_default::<$ty>(),
                    }
                };
            }
        )*
    };
}

impl_reflect_for_scalar! {
    bool => Bool,
    String => String,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => ISize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => USize,
    f32 => F32,
    f64 => F64,
}
