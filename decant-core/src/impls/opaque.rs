//! Types that can appear in reflected structs but have no JSON form.

use core::alloc::Layout;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::{ConstTypeId, Def, PtrMut, PtrUninit, Reflect, Shape, ValueVTable};

unsafe fn sender_default_in_place<T>(target: PtrUninit) -> PtrMut {
    let (tx, _rx) = channel::<T>();
    unsafe { target.put(tx) }
}

unsafe fn receiver_default_in_place<T>(target: PtrUninit) -> PtrMut {
    let (_tx, rx) = channel::<T>();
    unsafe { target.put(rx) }
}

unsafe impl<T: Reflect> Reflect for Sender<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "Sender",
            type_params: &const { [T::SHAPE] },
            def: Def::Opaque,
            vtable: ValueVTable::new::<Self>(sender_default_in_place::<T>),
        }
    };
}

unsafe impl<T: Reflect> Reflect for Receiver<T> {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "Receiver",
            type_params: &const { [T::SHAPE] },
            def: Def::Opaque,
            vtable: ValueVTable::new::<Self>(receiver_default_in_place::<T>),
        }
    };
}

fn noop() {}

unsafe fn fn_default_in_place(target: PtrUninit) -> PtrMut {
    unsafe { target.put(noop as fn()) }
}

unsafe impl Reflect for fn() {
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "fn()",
            type_params: &[],
            def: Def::Opaque,
            vtable: ValueVTable::new::<Self>(fn_default_in_place),
        }
    };
}
