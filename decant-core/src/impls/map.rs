use core::alloc::Layout;
use core::hash::Hash;
use std::collections::{BTreeMap, HashMap};

use crate::{ConstTypeId, Def, MapDef, MapVTable, PtrMut, Reflect, Shape, ValueVTable};

unsafe fn hashmap_insert<K: Eq + Hash, V>(map: PtrMut, key: PtrMut, value: PtrMut) {
    unsafe {
        let key = key.read::<K>();
        let value = value.read::<V>();
        map.as_mut::<HashMap<K, V>>().insert(key, value);
    }
}

unsafe impl<K, V> Reflect for HashMap<K, V>
where
    K: Reflect + Eq + Hash,
    V: Reflect,
{
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "HashMap",
            type_params: &const { [K::SHAPE, V::SHAPE] },
            def: Def::Map(MapDef {
                vtable: &const {
                    MapVTable {
                        insert: hashmap_insert::<K, V>,
                    }
                },
                k: K::SHAPE,
                v: V::SHAPE,
            }),
            vtable: ValueVTable::with_default::<Self>(),
        }
    };
}

unsafe fn btreemap_insert<K: Ord, V>(map: PtrMut, key: PtrMut, value: PtrMut) {
    unsafe {
        let key = key.read::<K>();
        let value = value.read::<V>();
        map.as_mut::<BTreeMap<K, V>>().insert(key, value);
    }
}

unsafe impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Ord,
    V: Reflect,
{
    const SHAPE: &'static Shape = &const {
        Shape {
            id: ConstTypeId::of::<Self>(),
            layout: Layout::new::<Self>(),
            type_identifier: "BTreeMap",
            type_params: &const { [K::SHAPE, V::SHAPE] },
            def: Def::Map(MapDef {
                vtable: &const {
                    MapVTable {
                        insert: btreemap_insert::<K, V>,
                    }
                },
                k: K::SHAPE,
                v: V::SHAPE,
            }),
            vtable: ValueVTable::with_default::<Self>(),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::ManuallyDrop;
    use decant_testhelpers::test;

    #[test]
    fn insert_moves_key_and_value() {
        let Def::Map(md) = <HashMap<String, Vec<u8>> as Reflect>::SHAPE.def else {
            panic!("expected a map def");
        };
        let mut map: HashMap<String, Vec<u8>> = HashMap::new();
        let mut key = ManuallyDrop::new(String::from("k"));
        let mut value = ManuallyDrop::new(vec![1u8, 2]);
        unsafe {
            (md.vtable.insert)(
                PtrMut::from_mut(&mut map),
                PtrMut::from_mut(&mut *key),
                PtrMut::from_mut(&mut *value),
            );
        }
        assert_eq!(map["k"], [1, 2]);
    }

    #[test]
    fn display_lists_both_parameters() {
        assert_eq!(
            <BTreeMap<String, Option<i32>> as Reflect>::SHAPE.to_string(),
            "BTreeMap<String, Option<i32>>"
        );
    }
}
