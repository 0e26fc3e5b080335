use crate::{PtrMut, Shape};

/// The semantic definition of a shape: is it a scalar, a list, a struct?
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Def {
    /// Leaf value decoded straight from a JSON token.
    ///
    /// e.g. `u32`, `String`, `bool`
    Scalar(ScalarType),

    /// Nullable wrapper
    ///
    /// e.g. `Option<T>`
    Option(OptionDef),

    /// Pointer to a single value
    ///
    /// e.g. `*mut T`, `Box<T>`
    Pointer(PointerDef),

    /// Ordered list of homogenous values, variable size
    ///
    /// e.g. `Vec<T>`
    List(ListDef),

    /// Map from keys to homogenous values
    ///
    /// e.g. `HashMap<String, T>`, `BTreeMap<String, T>`
    Map(MapDef),

    /// Struct with named fields at fixed offsets
    Struct(StructDef),

    /// Self-describing value that can hold any JSON document
    DynamicValue,

    /// Reflected, but nothing can be decoded into it
    ///
    /// e.g. channels, function pointers
    Opaque,
}

/// Scalar kinds with a dedicated decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `String`
    String,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    ISize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    USize,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl ScalarType {
    /// Returns true for the numeric scalar types.
    pub const fn is_numeric(self) -> bool {
        !matches!(self, ScalarType::Bool | ScalarType::String)
    }
}

//////////////////////////////////////////////////////////////////////////////
// Option
//////////////////////////////////////////////////////////////////////////////

/// Describes an `Option<T>`: a vtable to query and alter its state, and the
/// shape of `T`.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// vtable for interacting with the option
    pub vtable: &'static OptionVTable,
    /// shape of the inner type of the option
    pub t: &'static Shape,
}

/// Set an option to `None`, dropping any previous value
///
/// # Safety
///
/// `option` must point to an initialized option of the correct type.
pub type OptionSetNoneFn = unsafe fn(option: PtrMut);

/// Return a pointer to the contained value, first storing the zero value of
/// the inner type if the option is `None`. An existing value is kept in place.
///
/// # Safety
///
/// `option` must point to an initialized option of the correct type.
pub type OptionGetOrInsertZeroFn = unsafe fn(option: PtrMut) -> PtrMut;

/// Virtual table for `Option<T>`
#[derive(Clone, Copy, Debug)]
pub struct OptionVTable {
    /// cf. [`OptionSetNoneFn`]
    pub set_none: OptionSetNoneFn,
    /// cf. [`OptionGetOrInsertZeroFn`]
    pub get_or_insert_zero: OptionGetOrInsertZeroFn,
}

//////////////////////////////////////////////////////////////////////////////
// Pointer
//////////////////////////////////////////////////////////////////////////////

/// Which kind of pointer a [`PointerDef`] describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    /// `*mut T`: addresses a value owned elsewhere
    Raw,
    /// `Box<T>`: owns its pointee
    Box,
}

/// Describes a pointer to a single value.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// vtable for interacting with the pointer
    pub vtable: &'static PointerVTable,
    /// shape of the pointee
    pub pointee: &'static Shape,
    /// raw or owning
    pub kind: PointerKind,
}

/// Follow the pointer, returning `None` if it is null
///
/// # Safety
///
/// `pointer` must point to an initialized pointer of the correct type.
pub type PointerDerefMutFn = unsafe fn(pointer: PtrMut) -> Option<PtrMut>;

/// Virtual table for pointers
#[derive(Clone, Copy, Debug)]
pub struct PointerVTable {
    /// cf. [`PointerDerefMutFn`]
    pub deref_mut: PointerDerefMutFn,
}

//////////////////////////////////////////////////////////////////////////////
// List
//////////////////////////////////////////////////////////////////////////////

/// Describes a growable list: a vtable and the shape of its elements.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// vtable for interacting with the list
    pub vtable: &'static ListVTable,
    /// shape of the items in the list
    pub t: &'static Shape,
}

/// Remove every element, keeping the allocation
///
/// # Safety
///
/// `list` must point to an initialized list of the correct type.
pub type ListClearFn = unsafe fn(list: PtrMut);

/// Append the zero value of the element type and return a pointer to it.
/// The pointer is invalidated by the next push.
///
/// # Safety
///
/// `list` must point to an initialized list of the correct type.
pub type ListPushZeroFn = unsafe fn(list: PtrMut) -> PtrMut;

/// Virtual table for lists
#[derive(Clone, Copy, Debug)]
pub struct ListVTable {
    /// cf. [`ListClearFn`]
    pub clear: ListClearFn,
    /// cf. [`ListPushZeroFn`]
    pub push_zero: ListPushZeroFn,
}

//////////////////////////////////////////////////////////////////////////////
// Map
//////////////////////////////////////////////////////////////////////////////

/// Describes a map: a vtable and the shapes of its keys and values.
#[derive(Clone, Copy, Debug)]
pub struct MapDef {
    /// vtable for interacting with the map
    pub vtable: &'static MapVTable,
    /// shape of the keys
    pub k: &'static Shape,
    /// shape of the values
    pub v: &'static Shape,
}

/// Insert a key/value pair, replacing any previous value for the key.
///
/// # Safety
///
/// `map` must point to an initialized map of the correct type. `key` and
/// `value` are moved out of (with [`core::ptr::read`]): the caller must
/// release their memory afterwards without dropping them.
pub type MapInsertFn = unsafe fn(map: PtrMut, key: PtrMut, value: PtrMut);

/// Virtual table for maps
#[derive(Clone, Copy, Debug)]
pub struct MapVTable {
    /// cf. [`MapInsertFn`]
    pub insert: MapInsertFn,
}

//////////////////////////////////////////////////////////////////////////////
// Struct
//////////////////////////////////////////////////////////////////////////////

/// Describes a struct with named fields.
#[derive(Clone, Copy, Debug)]
pub struct StructDef {
    /// all fields, in declaration order
    pub fields: &'static [Field],
}

/// A single field of a struct.
#[derive(Clone, Copy)]
pub struct Field {
    /// declared name of the field
    pub name: &'static str,

    /// shape of the field's type
    ///
    /// A function rather than a reference so a struct can contain itself
    /// behind a `Box` or a `Vec`.
    pub shape: fn() -> &'static Shape,

    /// offset of the field in the struct, in bytes
    pub offset: usize,

    /// raw `#[json = "..."]` annotation, cf. [`crate::FieldTag`]
    pub tag: Option<&'static str>,
}

impl Field {
    /// Shape of the field's type.
    #[inline]
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }
}

impl core::fmt::Debug for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("offset", &self.offset)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}
