//! Turns a [`Shape`] into a tree of [`Decoder`]s.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use decant_core::{
    ConstTypeId, Def, FieldTag, MapDef, PointerKind, ScalarType, Shape, StructDef,
};

use crate::decoder::*;
use crate::error::{Breadcrumb, CompileError, CompileErrorKind};
use crate::registry::{Overrides, Registry};

/// Builds the decoder for `root`, which must be the shape of a raw pointer
/// (`*mut T`): decoding writes through that pointer.
///
/// Type and field registrations and extensions in `registry` are applied as
/// they stand when this is called.
pub fn compile(root: &'static Shape, registry: &Registry) -> Result<DecoderRef, CompileError> {
    let overrides = registry.snapshot();
    let decoder = Compiler::new(&overrides).root(root)?;
    debug!(shape = %root, "compiled decoder");
    Ok(decoder)
}

type RecursionSlot = Arc<OnceLock<std::sync::Weak<dyn Decoder>>>;

struct Compiler<'o> {
    overrides: &'o Overrides,
    /// Structs whose decoder is being built further up the stack.
    in_progress: HashMap<ConstTypeId, RecursionSlot>,
}

impl<'o> Compiler<'o> {
    fn new(overrides: &'o Overrides) -> Self {
        Compiler {
            overrides,
            in_progress: HashMap::new(),
        }
    }

    fn root(&mut self, shape: &'static Shape) -> Result<DecoderRef, CompileError> {
        match shape.def {
            Def::Pointer(pd) if pd.kind == PointerKind::Raw => self
                .shape(pd.pointee)
                .map_err(|err| err.within(Breadcrumb::Ptr)),
            _ => Err(CompileError::new(CompileErrorKind::InvalidTarget { shape })),
        }
    }

    fn shape(&mut self, shape: &'static Shape) -> Result<DecoderRef, CompileError> {
        if let Def::DynamicValue = shape.def {
            return Ok(Arc::new(AnyDecoder));
        }
        if let Some(func) = self.overrides.type_decoder(shape) {
            trace!(shape = %shape, "using registered type decoder");
            return Ok(Arc::new(FuncDecoder { func: func.clone() }));
        }

        let unsupported = || CompileError::new(CompileErrorKind::UnsupportedType { shape });
        match shape.def {
            Def::Scalar(ty) => Ok(scalar(ty)),
            Def::Option(od) => {
                let inner = self
                    .shape(od.t)
                    .map_err(|err| err.within(Breadcrumb::Optional))?;
                Ok(Arc::new(OptionalDecoder {
                    vtable: od.vtable,
                    inner,
                }))
            }
            Def::Pointer(pd) => match pd.kind {
                PointerKind::Box => {
                    let inner = self
                        .shape(pd.pointee)
                        .map_err(|err| err.within(Breadcrumb::Box))?;
                    Ok(Arc::new(BoxDecoder {
                        vtable: pd.vtable,
                        inner,
                    }))
                }
                PointerKind::Raw => Err(unsupported()),
            },
            Def::List(ld) => {
                let elem = self
                    .shape(ld.t)
                    .map_err(|err| err.within(Breadcrumb::Slice))?;
                Ok(Arc::new(SequenceDecoder {
                    vtable: ld.vtable,
                    elem,
                }))
            }
            Def::Map(md) => self.map(shape, md),
            Def::Struct(sd) => self.struct_(shape, sd),
            _ => Err(unsupported()),
        }
    }

    fn map(&mut self, shape: &'static Shape, md: MapDef) -> Result<DecoderRef, CompileError> {
        if !md.k.is_type::<String>() {
            return Err(CompileError::new(CompileErrorKind::UnsupportedKeyType {
                map: shape,
                key: md.k,
            }));
        }
        let value = self
            .shape(md.v)
            .map_err(|err| err.within(Breadcrumb::Map))?;
        Ok(Arc::new(MapDecoder {
            vtable: md.vtable,
            value_shape: md.v,
            value,
        }))
    }

    fn struct_(&mut self, shape: &'static Shape, sd: StructDef) -> Result<DecoderRef, CompileError> {
        if let Some(slot) = self.in_progress.get(&shape.id) {
            trace!(shape = %shape, "recursive struct");
            return Ok(Arc::new(RecursiveDecoder {
                target: slot.clone(),
            }));
        }

        let slot = RecursionSlot::default();
        self.in_progress.insert(shape.id, slot.clone());
        let built = self.fields(shape, sd);
        self.in_progress.remove(&shape.id);

        let decoder: DecoderRef = Arc::new(built?);
        // unused when the struct never refers to itself
        let _ = slot.set(Arc::downgrade(&decoder));
        Ok(decoder)
    }

    fn fields(&mut self, shape: &'static Shape, sd: StructDef) -> Result<StructDecoder, CompileError> {
        let mut decoder = StructDecoder::new(shape.type_identifier);
        for field in sd.fields {
            let tag = FieldTag::of(field);
            if tag.skip {
                trace!(shape = %shape, field = field.name, "field skipped by annotation");
                continue;
            }

            let mut names = vec![tag.key_or(field.name).to_owned()];
            let mut extension_decoder = None;
            if let Some(over) = self.overrides.extension_override(shape, field) {
                if !over.names.is_empty() {
                    names = over.names;
                }
                extension_decoder = over.decoder;
            }

            let field_shape = field.shape();
            let registered = self.overrides.field_decoder(shape, field.name).cloned();
            let mut inner: DecoderRef = match registered.or(extension_decoder) {
                Some(func) => Arc::new(FuncDecoder { func }),
                None => self
                    .shape(field_shape)
                    .map_err(|err| err.within(Breadcrumb::Field(field.name)))?,
            };
            if tag.string && quotable(field_shape) {
                inner = Arc::new(StringCoercedDecoder { inner });
            }

            decoder.add_field(
                &names,
                FieldDecoder {
                    name: field.name,
                    offset: field.offset,
                    decoder: inner,
                },
            );
        }
        trace!(shape = %shape, fields = decoder.field_count(), "struct compiled");
        Ok(decoder)
    }
}

fn scalar(ty: ScalarType) -> DecoderRef {
    match ty {
        ScalarType::Bool => Arc::new(BoolDecoder),
        ScalarType::String => Arc::new(StringDecoder),
        ScalarType::I8 => Arc::new(IntDecoder::<i8>::new()),
        ScalarType::I16 => Arc::new(IntDecoder::<i16>::new()),
        ScalarType::I32 => Arc::new(IntDecoder::<i32>::new()),
        ScalarType::I64 => Arc::new(IntDecoder::<i64>::new()),
        ScalarType::ISize => Arc::new(IntDecoder::<isize>::new()),
        ScalarType::U8 => Arc::new(IntDecoder::<u8>::new()),
        ScalarType::U16 => Arc::new(IntDecoder::<u16>::new()),
        ScalarType::U32 => Arc::new(IntDecoder::<u32>::new()),
        ScalarType::U64 => Arc::new(IntDecoder::<u64>::new()),
        ScalarType::USize => Arc::new(IntDecoder::<usize>::new()),
        ScalarType::F32 => Arc::new(FloatDecoder::<f32>::new()),
        ScalarType::F64 => Arc::new(FloatDecoder::<f64>::new()),
    }
}

/// Scalars that may arrive wrapped in a string (`,string`). The option is
/// ignored on anything else.
fn quotable(shape: &Shape) -> bool {
    match shape.def {
        Def::Scalar(ty) => ty.is_numeric() || ty == ScalarType::Bool,
        _ => false,
    }
}
