use proc_macro2::TokenStream as TokenStream2;
use quote::quote;

use crate::parse::PStruct;

/// Emits `unsafe impl Reflect` for a parsed struct.
///
/// Field offsets come from `offset_of!`, expanded in the struct's own module,
/// so private fields are reachable like public ones.
pub(crate) fn process_struct(parsed: PStruct) -> TokenStream2 {
    let PStruct { name, fields } = parsed;
    let name_str = name.to_string();

    let field_defaults = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            (<#ty as ::decant::Reflect>::SHAPE.vtable.default_in_place)(
                target.field_uninit(::core::mem::offset_of!(#name, #ident)),
            );
        }
    });

    let field_defs: Vec<TokenStream2> = fields
        .iter()
        .map(|field| {
            let ident = &field.ident;
            let ty = &field.ty;
            let field_name = &field.name;
            let tag = match &field.tag {
                Some(tag) => quote! { ::core::option::Option::Some(#tag) },
                None => quote! { ::core::option::Option::None },
            };
            quote! {
                ::decant::Field {
                    name: #field_name,
                    shape: || <#ty as ::decant::Reflect>::SHAPE,
                    offset: ::core::mem::offset_of!(#name, #ident),
                    tag: #tag,
                }
            }
        })
        .collect();
    let fields_expr = if field_defs.is_empty() {
        quote! { &[] }
    } else {
        quote! { &const { [#(#field_defs),*] } }
    };

    quote! {
        #[automatically_derived]
        unsafe impl ::decant::Reflect for #name {
            const SHAPE: &'static ::decant::Shape = &const {
                unsafe fn default_in_place(target: ::decant::PtrUninit) -> ::decant::PtrMut {
                    unsafe {
                        #(#field_defaults)*
                        target.assume_init()
                    }
                }

                ::decant::Shape {
                    id: ::decant::ConstTypeId::of::<#name>(),
                    layout: ::core::alloc::Layout::new::<#name>(),
                    type_identifier: #name_str,
                    type_params: &[],
                    def: ::decant::Def::Struct(::decant::StructDef {
                        fields: #fields_expr,
                    }),
                    vtable: ::decant::ValueVTable::new::<#name>(default_in_place),
                }
            };
        }
    }
}
