#![warn(missing_docs)]
//! Derive macro for [decant](https://docs.rs/decant).

mod parse;
mod process_struct;
mod unescape;

/// Derives `decant::Reflect` for a struct with named fields.
///
/// A field may carry a `#[json = "..."]` annotation:
///
/// ```ignore
/// #[derive(decant::Reflect)]
/// struct Order {
///     #[json = "order-id"]
///     id: u64,
///     #[json = "-"]
///     cached_total: f64,
///     #[json = ",string"]
///     quantity: u32,
/// }
/// ```
///
/// Generic structs, tuple structs and enums are rejected.
#[proc_macro_derive(Reflect, attributes(json))]
pub fn reflect_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    expand(input.into()).into()
}

fn expand(input: proc_macro2::TokenStream) -> proc_macro2::TokenStream {
    match parse::parse_struct(input) {
        Ok(parsed) => process_struct::process_struct(parsed),
        Err(err) => {
            let message = err.message;
            quote::quote_spanned! { err.span => ::core::compile_error!(#message); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn parse_errors_become_compile_errors() {
        let output = expand(quote! {
            struct Bad {
                #[json = 5]
                a: u8,
            }
        })
        .to_string();
        assert!(output.contains("compile_error"), "{output}");
        assert!(output.contains("expected #[json"), "{output}");

        let output = expand(quote! { enum Nope { A } }).to_string();
        assert!(output.contains("compile_error"), "{output}");
        assert!(!output.contains("impl"), "{output}");
    }

    #[test]
    fn valid_input_expands_to_an_impl() {
        let output = expand(quote! {
            struct Point { x: i32 }
        })
        .to_string();
        assert!(output.contains("Reflect for Point"), "{output}");
        assert!(!output.contains("compile_error"), "{output}");
    }
}
