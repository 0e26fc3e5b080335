//! Turns the derive input into a [`PStruct`].

use core::result::Result;

use proc_macro2::{Span, TokenStream as TokenStream2};
use unsynn::*;

use crate::unescape::unescape;

keyword! {
    KStruct = "struct";
    KPub = "pub";
    KJson = "json";
}

/// Tokens up to (not including) a `C` outside any `<...>`.
type VerbatimUntil<C> = Many<Cons<Except<C>, AngleTokenTree>>;

unsynn! {
    /// Visibility: `pub`, `pub(crate)`, ...
    enum Vis {
        PubIn(Cons<KPub, ParenthesisGroup>),
        Pub(KPub),
    }

    /// One token tree, where `<...>` counts as a single tree. `->` is kept
    /// whole so its `>` never closes a bracket.
    enum AngleTokenTree {
        Arrow(RArrow),
        Angle(Cons<Lt, Vec<Cons<Except<Gt>, AngleTokenTree>>, Gt>),
        Tree(TokenTree),
    }

    /// An outer attribute: `#[...]`
    struct Attribute {
        _pound: Pound,
        body: BracketGroupContaining<AttributeInner>,
    }

    enum AttributeInner {
        Json(JsonAttr),
        MalformedJson(Cons<KJson, Vec<TokenTree>>),
        Other(Vec<TokenTree>),
    }

    /// `json = "name,options"`
    struct JsonAttr {
        _kw: KJson,
        _eq: Assign,
        value: LiteralString,
        _end: EndOfStream,
    }

    /// `#[json = "..."] pub name: Type`
    struct StructField {
        attributes: Vec<Attribute>,
        _vis: Option<Vis>,
        name: Ident,
        _colon: Colon,
        typ: VerbatimUntil<Comma>,
    }

    /// `struct Name { ... }`; anything else (generics, tuple structs,
    /// enums) fails to parse.
    struct StructDef {
        _attrs: Vec<Attribute>,
        _vis: Option<Vis>,
        _kw_struct: KStruct,
        name: Ident,
        body: BraceGroupContaining<CommaDelimitedVec<StructField>>,
    }
}

/// A parsed struct.
pub(crate) struct PStruct {
    pub name: proc_macro2::Ident,
    pub fields: Vec<PField>,
}

/// A parsed named field.
pub(crate) struct PField {
    /// The identifier as written, possibly raw (`r#type`).
    pub ident: proc_macro2::Ident,
    /// The identifier without the `r#` prefix.
    pub name: String,
    pub ty: TokenStream2,
    /// Contents of `#[json = "..."]`
    pub tag: Option<String>,
}

/// A parse failure, reported through `compile_error!` at `span`.
pub(crate) struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

const MALFORMED_TAG: &str = r#"expected #[json = "name,options"]"#;

fn span_of(tokens: &impl ToTokens) -> Span {
    tokens
        .to_token_stream()
        .into_iter()
        .next()
        .map_or_else(Span::call_site, |tt| tt.span())
}

pub(crate) fn parse_struct(input: TokenStream2) -> Result<PStruct, ParseError> {
    let mut iter = input.to_token_iter();
    let def = iter.parse::<StructDef>().map_err(|err| {
        ParseError::new(
            "Reflect can only be derived for non-generic structs with named fields",
            err.failed_at().map_or_else(Span::call_site, |tt| tt.span()),
        )
    })?;

    let fields = def
        .body
        .content
        .into_iter()
        .map(|delimited| field_from_grammar(delimited.value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PStruct {
        name: def.name,
        fields,
    })
}

fn field_from_grammar(field: StructField) -> Result<PField, ParseError> {
    let mut tag = None;
    for attr in field.attributes {
        match attr.body.content {
            AttributeInner::Json(json) => {
                let span = span_of(&json.value);
                let value = unescape(json.value.as_str())
                    .map_err(|err| ParseError::new(format!("{MALFORMED_TAG}: {err}"), span))?;
                tag = Some(value);
            }
            AttributeInner::MalformedJson(malformed) => {
                return Err(ParseError::new(MALFORMED_TAG, span_of(&malformed.first)));
            }
            AttributeInner::Other(_) => {}
        }
    }

    let raw = field.name.to_string();
    let name = raw.strip_prefix("r#").unwrap_or(&raw).to_string();
    Ok(PField {
        ident: field.name,
        name,
        ty: field.typ.to_token_stream(),
        tag,
    })
}
