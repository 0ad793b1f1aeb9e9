use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Lit, Meta, Type};

/// Derive macro describing the columns of a flat record type.
///
/// For each named field it records:
/// - the wire name (honours `#[serde(rename = "...")]`)
/// - whether the field must be present in the input: a field is optional
///   when it is an `Option<T>` or carries `#[serde(default)]`
/// - the doc comment, used as the column description
///
/// Generates `record_schema() -> &'static [FieldSpec]`; `FieldSpec` must be in
/// scope at the derive site.
#[proc_macro_derive(RecordSchema, attributes(serde))]
pub fn derive_record_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return syn::Error::new_spanned(name, "RecordSchema requires named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(name, "RecordSchema only supports structs")
                .to_compile_error()
                .into()
        }
    };

    let entries = fields.iter().filter_map(|field| {
        let ident = field.ident.as_ref()?;
        let serde = SerdeField::from_attrs(&field.attrs);
        let wire_name = serde.rename.unwrap_or_else(|| ident.to_string());
        let required = !serde.has_default && !is_option_type(&field.ty);
        let description = doc_comment(&field.attrs);

        Some(quote! {
            FieldSpec {
                name: #wire_name,
                required: #required,
                description: #description,
            }
        })
    });

    let expanded = quote! {
        impl #name {
            pub fn record_schema() -> &'static [FieldSpec] {
                static SCHEMA: &[FieldSpec] = &[
                    #(#entries),*
                ];
                SCHEMA
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SerdeField {
    rename: Option<String>,
    has_default: bool,
}

impl SerdeField {
    fn from_attrs(attrs: &[Attribute]) -> Self {
        let mut field = SerdeField::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
            let Meta::List(list) = &attr.meta else {
                continue;
            };
            let tokens = list.tokens.to_string();
            for part in tokens.split(',').map(str::trim) {
                let (key, value) = match part.split_once('=') {
                    Some((k, v)) => (k.trim(), Some(v.trim())),
                    None => (part, None),
                };
                match key {
                    "default" => field.has_default = true,
                    "rename" => {
                        field.rename = value
                            .and_then(|v| v.strip_prefix('"'))
                            .and_then(|v| v.strip_suffix('"'))
                            .map(str::to_string);
                    }
                    _ => {}
                }
            }
        }
        field
    }
}

fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(meta) => match &meta.value {
                syn::Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "Option"),
        _ => false,
    }
}
