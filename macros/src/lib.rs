use proc_macro::TokenStream;
use quote::quote;
use syn::{Attribute, Data, DeriveInput, Fields, LitStr, Visibility, parse_macro_input};

/// Naming policy applied to every field without an explicit rename
#[derive(Debug, Clone, Copy)]
enum RenameAll {
    Verbatim,
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
}

impl RenameAll {
    fn parse(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "lowercase" => Ok(Self::Lower),
            "UPPERCASE" => Ok(Self::Upper),
            "PascalCase" => Ok(Self::Pascal),
            "camelCase" => Ok(Self::Camel),
            "snake_case" => Ok(Self::Snake),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "kebab-case" => Ok(Self::Kebab),
            other => Err(syn::Error::new_spanned(
                lit,
                format!(
                    "unknown rename_all policy `{}`, expected one of: lowercase, UPPERCASE, \
                     PascalCase, camelCase, snake_case, SCREAMING_SNAKE_CASE, kebab-case",
                    other
                ),
            )),
        }
    }

    fn apply(&self, ident: &str) -> String {
        let words = ident.split('_').filter(|w| !w.is_empty());
        match self {
            Self::Verbatim | Self::Snake => ident.to_string(),
            Self::Lower => ident.to_ascii_lowercase(),
            Self::Upper => ident.to_ascii_uppercase(),
            Self::Pascal => words.map(capitalize).collect(),
            Self::Camel => words
                .enumerate()
                .map(|(i, w)| if i == 0 { w.to_ascii_lowercase() } else { capitalize(w) })
                .collect(),
            Self::ScreamingSnake => ident.to_ascii_uppercase(),
            Self::Kebab => words.collect::<Vec<_>>().join("-"),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
}

/// Derives `fusion_config::Configurable` and `fusion_config::FieldType`
///
/// Only `pub` fields are part of the schema. Field attributes:
/// `#[fusion(rename = "Name")]` and `#[fusion(skip)]`. Struct attribute:
/// `#[fusion(rename_all = "PascalCase")]`.
#[proc_macro_derive(Configurable, attributes(fusion))]
pub fn derive_configurable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_configurable(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_configurable(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let rename_all = parse_struct_attrs(&input.attrs)?;

    // Extract fields from the struct
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Configurable can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Configurable can only be derived for structs",
            ));
        }
    };

    let mut schema_fields = Vec::new();
    let mut set_arms = Vec::new();
    let mut nested_arms = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let attrs = parse_field_attrs(&field.attrs)?;

        // Private fields are not externally settable
        if attrs.skip || !matches!(field.vis, Visibility::Public(_)) {
            continue;
        }

        let field_name = match field.ident.as_ref() {
            Some(ident) => ident,
            None => continue,
        };
        let field_type = &field.ty;
        let ident_str = field_name.to_string();
        let ident_str = ident_str.strip_prefix("r#").unwrap_or(&ident_str).to_string();
        let key_name = attrs
            .rename
            .unwrap_or_else(|| rename_all.apply(&ident_str));

        schema_fields.push(quote! {
            ::fusion_config::FieldSchema::new(
                #index,
                #ident_str,
                #key_name,
                <#field_type as ::fusion_config::FieldType>::kind(),
            )
        });

        set_arms.push(quote! {
            #index => match <#field_type as ::fusion_config::FieldType>::from_value(value) {
                ::std::option::Option::Some(v) => {
                    self.#field_name = v;
                    true
                }
                ::std::option::Option::None => false,
            }
        });

        nested_arms.push(quote! {
            #index => ::fusion_config::FieldType::as_configurable(&mut self.#field_name)
        });
    }

    let type_name = struct_name.to_string();

    Ok(quote! {
        impl #impl_generics ::fusion_config::Configurable
            for #struct_name #ty_generics #where_clause
        {
            fn schema() -> ::fusion_config::Schema {
                ::fusion_config::Schema::new(#type_name, ::std::vec![#(#schema_fields),*])
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, index: usize, value: ::fusion_config::Value) -> bool {
                match index {
                    #(#set_arms,)*
                    _ => false,
                }
            }

            #[allow(unused_variables)]
            fn nested_mut(
                &mut self,
                index: usize,
            ) -> ::std::option::Option<&mut dyn ::fusion_config::Configurable> {
                match index {
                    #(#nested_arms,)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl #impl_generics ::fusion_config::FieldType for #struct_name #ty_generics #where_clause {
            fn kind() -> ::fusion_config::Kind {
                ::fusion_config::Kind::Struct(
                    <Self as ::fusion_config::Configurable>::schema(),
                )
            }

            fn from_value(_value: ::fusion_config::Value) -> ::std::option::Option<Self> {
                ::std::option::Option::None
            }

            fn as_configurable(
                &mut self,
            ) -> ::std::option::Option<&mut dyn ::fusion_config::Configurable> {
                ::std::option::Option::Some(self)
            }
        }
    })
}

/// Parse #[fusion(rename_all = "...")] on the struct
fn parse_struct_attrs(attrs: &[Attribute]) -> syn::Result<RenameAll> {
    let mut rename_all = RenameAll::Verbatim;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("fusion")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename_all") {
                let value: LitStr = meta.value()?.parse()?;
                rename_all = RenameAll::parse(&value)?;
                Ok(())
            } else {
                Err(meta.error("expected `rename_all = \"...\"`"))
            }
        })?;
    }

    Ok(rename_all)
}

/// Parse #[fusion(rename = "...")] and #[fusion(skip)] on a field
fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut parsed = FieldAttrs::default();

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("fusion")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(value, "rename must not be empty"));
                }
                parsed.rename = Some(value.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"` or `skip`"))
            }
        })?;
    }

    Ok(parsed)
}
