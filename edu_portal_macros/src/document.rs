use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, LitStr};

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match named_fields(&input) {
        Some(fields) => fields,
        None => {
            return syn::Error::new_spanned(name, "Document derive requires a struct with named fields")
                .to_compile_error()
                .into();
        }
    };

    let collection = extract_collection(&input);

    let id_field = match marked_field(&fields, "id").or_else(|| field_named(&fields, "id")) {
        Some(ident) => ident,
        None => {
            return syn::Error::new_spanned(
                name,
                "Document derive: no field marked with #[document(id)] and no field named `id`",
            )
            .to_compile_error()
            .into();
        }
    };

    let created_at = marked_field(&fields, "created_at").map(|field| {
        quote! {
            fn created_at(&self) -> Option<edu_portal::Timestamp> {
                self.#field
            }
        }
    });

    let updated_at = marked_field(&fields, "updated_at").map(|field| {
        quote! {
            fn updated_at(&self) -> Option<edu_portal::Timestamp> {
                self.#field
            }
        }
    });

    let expanded = quote! {
        impl edu_portal::Document for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> &str {
                &self.#id_field
            }

            #created_at
            #updated_at
        }
    };

    TokenStream::from(expanded)
}

fn named_fields(input: &DeriveInput) -> Option<Vec<Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Some(fields.named.iter().cloned().collect()),
            _ => None,
        },
        _ => None,
    }
}

fn extract_collection(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        let mut collection = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
            }
            Ok(())
        });

        if let Some(c) = collection {
            return c;
        }
    }

    format!("{}s", to_snake_case(&input.ident.to_string()))
}

/// Finds the field carrying `#[document(<marker>)]`.
fn marked_field(fields: &[Field], marker: &str) -> Option<syn::Ident> {
    for field in fields {
        for attr in &field.attrs {
            if !attr.path().is_ident("document") {
                continue;
            }
            let mut found = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(marker) {
                    found = true;
                }
                Ok(())
            });
            if found {
                return field.ident.clone();
            }
        }
    }
    None
}

fn field_named(fields: &[Field], name: &str) -> Option<syn::Ident> {
    fields
        .iter()
        .filter_map(|field| field.ident.clone())
        .find(|ident| ident == name)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
