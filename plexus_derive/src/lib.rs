//! # plexus_derive: fieldwise `Merge` for product types
//!
//! A struct whose fields are all mergeable merges as the product of its
//! parts, and a product of commutative combines stays commutative. The
//! **`#[derive(Merge)]`** macro generates exactly that implementation,
//! for named structs and for tuple structs (mergeable newtypes are
//! common enough to deserve support):
//!
//! ```ignore
//! use plexus::{Counter, Merge};
//!
//! #[derive(Clone, Merge)]
//! struct Stats {
//!     requests: Counter,
//!     errors: Counter,
//! }
//!
//! #[derive(Clone, Merge)]
//! struct Wrapped(Counter);
//! ```
//!
//! Enums and unit structs are rejected: neither has a canonical
//! componentwise merge. Do not depend on this crate directly; `plexus`
//! re-exports the macro next to the trait when its `derive` feature is
//! enabled:
//!
//! ```toml
//! plexus = { version = "...", features = ["derive"] }
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;
use syn::parse_quote;
use syn::Data;
use syn::DeriveInput;
use syn::Error;
use syn::Field;
use syn::Fields;
use syn::Index;
use syn::Member;

/// Derive `plexus::Merge` by merging every field with its counterpart.
#[proc_macro_derive(Merge)]
pub fn derive_merge(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens,
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = mergeable_fields(input)?;

    // Address named and positional fields uniformly through
    // `syn::Member`; `Self { 0: … }` is a valid struct expression for
    // tuple structs.
    let members: Vec<Member> = fields
        .iter()
        .enumerate()
        .map(|(idx, field)| match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(idx)),
        })
        .collect();

    // The derived type is only mergeable when every field is.
    let mut generics = input.generics.clone();
    let predicates = &mut generics.make_where_clause().predicates;
    for field in &fields {
        let ty = &field.ty;
        predicates.push(parse_quote!(#ty: ::plexus::Merge));
    }

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let tokens = quote! {
        impl #impl_generics ::plexus::Merge for #name #ty_generics #where_clause {
            fn merge(&self, other: &Self) -> Self {
                Self {
                    #( #members: ::plexus::Merge::merge(&self.#members, &other.#members), )*
                }
            }
        }
    };
    Ok(tokens.into())
}

fn mergeable_fields(input: &DeriveInput) -> syn::Result<Vec<&Field>> {
    let Data::Struct(data) = &input.data else {
        return Err(Error::new_spanned(
            &input.ident,
            "#[derive(Merge)] is defined for structs only",
        ));
    };
    match &data.fields {
        Fields::Named(fields) => Ok(fields.named.iter().collect()),
        Fields::Unnamed(fields) => Ok(fields.unnamed.iter().collect()),
        Fields::Unit => Err(Error::new_spanned(
            &input.ident,
            "a unit struct has no fields to merge; implement Merge by hand",
        )),
    }
}
