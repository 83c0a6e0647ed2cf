//! Procedural macros for the fruits backend
//!
//! This crate binds annotated entity structs to both the database and the
//! GraphQL schema, so a single struct is the source of truth for:
//!
//! - `#[derive(GraphQLEntity)]` - table metadata, column definitions, row
//!   decoding, `*WhereInput` / `*OrderByInput` inputs and repository entry points
//! - `#[derive(GraphQLRelations)]` - the `ComplexObject` half of the GraphQL
//!   type: the primary key as `ID` and batched relation resolvers
//! - `mutation_result!` - GraphQL mutation result types
//!
//! Generated code refers to `crate::graphql::{orm, filters, loaders}` and
//! `crate::db::Database`, so these derives are only usable inside the backend
//! crate.
//!
//! # Entity attributes
//!
//! ```ignore
//! #[derive(GraphQLEntity, GraphQLRelations, SimpleObject, Clone, Debug)]
//! #[graphql(name = "Fruit", complex)]
//! #[graphql_entity(table = "fruits", plural = "Fruits", default_sort = "id")]
//! pub struct Fruit {
//!     #[graphql(skip)]          // exposed as `ID` by GraphQLRelations
//!     #[primary_key]
//!     #[filterable(type = "number")]
//!     #[sortable]
//!     pub id: i64,
//!
//!     #[filterable(type = "string")]
//!     #[sortable]
//!     pub name: String,
//!
//!     #[graphql(skip)]
//!     #[column(references = "colors(id)", on_delete = "CASCADE")]
//!     #[filterable(type = "number")]
//!     pub color_id: Option<i64>,
//!
//!     #[graphql(skip)]
//!     #[relation(target = "Color", from = "color_id")]
//!     pub color: Option<Color>,
//! }
//! ```

mod attrs;
mod entity;
mod relations;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse::Parse, parse::ParseStream, parse_macro_input, DeriveInput, Ident, Token};

/// Derive table metadata, row decoding and GraphQL filter/sort inputs.
///
/// The primary key must be an `i64`. Column SQL types are inferred from the
/// Rust type (`Option<T>` makes the column nullable); other types need
/// `#[column(sql_type = "...")]`. Fields marked `#[relation]` or `#[skip_db]`
/// are not stored and decode as `Default::default()`.
#[proc_macro_derive(
    GraphQLEntity,
    attributes(graphql_entity, primary_key, filterable, sortable, skip_db, relation, column)
)]
pub fn derive_graphql_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive the `ComplexObject` impl for an entity.
///
/// Requires `#[graphql(complex)]` on the `SimpleObject` and `#[graphql(skip)]`
/// on the primary key field, which is re-exposed as `ID`.
///
/// - `#[relation(target = "T", from = "fk")]` on an `Option<T>` field loads
///   the row whose primary key equals `self.fk` through
///   `DataLoader<EntityLoader<T>>`.
/// - `#[relation(target = "T", to = "fk", multiple)]` on a `Vec<T>` field
///   loads every `T` whose `fk` equals this row's primary key (or `from`)
///   through `DataLoader<RelationLoader<T>>`. The field takes optional
///   `where` / `orderBy` arguments; when either is given the rows are fetched
///   with a direct query instead.
#[proc_macro_derive(GraphQLRelations, attributes(relation, primary_key))]
pub fn derive_graphql_relations(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    relations::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Generate a GraphQL mutation result type with success, error, and optional entity field.
///
/// # Usage
///
/// ```ignore
/// // Simple result (success + error only)
/// mutation_result!(MutationResult);
///
/// // With entity field
/// mutation_result!(FruitResult, fruit: Fruit);
/// ```
///
/// # Generated Code
///
/// For `mutation_result!(FruitResult, fruit: Fruit)`:
///
/// ```ignore
/// #[derive(Debug, Clone, async_graphql::SimpleObject)]
/// pub struct FruitResult {
///     pub success: bool,
///     pub error: Option<String>,
///     pub fruit: Option<Fruit>,
/// }
///
/// impl FruitResult {
///     pub fn ok(fruit: Fruit) -> Self { ... }
///     pub fn failed(msg: impl Into<String>) -> Self { ... }
/// }
/// ```
///
/// The constructors are not named after the fields, since `SimpleObject`
/// already generates `success` and `error` resolver methods.
#[proc_macro]
pub fn mutation_result(input: TokenStream) -> TokenStream {
    let parsed = parse_macro_input!(input as MutationResultInput);

    let struct_name = &parsed.name;

    if let Some((field_name, field_type)) = parsed.field {
        let output = quote! {
            #[derive(Debug, Clone, async_graphql::SimpleObject)]
            pub struct #struct_name {
                pub success: bool,
                pub error: Option<String>,
                pub #field_name: Option<#field_type>,
            }

            impl #struct_name {
                pub fn ok(#field_name: #field_type) -> Self {
                    Self {
                        success: true,
                        error: None,
                        #field_name: Some(#field_name),
                    }
                }

                pub fn failed(msg: impl Into<String>) -> Self {
                    Self {
                        success: false,
                        error: Some(msg.into()),
                        #field_name: None,
                    }
                }
            }
        };
        output.into()
    } else {
        let output = quote! {
            #[derive(Debug, Clone, async_graphql::SimpleObject)]
            pub struct #struct_name {
                pub success: bool,
                pub error: Option<String>,
            }

            impl #struct_name {
                pub fn ok() -> Self {
                    Self {
                        success: true,
                        error: None,
                    }
                }

                pub fn failed(msg: impl Into<String>) -> Self {
                    Self {
                        success: false,
                        error: Some(msg.into()),
                    }
                }
            }
        };
        output.into()
    }
}

/// Input for mutation_result! macro
struct MutationResultInput {
    name: Ident,
    field: Option<(Ident, Ident)>,
}

impl Parse for MutationResultInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let name: Ident = input.parse()?;

        let field = if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
            let field_name: Ident = input.parse()?;
            input.parse::<Token![:]>()?;
            let field_type: Ident = input.parse()?;
            Some((field_name, field_type))
        } else {
            None
        };

        Ok(MutationResultInput { name, field })
    }
}
