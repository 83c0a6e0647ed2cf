//! `#[derive(GraphQLRelations)]`

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::attrs::{option_inner, parse_fields, FieldInfo, RelationAttrs};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = parse_fields(input)?;
    let ident = &input.ident;

    let pk = fields.iter().find(|f| f.primary_key).ok_or_else(|| {
        syn::Error::new_spanned(ident, "exactly one field must be marked #[primary_key]")
    })?;
    let pk_ident = &pk.ident;
    let pk_docs = &pk.docs;

    let resolvers = fields
        .iter()
        .filter_map(|f| f.relation.as_ref().map(|r| (f, r)))
        .map(|(field, relation)| {
            if relation.multiple {
                has_many(&fields, pk, field, relation)
            } else {
                belongs_to(&fields, field, relation)
            }
        })
        .collect::<syn::Result<Vec<_>>>()?;

    Ok(quote! {
        #[async_graphql::ComplexObject]
        impl #ident {
            #(#pk_docs)*
            async fn #pk_ident(&self) -> async_graphql::ID {
                async_graphql::ID::from(self.#pk_ident)
            }

            #(#resolvers)*
        }
    })
}

fn find_field<'a>(fields: &'a [FieldInfo], name: &str, owner: &FieldInfo) -> syn::Result<&'a FieldInfo> {
    fields
        .iter()
        .find(|f| f.ident == name && f.is_column())
        .ok_or_else(|| {
            syn::Error::new_spanned(&owner.ident, format!("relation key `{name}` is not a column"))
        })
}

/// Forward relation resolved through the target's primary key.
fn belongs_to(
    fields: &[FieldInfo],
    field: &FieldInfo,
    relation: &RelationAttrs,
) -> syn::Result<TokenStream> {
    if relation.to.is_some() {
        return Err(syn::Error::new_spanned(
            &field.ident,
            "single relations resolve against the target primary key; drop `to`",
        ));
    }
    let from_name = relation.from.as_deref().ok_or_else(|| {
        syn::Error::new_spanned(&field.ident, "single relations need `from = \"<fk column>\"`")
    })?;
    let from = find_field(fields, from_name, field)?;
    let from_ident = &from.ident;

    let name = &field.ident;
    let docs = &field.docs;
    let target = &relation.target;
    let ty = &field.ty;

    if from.is_optional() && option_inner(ty).is_none() {
        return Err(syn::Error::new_spanned(
            ty,
            "a nullable foreign key needs an `Option<...>` relation field",
        ));
    }

    let key = if from.is_optional() {
        quote! {
            let ::core::option::Option::Some(key) = self.#from_ident else {
                return ::core::result::Result::Ok(::core::default::Default::default());
            };
        }
    } else {
        quote! { let key = self.#from_ident; }
    };

    let load = if option_inner(ty).is_some() {
        quote! { ::core::result::Result::Ok(loaded) }
    } else {
        let missing = format!("{target} {{}} referenced by `{from_name}` does not exist");
        quote! {
            loaded.ok_or_else(|| async_graphql::Error::new(::std::format!(#missing, key)))
        }
    };

    Ok(quote! {
        #(#docs)*
        async fn #name(
            &self,
            ctx: &async_graphql::Context<'_>,
        ) -> async_graphql::Result<#ty> {
            #key
            let loader = ctx.data::<async_graphql::dataloader::DataLoader<
                crate::graphql::loaders::EntityLoader<#target>,
            >>()?;
            let loaded = loader.load_one(key).await.map_err(|e| {
                async_graphql::ErrorExtensions::extend(&crate::error::AppError::from(e))
            })?;
            #load
        }
    })
}

/// Reverse relation: every target row whose `to` column points at this row.
///
/// The target's `*WhereInput` and `*OrderByInput` are named through
/// `crate::graphql::entities`, which re-exports every entity module.
fn has_many(
    fields: &[FieldInfo],
    pk: &FieldInfo,
    field: &FieldInfo,
    relation: &RelationAttrs,
) -> syn::Result<TokenStream> {
    let to = relation.to.as_deref().ok_or_else(|| {
        syn::Error::new_spanned(&field.ident, "multiple relations need `to = \"<fk column>\"`")
    })?;
    let from = match relation.from.as_deref() {
        Some(name) => find_field(fields, name, field)?,
        None => pk,
    };
    let from_ident = &from.ident;

    let name = &field.ident;
    let docs = &field.docs;
    let target = &relation.target;
    let ty = &field.ty;
    let where_ident = format_ident!("{}WhereInput", target);
    let order_ident = format_ident!("{}OrderByInput", target);
    let where_ty = quote! { crate::graphql::entities::#where_ident };
    let order_ty = quote! { crate::graphql::entities::#order_ident };
    let condition = format!("{to} = ?");

    let parent = if from.is_optional() {
        quote! {
            let ::core::option::Option::Some(parent) = self.#from_ident else {
                return ::core::result::Result::Ok(::std::vec::Vec::new());
            };
        }
    } else {
        quote! { let parent = self.#from_ident; }
    };

    Ok(quote! {
        #(#docs)*
        async fn #name(
            &self,
            ctx: &async_graphql::Context<'_>,
            #[graphql(name = "where")] filter: ::core::option::Option<#where_ty>,
            order_by: ::core::option::Option<::std::vec::Vec<#order_ty>>,
        ) -> async_graphql::Result<#ty> {
            use async_graphql::ErrorExtensions as _;

            #parent
            let unfiltered = filter
                .as_ref()
                .map_or(true, crate::graphql::orm::DatabaseFilter::is_empty);
            let order_by = order_by.unwrap_or_default();

            if unfiltered && order_by.is_empty() {
                let loader = ctx.data::<async_graphql::dataloader::DataLoader<
                    crate::graphql::loaders::RelationLoader<#target>,
                >>()?;
                let key = crate::graphql::loaders::ForeignKey::new(#to, parent);
                let loaded = loader
                    .load_one(key)
                    .await
                    .map_err(|e| crate::error::AppError::from(e).extend())?;
                return ::core::result::Result::Ok(loaded.unwrap_or_default());
            }

            let db = ctx.data::<crate::db::Database>()?;
            let mut query = crate::graphql::orm::EntityQuery::<#target>::new()
                .where_clause(#condition, crate::graphql::orm::SqlValue::Int(parent));
            if let ::core::option::Option::Some(filter) = &filter {
                query = query.filter(filter);
            }
            for order in &order_by {
                query = query.order_by(order);
            }
            query
                .default_order()
                .fetch_all(db.pool())
                .await
                .map_err(|e| crate::error::AppError::from(e).extend())
        }
    })
}
