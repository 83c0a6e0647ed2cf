//! `#[derive(GraphQLEntity)]`

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::attrs::{infer_sql_type, parse_entity_attrs, parse_fields, FieldInfo, FilterKind};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let entity = parse_entity_attrs(input)?;
    let fields = parse_fields(input)?;

    let ident = &input.ident;
    let vis = &input.vis;
    let table = &entity.table;
    let plural = &entity.plural;
    let default_sort = &entity.default_sort;

    let columns: Vec<&FieldInfo> = fields.iter().filter(|f| f.is_column()).collect();

    let pk = match columns.iter().filter(|f| f.primary_key).collect::<Vec<_>>().as_slice() {
        [pk] => *pk,
        [] => {
            return Err(syn::Error::new_spanned(
                ident,
                "exactly one field must be marked #[primary_key]",
            ));
        }
        [_, extra, ..] => {
            return Err(syn::Error::new_spanned(
                &extra.ident,
                "only one field may be marked #[primary_key]",
            ));
        }
    };
    let pk_ident = &pk.ident;
    let pk_name = pk.column_name();

    if !columns.iter().any(|f| f.column_name() == *default_sort) {
        return Err(syn::Error::new_spanned(
            ident,
            format!("default_sort `{default_sort}` is not a column"),
        ));
    }

    let column_names: Vec<String> = columns.iter().map(|f| f.column_name()).collect();

    // DatabaseSchema
    let column_defs = columns
        .iter()
        .map(|f| column_def(f))
        .collect::<syn::Result<Vec<_>>>()?;

    // FromSqlRow
    let decode_fields = fields.iter().map(|f| {
        let field = &f.ident;
        if f.is_column() {
            let name = f.column_name();
            quote! { #field: row.try_get(#name)? }
        } else {
            quote! { #field: ::core::default::Default::default() }
        }
    });

    // HasForeignKey
    let fk_arms = columns.iter().filter(|f| f.column.references.is_some()).map(|f| {
        let field = &f.ident;
        let name = f.column_name();
        if f.is_optional() {
            quote! { #name => self.#field }
        } else {
            quote! { #name => ::core::option::Option::Some(self.#field) }
        }
    });

    // WhereInput
    let filterable: Vec<&&FieldInfo> = columns.iter().filter(|f| f.filter.is_some()).collect();
    if filterable.is_empty() {
        return Err(syn::Error::new_spanned(
            ident,
            "at least one field must be marked #[filterable]",
        ));
    }
    let where_ident = format_ident!("{}WhereInput", ident);
    let where_name = where_ident.to_string();
    let where_fields = filterable.iter().map(|f| {
        let field = &f.ident;
        let doc = format!("Filter on `{}`", f.column_name());
        let filter_ty = match &f.filter {
            Some(FilterKind::Number) => quote! { crate::graphql::filters::IntFilter },
            Some(FilterKind::Custom(path)) => quote! { #path },
            _ => quote! { crate::graphql::filters::StringFilter },
        };
        quote! {
            #[doc = #doc]
            pub #field: ::core::option::Option<#filter_ty>
        }
    });
    let where_conditions = filterable.iter().map(|f| {
        let field = &f.ident;
        let name = f.column_name();
        quote! {
            if let ::core::option::Option::Some(filter) = &self.#field {
                let (c, v) = filter.to_sql_conditions(#name);
                conditions.extend(c);
                values.extend(v);
            }
        }
    });
    let where_empty = filterable.iter().map(|f| {
        let field = &f.ident;
        quote! { self.#field.as_ref().map_or(true, |filter| filter.is_empty()) }
    });

    // OrderByInput
    let sortable: Vec<&&FieldInfo> = columns.iter().filter(|f| f.sortable).collect();
    if sortable.is_empty() {
        return Err(syn::Error::new_spanned(
            ident,
            "at least one field must be marked #[sortable]",
        ));
    }
    let order_ident = format_ident!("{}OrderByInput", ident);
    let order_name = order_ident.to_string();
    let order_fields = sortable.iter().map(|f| {
        let field = &f.ident;
        let doc = format!("Sort by `{}`", f.column_name());
        quote! {
            #[doc = #doc]
            pub #field: ::core::option::Option<crate::graphql::orm::OrderDirection>
        }
    });
    let order_parts = sortable.iter().map(|f| {
        let field = &f.ident;
        let name = f.column_name();
        quote! {
            if let ::core::option::Option::Some(direction) = self.#field {
                parts.push(::std::format!("{} {}", #name, direction.to_sql()));
            }
        }
    });

    let pk_condition = format!("{pk_name} = ?");
    let where_doc = format!("Filter input for `{ident}` queries.");
    // Input object fields carry no order, so one input sorts in declaration
    // order. Clients pick precedence with a list of single-field inputs.
    let order_doc = format!(
        "Sort input for `{ident}` queries. Fields set together apply in declaration \
         order; pass a list of inputs to choose precedence."
    );

    Ok(quote! {
        impl crate::graphql::orm::DatabaseEntity for #ident {
            const TABLE_NAME: &'static str = #table;
            const PLURAL_NAME: &'static str = #plural;
            const PRIMARY_KEY: &'static str = #pk_name;
            const DEFAULT_SORT: &'static str = #default_sort;

            fn column_names() -> &'static [&'static str] {
                &[#(#column_names),*]
            }

            fn primary_key(&self) -> i64 {
                self.#pk_ident
            }
        }

        impl crate::graphql::orm::DatabaseSchema for #ident {
            fn columns() -> &'static [crate::graphql::orm::ColumnDef] {
                const COLUMNS: &[crate::graphql::orm::ColumnDef] = &[#(#column_defs),*];
                COLUMNS
            }
        }

        impl crate::graphql::orm::FromSqlRow for #ident {
            fn from_row(row: &sqlx::sqlite::SqliteRow) -> ::core::result::Result<Self, sqlx::Error> {
                use sqlx::Row as _;
                ::core::result::Result::Ok(Self {
                    #(#decode_fields),*
                })
            }
        }

        impl crate::graphql::loaders::HasForeignKey for #ident {
            fn get_fk_value(&self, fk_column: &str) -> ::core::option::Option<i64> {
                match fk_column {
                    #(#fk_arms,)*
                    _ => ::core::option::Option::None,
                }
            }
        }

        #[doc = #where_doc]
        #[derive(async_graphql::InputObject, Default, Clone, Debug)]
        #[graphql(name = #where_name)]
        #vis struct #where_ident {
            #(#where_fields,)*
        }

        impl crate::graphql::orm::DatabaseFilter for #where_ident {
            fn to_sql_conditions(&self) -> (::std::vec::Vec<::std::string::String>, ::std::vec::Vec<crate::graphql::orm::SqlValue>) {
                let mut conditions = ::std::vec::Vec::new();
                let mut values = ::std::vec::Vec::new();
                #(#where_conditions)*
                (conditions, values)
            }

            fn is_empty(&self) -> bool {
                #(#where_empty)&&*
            }
        }

        #[doc = #order_doc]
        #[derive(async_graphql::InputObject, Default, Clone, Debug)]
        #[graphql(name = #order_name)]
        #vis struct #order_ident {
            #(#order_fields,)*
        }

        impl crate::graphql::orm::DatabaseOrderBy for #order_ident {
            fn to_sql_order(&self) -> ::core::option::Option<::std::string::String> {
                let mut parts: ::std::vec::Vec<::std::string::String> = ::std::vec::Vec::new();
                #(#order_parts)*
                if parts.is_empty() {
                    ::core::option::Option::None
                } else {
                    ::core::option::Option::Some(parts.join(", "))
                }
            }
        }

        impl #ident {
            /// Start a filtered, sorted, paginated query over this entity.
            #vis fn query(
                pool: &sqlx::SqlitePool,
            ) -> crate::graphql::orm::FindQuery<'_, Self, #where_ident, #order_ident> {
                crate::graphql::orm::FindQuery::new(pool)
            }

            /// Fetch one row by primary key.
            #vis async fn get(
                pool: &sqlx::SqlitePool,
                id: i64,
            ) -> ::core::result::Result<::core::option::Option<Self>, sqlx::Error> {
                crate::graphql::orm::EntityQuery::<Self>::new()
                    .where_clause(#pk_condition, crate::graphql::orm::SqlValue::Int(id))
                    .fetch_one(pool)
                    .await
            }

            /// Start a COUNT query over this entity.
            #vis fn count_query(
                pool: &sqlx::SqlitePool,
            ) -> crate::graphql::orm::CountQuery<'_, Self, #where_ident> {
                crate::graphql::orm::CountQuery::new(pool)
            }
        }
    })
}

fn column_def(field: &FieldInfo) -> syn::Result<TokenStream> {
    let name = field.column_name();
    let sql_type = match (&field.column.sql_type, infer_sql_type(&field.ty)) {
        (Some(explicit), _) => explicit.clone(),
        (None, Some(inferred)) => inferred.to_string(),
        (None, None) => {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "cannot infer SQL type, add #[column(sql_type = \"...\")]",
            ));
        }
    };
    let nullable = field.is_optional();
    let is_primary_key = field.primary_key;
    let default = opt_str(&field.column.default);
    let references = opt_str(&field.column.references);
    let on_delete = opt_str(&field.column.on_delete);

    Ok(quote! {
        crate::graphql::orm::ColumnDef {
            name: #name,
            sql_type: #sql_type,
            nullable: #nullable,
            is_primary_key: #is_primary_key,
            default: #default,
            references: #references,
            on_delete: #on_delete,
        }
    })
}

fn opt_str(value: &Option<String>) -> TokenStream {
    match value {
        Some(v) => quote! { ::core::option::Option::Some(#v) },
        None => quote! { ::core::option::Option::None },
    }
}
