//! Attribute parsing shared by the entity derives.

use convert_case::{Case, Casing};
use syn::{Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments, Type};

/// Struct-level `#[graphql_entity(...)]` settings.
pub struct EntityAttrs {
    pub table: String,
    pub plural: String,
    pub default_sort: String,
}

/// Which filter input a `#[filterable]` field gets.
pub enum FilterKind {
    String,
    Number,
    /// `#[filterable(with = "CategoryFilter")]`: any input type with
    /// `to_sql_conditions(column)` and `is_empty()`, resolved in the entity's module.
    Custom(syn::Path),
}

/// `#[relation(target = "...", from = "...", to = "...", multiple)]`
pub struct RelationAttrs {
    pub target: Ident,
    pub from: Option<String>,
    pub to: Option<String>,
    pub multiple: bool,
}

/// `#[column(sql_type = "...", references = "...", on_delete = "...", default = "...")]`
#[derive(Default)]
pub struct ColumnAttrs {
    pub sql_type: Option<String>,
    pub references: Option<String>,
    pub on_delete: Option<String>,
    pub default: Option<String>,
}

pub struct FieldInfo {
    pub ident: Ident,
    pub ty: Type,
    pub docs: Vec<Attribute>,
    pub primary_key: bool,
    pub filter: Option<FilterKind>,
    pub sortable: bool,
    pub skip_db: bool,
    pub relation: Option<RelationAttrs>,
    pub column: ColumnAttrs,
}

impl FieldInfo {
    pub fn column_name(&self) -> String {
        self.ident.to_string()
    }

    /// Whether the field is stored in the table.
    pub fn is_column(&self) -> bool {
        !self.skip_db && self.relation.is_none()
    }

    pub fn is_optional(&self) -> bool {
        option_inner(&self.ty).is_some()
    }
}

pub fn parse_entity_attrs(input: &DeriveInput) -> syn::Result<EntityAttrs> {
    let mut table = None;
    let mut plural = None;
    let mut default_sort = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("graphql_entity")) {
        attr.parse_nested_meta(|meta| {
            let value: LitStr = meta.value()?.parse()?;
            if meta.path.is_ident("table") {
                table = Some(value.value());
            } else if meta.path.is_ident("plural") {
                plural = Some(value.value());
            } else if meta.path.is_ident("default_sort") {
                default_sort = Some(value.value());
            } else {
                return Err(meta.error("expected `table`, `plural` or `default_sort`"));
            }
            Ok(())
        })?;
    }

    let plural = plural.unwrap_or_else(|| format!("{}s", input.ident));
    let table = table.unwrap_or_else(|| plural.to_case(Case::Snake));

    Ok(EntityAttrs {
        table,
        plural,
        default_sort: default_sort.unwrap_or_else(|| "id".to_string()),
    })
}

pub fn parse_fields(input: &DeriveInput) -> syn::Result<Vec<FieldInfo>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "entity derives only support structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "entity derives require named fields",
        ));
    };

    named
        .named
        .iter()
        .map(|field| {
            let ident = field
                .ident
                .clone()
                .ok_or_else(|| syn::Error::new_spanned(field, "unnamed field"))?;

            let mut info = FieldInfo {
                ident,
                ty: field.ty.clone(),
                docs: Vec::new(),
                primary_key: false,
                filter: None,
                sortable: false,
                skip_db: false,
                relation: None,
                column: ColumnAttrs::default(),
            };

            for attr in &field.attrs {
                let path = attr.path();
                if path.is_ident("doc") {
                    info.docs.push(attr.clone());
                } else if path.is_ident("primary_key") {
                    info.primary_key = true;
                } else if path.is_ident("sortable") {
                    info.sortable = true;
                } else if path.is_ident("skip_db") {
                    info.skip_db = true;
                } else if path.is_ident("filterable") {
                    info.filter = Some(parse_filterable(attr)?);
                } else if path.is_ident("relation") {
                    info.relation = Some(parse_relation(attr)?);
                } else if path.is_ident("column") {
                    info.column = parse_column(attr)?;
                }
            }

            Ok(info)
        })
        .collect()
}

fn parse_filterable(attr: &Attribute) -> syn::Result<FilterKind> {
    let mut kind = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("type") {
            let value: LitStr = meta.value()?.parse()?;
            kind = Some(match value.value().as_str() {
                "string" => FilterKind::String,
                "number" => FilterKind::Number,
                other => {
                    return Err(syn::Error::new_spanned(
                        &value,
                        format!("unsupported filter type `{other}`, expected `string` or `number`"),
                    ));
                }
            });
            Ok(())
        } else if meta.path.is_ident("with") {
            let value: LitStr = meta.value()?.parse()?;
            kind = Some(FilterKind::Custom(value.parse()?));
            Ok(())
        } else {
            Err(meta.error("expected `type = \"...\"` or `with = \"...\"`"))
        }
    })?;
    kind.ok_or_else(|| syn::Error::new_spanned(attr, "missing `type` or `with`"))
}

fn parse_relation(attr: &Attribute) -> syn::Result<RelationAttrs> {
    let mut target = None;
    let mut from = None;
    let mut to = None;
    let mut multiple = false;

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("multiple") {
            multiple = true;
            return Ok(());
        }
        let value: LitStr = meta.value()?.parse()?;
        if meta.path.is_ident("target") {
            target = Some(Ident::new(&value.value(), value.span()));
        } else if meta.path.is_ident("from") {
            from = Some(value.value());
        } else if meta.path.is_ident("to") {
            to = Some(value.value());
        } else {
            return Err(meta.error("expected `target`, `from`, `to` or `multiple`"));
        }
        Ok(())
    })?;

    Ok(RelationAttrs {
        target: target.ok_or_else(|| syn::Error::new_spanned(attr, "missing `target`"))?,
        from,
        to,
        multiple,
    })
}

fn parse_column(attr: &Attribute) -> syn::Result<ColumnAttrs> {
    let mut column = ColumnAttrs::default();
    attr.parse_nested_meta(|meta| {
        let value: LitStr = meta.value()?.parse()?;
        if meta.path.is_ident("sql_type") {
            column.sql_type = Some(value.value());
        } else if meta.path.is_ident("references") {
            column.references = Some(value.value());
        } else if meta.path.is_ident("on_delete") {
            column.on_delete = Some(value.value());
        } else if meta.path.is_ident("default") {
            column.default = Some(value.value());
        } else {
            return Err(meta.error(
                "expected `sql_type`, `references`, `on_delete` or `default`",
            ));
        }
        Ok(())
    })?;
    Ok(column)
}

/// `Option<T>` -> `Some(T)`
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// SQLite storage class for a Rust type, if it can be inferred.
pub fn infer_sql_type(ty: &Type) -> Option<&'static str> {
    let ty = option_inner(ty).unwrap_or(ty);
    let Type::Path(path) = ty else { return None };
    let ident = &path.path.segments.last()?.ident;
    match ident.to_string().as_str() {
        "i64" | "i32" | "i16" | "u32" | "u16" | "bool" => Some("INTEGER"),
        "f64" | "f32" => Some("REAL"),
        "String" => Some("TEXT"),
        _ => None,
    }
}
