//! Fruit Entity
//!
//! The `color` relation is resolved through the primary key loader, so listing
//! fruits with their colors costs one query for the fruits and one for all
//! of their colors.

use async_graphql::{Enum, InputObject, SimpleObject};
use fruits_macros::{GraphQLEntity, GraphQLRelations};
use serde::{Deserialize, Serialize};

use super::color::Color;
use crate::graphql::filters::StringFilter;
use crate::graphql::orm::SqlValue;

/// Kind of fruit, stored as its lowercase value
#[derive(Enum, sqlx::Type, Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[graphql(name = "FruitCategory")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FruitCategory {
    /// Citrus fruits
    Citrus,
    /// Berries
    Berry,
}

impl FruitCategory {
    /// Value stored in the `category` column
    pub fn as_str(&self) -> &'static str {
        match self {
            FruitCategory::Citrus => "citrus",
            FruitCategory::Berry => "berry",
        }
    }
}

/// Filter for the `category` column, matched on enum values
#[derive(InputObject, Default, Clone, Debug)]
#[graphql(name = "FruitCategoryFilter")]
pub struct FruitCategoryFilter {
    /// Equals
    pub eq: Option<FruitCategory>,
    /// Not equals
    pub ne: Option<FruitCategory>,
    /// In list
    #[graphql(name = "in")]
    pub in_list: Option<Vec<FruitCategory>>,
    /// Not in list
    pub not_in: Option<Vec<FruitCategory>>,
}

impl FruitCategoryFilter {
    pub fn is_empty(&self) -> bool {
        self.as_stored().is_empty()
    }

    pub fn to_sql_conditions(&self, column: &str) -> (Vec<String>, Vec<SqlValue>) {
        self.as_stored().to_sql_conditions(column)
    }

    /// The same conditions over the stored lowercase values
    fn as_stored(&self) -> StringFilter {
        let value = |c: &FruitCategory| c.as_str().to_string();
        let list = |l: &Vec<FruitCategory>| -> Vec<String> { l.iter().map(value).collect() };
        StringFilter {
            eq: self.eq.as_ref().map(value),
            ne: self.ne.as_ref().map(value),
            in_list: self.in_list.as_ref().map(list),
            not_in: self.not_in.as_ref().map(list),
            ..Default::default()
        }
    }
}

/// A tasty fruit
#[derive(GraphQLEntity, GraphQLRelations, SimpleObject, Clone, Debug)]
#[graphql(name = "Fruit", complex)]
#[graphql_entity(table = "fruits", plural = "Fruits", default_sort = "id")]
pub struct Fruit {
    #[graphql(skip)]
    #[primary_key]
    #[filterable(type = "number")]
    #[sortable]
    pub id: i64,

    /// Variety name of the fruit
    #[filterable(type = "string")]
    #[sortable]
    pub name: String,

    /// Category of the fruit
    #[column(sql_type = "TEXT")]
    #[filterable(with = "FruitCategoryFilter")]
    #[sortable]
    pub category: FruitCategory,

    #[graphql(skip)]
    #[column(references = "colors(id)", on_delete = "CASCADE")]
    #[filterable(type = "number")]
    pub color_id: Option<i64>,

    /// Color of this kind of fruit
    #[graphql(skip)]
    #[relation(target = "Color", from = "color_id")]
    pub color: Option<Color>,
}
