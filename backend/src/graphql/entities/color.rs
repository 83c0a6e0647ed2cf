use async_graphql::SimpleObject;
use fruits_macros::{GraphQLEntity, GraphQLRelations};

use super::fruit::Fruit;

/// The shade of a tasty fruit
#[derive(GraphQLEntity, GraphQLRelations, SimpleObject, Clone, Debug)]
#[graphql(name = "Color", complex)]
#[graphql_entity(table = "colors", plural = "Colors", default_sort = "id")]
pub struct Color {
    #[graphql(skip)]
    #[primary_key]
    #[filterable(type = "number")]
    #[sortable]
    pub id: i64,

    /// Name of the color
    #[filterable(type = "string")]
    #[sortable]
    pub name: String,

    /// Fruits of this color
    #[graphql(skip)]
    #[relation(target = "Fruit", to = "color_id", multiple)]
    pub fruits: Vec<Fruit>,
}
