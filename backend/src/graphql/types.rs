//! GraphQL input and payload types for mutations

use async_graphql::{ID, InputObject};
use fruits_macros::mutation_result;

use crate::graphql::entities::{Color, Fruit, FruitCategory};

mutation_result!(MutationResult);
mutation_result!(ColorResult, color: Color);
mutation_result!(FruitResult, fruit: Fruit);

/// Input for creating a color
#[derive(Debug, InputObject)]
pub struct CreateColorInput {
    /// Name of the color (1-20 characters)
    pub name: String,
}

/// Input for creating a fruit
#[derive(Debug, InputObject)]
pub struct CreateFruitInput {
    /// Variety name of the fruit (1-20 characters)
    pub name: String,
    pub category: FruitCategory,
    /// Color of the fruit, if any
    pub color_id: Option<ID>,
}
