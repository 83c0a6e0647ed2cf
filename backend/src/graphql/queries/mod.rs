pub mod colors;
pub mod fruits;

pub use colors::ColorQueries;
pub use fruits::FruitQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, ID, Object, Result, ResultExt};

    pub(crate) use crate::db::Database;
    pub(crate) use crate::error::{AppError, parse_id};
    pub(crate) use crate::graphql::entities::*;
    pub(crate) use crate::graphql::orm::PageInput;
}
