pub mod colors;
pub mod fruits;

pub use colors::ColorMutations;
pub use fruits::FruitMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, ErrorExtensions, ID, Object, Result, ResultExt};

    pub(crate) use crate::db::*;
    pub(crate) use crate::error::parse_id;
    pub(crate) use crate::graphql::types::*;
}
