//! GraphQL ORM Layer
//!
//! Provides traits and utilities for macro-generated GraphQL entities.
//! The `fruits-macros` crate generates implementations of these traits
//! from annotated Rust structs, creating a single source of truth for:
//! - GraphQL types (SimpleObject + ComplexObject)
//! - Filter inputs (WhereInput)
//! - Sort inputs (OrderByInput)
//! - SQL query generation (parameterized via sqlx)
//! - Row decoding (FromSqlRow)
//! - Relation loading (batched through DataLoader)
//!
//! # Repository Pattern
//!
//! ```rust,ignore
//! use crate::graphql::entities::{Fruit, FruitWhereInput};
//! use crate::graphql::filters::IntFilter;
//!
//! let fruits = Fruit::query(&pool)
//!     .filter(FruitWhereInput {
//!         color_id: Some(IntFilter::eq(color_id)),
//!         ..Default::default()
//!     })
//!     .fetch_all()
//!     .await?;
//! ```

mod builder;
mod repository;
mod traits;

pub use builder::*;
pub use repository::*;
pub use traits::*;
