//! GraphQL API over fruits and their colors
//!
//! Entity structs in [entities] are the single source of truth: the derives
//! from `fruits-macros` generate their tables, filter/sort inputs and relation
//! resolvers, and [loaders] batch the relation lookups.
//!
//! Queries and mutations live in per-entity files under `queries/` and
//! `mutations/`, merged into the roots in `schema.rs`:
//!
//! ```rust,ignore
//! #[derive(MergedObject, Default)]
//! pub struct QueryRoot(FruitQueries, ColorQueries);
//! ```

pub mod entities;
pub mod filters;
pub mod loaders;
pub mod mutations;
pub mod orm;
pub mod queries;
mod schema;
pub mod service;
pub mod types;

pub use schema::{FruitsSchema, SchemaLimits, build_schema, schema_sdl};
