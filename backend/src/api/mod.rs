//! REST endpoints outside the GraphQL API

pub mod health;
