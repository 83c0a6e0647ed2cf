//! Repository pattern for entity data access
//!
//! This module provides a unified interface for querying entities
//! that can be used by both GraphQL resolvers and internal service code.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use crate::graphql::entities::{Fruit, FruitCategory, FruitCategoryFilter, FruitWhereInput};
//!
//! // Find berries
//! let fruits = Fruit::query(&pool)
//!     .filter(FruitWhereInput {
//!         category: Some(FruitCategoryFilter {
//!             eq: Some(FruitCategory::Berry),
//!             ..Default::default()
//!         }),
//!         ..Default::default()
//!     })
//!     .fetch_all()
//!     .await?;
//!
//! // Find one fruit by ID
//! let fruit = Fruit::get(&pool, 1).await?;
//!
//! // Count fruits
//! let count = Fruit::count_query(&pool).execute().await?;
//! ```

use sqlx::SqlitePool;

use super::builder::EntityQuery;
use super::traits::{DatabaseEntity, DatabaseFilter, DatabaseOrderBy, FromSqlRow, PageInput};

/// Query builder for finding entities
///
/// Wraps EntityQuery and provides a fluent interface for building queries.
pub struct FindQuery<'a, E, F, O>
where
    E: DatabaseEntity + FromSqlRow,
    F: DatabaseFilter + Default,
    O: DatabaseOrderBy + Default,
{
    pool: &'a SqlitePool,
    filter: Option<F>,
    order_by: Vec<O>,
    page: Option<PageInput>,
    _marker: std::marker::PhantomData<E>,
}

impl<'a, E, F, O> FindQuery<'a, E, F, O>
where
    E: DatabaseEntity + FromSqlRow,
    F: DatabaseFilter + Default,
    O: DatabaseOrderBy + Default,
{
    /// Create a new find query
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            filter: None,
            order_by: Vec::new(),
            page: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the filter
    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Add ordering
    pub fn order_by(mut self, order_by: Vec<O>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Set pagination
    pub fn paginate(mut self, page: PageInput) -> Self {
        self.page = Some(page);
        self
    }

    fn build(&self) -> EntityQuery<E> {
        let mut query = EntityQuery::<E>::new();

        if let Some(ref filter) = self.filter {
            query = query.filter(filter);
        }

        for order in &self.order_by {
            query = query.order_by(order);
        }
        query = query.default_order();

        if let Some(ref page) = self.page {
            query = query.paginate(page);
        }

        query
    }

    /// Execute and fetch all results
    pub async fn fetch_all(self) -> Result<Vec<E>, sqlx::Error> {
        self.build().fetch_all(self.pool).await
    }

    /// Execute and fetch one optional result
    #[cfg(test)]
    pub async fn fetch_optional(self) -> Result<Option<E>, sqlx::Error> {
        self.build().fetch_one(self.pool).await
    }

    /// Execute and fetch exactly one result (errors if not found)
    #[cfg(test)]
    pub async fn fetch_one(self) -> Result<E, sqlx::Error> {
        self.fetch_optional()
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)
    }
}

/// Query builder for counting entities
pub struct CountQuery<'a, E, F>
where
    E: DatabaseEntity + FromSqlRow,
    F: DatabaseFilter + Default,
{
    pool: &'a SqlitePool,
    filter: Option<F>,
    _marker: std::marker::PhantomData<E>,
}

impl<'a, E, F> CountQuery<'a, E, F>
where
    E: DatabaseEntity + FromSqlRow,
    F: DatabaseFilter + Default,
{
    /// Create a new count query
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            filter: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the filter
    #[cfg(test)]
    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Execute the count query
    pub async fn execute(self) -> Result<i64, sqlx::Error> {
        let mut query = EntityQuery::<E>::new();
        if let Some(ref filter) = self.filter {
            query = query.filter(filter);
        }
        query.count(self.pool).await
    }
}
