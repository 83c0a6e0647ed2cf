//! GraphQL DataLoaders for batching database queries
//!
//! DataLoaders solve the N+1 problem by collecting multiple requests
//! for related entities and executing them in a single batch query.
//!
//! # Architecture
//!
//! Relations marked with `#[relation(...)]` in entity structs automatically
//! use DataLoaders via the generated `ComplexObject` resolvers.
//!
//! The pattern works as follows:
//! 1. When GraphQL resolves `fruits { color { name } }`, each Fruit's
//!    `color` resolver calls `loader.load_one(color_id)`
//! 2. DataLoader batches these calls within the same request tick
//! 3. A single SQL query fetches all Colors for all Fruits:
//!    `SELECT ... FROM colors WHERE id IN (...)`
//! 4. Results are keyed by id and returned to each resolver
//!
//! Reverse relations (`color { fruits { ... } }`) work the same way through
//! [RelationLoader], grouping children by their foreign key value.
//!
//! # Adding a New Relation
//!
//! 1. Add `#[relation(...)]` attribute to the parent entity field
//! 2. Mark the child's foreign key column with `#[column(references = "...")]`
//!    so the derive generates its `HasForeignKey` impl
//! 3. Register the matching loader in [register_loaders]

use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_graphql::dataloader::{DataLoader, Loader};
use async_graphql::{ObjectType, SchemaBuilder, SubscriptionType};

use crate::db::Database;
use crate::graphql::entities::{Color, Fruit};
use crate::graphql::orm::{DatabaseEntity, EntityQuery, FromSqlRow};

/// Trait for entities that have a foreign key field we can extract.
///
/// This is used by [RelationLoader] to group batch-loaded entities by their parent ID.
/// Implemented by `#[derive(GraphQLEntity)]` for every `#[column(references = ...)]` field.
pub trait HasForeignKey {
    /// Get the value of a foreign key column.
    /// Returns None if the column doesn't exist on this entity or is NULL.
    fn get_fk_value(&self, fk_column: &str) -> Option<i64>;
}

/// Key for [RelationLoader]: "children whose `column` equals `value`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub column: &'static str,
    pub value: i64,
}

impl ForeignKey {
    pub fn new(column: &'static str, value: i64) -> Self {
        Self { column, value }
    }
}

// ============================================================================
// Primary Key Loader
// ============================================================================

/// Loads entities by primary key, batching every requested id into one
/// `WHERE pk IN (...)` query. Ids with no row are absent from the result.
pub struct EntityLoader<T> {
    db: Database,
    batches: Arc<AtomicUsize>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> EntityLoader<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            batches: Arc::new(AtomicUsize::new(0)),
            _phantom: PhantomData,
        }
    }

    /// Number of SQL batches executed so far.
    #[cfg(test)]
    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }

    /// Shared handle to the batch counter, readable after the loader is
    /// handed to a schema or request.
    #[cfg(test)]
    pub fn batch_counter(&self) -> Arc<AtomicUsize> {
        self.batches.clone()
    }
}

impl<T> Loader<i64> for EntityLoader<T>
where
    T: DatabaseEntity + FromSqlRow + Clone + 'static,
{
    type Value = T;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i64]) -> Result<HashMap<i64, Self::Value>, Self::Error> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let batch = self.batches.fetch_add(1, Ordering::Relaxed) + 1;

        tracing::debug!(
            entity = T::TABLE_NAME,
            key_count = keys.len(),
            batch,
            "Batch loading {} by primary key",
            T::TABLE_NAME
        );

        let entities = EntityQuery::<T>::new()
            .where_in(T::PRIMARY_KEY, keys)
            .fetch_all(self.db.pool())
            .await
            .map_err(Arc::new)?;

        tracing::debug!(
            entity = T::TABLE_NAME,
            total_loaded = entities.len(),
            "Batch load complete"
        );

        Ok(entities.into_iter().map(|e| (e.primary_key(), e)).collect())
    }
}

// ============================================================================
// Generic Relation Loader
// ============================================================================

/// A generic loader that batches queries for a one-to-many relation.
///
/// Given a set of parent IDs, loads all child entities where `fk_column = parent_id`
/// and groups them by the foreign key value. Keys for different columns in the
/// same batch are served by one query per column. Every requested key is
/// present in the result, with an empty list when the parent has no children.
///
/// # Example
///
/// ```ignore
/// let loader = ctx.data_unchecked::<DataLoader<RelationLoader<Fruit>>>();
/// let fruits = loader
///     .load_one(ForeignKey::new("color_id", color.id))
///     .await?
///     .unwrap_or_default();
/// ```
pub struct RelationLoader<T> {
    db: Database,
    batches: Arc<AtomicUsize>,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> RelationLoader<T> {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            batches: Arc::new(AtomicUsize::new(0)),
            _phantom: PhantomData,
        }
    }

    /// Number of SQL batches executed so far.
    #[cfg(test)]
    pub fn batch_count(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }

    /// Shared handle to the batch counter, readable after the loader is
    /// handed to a schema or request.
    #[cfg(test)]
    pub fn batch_counter(&self) -> Arc<AtomicUsize> {
        self.batches.clone()
    }
}

impl<T> Loader<ForeignKey> for RelationLoader<T>
where
    T: DatabaseEntity + FromSqlRow + HasForeignKey + Clone + 'static,
{
    type Value = Vec<T>;
    type Error = Arc<sqlx::Error>;

    async fn load(
        &self,
        keys: &[ForeignKey],
    ) -> Result<HashMap<ForeignKey, Self::Value>, Self::Error> {
        let mut result: HashMap<ForeignKey, Vec<T>> =
            keys.iter().map(|k| (*k, Vec::new())).collect();

        let mut by_column: BTreeMap<&'static str, Vec<i64>> = BTreeMap::new();
        for key in keys {
            by_column.entry(key.column).or_default().push(key.value);
        }

        for (column, parents) in by_column {
            let batch = self.batches.fetch_add(1, Ordering::Relaxed) + 1;

            tracing::debug!(
                entity = T::TABLE_NAME,
                fk_column = column,
                batch,
                parent_count = parents.len(),
                "Batch loading {} for {} parents",
                T::TABLE_NAME,
                parents.len()
            );

            let children = EntityQuery::<T>::new()
                .where_in(column, &parents)
                .default_order()
                .fetch_all(self.db.pool())
                .await
                .map_err(Arc::new)?;

            tracing::debug!(
                entity = T::TABLE_NAME,
                total_loaded = children.len(),
                "Batch load complete"
            );

            for child in children {
                if let Some(value) = child.get_fk_value(column)
                    && let Some(siblings) = result.get_mut(&ForeignKey::new(column, value))
                {
                    siblings.push(child);
                }
            }
        }

        Ok(result)
    }
}

/// Register one loader per relation the entities resolve through.
pub fn register_loaders<Q, M, S>(
    builder: SchemaBuilder<Q, M, S>,
    db: &Database,
) -> SchemaBuilder<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    builder
        .data(DataLoader::new(
            EntityLoader::<Color>::new(db.clone()),
            tokio::spawn,
        ))
        .data(DataLoader::new(
            RelationLoader::<Fruit>::new(db.clone()),
            tokio::spawn,
        ))
}
