//! Color database repository

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::graphql::entities::Color;
use crate::graphql::orm::{EntityQuery, SqlValue, execute_with_binds};

use super::validate_name;

/// Input for creating a color
#[derive(Debug)]
pub struct CreateColor {
    pub name: String,
}

pub struct ColorRepository {
    pool: SqlitePool,
}

impl ColorRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a color and return the stored row
    pub async fn create(&self, input: CreateColor) -> Result<Color, AppError> {
        let name = validate_name(&input.name)?;

        let id = execute_with_binds(
            "INSERT INTO colors (name) VALUES (?1)",
            &[SqlValue::String(name)],
            &self.pool,
        )
        .await?
        .last_insert_rowid();

        Color::get(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound { entity: "Color", id })
    }

    /// Delete a color. Its fruits go with it.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let (sql, values) = EntityQuery::<Color>::new()
            .where_clause("id = ?", SqlValue::Int(id))
            .build_delete_sql();

        let result = execute_with_binds(&sql, &values, &self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "Color", id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::graphql::entities::{Fruit, FruitWhereInput};
    use crate::graphql::filters::IntFilter;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    async fn fruits_of(db: &crate::db::Database, color_id: i64) -> i64 {
        Fruit::count_query(db.pool())
            .filter(FruitWhereInput {
                color_id: Some(IntFilter::eq(color_id)),
                ..Default::default()
            })
            .execute()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_color() {
        let db = test_database().await;

        let color = db
            .colors()
            .create(CreateColor {
                name: " green ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(color.name, "green");
        assert_eq!(Color::get(db.pool(), color.id).await.unwrap().unwrap().name, "green");

        let err = db
            .colors()
            .create(CreateColor {
                name: String::new(),
            })
            .await;
        assert_matches!(err, Err(AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_color_cascades() {
        let db = test_database().await;
        let red = Color::query(db.pool()).fetch_one().await.unwrap();

        assert!(fruits_of(&db, red.id).await > 0);

        db.colors().delete(red.id).await.unwrap();

        assert_eq!(fruits_of(&db, red.id).await, 0);
        assert!(Color::get(db.pool(), red.id).await.unwrap().is_none());
        assert_matches!(
            db.colors().delete(red.id).await,
            Err(AppError::NotFound { entity: "Color", .. })
        );
    }
}
