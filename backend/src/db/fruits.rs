//! Fruit database repository

use sqlx::SqlitePool;

use crate::error::AppError;
use crate::graphql::entities::{Color, Fruit, FruitCategory};
use crate::graphql::orm::{EntityQuery, SqlValue, execute_with_binds};

use super::validate_name;

/// Input for creating a fruit
#[derive(Debug)]
pub struct CreateFruit {
    pub name: String,
    pub category: FruitCategory,
    pub color_id: Option<i64>,
}

fn missing_color(id: i64) -> AppError {
    AppError::Validation(format!("Color {} does not exist", id))
}

pub struct FruitRepository {
    pool: SqlitePool,
}

impl FruitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a fruit and return the stored row
    pub async fn create(&self, input: CreateFruit) -> Result<Fruit, AppError> {
        let name = validate_name(&input.name)?;

        if let Some(color_id) = input.color_id
            && Color::get(&self.pool, color_id).await?.is_none()
        {
            return Err(missing_color(color_id));
        }

        let id = self.insert(name, input.category, input.color_id).await?;

        Fruit::get(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound { entity: "Fruit", id })
    }

    async fn insert(
        &self,
        name: String,
        category: FruitCategory,
        color_id: Option<i64>,
    ) -> Result<i64, AppError> {
        let result = execute_with_binds(
            "INSERT INTO fruits (name, category, color_id) VALUES (?1, ?2, ?3)",
            &[
                SqlValue::String(name),
                SqlValue::String(category.as_str().to_string()),
                color_id.map_or(SqlValue::Null, SqlValue::Int),
            ],
            &self.pool,
        )
        .await;

        match (result, color_id) {
            (Ok(done), _) => Ok(done.last_insert_rowid()),
            // The color was deleted after the existence check
            (Err(sqlx::Error::Database(e)), Some(color_id)) if e.is_foreign_key_violation() => {
                Err(missing_color(color_id))
            }
            (Err(e), _) => Err(e.into()),
        }
    }

    /// Delete a fruit
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let (sql, values) = EntityQuery::<Fruit>::new()
            .where_clause("id = ?", SqlValue::Int(id))
            .build_delete_sql();

        let result = execute_with_binds(&sql, &values, &self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound { entity: "Fruit", id });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_create_fruit() {
        let db = test_database().await;
        let yellow = Color::query(db.pool())
            .filter(crate::graphql::entities::ColorWhereInput {
                name: Some(crate::graphql::filters::StringFilter::eq("yellow")),
                ..Default::default()
            })
            .fetch_one()
            .await
            .unwrap();

        let fruit = db
            .fruits()
            .create(CreateFruit {
                name: "pomelo".to_string(),
                category: FruitCategory::Citrus,
                color_id: Some(yellow.id),
            })
            .await
            .unwrap();
        assert_eq!(fruit.name, "pomelo");
        assert_eq!(fruit.category, FruitCategory::Citrus);
        assert_eq!(fruit.color_id, Some(yellow.id));

        let colorless = db
            .fruits()
            .create(CreateFruit {
                name: "mystery".to_string(),
                category: FruitCategory::Berry,
                color_id: None,
            })
            .await
            .unwrap();
        assert_eq!(colorless.color_id, None);
    }

    #[tokio::test]
    async fn test_create_fruit_rejects_unknown_color() {
        let db = test_database().await;
        let err = db
            .fruits()
            .create(CreateFruit {
                name: "ghost".to_string(),
                category: FruitCategory::Berry,
                color_id: Some(9_999),
            })
            .await;
        assert_matches!(err, Err(AppError::Validation(msg)) if msg.contains("9999"));
    }

    #[tokio::test]
    async fn test_insert_maps_foreign_key_violation() {
        let db = test_database().await;
        let err = db
            .fruits()
            .insert("ghost".to_string(), FruitCategory::Berry, Some(9_999))
            .await;
        assert_matches!(
            err,
            Err(AppError::Validation(msg)) if msg == "Color 9999 does not exist"
        );
    }

    #[tokio::test]
    async fn test_delete_fruit() {
        let db = test_database().await;
        let fruit = Fruit::query(db.pool()).fetch_one().await.unwrap();

        db.fruits().delete(fruit.id).await.unwrap();
        assert!(Fruit::get(db.pool(), fruit.id).await.unwrap().is_none());
        assert_matches!(
            db.fruits().delete(fruit.id).await,
            Err(AppError::NotFound { entity: "Fruit", .. })
        );
    }
}
