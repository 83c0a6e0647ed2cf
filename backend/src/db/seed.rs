//! Demo data for an empty database.
//!
//! Runs after schema sync when `SEED_DEMO_DATA` is set or `--seed` is passed.
//! Seeding only happens while both tables are empty, so re-runs never
//! duplicate rows.

use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::graphql::entities::{Color, Fruit, FruitCategory};

const SEED_DATA: &str = include_str!("seed.json");

#[derive(Debug, Deserialize)]
struct SeedColor {
    name: String,
    fruits: Vec<SeedFruit>,
}

#[derive(Debug, Deserialize)]
struct SeedFruit {
    name: String,
    category: FruitCategory,
}

/// Result of running seed operations.
#[derive(Debug, Default, PartialEq)]
pub struct SeedResult {
    pub colors_inserted: u64,
    pub fruits_inserted: u64,
}

/// Insert the demo colors and fruits unless data already exists.
pub async fn run_seeds(pool: &SqlitePool) -> anyhow::Result<SeedResult> {
    let colors = Color::count_query(pool).execute().await?;
    let fruits = Fruit::count_query(pool).execute().await?;
    if colors > 0 || fruits > 0 {
        debug!(colors, fruits, "Database already has data, skipping seed");
        return Ok(SeedResult::default());
    }

    let seed: Vec<SeedColor> = serde_json::from_str(SEED_DATA)?;
    let mut result = SeedResult::default();
    let mut tx = pool.begin().await?;

    for color in &seed {
        let color_id = sqlx::query("INSERT INTO colors (name) VALUES (?1)")
            .bind(&color.name)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        result.colors_inserted += 1;

        for fruit in &color.fruits {
            sqlx::query("INSERT INTO fruits (name, category, color_id) VALUES (?1, ?2, ?3)")
                .bind(&fruit.name)
                .bind(fruit.category.as_str())
                .bind(color_id)
                .execute(&mut *tx)
                .await?;
            result.fruits_inserted += 1;
        }
    }

    tx.commit().await?;

    info!(
        colors = result.colors_inserted,
        fruits = result.fruits_inserted,
        "Seeded demo data"
    );
    Ok(result)
}
