//! GraphQL schema definition with queries and mutations

use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::db::Database;

use super::loaders::register_loaders;
use super::mutations::{ColorMutations, FruitMutations};
use super::queries::{ColorQueries, FruitQueries};

/// The GraphQL schema type
pub type FruitsSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct QueryRoot(FruitQueries, ColorQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(FruitMutations, ColorMutations);

/// Query depth and complexity ceilings
#[derive(Debug, Clone, Copy)]
pub struct SchemaLimits {
    pub depth: usize,
    pub complexity: usize,
}

impl Default for SchemaLimits {
    fn default() -> Self {
        Self {
            depth: 10,
            complexity: 1000,
        }
    }
}

/// Build the GraphQL schema with all resolvers and batch loaders
pub fn build_schema(db: Database, limits: SchemaLimits) -> FruitsSchema {
    let builder = Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .limit_depth(limits.depth)
    .limit_complexity(limits.complexity);

    register_loaders(builder, &db).data(db).finish()
}

/// Schema without a database, only used to print the SDL
pub fn schema_sdl() -> String {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .finish()
    .sdl()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::graphql::entities::{Color, Fruit};
    use crate::graphql::loaders::{EntityLoader, RelationLoader};
    use async_graphql::dataloader::DataLoader;
    use async_graphql::{Request, Value};
    use std::sync::atomic::Ordering;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    async fn execute(schema: &FruitsSchema, query: &str) -> serde_json::Value {
        let response = schema.execute(Request::new(query)).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().unwrap()
    }

    fn error_code(response: &async_graphql::Response) -> Option<Value> {
        response
            .errors
            .first()
            .and_then(|e| e.extensions.as_ref())
            .and_then(|ext| ext.get("code"))
            .cloned()
    }

    #[tokio::test]
    async fn test_fruits_with_colors() {
        let db = test_database().await;
        let schema = build_schema(db.clone(), SchemaLimits::default());

        let data = execute(&schema, "{ fruits { id name category color { id name } } }").await;
        let fruits = data["fruits"].as_array().unwrap();

        let stored = Fruit::query(db.pool()).fetch_all().await.unwrap();
        assert_eq!(fruits.len(), stored.len());
        assert_eq!(
            fruits[0],
            json!({
                "id": stored[0].id.to_string(),
                "name": "strawberry",
                "category": "BERRY",
                "color": { "id": stored[0].color_id.unwrap().to_string(), "name": "red" }
            })
        );
    }

    #[tokio::test]
    async fn test_fruit_colors_are_batched() {
        let db = test_database().await;
        let schema = build_schema(db.clone(), SchemaLimits::default());

        let colors = EntityLoader::<Color>::new(db.clone());
        let fruits = RelationLoader::<Fruit>::new(db.clone());
        let color_batches = colors.batch_counter();
        let fruit_batches = fruits.batch_counter();

        // Request data shadows the schema's loaders
        let request = Request::new("{ fruits { name color { name fruits { name } } } }")
            .data(DataLoader::new(colors, tokio::spawn))
            .data(DataLoader::new(fruits, tokio::spawn));
        let response = schema.execute(request).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        assert_eq!(color_batches.load(Ordering::Relaxed), 1);
        assert_eq!(fruit_batches.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_fruits_filter_order_page() {
        let db = test_database().await;
        let schema = build_schema(db, SchemaLimits::default());

        let data = execute(
            &schema,
            r#"{
                fruits(
                    where: { category: { eq: BERRY } }
                    orderBy: [{ name: DESC }]
                    page: { limit: 2 }
                ) { name }
            }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({ "fruits": [{ "name": "strawberry" }, { "name": "raspberry" }] })
        );
    }

    #[tokio::test]
    async fn test_color_fruits_relation() {
        let db = test_database().await;
        let schema = build_schema(db, SchemaLimits::default());

        let data = execute(
            &schema,
            r#"{
                colors(where: { name: { eq: "yellow" } }) {
                    name
                    fruits { name }
                    sorted: fruits(orderBy: [{ name: DESC }]) { name }
                    lemons: fruits(where: { name: { startsWith: "lem" } }) { name }
                }
            }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({ "colors": [{
                "name": "yellow",
                "fruits": [{ "name": "lemon" }, { "name": "yuzu" }],
                "sorted": [{ "name": "yuzu" }, { "name": "lemon" }],
                "lemons": [{ "name": "lemon" }]
            }] })
        );
    }

    #[tokio::test]
    async fn test_category_filter_uses_enum_values() {
        let db = test_database().await;
        let schema = build_schema(db, SchemaLimits::default());

        let data = execute(
            &schema,
            r#"{
                citrus: fruits(where: { category: { eq: CITRUS } }) { category }
                other: fruits(where: { category: { notIn: [BERRY] } }) { name }
                both: fruits(where: { category: { in: [CITRUS, BERRY] } }) { id }
            }"#,
        )
        .await;
        let citrus = data["citrus"].as_array().unwrap();
        assert!(!citrus.is_empty());
        assert!(citrus.iter().all(|f| f["category"] == json!("CITRUS")));
        assert_eq!(data["other"].as_array().unwrap().len(), citrus.len());
        assert_eq!(data["both"].as_array().unwrap().len(), 9);

        let response = schema
            .execute(Request::new(r#"{ fruits(where: { category: { eq: "berry" } }) { id } }"#))
            .await;
        assert!(!response.errors.is_empty());
    }

    #[tokio::test]
    async fn test_fruit_without_color() {
        let db = test_database().await;
        let schema = build_schema(db, SchemaLimits::default());

        let data = execute(
            &schema,
            r#"mutation {
                createFruit(input: { name: "mystery", category: BERRY }) {
                    success fruit { id color { name } }
                }
            }"#,
        )
        .await;
        assert_eq!(data["createFruit"]["success"], json!(true));
        assert_eq!(data["createFruit"]["fruit"]["color"], json!(null));

        let id = data["createFruit"]["fruit"]["id"].as_str().unwrap().to_string();
        let data = execute(
            &schema,
            &format!(r#"{{ fruit(id: "{id}") {{ name color {{ id }} }} }}"#),
        )
        .await;
        assert_eq!(data, json!({ "fruit": { "name": "mystery", "color": null } }));
    }

    #[tokio::test]
    async fn test_relation_database_errors_are_internal() {
        let db = test_database().await;
        sqlx::query("ALTER TABLE colors RENAME TO old_colors")
            .execute(db.pool())
            .await
            .unwrap();
        let schema = build_schema(db, SchemaLimits::default());

        let response = schema
            .execute(Request::new("{ fruits { name color { name } } }"))
            .await;
        assert_eq!(response.errors[0].message, "Internal server error");
        assert_eq!(error_code(&response), Some(Value::from("INTERNAL")));

        let db = test_database().await;
        sqlx::query("ALTER TABLE fruits RENAME TO old_fruits")
            .execute(db.pool())
            .await
            .unwrap();
        let schema = build_schema(db, SchemaLimits::default());

        for query in [
            "{ colors { fruits { name } } }",
            r#"{ colors { fruits(where: { name: { eq: "lemon" } }) { name } } }"#,
        ] {
            let response = schema.execute(Request::new(query)).await;
            assert_eq!(response.errors[0].message, "Internal server error", "{query}");
            assert_eq!(error_code(&response), Some(Value::from("INTERNAL")), "{query}");
        }
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let db = test_database().await;
        let schema = build_schema(db, SchemaLimits::default());

        let data = execute(&schema, r#"{ fruit(id: "1") { name } missing: color(id: "9999") { name } }"#).await;
        assert_eq!(data, json!({ "fruit": { "name": "strawberry" }, "missing": null }));

        let response = schema
            .execute(Request::new(r#"{ fruit(id: "abc") { name } }"#))
            .await;
        assert_eq!(error_code(&response), Some(Value::from("BAD_USER_INPUT")));
    }

    #[tokio::test]
    async fn test_create_and_delete() {
        let db = test_database().await;
        let schema = build_schema(db.clone(), SchemaLimits::default());

        let data = execute(
            &schema,
            r#"mutation { createColor(input: { name: "green" }) { success error color { id name } } }"#,
        )
        .await;
        assert_eq!(data["createColor"]["success"], json!(true));
        let color_id = data["createColor"]["color"]["id"].as_str().unwrap().to_string();

        let data = execute(
            &schema,
            &format!(
                r#"mutation {{
                    createFruit(input: {{ name: "lime", category: CITRUS, colorId: "{color_id}" }}) {{
                        success fruit {{ name category color {{ name }} }}
                    }}
                }}"#
            ),
        )
        .await;
        assert_eq!(
            data["createFruit"],
            json!({
                "success": true,
                "fruit": { "name": "lime", "category": "CITRUS", "color": { "name": "green" } }
            })
        );

        let data = execute(
            &schema,
            &format!(r#"mutation {{ deleteColor(id: "{color_id}") {{ success error }} }}"#),
        )
        .await;
        assert_eq!(data["deleteColor"], json!({ "success": true, "error": null }));

        let data = execute(&schema, r#"{ fruits(where: { name: { eq: "lime" } }) { id } }"#).await;
        assert_eq!(data, json!({ "fruits": [] }));
    }

    #[tokio::test]
    async fn test_mutation_validation_errors() {
        let db = test_database().await;
        let schema = build_schema(db, SchemaLimits::default());

        let data = execute(
            &schema,
            r#"mutation {
                tooLong: createColor(input: { name: "a color name that is far too long" }) { success error }
                unknownColor: createFruit(input: { name: "kiwi", category: BERRY, colorId: "9999" }) { success error fruit { id } }
                missing: deleteFruit(id: "9999") { success error }
            }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({
                "tooLong": { "success": false, "error": "Name must be at most 20 characters" },
                "unknownColor": { "success": false, "error": "Color 9999 does not exist", "fruit": null },
                "missing": { "success": false, "error": "Fruit 9999 not found" }
            })
        );
    }

    #[tokio::test]
    async fn test_depth_limit() {
        let db = test_database().await;
        let schema = build_schema(
            db,
            SchemaLimits {
                depth: 2,
                complexity: 1000,
            },
        );

        let response = schema
            .execute(Request::new("{ fruits { color { fruits { name } } } }"))
            .await;
        assert!(!response.errors.is_empty());
    }

    #[test]
    fn test_sdl_names() {
        let sdl = schema_sdl();
        for expected in [
            "type Fruit",
            "type Color",
            "enum FruitCategory",
            "CITRUS",
            "Citrus fruits",
            "input FruitWhereInput",
            "input ColorOrderByInput",
            "fruits(where: FruitWhereInput, orderBy: [FruitOrderByInput!], page: PageInput): [Fruit!]!",
            "color: Color",
            "category: FruitCategoryFilter",
            "fruits(where: FruitWhereInput, orderBy: [FruitOrderByInput!]): [Fruit!]!",
            "createFruit(input: CreateFruitInput!): FruitResult!",
        ] {
            assert!(sdl.contains(expected), "missing `{expected}` in\n{sdl}");
        }

        // Foreign keys stay out of the object type
        let fruit_type = sdl
            .split("type Fruit {")
            .nth(1)
            .and_then(|rest| rest.split('}').next())
            .unwrap();
        assert!(fruit_type.contains("color: Color"), "{fruit_type}");
        assert!(!fruit_type.contains("colorId"), "{fruit_type}");
    }
}
