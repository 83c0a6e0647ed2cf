//! Application state and HTTP router construction.

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::db::Database;
use crate::graphql::{self, FruitsSchema};

/// Shared state for HTTP handlers (GraphQL, health checks).
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub schema: FruitsSchema,
}

/// Build the full Axum router: /graphql, /healthz, /readyz and layers.
/// Returns Router<()> (state fully applied) for use with axum::serve.
pub fn build_app(state: AppState) -> Router<()> {
    Router::new()
        .merge(api::health::router())
        .merge(graphql::service::router())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::test_database;
    use crate::graphql::{SchemaLimits, build_schema};
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_app() -> Router<()> {
        let db = test_database().await;
        let config = Config::from_lookup(|_| None).unwrap();
        let schema = build_schema(db.clone(), config.schema_limits);
        build_app(AppState { db, schema })
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_graphql() {
        let app = test_app().await;
        let request = Request::post("/graphql")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "query": "{ fruits(page: { limit: 1 }) { name color { name } } }" })
                    .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "data": { "fruits": [{ "name": "strawberry", "color": { "name": "red" } }] } })
        );
    }

    #[tokio::test]
    async fn test_get_graphql() {
        let app = test_app().await;

        let browser = Request::get("/graphql")
            .header(header::ACCEPT, "text/html")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(browser).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let client = Request::get("/graphql").body(Body::empty()).unwrap();
        let response = app.oneshot(client).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = test_app().await;

        let response = app
            .clone()
            .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");

        let response = app
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({ "ready": true, "database": true })
        );
    }

    #[tokio::test]
    async fn test_readyz_reports_closed_database() {
        let db = test_database().await;
        let config = Config::from_lookup(|_| None).unwrap();
        let schema = build_schema(db.clone(), config.schema_limits);
        let app = build_app(AppState {
            db: db.clone(),
            schema,
        });
        db.pool().close().await;

        let response = app
            .oneshot(Request::get("/readyz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body_json(response).await,
            json!({ "ready": false, "database": false })
        );
    }
}
