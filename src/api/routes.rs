//! API Routes
//!
//! Configures the Axum router, the caching middleware and the mutation table.

use axum::{
    http::Method,
    middleware,
    routing::{get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_widget, delete_widget, get_widget, health_handler, list_widgets, stats_handler,
    update_widget, AppState,
};
use super::middleware::{conditional_get, invalidate_on_mutation};
use super::registry::{MutationBinding, MutationRegistry};

/// Mutating widget operations and the resources each invalidates.
///
/// Item changes also invalidate the `/widgets` collection.
pub fn widget_mutations() -> MutationRegistry {
    MutationRegistry::new()
        .bind(Method::POST, "/widgets", MutationBinding::resource())
        .bind(
            Method::PUT,
            "/widgets/:id",
            MutationBinding::resource_and_parent(),
        )
        .bind(
            Method::DELETE,
            "/widgets/:id",
            MutationBinding::resource_and_parent(),
        )
}

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /widgets` - List widgets (conditional)
/// - `POST /widgets` - Create a widget (invalidating)
/// - `GET /widgets/:id` - Fetch a widget (conditional)
/// - `PUT /widgets/:id` - Replace a widget (invalidating)
/// - `DELETE /widgets/:id` - Delete a widget (invalidating)
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - Conditional GET and mutation invalidation on the widget routes
/// - CORS: Allows any origin when permissive
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    create_router_with_cors(state, true)
}

/// Creates the router, optionally without the permissive CORS layer.
pub fn create_router_with_cors(state: AppState, cors_permissive: bool) -> Router {
    // Widget routes sit behind the caching middleware. `route_layer` runs it
    // after matching so `MatchedPath` is available to the registry lookup.
    let widgets = Router::new()
        .route("/widgets", get(list_widgets).post(create_widget))
        .route(
            "/widgets/:id",
            put(update_widget).get(get_widget).delete(delete_widget),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            invalidate_on_mutation,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            conditional_get,
        ));

    let router = Router::new()
        .merge(widgets)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler));

    let router = if cors_permissive {
        router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        router
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::WidgetRepository;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(WidgetRepository::new(), Duration::from_secs(2));
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("etag").is_none());
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_endpoint_sets_etag() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/widgets")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let etag = response.headers().get("etag").unwrap().to_str().unwrap();
        assert!(etag.starts_with('"') && etag.ends_with('"'));
    }

    #[tokio::test]
    async fn test_get_not_found_has_no_etag() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/widgets/99")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(response.headers().get("etag").is_none());
    }

    #[test]
    fn test_widget_mutations_table() {
        let registry = widget_mutations();
        assert!(registry.is_mutating(&Method::POST, "/widgets"));
        assert!(registry.is_mutating(&Method::PUT, "/widgets/:id"));
        assert!(registry.is_mutating(&Method::DELETE, "/widgets/:id"));
        assert!(!registry.is_mutating(&Method::GET, "/widgets"));
        assert!(!registry.is_mutating(&Method::GET, "/widgets/:id"));
    }
}
