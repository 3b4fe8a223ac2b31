//! API Handlers
//!
//! HTTP request handlers for the widget resource and service endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{StatusCode, Uri},
    Json,
};

use super::registry::{path_key, KeyExtractor, MutationRegistry};
use super::routes::widget_mutations;
use crate::cache::{ConditionalCache, ContentHashGenerator, ResourceIdentity, TokenGenerator};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{HealthResponse, StatsResponse, Widget, WidgetRequest};
use crate::repository::{parse_widget_id, WidgetRepository};

/// Application state shared across all handlers and middleware.
///
/// The cache is passed in explicitly; nothing is wired up behind the scenes.
#[derive(Clone)]
pub struct AppState {
    /// Validator token store, gate and trigger
    pub cache: Arc<ConditionalCache>,
    /// Demo resource storage
    pub widgets: Arc<WidgetRepository>,
    /// Which routes invalidate which resources
    pub registry: Arc<MutationRegistry>,
    /// Upper bound on a single token generation
    pub generation_timeout: Duration,
    /// Identity a read's token is stored under
    pub key_extractor: KeyExtractor,
}

impl AppState {
    /// Creates state whose tokens are content hashes of the widget repository.
    pub fn new(widgets: WidgetRepository, generation_timeout: Duration) -> Self {
        let widgets = Arc::new(widgets);
        let generator: Arc<dyn TokenGenerator> =
            Arc::new(ContentHashGenerator::new(widgets.clone()));
        Self::with_parts(
            Arc::new(ConditionalCache::new(generator)),
            widgets,
            widget_mutations(),
            generation_timeout,
        )
    }

    /// Assembles state from explicitly constructed parts.
    pub fn with_parts(
        cache: Arc<ConditionalCache>,
        widgets: Arc<WidgetRepository>,
        registry: MutationRegistry,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            cache,
            widgets,
            registry: Arc::new(registry),
            generation_timeout,
            // Widget handlers ignore the query string
            key_extractor: path_key(),
        }
    }

    /// Replaces the read key policy.
    pub fn with_key_extractor(mut self, key_extractor: KeyExtractor) -> Self {
        self.key_extractor = key_extractor;
        self
    }

    /// Identity a read on `uri` is cached under.
    pub fn resource_identity(&self, uri: &Uri) -> ResourceIdentity {
        (self.key_extractor)(uri)
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(WidgetRepository::new(), config.generation_timeout())
    }
}

/// Handler for GET /widgets
pub async fn list_widgets(State(state): State<AppState>) -> Result<Json<Vec<Widget>>> {
    Ok(Json(state.widgets.list()?))
}

/// Handler for POST /widgets
pub async fn create_widget(
    State(state): State<AppState>,
    Json(req): Json<WidgetRequest>,
) -> Result<(StatusCode, Json<Widget>)> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let widget = state.widgets.create(req)?;
    Ok((StatusCode::CREATED, Json(widget)))
}

/// Resolves the `:id` segment. Only the canonical decimal form addresses a
/// widget, so `/widgets/01` and `/widgets/+1` are not aliases of `/widgets/1`.
fn widget_id(raw: &str) -> Result<u64> {
    parse_widget_id(raw).ok_or_else(|| ApiError::NotFound(format!("Widget {} not found", raw)))
}

/// Handler for GET /widgets/:id
pub async fn get_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Widget>> {
    Ok(Json(state.widgets.get(widget_id(&id)?)?))
}

/// Handler for PUT /widgets/:id
pub async fn update_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<WidgetRequest>,
) -> Result<Json<Widget>> {
    let id = widget_id(&id)?;
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    Ok(Json(state.widgets.update(id, req)?))
}

/// Handler for DELETE /widgets/:id
pub async fn delete_widget(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.widgets.delete(widget_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(WidgetRepository::new(), Duration::from_secs(2))
    }

    fn request(name: &str, quantity: u32) -> WidgetRequest {
        WidgetRequest {
            name: name.to_string(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_handler() {
        let state = test_state();

        let (status, created) = create_widget(State(state.clone()), Json(request("bolt", 3)))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let fetched = get_widget(State(state), Path(created.id.to_string()))
            .await
            .unwrap();
        assert_eq!(fetched.name, "bolt");
        assert_eq!(fetched.quantity, 3);
    }

    #[tokio::test]
    async fn test_get_missing_widget() {
        let result = get_widget(State(test_state()), Path("42".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_non_canonical_id_is_not_found() {
        let state = test_state();
        create_widget(State(state.clone()), Json(request("bolt", 3)))
            .await
            .unwrap();

        for raw in ["01", "+1", "1.0", " 1"] {
            let result = get_widget(State(state.clone()), Path(raw.to_string())).await;
            assert!(matches!(result, Err(ApiError::NotFound(_))), "{raw}");

            let result =
                update_widget(State(state.clone()), Path(raw.to_string()), Json(request("x", 1)))
                    .await;
            assert!(matches!(result, Err(ApiError::NotFound(_))), "{raw}");
        }
        assert_eq!(state.widgets.get(1).unwrap().name, "bolt");
    }

    #[test]
    fn test_resource_identity_ignores_query() {
        let state = test_state();
        let uri: Uri = "/widgets?page=2".parse().unwrap();
        assert_eq!(state.resource_identity(&uri), ResourceIdentity::new("/widgets"));

        let state = state.with_key_extractor(crate::api::uri_key());
        assert_eq!(
            state.resource_identity(&uri),
            ResourceIdentity::new("/widgets?page=2")
        );
    }

    #[tokio::test]
    async fn test_update_handler() {
        let state = test_state();
        create_widget(State(state.clone()), Json(request("bolt", 3)))
            .await
            .unwrap();

        let updated = update_widget(State(state), Path("1".to_string()), Json(request("bolt", 9)))
            .await
            .unwrap();
        assert_eq!(updated.quantity, 9);
    }

    #[tokio::test]
    async fn test_delete_handler() {
        let state = test_state();
        create_widget(State(state.clone()), Json(request("bolt", 3)))
            .await
            .unwrap();

        let status = delete_widget(State(state.clone()), Path("1".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let listed = list_widgets(State(state)).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_create_invalid_request() {
        let result = create_widget(State(test_state()), Json(request("", 1))).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let response = stats_handler(State(test_state())).await;
        assert_eq!(response.short_circuits, 0);
        assert_eq!(response.total_tokens, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
