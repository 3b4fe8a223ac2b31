//! Caching Middleware
//!
//! Tower middleware binding the conditional cache into the request pipeline.
//!
//! - `conditional_get` answers `If-None-Match` hits with 304 and tags
//!   successful reads with an `ETag`
//! - `invalidate_on_mutation` clears tokens after registered mutations

use axum::{
    body::{Body, HttpBody},
    extract::{MatchedPath, Request, State},
    http::{
        header::{ETAG, IF_NONE_MATCH},
        HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::handlers::AppState;
use crate::cache::{Decision, ResourceIdentity, ValidatorToken};
use crate::error::GenerationError;

/// Largest response body hashed into an `ETag` (1MB). Larger bodies are
/// served untagged.
pub const MAX_TAGGED_BODY_BYTES: usize = 1024 * 1024;

// == Conditional GET ==
/// Short-circuits reads whose `If-None-Match` matches the current token.
///
/// On pass-through the handler runs normally and a 2xx response is tagged
/// with the content hash of the body actually being sent. If no token can be
/// attached the response is served untagged.
pub async fn conditional_get(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    if method != Method::GET && method != Method::HEAD {
        return next.run(request).await;
    }

    let id = state.resource_identity(request.uri());
    let client_token = request
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|raw| ValidatorToken::client_validator(raw).to_string());

    if let (Decision::ShortCircuit, Some(client)) = (
        state.cache.evaluate(&id, client_token.as_deref()),
        client_token.as_deref(),
    ) {
        debug!(
            "Aborting request since If-None-Match / ETag values match for {} {}",
            method, id
        );
        return not_modified(&ValidatorToken::new(client));
    }

    let epoch = state.cache.begin_read(&id);
    let response = next.run(request).await;
    if !response.status().is_success() {
        return response;
    }

    if method == Method::HEAD {
        // No body to hash; only a token produced by an earlier GET applies
        let mut response = response;
        if let Some(token) = state.cache.stored_validator(&id, epoch) {
            attach_etag(&mut response, &token);
        }
        return response;
    }

    tag_with_body_hash(&state, &id, epoch, response).await
}

/// Buffers the body, tags the response with its hash and installs the token.
async fn tag_with_body_hash(
    state: &AppState,
    id: &ResourceIdentity,
    epoch: u64,
    response: Response,
) -> Response {
    let within_limit = response
        .body()
        .size_hint()
        .upper()
        .is_some_and(|len| len <= MAX_TAGGED_BODY_BYTES as u64);
    if !within_limit {
        debug!("Serving {} without ETag, body too large to hash", id);
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_TAGGED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Failed to buffer response body for {}: {}", id, err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let mut response = Response::from_parts(parts, Body::from(bytes.clone()));
    match state.cache.tag_body(id, epoch, &bytes) {
        Ok(token) => attach_etag(&mut response, &token),
        Err(GenerationError::Superseded(_)) => {
            debug!("Serving {} without ETag, invalidated while responding", id);
        }
        Err(err) => {
            warn!("Serving {} without ETag: {}", id, err);
        }
    }

    response
}

fn attach_etag(response: &mut Response, token: &ValidatorToken) {
    if let Ok(value) = HeaderValue::from_str(&token.to_header_value()) {
        response.headers_mut().insert(ETAG, value);
    }
}

/// Empty 304 carrying the validator the client already holds.
fn not_modified(token: &ValidatorToken) -> Response {
    let mut response = (StatusCode::NOT_MODIFIED, Body::empty()).into_response();
    attach_etag(&mut response, token);
    response
}

// == Invalidate On Mutation ==
/// Runs the invalidation trigger around operations the registry marks as
/// mutating. A mutation counts as committed when its response is 2xx.
pub async fn invalidate_on_mutation(
    State(state): State<AppState>,
    matched: Option<MatchedPath>,
    request: Request,
    next: Next,
) -> Response {
    let binding = matched.and_then(|path| {
        state
            .registry
            .lookup(request.method(), path.as_str())
            .cloned()
    });
    let Some(binding) = binding else {
        return next.run(request).await;
    };

    let affected = binding.affected(request.uri());
    let trigger = state.cache.trigger();
    for id in &affected {
        trigger.before_invoke(id);
    }

    let response = next.run(request).await;

    let success = response.status().is_success();
    for id in &affected {
        trigger.after_invoke(id, success);
    }

    response
}
