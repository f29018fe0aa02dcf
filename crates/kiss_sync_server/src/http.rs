//! HTTP surface: axum routes for `/sync` and `/rules`.

use crate::error::{ServerError, ServerResult};
use crate::handler::RequestHandler;
use axum::{
    async_trait,
    extract::{rejection::QueryRejection, FromRequest, FromRequestParts, Query, Request, State},
    http::header::{AUTHORIZATION, CONTENT_TYPE},
    http::request::Parts,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use kiss_storage::Record;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

/// Content type of the `/rules` response.
pub const RULES_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Builds the router serving `POST /sync` and `GET /rules`.
///
/// CORS is fully permissive: the extension calls from arbitrary origins.
pub fn router(handler: Arc<RequestHandler>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/sync", post(sync_handler))
        .route("/rules", get(rules_handler))
        .layer(cors)
        .with_state(handler)
}

/// A verified `Authorization` header for `/sync`.
///
/// Runs before [`SyncPayload`], so a request with a bad credential is
/// rejected without its body being read.
#[derive(Debug)]
pub struct SyncAuth(pub Option<String>);

#[async_trait]
impl FromRequestParts<Arc<RequestHandler>> for SyncAuth {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        handler: &Arc<RequestHandler>,
    ) -> Result<Self, Self::Rejection> {
        let authorization = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        handler.authenticate_sync(authorization.as_deref())?;
        Ok(Self(authorization))
    }
}

/// A sync request body, accepted as JSON or as a URL-encoded form.
#[derive(Debug)]
pub struct SyncPayload(pub Record);

#[async_trait]
impl<S> FromRequest<S> for SyncPayload
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(false, |value| value.starts_with("application/json"));

        let record = if is_json {
            let Json(record) = Json::<Record>::from_request(req, state)
                .await
                .map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
            record
        } else {
            let Form(record) = Form::<Record>::from_request(req, state)
                .await
                .map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
            record
        };

        Ok(Self(record))
    }
}

#[derive(Debug, Deserialize)]
struct RulesQuery {
    psk: Option<String>,
}

async fn sync_handler(
    State(handler): State<Arc<RequestHandler>>,
    SyncAuth(authorization): SyncAuth,
    SyncPayload(record): SyncPayload,
) -> ServerResult<Json<Record>> {
    let record = run_blocking(move || handler.handle_sync(authorization.as_deref(), record)).await?;
    Ok(Json(record))
}

async fn rules_handler(
    State(handler): State<Arc<RequestHandler>>,
    query: Result<Query<RulesQuery>, QueryRejection>,
) -> ServerResult<Response> {
    let Query(query) = query.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;
    let value = run_blocking(move || handler.handle_rules(query.psk.as_deref())).await?;
    Ok(([(CONTENT_TYPE, RULES_CONTENT_TYPE)], value).into_response())
}

/// Runs store-touching work off the async runtime.
async fn run_blocking<T, F>(f: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> ServerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.is_client_error() {
            debug!(error = %self, "request rejected");
        }
        let body = serde_json::json!({ "message": self.public_message() });
        (self.status_code(), Json(body)).into_response()
    }
}
