use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::{panic_response, GatewayError};
use crate::state::AppState;
use crate::translate::{TranslationRequest, TranslationResponse};

pub fn create_routes() -> Router<AppState> {
    let translation = Router::new()
        .route("/translate", post(translate))
        .route("/translate/batch", post(translate_batch))
        .route("/languages", get(get_languages));

    Router::new()
        // Health check
        .route("/api/health", get(health_check))
        .merge(translation.clone())
        // Legacy controller prefix
        .nest("/api/translation", translation)
        .layer(CatchPanicLayer::custom(panic_response))
}

fn invalid_body(err: JsonRejection) -> GatewayError {
    GatewayError::Validation(format!("Invalid request body: {}", err.body_text()))
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.translation.provider_name(),
        "cacheEntries": state.translation.cache_entries()
    }))
}

async fn translate(
    State(state): State<AppState>,
    payload: Result<Json<TranslationRequest>, JsonRejection>,
) -> Result<Json<TranslationResponse>, GatewayError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let response = state.translation.translate(&request).await?;
    Ok(Json(response))
}

async fn translate_batch(
    State(state): State<AppState>,
    payload: Result<Json<Vec<TranslationRequest>>, JsonRejection>,
) -> Result<Json<Vec<TranslationResponse>>, GatewayError> {
    let Json(requests) = payload.map_err(invalid_body)?;
    let responses = state.translation.translate_batch(&requests).await?;
    Ok(Json(responses))
}

async fn get_languages(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.translation.supported_languages())
}
