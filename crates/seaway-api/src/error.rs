//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use seaway_core::{Classify, FaultKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error into the narrowest matching variant so domain
  /// failures surface as 4xx instead of a blanket 500.
  pub fn from_store<E>(err: E) -> Self
  where
    E: std::error::Error + Classify + Send + Sync + 'static,
  {
    match err.fault_kind() {
      FaultKind::NotFound => ApiError::NotFound(err.to_string()),
      FaultKind::Validation => ApiError::BadRequest(err.to_string()),
      FaultKind::Conflict => ApiError::Conflict(err.to_string()),
      FaultKind::Internal => ApiError::Store(Box::new(err)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use axum::{body, http::StatusCode, response::IntoResponse as _};
  use serde_json::Value;
  use uuid::Uuid;

  use super::ApiError;

  #[tokio::test]
  async fn lost_repair_race_maps_to_409_with_json_body() {
    // A concurrent reassignment on the same agent is the one retryable
    // failure; it must surface as a conflict, not a 500.
    let err =
      ApiError::from_store(seaway_core::Error::RelationConflict(Uuid::new_v4()));
    assert!(matches!(err, ApiError::Conflict(_)));

    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let bytes = body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(
      value["error"].as_str().unwrap().contains("retry"),
      "body: {value}"
    );
  }

  #[test]
  fn store_errors_classify_to_the_narrowest_variant() {
    let id = Uuid::new_v4();
    assert!(matches!(
      ApiError::from_store(seaway_core::Error::LeadNotFound(id)),
      ApiError::NotFound(_)
    ));
    assert!(matches!(
      ApiError::from_store(seaway_core::Error::NothingToReassign),
      ApiError::BadRequest(_)
    ));
    assert!(matches!(
      ApiError::from_store(seaway_core::Error::Serialization(
        serde_json::from_str::<Value>("not json").unwrap_err()
      )),
      ApiError::Store(_)
    ));
  }
}
