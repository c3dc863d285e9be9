//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Engine errors pass through with their `kind` discriminant so clients
//! can tell an authorization failure (403) from a state-machine failure
//! (409) without parsing messages.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Engine(#[from] redress_core::Error),

  #[error("{0}")]
  Internal(String),
}

impl ApiError {
  fn status_and_kind(&self) -> (StatusCode, &'static str) {
    match self {
      Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
      Self::Engine(e) => {
        let status = match e.kind() {
          "validation" => StatusCode::UNPROCESSABLE_ENTITY,
          "permission" => StatusCode::FORBIDDEN,
          // State and conflict failures share 409; the body's `kind`
          // field tells them apart.
          "state" | "conflict" => StatusCode::CONFLICT,
          "not_found" => StatusCode::NOT_FOUND,
          _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, e.kind())
      }
      Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, kind) = self.status_and_kind();
    let mut response = (
      status,
      Json(json!({ "error": self.to_string(), "kind": kind })),
    )
      .into_response();
    if status == StatusCode::UNAUTHORIZED {
      response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"redress\""),
      );
    }
    response
  }
}
