//! HTTP Basic-auth extractor resolving request credentials to a stored
//! actor.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use redress_core::{actor::Actor, store::ComplaintStore};

use crate::{AppState, error::ApiError};

/// The authenticated actor for this request. Present in a handler's
/// signature means Basic auth succeeded and the actor exists.
pub struct AuthedActor(pub Actor);

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use rand_core::OsRng;

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|_| ApiError::Internal("password hashing failed".to_string()))
}

/// Verify Basic credentials against the actor store and return the actor.
pub async fn verify_basic<S>(
  headers: &HeaderMap,
  store: &S,
) -> Result<Actor, ApiError>
where
  S: ComplaintStore,
{
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let hash = store
    .password_hash(username)
    .await
    .map_err(|e| ApiError::Engine(e.into()))?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash =
    PasswordHash::new(&hash).map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  store
    .actor_by_username(username)
    .await
    .map_err(|e| ApiError::Engine(e.into()))?
    .ok_or(ApiError::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for AuthedActor
where
  S: ComplaintStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let actor =
      verify_basic(&parts.headers, state.engine.store().as_ref()).await?;
    Ok(AuthedActor(actor))
  }
}
