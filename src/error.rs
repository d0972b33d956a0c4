pub use anyhow::{anyhow, bail, ensure, Error, Result};

use crate::log::*;
use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use serde_json::json;

/// Reasons a token string is rejected by the token codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
  #[error("token format is invalid")]
  MalformedToken,
  #[error("token had expired")]
  ExpiredToken,
  #[error("token signature does not match")]
  WrongAudienceSecret,
  #[error("token claims are invalid")]
  InvalidClaims,
}

/// Everything that aborts a request in the authentication and authorization chain
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
  #[error(transparent)]
  Token(#[from] TokenError),
  #[error("refresh token is invalid: {0}")]
  InvalidRefreshToken(TokenError),
  #[error("no live session for this token")]
  SessionNotFound,
  #[error("user profile not found")]
  ProfileNotFound,
  #[error("role catalog is unavailable")]
  RoleCatalogUnavailable,
  #[error("no permission to access")]
  PermissionDenied,
  #[error("user identity not found in request")]
  UserIdNotFound,
  #[error("authentication failed")]
  InvalidCredentials,
  #[error("{0}")]
  DuplicateUser(&'static str),
  #[error("invalid request: {0}")]
  InvalidRequest(String),
  #[error("internal failure: {0}")]
  Internal(#[from] Error),
}

impl AuthError {
  pub fn status(&self) -> StatusCode {
    match self {
      AuthError::Token(_)
      | AuthError::InvalidRefreshToken(_)
      | AuthError::SessionNotFound
      | AuthError::ProfileNotFound
      | AuthError::UserIdNotFound
      | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
      AuthError::PermissionDenied => StatusCode::FORBIDDEN,
      AuthError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
      AuthError::DuplicateUser(_) => StatusCode::CONFLICT,
      AuthError::RoleCatalogUnavailable | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for AuthError {
  fn into_response(self) -> Response {
    let status = self.status();
    // internal details stay in the log
    let error_message = match &self {
      AuthError::Internal(e) => {
        error!("Request aborted by internal failure: {e}");
        "something failed on the server".to_string()
      }
      e if status.is_server_error() => {
        error!("Request aborted: {e}");
        e.to_string()
      }
      e => {
        debug!("Request aborted: {e}");
        e.to_string()
      }
    };
    let body = Json(json!({
        "error": error_message,
    }));
    (status, body).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn only_store_faults_are_server_errors() {
    assert_eq!(
      AuthError::RoleCatalogUnavailable.status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
      AuthError::Internal(anyhow!("store timed out")).status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(AuthError::SessionNotFound.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      AuthError::from(TokenError::WrongAudienceSecret).status(),
      StatusCode::UNAUTHORIZED
    );
    assert_eq!(AuthError::PermissionDenied.status(), StatusCode::FORBIDDEN);
  }

  #[test]
  fn messages_are_prose() {
    assert_eq!(AuthError::from(TokenError::ExpiredToken).to_string(), "token had expired");
    assert_eq!(
      AuthError::InvalidRefreshToken(TokenError::MalformedToken).to_string(),
      "refresh token is invalid: token format is invalid"
    );
  }
}
