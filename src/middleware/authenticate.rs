use super::Identity;
use crate::{
  entity::Entity,
  error::*,
  jwt::{TokenAudience, VerifiedToken},
  log::*,
  state::AppState,
  table::SessionTable,
};
use axum::{
  extract::{Request, State},
  http::{header::AUTHORIZATION, HeaderMap},
  middleware::Next,
  response::Response,
};
use std::sync::Arc;

/// Which token audiences a route accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JwtAuthPolicy {
  pub allow_customer: bool,
  pub allow_admin: bool,
}

impl JwtAuthPolicy {
  pub const ANY: Self = Self {
    allow_customer: true,
    allow_admin: true,
  };
  pub const CUSTOMER_ONLY: Self = Self {
    allow_customer: true,
    allow_admin: false,
  };
  pub const ADMIN_ONLY: Self = Self {
    allow_customer: false,
    allow_admin: true,
  };

  /// Audiences in the order they are tried. Customer comes first.
  fn audiences(&self) -> Vec<TokenAudience> {
    let mut audiences = Vec::with_capacity(2);
    if self.allow_customer {
      audiences.push(TokenAudience::CustomerAccess);
    }
    if self.allow_admin {
      audiences.push(TokenAudience::AdminAccess);
    }
    audiences
  }
}

/// Authentication middleware state, one per route group
#[derive(Clone)]
pub struct JwtAuth {
  pub state: Arc<AppState>,
  pub policy: JwtAuthPolicy,
}

impl JwtAuth {
  pub fn new(state: Arc<AppState>, policy: JwtAuthPolicy) -> Self {
    Self { state, policy }
  }

  /// Bearer credential -> verified token -> live session (customer only) -> identity
  pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let credential = bearer_credential(headers);
    let (audience, verified) = self.select_and_verify(credential)?;

    // admin tokens are not backed by a session record
    if !audience.is_admin() {
      let live = self
        .state
        .table
        .session
        .exists_access_token(&verified.claims.id, credential)
        .await?;
      if !live {
        debug!("Access token of user {} has no live session", verified.claims.id.as_str());
        return Err(AuthError::SessionNotFound);
      }
    }

    Ok(Identity {
      user_id: verified.claims.id,
      user_role_id: verified.claims.role_id,
    })
  }

  fn select_and_verify(&self, credential: &str) -> std::result::Result<(TokenAudience, VerifiedToken), TokenError> {
    let mut reason = None;
    for audience in self.policy.audiences() {
      match self.state.crypto.verify_token(audience, credential) {
        Ok(verified) => {
          debug!(
            "{} token of user {} verified (aud {:?}, iat {}, exp {})",
            verified.subject,
            verified.claims.id.as_str(),
            verified.audiences,
            verified.issued_at,
            verified.expires_at
          );
          return Ok((audience, verified));
        }
        Err(e) => {
          // a secret mismatch on a later audience says less than the earlier failure
          reason = match reason {
            Some(earlier) if e == TokenError::WrongAudienceSecret => Some(earlier),
            _ => Some(e),
          };
        }
      }
    }
    let reason = reason.unwrap_or(TokenError::WrongAudienceSecret);
    debug!("Bearer credential {} rejected: {reason}", redact(credential));
    Err(reason)
  }
}

/// Value of the Authorization header with a leading `Bearer ` removed. Missing header gives an empty string.
pub fn bearer_credential(headers: &HeaderMap) -> &str {
  let value = headers
    .get(AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();
  value.strip_prefix("Bearer ").unwrap_or(value)
}

/// For `axum::middleware::from_fn_with_state`
pub async fn jwt_auth(State(auth): State<JwtAuth>, mut request: Request, next: Next) -> Result<Response, AuthError> {
  let identity = auth.authenticate(request.headers()).await?;
  request.extensions_mut().insert(identity);
  Ok(next.run(request).await)
}
