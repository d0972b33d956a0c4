use super::Identity;
use crate::{
  constants::ROLE_VECTOR_WIDTH,
  entity::Entity,
  error::*,
  log::*,
  role,
  state::AppState,
  table::RoleTable,
};
use axum::{
  extract::{Path, Request, State},
  middleware::Next,
  response::Response,
};
use std::sync::Arc;

/// Numeric-role authorization middleware state. Runs after `jwt_auth`.
#[derive(Clone)]
pub struct Authorize {
  state: Arc<AppState>,
  permitted_role_ids: Arc<[i64]>,
}

impl Authorize {
  pub fn new(state: Arc<AppState>, permitted_role_ids: &[i64]) -> Self {
    Self {
      state,
      permitted_role_ids: permitted_role_ids.into(),
    }
  }

  pub async fn check(&self, identity: Option<&Identity>) -> Result<(), AuthError> {
    let Some(identity) = identity else {
      return Err(AuthError::UserIdNotFound);
    };
    let caller = identity.user_role_id;

    let catalog = match self.state.table.role.list_roles(Some(caller)).await {
      Ok(catalog) => catalog,
      Err(e) => {
        error!("Role catalog lookup for role {caller} failed: {e}");
        return Err(AuthError::RoleCatalogUnavailable);
      }
    };
    let catalogued = self
      .permitted_role_ids
      .iter()
      .any(|id| catalog.iter().any(|entry| entry.role_id.get() == *id));
    if !catalogued {
      debug!("No permitted role {:?} found in catalog for role {caller}", self.permitted_role_ids);
      return Err(AuthError::PermissionDenied);
    }

    if !role::authorize(caller.get(), &self.permitted_role_ids, ROLE_VECTOR_WIDTH) {
      debug!(
        "User {} with role {caller} is not in {:?}",
        identity.user_id.as_str(),
        self.permitted_role_ids
      );
      return Err(AuthError::PermissionDenied);
    }
    Ok(())
  }
}

/// Named-role authorization middleware state. Requires an exact role match.
#[derive(Clone)]
pub struct AuthorizeByName {
  state: Arc<AppState>,
  names: Arc<[&'static str]>,
}

impl AuthorizeByName {
  pub fn new(state: Arc<AppState>, names: &[&'static str]) -> Self {
    Self {
      state,
      names: names.into(),
    }
  }

  pub fn check(&self, identity: Option<&Identity>) -> Result<(), AuthError> {
    let Some(identity) = identity else {
      return Err(AuthError::UserIdNotFound);
    };
    if !role::authorize_by_name(identity.user_role_id.get(), &self.names, &self.state.role_names) {
      debug!(
        "User {} with role {} is none of {:?}",
        identity.user_id.as_str(),
        identity.user_role_id,
        self.names
      );
      return Err(AuthError::PermissionDenied);
    }
    Ok(())
  }
}

pub async fn authorize(State(authorizer): State<Authorize>, request: Request, next: Next) -> Result<Response, AuthError> {
  let identity = request.extensions().get::<Identity>().cloned();
  authorizer.check(identity.as_ref()).await?;
  Ok(next.run(request).await)
}

pub async fn authorize_by_name(
  State(authorizer): State<AuthorizeByName>,
  request: Request,
  next: Next,
) -> Result<Response, AuthError> {
  authorizer.check(request.extensions().get::<Identity>())?;
  Ok(next.run(request).await)
}

/// The `:user_id` path parameter must name the authenticated caller
pub async fn param_check(Path(user_id): Path<String>, request: Request, next: Next) -> Result<Response, AuthError> {
  let Some(identity) = request.extensions().get::<Identity>() else {
    return Err(AuthError::UserIdNotFound);
  };
  if identity.user_id.as_str() != user_id {
    debug!("User {} asked for {user_id}", identity.user_id.as_str());
    return Err(AuthError::PermissionDenied);
  }
  Ok(next.run(request).await)
}
