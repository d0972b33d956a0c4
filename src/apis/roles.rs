use super::{
  json_body,
  request::RoleRequest,
  response::{MessageResponse, RoleListResponse},
};
use crate::{
  entity::{Entity, Role, RoleId},
  error::*,
  log::*,
  state::AppState,
  table::RoleTable,
};
use axum::{
  extract::{
    rejection::{JsonRejection, QueryRejection},
    Query, State,
  },
  http::StatusCode,
  Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize, Debug, Clone)]
pub struct RoleQuery {
  pub role_id: Option<RoleId>,
}

/// Role catalog, optionally narrowed with `?role_id=`
pub async fn list_roles(
  State(state): State<Arc<AppState>>,
  query: Result<Query<RoleQuery>, QueryRejection>,
) -> Result<Json<RoleListResponse>, AuthError> {
  let Query(query) = query.map_err(|e| AuthError::InvalidRequest(e.body_text()))?;
  let roles = state.table.role.list_roles(query.role_id).await?;
  Ok(Json(RoleListResponse { roles }))
}

pub async fn create_role(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
  let role: Role = json_body(payload)?.into();
  if role.role_id.get().count_ones() != 1 {
    return Err(AuthError::InvalidRequest(format!(
      "role id {} must be a power of two",
      role.role_id
    )));
  }
  let existing = state.table.role.list_roles(None).await?;
  if existing
    .iter()
    .any(|r| r.role_id == role.role_id || r.role == role.role)
  {
    return Err(AuthError::InvalidRequest(format!(
      "role {} ({}) already exists",
      role.role.as_str(),
      role.role_id
    )));
  }

  state.table.role.add_role(&role).await?;
  info!("Role {} ({}) created", role.role.as_str(), role.role_id);
  Ok((
    StatusCode::CREATED,
    Json(MessageResponse {
      message: "ok. created the role.".to_string(),
    }),
  ))
}
