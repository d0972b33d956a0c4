use super::{json_body, request::RoleRequest, response::MessageResponse};
use crate::{
  entity::{Entity, Role, TryNewEntity, UserId},
  error::*,
  log::*,
  state::AppState,
  table::{RoleTable, UserTable},
};
use axum::{
  extract::{rejection::JsonRejection, Path, State},
  Json,
};
use std::sync::Arc;

/// Move a user to another catalogued role. Takes effect on the user's next refresh.
pub async fn update_role(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
  payload: Result<Json<RoleRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, AuthError> {
  let role: Role = json_body(payload)?.into();
  let user_id = UserId::new(user_id).map_err(|e| AuthError::InvalidRequest(e.to_string()))?;

  let catalog = state.table.role.list_roles(Some(role.role_id)).await?;
  if !catalog.contains(&role) {
    return Err(AuthError::InvalidRequest(format!(
      "role {} ({}) is not in the catalog",
      role.role.as_str(),
      role.role_id
    )));
  }

  if !state.table.user.update_role(&user_id, &role).await? {
    return Err(AuthError::InvalidRequest(format!("user {} does not exist", user_id.as_str())));
  }
  info!("User {} moved to role {}", user_id.as_str(), role.role_id);

  Ok(Json(MessageResponse {
    message: "ok. updated the role.".to_string(),
  }))
}
