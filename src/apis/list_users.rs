use super::response::UserListResponse;
use crate::{error::*, log::*, state::AppState, table::UserTable};
use axum::{extract::State, Json};
use std::sync::Arc;

pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<UserListResponse>, AuthError> {
  let users = state.table.user.list_users().await?;
  debug!("Listing {} users", users.len());
  Ok(Json(UserListResponse {
    users: users.iter().map(|u| u.profile()).collect(),
  }))
}
