use crate::{
  entity::UserProfile,
  error::*,
  middleware::Identity,
  state::AppState,
  table::{UserSearchKey, UserTable},
};
use axum::{extract::State, Extension, Json};
use std::sync::Arc;

/// Profile of the caller. The path id has already been matched against the caller by `param_check`.
pub async fn get_user_profile(
  State(state): State<Arc<AppState>>,
  Extension(identity): Extension<Identity>,
) -> Result<Json<UserProfile>, AuthError> {
  let Some(user) = state.table.user.find_user(UserSearchKey::Id(&identity.user_id)).await? else {
    return Err(AuthError::ProfileNotFound);
  };
  Ok(Json(user.profile()))
}
