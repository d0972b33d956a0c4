use super::{json_body, request::SignUpRequest};
use crate::{
  constants::{ADMIN_ROLE_ID, CUSTOMER_ROLE_ID},
  entity::RoleId,
  error::*,
  passport::Passport,
  state::AppState,
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;

/// Open registration, always as a customer
pub async fn sign_up(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Passport>), AuthError> {
  register(&state, json_body(payload)?, CUSTOMER_ROLE_ID).await
}

/// Registration of another admin by an admin
pub async fn sign_up_admin(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Passport>), AuthError> {
  register(&state, json_body(payload)?, ADMIN_ROLE_ID).await
}

async fn register(
  state: &AppState,
  request: SignUpRequest,
  role_id: i64,
) -> Result<(StatusCode, Json<Passport>), AuthError> {
  let passport = state
    .sign_up(&request.email, &request.username, &request.password, RoleId::new(role_id)?)
    .await?;
  Ok((StatusCode::CREATED, Json(passport)))
}
