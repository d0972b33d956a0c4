use super::{json_body, request::RefreshRequest};
use crate::{error::*, jwt::Realm, passport::Passport, state::AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

pub async fn refresh(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<Passport>, AuthError> {
  let request = json_body(payload)?;
  let passport = state.refresh(&request.refresh_token, Realm::Customer).await?;
  Ok(Json(passport))
}

pub async fn refresh_admin(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<Passport>, AuthError> {
  let request = json_body(payload)?;
  let passport = state.refresh(&request.refresh_token, Realm::Admin).await?;
  Ok(Json(passport))
}
