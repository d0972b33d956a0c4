use super::{json_body, request::SignInRequest};
use crate::{error::*, passport::Passport, state::AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use std::sync::Arc;

pub async fn sign_in(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<Passport>, AuthError> {
  let request = json_body(payload)?;
  let passport = state.sign_in(&request.email, &request.password).await?;
  Ok(Json(passport))
}
