mod health_check;
mod list_users;
mod refresh;
mod request;
mod response;
mod roles;
mod sign_in;
mod sign_up;
mod update_role;
mod user_profile;

pub use health_check::health_check;
pub use list_users::list_users;
pub use refresh::{refresh, refresh_admin};
pub use roles::{create_role, list_roles};
pub use sign_in::sign_in;
pub use sign_up::{sign_up, sign_up_admin};
pub use update_role::update_role;
pub use user_profile::get_user_profile;

use crate::{
  constants::{ADMIN_ROLE_ID, ADMIN_ROLE_NAME, MANAGER_ROLE_NAME},
  error::AuthError,
  middleware::{authorize, authorize_by_name, jwt_auth, param_check, Authorize, AuthorizeByName, JwtAuth, JwtAuthPolicy},
  state::AppState,
};
use axum::{
  extract::rejection::JsonRejection,
  middleware::{from_fn, from_fn_with_state},
  routing::{get, patch, post},
  Json, Router,
};
use std::sync::Arc;

/// Body rejections are reported in the same JSON shape as every other failure
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
  match payload {
    Ok(Json(body)) => Ok(body),
    Err(rejection) => Err(AuthError::InvalidRequest(rejection.body_text())),
  }
}

pub fn router(shared_state: Arc<AppState>) -> Router {
  let admin_auth = JwtAuth::new(shared_state.clone(), JwtAuthPolicy::ADMIN_ONLY);
  let any_auth = JwtAuth::new(shared_state.clone(), JwtAuthPolicy::ANY);
  let admin_role = Authorize::new(shared_state.clone(), &[ADMIN_ROLE_ID]);
  let staff_roles = AuthorizeByName::new(shared_state.clone(), &[ADMIN_ROLE_NAME, MANAGER_ROLE_NAME]);

  let public_routes = Router::new()
    .route("/signup", post(sign_up))
    .route("/sign-in", post(sign_in))
    .route("/refresh", post(refresh))
    .route("/refresh-admin", post(refresh_admin));

  // route layers run bottom-up: authentication first
  let admin_routes = Router::new()
    .route("/signup-admin", post(sign_up_admin))
    .route("/get-all-user", get(list_users))
    .route("/update-role/:user_id", patch(update_role))
    .route("/create-role", post(create_role))
    .route_layer(from_fn_with_state(admin_role, authorize))
    .route_layer(from_fn_with_state(admin_auth, jwt_auth));

  let staff_routes = Router::new()
    .route("/roles", get(list_roles))
    .route_layer(from_fn_with_state(staff_roles, authorize_by_name))
    .route_layer(from_fn_with_state(any_auth.clone(), jwt_auth));

  let profile_routes = Router::new()
    .route("/:user_id", get(get_user_profile))
    .route_layer(from_fn(param_check))
    .route_layer(from_fn_with_state(any_auth, jwt_auth));

  let user_routes = public_routes
    .merge(admin_routes)
    .merge(staff_routes)
    .merge(profile_routes)
    .with_state(shared_state);

  Router::new()
    .route("/health", get(health_check))
    .nest("/api/users", user_routes)
}
