use crate::entity::{Email, Password, Role, RoleId, RoleName, Username};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct SignUpRequest {
  pub email: Email,
  pub username: Username,
  pub password: Password,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SignInRequest {
  pub email: Email,
  pub password: Password,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RefreshRequest {
  pub refresh_token: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RoleRequest {
  pub role_id: RoleId,
  pub role: RoleName,
}

impl From<RoleRequest> for Role {
  fn from(value: RoleRequest) -> Self {
    Role {
      role_id: value.role_id,
      role: value.role,
    }
  }
}
