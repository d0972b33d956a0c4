use crate::entity::{Role, UserProfile};
use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct MessageResponse {
  pub message: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct UserListResponse {
  pub users: Vec<UserProfile>,
}

#[derive(Serialize, Debug, Clone)]
pub struct RoleListResponse {
  pub roles: Vec<Role>,
}
