use crate::entity::{RoleId, RoleName, User, UserId};
use serde::{Deserialize, Serialize};

/// Identity embedded in every issued token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
  pub id: UserId,
  pub role: RoleName,
  pub role_id: RoleId,
}

impl From<&User> for IdentityClaims {
  fn from(user: &User) -> Self {
    Self {
      id: user.user_id.clone(),
      role: user.role.clone(),
      role_id: user.role_id,
    }
  }
}

/// Custom part of the JWT claim set, carried as `{"claims": {...}}` next to the registered claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct CustomClaims {
  pub claims: IdentityClaims,
}

/// Result of a successful verification
#[derive(Debug, Clone)]
pub struct VerifiedToken {
  pub claims: IdentityClaims,
  pub subject: String,
  pub audiences: Vec<String>,
  pub issued_at: u64,
  pub expires_at: u64,
}
