mod authenticate;
mod authorize;

use crate::entity::{RoleId, UserId};

pub use authenticate::{jwt_auth, JwtAuth, JwtAuthPolicy};
pub use authorize::{authorize, authorize_by_name, param_check, Authorize, AuthorizeByName};

/// Caller identity put into the request extensions by `jwt_auth`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
  pub user_id: UserId,
  pub user_role_id: RoleId,
}
