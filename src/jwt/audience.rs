use crate::{
  constants::{ACCESS_TOKEN_SUBJECT, ADMIN_REFRESH_TOKEN_SUBJECT, ADMIN_ROLE_ID, ADMIN_TOKEN_SUBJECT, REFRESH_TOKEN_SUBJECT},
  entity::RoleId,
};
use std::fmt;

/// Intended consumer class of a token. Customer and admin audiences are signed with different secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAudience {
  CustomerAccess,
  CustomerRefresh,
  AdminAccess,
  AdminRefresh,
}

impl TokenAudience {
  /// Purpose tag written into the `sub` claim
  pub fn subject(&self) -> &'static str {
    match self {
      TokenAudience::CustomerAccess => ACCESS_TOKEN_SUBJECT,
      TokenAudience::CustomerRefresh => REFRESH_TOKEN_SUBJECT,
      TokenAudience::AdminAccess => ADMIN_TOKEN_SUBJECT,
      TokenAudience::AdminRefresh => ADMIN_REFRESH_TOKEN_SUBJECT,
    }
  }
  pub fn is_admin(&self) -> bool {
    matches!(self, TokenAudience::AdminAccess | TokenAudience::AdminRefresh)
  }
  pub fn is_refresh(&self) -> bool {
    matches!(self, TokenAudience::CustomerRefresh | TokenAudience::AdminRefresh)
  }
}

impl fmt::Display for TokenAudience {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.subject())
  }
}

/// Pairs an access audience with its refresh audience
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Realm {
  Customer,
  Admin,
}

impl Realm {
  /// Admins (role id 2) sign in to the admin realm, everyone else to the customer realm
  pub fn of_role(role_id: RoleId) -> Self {
    if role_id.get() == ADMIN_ROLE_ID {
      Realm::Admin
    } else {
      Realm::Customer
    }
  }
  pub fn access(&self) -> TokenAudience {
    match self {
      Realm::Customer => TokenAudience::CustomerAccess,
      Realm::Admin => TokenAudience::AdminAccess,
    }
  }
  pub fn refresh(&self) -> TokenAudience {
    match self {
      Realm::Customer => TokenAudience::CustomerRefresh,
      Realm::Admin => TokenAudience::AdminRefresh,
    }
  }
}
