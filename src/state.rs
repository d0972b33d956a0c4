use crate::{
  entity::User,
  error::*,
  jwt::{IdentityClaims, Realm, TokenAudience, TokenCodec, VerifiedToken},
  role::RoleNameMap,
  table::{SqliteRoleTable, SqliteSessionTable, SqliteUserTable},
};
use std::net::SocketAddr;

/// Access and refresh token strings minted together
#[derive(Debug, Clone)]
pub struct TokenPair {
  pub access_token: String,
  pub refresh_token: String,
}

pub struct CryptoState {
  pub codec: TokenCodec,
}

impl CryptoState {
  /// Fresh access + refresh pair for the user, both counted from now
  pub fn generate_token_pair(&self, user: &User, realm: Realm) -> Result<TokenPair> {
    let identity = IdentityClaims::from(user);
    Ok(TokenPair {
      access_token: self.codec.issue(realm.access(), &identity)?,
      refresh_token: self.codec.issue(realm.refresh(), &identity)?,
    })
  }
  pub fn verify_token(&self, audience: TokenAudience, token: &str) -> std::result::Result<VerifiedToken, TokenError> {
    self.codec.verify(audience, token)
  }
}

pub struct TableState {
  pub user: SqliteUserTable,
  pub session: SqliteSessionTable,
  pub role: SqliteRoleTable,
}

pub struct AppState {
  pub listen_socket: SocketAddr,
  pub crypto: CryptoState,
  pub table: TableState,
  /// Names accepted by named-role authorization
  pub role_names: RoleNameMap,
}
