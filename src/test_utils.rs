use crate::{
  constants::{CUSTOMER_ROLE_ID, DEFAULT_TOKEN_ISSUER},
  entity::{Email, Password, RoleId, TryNewEntity, UserProfile, Username},
  jwt::{JwtSettings, TokenCodec},
  passport::Passport,
  role::RoleNameMap,
  state::{AppState, CryptoState, TableState},
  table::setup_sqlite,
};
use std::time::Duration;

pub(crate) const ADMIN_PASSWORD: &str = "admin-password";

/// State backed by a fresh in-memory database holding only the bootstrapped admin
pub(crate) async fn test_state() -> AppState {
  let (user, session, role) = setup_sqlite(
    "sqlite::memory:",
    Duration::from_secs(5),
    Some(Password::new(ADMIN_PASSWORD).unwrap()),
  )
  .await
  .unwrap();
  let codec = TokenCodec::new(&JwtSettings {
    issuer: DEFAULT_TOKEN_ISSUER.to_string(),
    customer_secret: "customer-secret-for-tests".to_string(),
    admin_secret: "admin-secret-for-tests".to_string(),
    access_lifetime_secs: 3600,
    refresh_lifetime_secs: 7200,
  })
  .unwrap();

  AppState {
    listen_socket: "127.0.0.1:0".parse().unwrap(),
    crypto: CryptoState { codec },
    table: TableState { user, session, role },
    role_names: RoleNameMap::default(),
  }
}

/// Sign up `name` as a customer with email `name@example.com` and password `name-password`
pub(crate) async fn add_customer(state: &AppState, name: &str) -> UserProfile {
  state
    .sign_up(
      &Email::new(format!("{name}@example.com")).unwrap(),
      &Username::new(name).unwrap(),
      &Password::new(format!("{name}-password")).unwrap(),
      RoleId::new(CUSTOMER_ROLE_ID).unwrap(),
    )
    .await
    .unwrap()
    .user
}

pub(crate) async fn sign_in(state: &AppState, name: &str) -> Passport {
  state
    .sign_in(
      &Email::new(format!("{name}@example.com")).unwrap(),
      &Password::new(format!("{name}-password")).unwrap(),
    )
    .await
    .unwrap()
}
