mod role_table;
mod session_table;
mod user_table;

use crate::{
  constants::{ADMIN_EMAIL, ADMIN_ROLE_ID, ADMIN_ROLE_NAME, ADMIN_USERNAME},
  entity::{
    Email, Entity, Password, Role, RoleId, RoleName, SessionId, SessionRecord, TryNewEntity, User, UserId, Username,
  },
  error::*,
  log::*,
};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{future::Future, str::FromStr, time::Duration};

pub use role_table::SqliteRoleTable;
pub use session_table::SqliteSessionTable;
pub use user_table::SqliteUserTable;

pub enum UserSearchKey<'a> {
  Id(&'a UserId),
  Email(&'a Email),
  Username(&'a Username),
}

/// Session Record Store
#[async_trait]
pub trait SessionTable {
  async fn insert(&self, record: &SessionRecord) -> Result<SessionId>;
  async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<SessionRecord>>;
  async fn exists_access_token(&self, user_id: &UserId, access_token: &str) -> Result<bool>;
  /// Replace both token values of the record `id` if it still holds `previous_refresh`.
  /// Returns false when no such record exists anymore.
  async fn update_tokens(
    &self,
    id: &SessionId,
    previous_refresh: &str,
    access_token: &str,
    refresh_token: &str,
  ) -> Result<bool>;
}

/// Unique user column an insert collided with. Returned by `UserTable::add` inside the `anyhow` error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DuplicateColumn {
  #[error("email has been used")]
  Email,
  #[error("username has been used")]
  Username,
}

impl DuplicateColumn {
  pub fn message(&self) -> &'static str {
    match self {
      DuplicateColumn::Email => "email has been used",
      DuplicateColumn::Username => "username has been used",
    }
  }
}

#[async_trait]
pub trait UserTable {
  /// Fails with a `DuplicateColumn` error when the email or username is taken
  async fn add(&self, user: &User) -> Result<()>;
  async fn find_user<'a>(&self, user_search_key: UserSearchKey<'a>) -> Result<Option<User>>;
  async fn list_users(&self) -> Result<Vec<User>>;
  async fn update_role(&self, user_id: &UserId, role: &Role) -> Result<bool>;
}

/// Role Catalog
#[async_trait]
pub trait RoleTable {
  async fn list_roles(&self, filter: Option<RoleId>) -> Result<Vec<Role>>;
  async fn add_role(&self, role: &Role) -> Result<()>;
}

/// Run one store operation with an upper bound on its duration. A timeout is reported as a store fault.
pub(crate) async fn bounded<T, E, F>(timeout: Duration, operation: F) -> Result<T>
where
  F: Future<Output = std::result::Result<T, E>>,
  E: Into<Error>,
{
  match tokio::time::timeout(timeout, operation).await {
    Ok(res) => res.map_err(Into::into),
    Err(_) => {
      error!("Store operation did not finish within {} ms", timeout.as_millis());
      bail!("Store operation timed out");
    }
  }
}

/// Setup sqlite database with automatic creation of user, role and session tables
pub async fn setup_sqlite(
  sqlite_url: &str,
  store_timeout: Duration,
  admin_password: Option<Password>,
) -> Result<(SqliteUserTable, SqliteSessionTable, SqliteRoleTable)> {
  let conn_opts = SqliteConnectOptions::from_str(sqlite_url)?.create_if_missing(true);
  let pool_opts = if sqlite_url.contains(":memory:") {
    // an in-memory database lives as long as its single connection
    SqlitePoolOptions::new()
      .max_connections(1)
      .idle_timeout(None)
      .max_lifetime(None)
  } else {
    SqlitePoolOptions::new()
  };
  let pool = pool_opts.connect_with(conn_opts).await?;

  // Embed migrations into binary
  sqlx::migrate!("./migrations").run(&pool).await?;

  let user_table = SqliteUserTable::new(pool.clone(), store_timeout);
  let session_table = SqliteSessionTable::new(pool.clone(), store_timeout);
  let role_table = SqliteRoleTable::new(pool, store_timeout);

  // Check existence of admin
  let admin_name = Username::new(ADMIN_USERNAME)?;
  let res = user_table.find_user(UserSearchKey::Username(&admin_name)).await?;
  if res.is_none() {
    let password = match admin_password {
      Some(p) => p,
      None => {
        let p = Password::generate();
        warn!(
          r#"
-----------------------------------------------------------------------------------------------------------------------
No admin user exist in DB. So we generate the user of name "admin" with a random password.
Admin password: {}
Note the admin password is never automatically overridden by ADMIN_PASSWORD if "admin" exists in user table.
-----------------------------------------------------------------------------------------------------------------------
"#,
          p.as_str()
        );
        p
      }
    };
    let admin = User::new(
      &Email::new(ADMIN_EMAIL)?,
      &admin_name,
      &password,
      &RoleName::new(ADMIN_ROLE_NAME)?,
      RoleId::new(ADMIN_ROLE_ID)?,
    )?;
    user_table.add(&admin).await?;
    info!("Admin user created: {}", admin.user_id.as_str());
  }

  Ok((user_table, session_table, role_table))
}
