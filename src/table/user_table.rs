use super::{bounded, DuplicateColumn, UserSearchKey, UserTable};
use crate::{constants::USER_TABLE_NAME, entity::*, error::*};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SqliteUserTable {
  pool: SqlitePool,
  timeout: Duration,
}

impl SqliteUserTable {
  pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
    Self { pool, timeout }
  }
}

#[async_trait]
impl UserTable for SqliteUserTable {
  async fn add(&self, user: &User) -> Result<()> {
    let sql = format!(
      "insert into {} (user_id, email, username, encoded_hash, role, role_id) VALUES (?, ?, ?, ?, ?, ?)",
      USER_TABLE_NAME
    );
    let query = sqlx::query(&sql)
      .bind(user.user_id.as_str())
      .bind(user.email.as_str())
      .bind(user.username.as_str())
      .bind(user.encoded_hash.as_str())
      .bind(user.role.as_str())
      .bind(user.role_id.get());
    bounded(self.timeout, async { query.execute(&self.pool).await.map_err(insert_error) }).await?;
    Ok(())
  }

  async fn find_user<'a>(&self, user_search_key: UserSearchKey<'a>) -> Result<Option<User>> {
    let (column, value) = match user_search_key {
      UserSearchKey::Id(user_id) => ("user_id", user_id.as_str()),
      UserSearchKey::Email(email) => ("email", email.as_str()),
      UserSearchKey::Username(username) => ("username", username.as_str()),
    };
    let sql = format!("select * from {} where {} = ?", USER_TABLE_NAME, column);
    let query = sqlx::query_as::<_, UserRow>(&sql).bind(value);
    let user_row_opt = bounded(self.timeout, query.fetch_optional(&self.pool)).await?;
    user_row_opt.map(User::try_from).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let sql = format!("select * from {} order by username", USER_TABLE_NAME);
    let query = sqlx::query_as::<_, UserRow>(&sql);
    let rows = bounded(self.timeout, query.fetch_all(&self.pool)).await?;
    rows.into_iter().map(User::try_from).collect()
  }

  async fn update_role(&self, user_id: &UserId, role: &Role) -> Result<bool> {
    let sql = format!("update {} set role = ?, role_id = ? where user_id = ?", USER_TABLE_NAME);
    let query = sqlx::query(&sql)
      .bind(role.role.as_str())
      .bind(role.role_id.get())
      .bind(user_id.as_str());
    let res = bounded(self.timeout, query.execute(&self.pool)).await?;
    Ok(res.rows_affected() == 1)
  }
}

/// Unique violations on email or username become `DuplicateColumn`, so concurrent sign-ups lose cleanly
fn insert_error(e: sqlx::Error) -> Error {
  if let sqlx::Error::Database(db_error) = &e {
    if db_error.is_unique_violation() {
      let message = db_error.message();
      if message.contains(&format!("{USER_TABLE_NAME}.email")) {
        return DuplicateColumn::Email.into();
      }
      if message.contains(&format!("{USER_TABLE_NAME}.username")) {
        return DuplicateColumn::Username.into();
      }
    }
  }
  e.into()
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
  user_id: String,
  email: String,
  username: String,
  encoded_hash: String,
  role: String,
  role_id: i64,
}

impl TryFrom<UserRow> for User {
  type Error = Error;

  fn try_from(row: UserRow) -> Result<Self> {
    Ok(User {
      user_id: UserId::new(row.user_id)?,
      email: Email::new(row.email)?,
      username: Username::new(row.username)?,
      encoded_hash: EncodedHash::new(row.encoded_hash)?,
      role: RoleName::new(row.role)?,
      role_id: RoleId::new(row.role_id)?,
    })
  }
}
