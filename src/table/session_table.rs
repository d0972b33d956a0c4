use super::{bounded, SessionTable};
use crate::{constants::SESSION_TABLE_NAME, entity::*, error::*};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SqliteSessionTable {
  pool: SqlitePool,
  timeout: Duration,
}

impl SqliteSessionTable {
  pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
    Self { pool, timeout }
  }
}

#[async_trait]
impl SessionTable for SqliteSessionTable {
  async fn insert(&self, record: &SessionRecord) -> Result<SessionId> {
    let sql = format!(
      "insert into {} (id, user_id, access_token, refresh_token, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
      SESSION_TABLE_NAME
    );
    let query = sqlx::query(&sql)
      .bind(record.id.as_str())
      .bind(record.user_id.as_str())
      .bind(record.access_token.as_str())
      .bind(record.refresh_token.as_str())
      .bind(record.created_at.timestamp())
      .bind(record.updated_at.timestamp());
    bounded(self.timeout, query.execute(&self.pool)).await?;
    Ok(record.id.clone())
  }

  async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<SessionRecord>> {
    let sql = format!("select * from {} where refresh_token = ?", SESSION_TABLE_NAME);
    let query = sqlx::query_as::<_, SessionRow>(&sql).bind(refresh_token);
    let row_opt = bounded(self.timeout, query.fetch_optional(&self.pool)).await?;
    row_opt.map(SessionRecord::try_from).transpose()
  }

  async fn exists_access_token(&self, user_id: &UserId, access_token: &str) -> Result<bool> {
    let sql = format!(
      "select count(*) from {} where user_id = ? and access_token = ?",
      SESSION_TABLE_NAME
    );
    let query = sqlx::query_scalar::<_, i64>(&sql)
      .bind(user_id.as_str())
      .bind(access_token);
    let count = bounded(self.timeout, query.fetch_one(&self.pool)).await?;
    Ok(count > 0)
  }

  async fn update_tokens(
    &self,
    id: &SessionId,
    previous_refresh: &str,
    access_token: &str,
    refresh_token: &str,
  ) -> Result<bool> {
    // single statement so that the pair is replaced together, and only once per refresh token
    let sql = format!(
      "update {} set access_token = ?, refresh_token = ?, updated_at = ? where id = ? and refresh_token = ?",
      SESSION_TABLE_NAME
    );
    let query = sqlx::query(&sql)
      .bind(access_token)
      .bind(refresh_token)
      .bind(Utc::now().timestamp())
      .bind(id.as_str())
      .bind(previous_refresh);
    let res = bounded(self.timeout, query.execute(&self.pool)).await?;
    Ok(res.rows_affected() == 1)
  }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
  id: String,
  user_id: String,
  access_token: String,
  refresh_token: String,
  created_at: i64,
  updated_at: i64,
}

impl TryFrom<SessionRow> for SessionRecord {
  type Error = Error;

  fn try_from(row: SessionRow) -> Result<Self> {
    let timestamp = |secs: i64| -> Result<DateTime<Utc>> {
      DateTime::from_timestamp(secs, 0).ok_or_else(|| anyhow!("Invalid session timestamp: {secs}"))
    };
    Ok(SessionRecord {
      id: SessionId::new(row.id)?,
      user_id: UserId::new(row.user_id)?,
      access_token: row.access_token,
      refresh_token: row.refresh_token,
      created_at: timestamp(row.created_at)?,
      updated_at: timestamp(row.updated_at)?,
    })
  }
}
