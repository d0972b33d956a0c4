use super::{bounded, RoleTable};
use crate::{constants::ROLE_TABLE_NAME, entity::*, error::*};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SqliteRoleTable {
  pool: SqlitePool,
  timeout: Duration,
}

impl SqliteRoleTable {
  pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
    Self { pool, timeout }
  }
}

#[async_trait]
impl RoleTable for SqliteRoleTable {
  async fn list_roles(&self, filter: Option<RoleId>) -> Result<Vec<Role>> {
    let rows = match filter {
      Some(role_id) => {
        let sql = format!("select * from {} where role_id = ? order by role_id", ROLE_TABLE_NAME);
        let query = sqlx::query_as::<_, RoleRow>(&sql).bind(role_id.get());
        bounded(self.timeout, query.fetch_all(&self.pool)).await?
      }
      None => {
        let sql = format!("select * from {} order by role_id", ROLE_TABLE_NAME);
        let query = sqlx::query_as::<_, RoleRow>(&sql);
        bounded(self.timeout, query.fetch_all(&self.pool)).await?
      }
    };
    rows.into_iter().map(Role::try_from).collect()
  }

  async fn add_role(&self, role: &Role) -> Result<()> {
    let sql = format!("insert into {} (role_id, role) VALUES (?, ?)", ROLE_TABLE_NAME);
    let query = sqlx::query(&sql).bind(role.role_id.get()).bind(role.role.as_str());
    bounded(self.timeout, query.execute(&self.pool)).await?;
    Ok(())
  }
}

#[derive(Debug, sqlx::FromRow)]
struct RoleRow {
  role_id: i64,
  role: String,
}

impl TryFrom<RoleRow> for Role {
  type Error = Error;

  fn try_from(row: RoleRow) -> Result<Self> {
    Ok(Role {
      role_id: RoleId::new(row.role_id)?,
      role: RoleName::new(row.role)?,
    })
  }
}
