use super::{string_entity_serde, Entity, TryNewEntity, UserId};
use crate::error::*;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use uuid::Uuid;
use validator::Validate;

/// Identity of a session record. It never changes across token rotations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Validate)]
pub struct SessionId {
  #[validate(length(min = 1))]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for SessionId {
  fn new(id: T) -> Result<Self> {
    let value = id.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for SessionId {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}
string_entity_serde!(SessionId, "session id string");

/// Access/refresh token pair representing one live login
#[derive(Debug, Clone)]
pub struct SessionRecord {
  pub id: SessionId,
  pub user_id: UserId,
  pub access_token: String,
  pub refresh_token: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
  pub fn new(user_id: &UserId, access_token: String, refresh_token: String) -> Self {
    let now = Utc::now();
    Self {
      id: SessionId {
        value: Uuid::new_v4().to_string(),
      },
      user_id: user_id.to_owned(),
      access_token,
      refresh_token,
      created_at: now,
      updated_at: now,
    }
  }
}
