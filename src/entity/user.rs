use super::{string_entity_serde, EncodedHash, Entity, Password, RoleId, RoleName, TryNewEntity};
use crate::error::*;
use serde::Serialize;
use std::borrow::Cow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Validate)]
pub struct UserId {
  #[validate(length(min = 1))]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for UserId {
  fn new(user_id: T) -> Result<Self> {
    let value = user_id.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for UserId {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}
string_entity_serde!(UserId, "user id string");
impl UserId {
  pub fn generate() -> Self {
    Self {
      value: Uuid::new_v4().to_string(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Email {
  #[validate(email)]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for Email {
  fn new(email: T) -> Result<Self> {
    let value = email.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for Email {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}
string_entity_serde!(Email, "email string");

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct Username {
  #[validate(length(min = 1))]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for Username {
  fn new(username: T) -> Result<Self> {
    let value = username.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for Username {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}
string_entity_serde!(Username, "username string");

/// Stored user profile with its credential
#[derive(Debug, Clone)]
pub struct User {
  pub user_id: UserId,
  pub email: Email,
  pub username: Username,
  pub encoded_hash: EncodedHash,
  pub role: RoleName,
  pub role_id: RoleId,
}

impl User {
  pub fn new(email: &Email, username: &Username, password: &Password, role: &RoleName, role_id: RoleId) -> Result<Self> {
    Ok(Self {
      user_id: UserId::generate(),
      email: email.to_owned(),
      username: username.to_owned(),
      encoded_hash: EncodedHash::generate(password)?,
      role: role.to_owned(),
      role_id,
    })
  }

  pub fn profile(&self) -> UserProfile {
    UserProfile {
      id: self.user_id.clone(),
      email: self.email.clone(),
      username: self.username.clone(),
      role: self.role.clone(),
      role_id: self.role_id,
    }
  }
}

/// Public view of a user, never carrying the password hash
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
  pub id: UserId,
  pub email: Email,
  pub username: Username,
  pub role: RoleName,
  pub role_id: RoleId,
}
