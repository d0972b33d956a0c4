use super::{string_entity_serde, Entity, TryNewEntity};
use crate::error::*;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, fmt};
use validator::Validate;

/// Numeric role identifier. Roles are expected to be disjoint powers of two (1, 2, 4, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RoleId(i64);

impl RoleId {
  pub fn new(value: i64) -> Result<Self> {
    ensure!(value >= 0, "Role id must be non-negative: {value}");
    Ok(Self(value))
  }
  pub fn get(&self) -> i64 {
    self.0
  }
}
impl TryFrom<i64> for RoleId {
  type Error = Error;
  fn try_from(value: i64) -> Result<Self> {
    Self::new(value)
  }
}
impl From<RoleId> for i64 {
  fn from(value: RoleId) -> Self {
    value.0
  }
}
impl fmt::Display for RoleId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct RoleName {
  #[validate(length(min = 1))]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for RoleName {
  fn new(input: T) -> Result<Self> {
    let value = input.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for RoleName {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}
string_entity_serde!(RoleName, "role name string");

/// Entry of the role catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub role_id: RoleId,
  pub role: RoleName,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn negative_role_id_is_rejected() {
    assert!(RoleId::new(-1).is_err());
    assert!(serde_json::from_str::<RoleId>("-4").is_err());
    assert_eq!(serde_json::from_str::<RoleId>("4").unwrap().get(), 4);
  }

  #[test]
  fn role_serializes_flat() {
    let role = Role {
      role_id: RoleId::new(2).unwrap(),
      role: RoleName::new("admin").unwrap(),
    };
    assert_eq!(
      serde_json::to_value(&role).unwrap(),
      serde_json::json!({"role_id": 2, "role": "admin"})
    );
  }
}
