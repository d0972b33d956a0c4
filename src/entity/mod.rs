mod password;
mod role;
mod session;
mod user;

use crate::error::{Error, Result};

pub use password::{EncodedHash, Password};
pub use role::{Role, RoleId, RoleName};
pub use session::{SessionId, SessionRecord};
pub use user::{Email, User, UserId, UserProfile, Username};

pub trait Entity
where
  Self: std::marker::Sized,
{
  fn as_str(&self) -> &str;
  fn into_string(self) -> String;
}

pub trait TryNewEntity<T>
where
  Self: std::marker::Sized,
{
  fn new(input: T) -> Result<Self, Error>;
}

/// Serialize/Deserialize string entities through `TryNewEntity` so that every value read from the wire is validated
macro_rules! string_entity_serde {
  ($name:ident, $expecting:literal) => {
    impl serde::Serialize for $name {
      fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
      where
        S: serde::Serializer,
      {
        serializer.serialize_str($crate::entity::Entity::as_str(self))
      }
    }

    impl<'de> serde::Deserialize<'de> for $name {
      fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
      where
        D: serde::Deserializer<'de>,
      {
        struct EntityVisitor;
        impl<'de> serde::de::Visitor<'de> for EntityVisitor {
          type Value = String;
          fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str($expecting)
          }
          fn visit_str<E>(self, str: &str) -> std::result::Result<Self::Value, E>
          where
            E: serde::de::Error,
          {
            Ok(str.to_owned())
          }
        }

        let value = deserializer.deserialize_str(EntityVisitor)?;
        <$name as $crate::entity::TryNewEntity<String>>::new(value).map_err(serde::de::Error::custom)
      }
    }
  };
}
pub(crate) use string_entity_serde;
