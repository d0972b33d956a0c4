use super::{string_entity_serde, Entity, TryNewEntity};
use crate::{
  constants::{ARGON2_CONFIG, ARGON2_SALT_LEN, PASSWORD_LEN},
  error::*,
};
use rand::{distributions::Alphanumeric, thread_rng, Rng, RngCore};
use std::borrow::Cow;
use validator::Validate;

#[derive(Debug, Clone, Validate)]
pub struct Password {
  #[validate(length(min = 1))]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for Password {
  fn new(password: T) -> Result<Self> {
    let value = password.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for Password {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}
string_entity_serde!(Password, "password string");

impl Password {
  /// Random alphanumeric password, used when no admin password is supplied at bootstrap
  pub fn generate() -> Self {
    let value = thread_rng()
      .sample_iter(&Alphanumeric)
      .take(PASSWORD_LEN)
      .map(char::from)
      .collect();
    Self { value }
  }

  /// Check the password against a stored argon2 encoded hash
  pub fn verify(&self, encoded_hash: &EncodedHash) -> Result<bool> {
    let matches = argon2::verify_encoded(encoded_hash.as_str(), self.as_str().as_bytes())?;
    Ok(matches)
  }
}

/// Argon2id encoded hash including salt and parameters
#[derive(Debug, Clone, Validate)]
pub struct EncodedHash {
  #[validate(length(min = 1))]
  value: String,
}
impl<'a, T: Into<Cow<'a, str>>> TryNewEntity<T> for EncodedHash {
  fn new(encoded_hash: T) -> Result<Self> {
    let value = encoded_hash.into().to_string();
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
impl Entity for EncodedHash {
  fn as_str(&self) -> &str {
    &self.value
  }
  fn into_string(self) -> String {
    self.value
  }
}

impl EncodedHash {
  pub fn generate(password: &Password) -> Result<Self> {
    let mut salt = [0u8; ARGON2_SALT_LEN];
    thread_rng().fill_bytes(&mut salt);
    let value = argon2::hash_encoded(password.as_str().as_bytes(), &salt, &ARGON2_CONFIG)?;
    let object = Self { value };
    object.validate()?;
    Ok(object)
  }
}
