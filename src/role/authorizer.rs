use super::bit_vector::{bit_length, BitVector};
use crate::{
  constants::{ADMIN_ROLE_ID, ADMIN_ROLE_NAME, CUSTOMER_ROLE_ID, CUSTOMER_ROLE_NAME, MANAGER_ROLE_ID, MANAGER_ROLE_NAME},
  log::*,
};
use std::collections::BTreeMap;

/// Numeric form: permitted if the caller's role bit overlaps any bit of the summed permitted ids.
///
/// The comparison width is widened to fit both the caller id and the sum, so that a role id
/// larger than `vector_width` is never silently truncated into a wrong decision.
pub fn authorize(caller_role_id: i64, permitted_role_ids: &[i64], vector_width: usize) -> bool {
  let Ok(caller) = u64::try_from(caller_role_id) else {
    warn!("Negative caller role id {caller_role_id} is never permitted");
    return false;
  };
  let mut sum = 0u64;
  for id in permitted_role_ids {
    let Some(next) = u64::try_from(*id).ok().and_then(|id| sum.checked_add(id)) else {
      warn!("Permitted role ids {permitted_role_ids:?} cannot be summed into a bitmask");
      return false;
    };
    sum = next;
  }

  let width = vector_width.max(bit_length(caller)).max(bit_length(sum));
  if width > vector_width {
    warn!("Role vector width {vector_width} widened to {width} for caller {caller} and permitted mask {sum}");
  }

  let caller_vector = BitVector::encode(caller, width);
  let permitted_vector = BitVector::encode(sum, width);
  caller_vector.overlaps(&permitted_vector)
}

/// Named form: permitted if the caller's vector is exactly equal to one of the named roles' vectors.
/// Unknown names are ignored. The vector width is the number of known role names, widened like `authorize`.
pub fn authorize_by_name(caller_role_id: i64, names: &[&str], name_to_role_id: &RoleNameMap) -> bool {
  let Ok(caller) = u64::try_from(caller_role_id) else {
    return false;
  };
  if name_to_role_id.is_empty() {
    return false;
  }
  let named = names
    .iter()
    .filter_map(|name| name_to_role_id.get(name))
    .filter_map(|id| u64::try_from(id).ok())
    .collect::<Vec<_>>();

  let base_width = name_to_role_id.len();
  let width = named
    .iter()
    .map(|id| bit_length(*id))
    .fold(base_width.max(bit_length(caller)), usize::max);
  if width > base_width {
    warn!("Role vector width {base_width} widened to {width} for caller {caller}");
  }

  let caller_vector = BitVector::encode(caller, width);
  named.into_iter().any(|id| BitVector::encode(id, width) == caller_vector)
}

/// Mapping from role names to role ids used by named-role authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleNameMap {
  inner: BTreeMap<String, i64>,
}

impl Default for RoleNameMap {
  fn default() -> Self {
    Self::from_iter([
      (CUSTOMER_ROLE_NAME, CUSTOMER_ROLE_ID),
      (ADMIN_ROLE_NAME, ADMIN_ROLE_ID),
      (MANAGER_ROLE_NAME, MANAGER_ROLE_ID),
    ])
  }
}

impl<'a> FromIterator<(&'a str, i64)> for RoleNameMap {
  fn from_iter<T: IntoIterator<Item = (&'a str, i64)>>(iter: T) -> Self {
    Self {
      inner: iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
    }
  }
}

impl RoleNameMap {
  pub fn get(&self, name: &str) -> Option<i64> {
    self.inner.get(name).copied()
  }
  pub fn len(&self) -> usize {
    self.inner.len()
  }
  pub fn is_empty(&self) -> bool {
    self.inner.is_empty()
  }
}
