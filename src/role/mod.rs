mod authorizer;
mod bit_vector;

pub use authorizer::{authorize, authorize_by_name, RoleNameMap};
pub use bit_vector::{bit_length, BitVector};
