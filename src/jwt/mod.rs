mod audience;
mod claims;
mod codec;

pub use audience::{Realm, TokenAudience};
pub use claims::{IdentityClaims, VerifiedToken};
pub use codec::{JwtSettings, TokenCodec};
