use super::{
  audience::TokenAudience,
  claims::{CustomClaims, IdentityClaims, VerifiedToken},
};
use crate::{
  constants::{ADMIN_ACCESS_EXPIRES_SECS, ADMIN_AUDIENCE},
  entity::Entity,
  error::*,
  log::*,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jwt_simple::{prelude::*, JWTError};
use std::collections::HashSet;
use uuid::Uuid;

/// Settings read once at startup
#[derive(Debug, Clone)]
pub struct JwtSettings {
  pub issuer: String,
  pub customer_secret: String,
  pub admin_secret: String,
  pub access_lifetime_secs: u64,
  pub refresh_lifetime_secs: u64,
}

/// HS256 token codec holding one key per audience class
pub struct TokenCodec {
  customer_key: HS256Key,
  admin_key: HS256Key,
  issuer: String,
  access_lifetime_secs: u64,
  refresh_lifetime_secs: u64,
}

impl TokenCodec {
  pub fn new(settings: &JwtSettings) -> Result<Self> {
    ensure!(
      !settings.customer_secret.is_empty() && !settings.admin_secret.is_empty(),
      "Token secrets must not be empty"
    );
    ensure!(
      settings.customer_secret != settings.admin_secret,
      "Customer and admin token secrets must differ"
    );
    ensure!(!settings.issuer.is_empty(), "Token issuer must not be empty");

    Ok(Self {
      customer_key: HS256Key::from_bytes(settings.customer_secret.as_bytes()),
      admin_key: HS256Key::from_bytes(settings.admin_secret.as_bytes()),
      issuer: settings.issuer.clone(),
      access_lifetime_secs: settings.access_lifetime_secs,
      refresh_lifetime_secs: settings.refresh_lifetime_secs,
    })
  }

  /// Lifetime applied by `issue`. Admin access tokens ignore the configured access lifetime.
  pub fn lifetime_secs(&self, audience: TokenAudience) -> u64 {
    match audience {
      TokenAudience::CustomerAccess => self.access_lifetime_secs,
      TokenAudience::AdminAccess => ADMIN_ACCESS_EXPIRES_SECS,
      TokenAudience::CustomerRefresh | TokenAudience::AdminRefresh => self.refresh_lifetime_secs,
    }
  }

  /// Sign a fresh token whose expiry counts from now
  pub fn issue(&self, audience: TokenAudience, identity: &IdentityClaims) -> Result<String> {
    let valid_for = Duration::from_secs(self.lifetime_secs(audience));
    let claims = self.build_claims(audience, identity, valid_for);
    self.sign(audience, identity, claims)
  }

  /// Sign a refresh token that keeps the absolute expiry `expires_at` (unix seconds) of the token it replaces
  pub fn reissue_with_fixed_expiry(
    &self,
    audience: TokenAudience,
    identity: &IdentityClaims,
    expires_at: u64,
  ) -> Result<String> {
    ensure!(audience.is_refresh(), "Only refresh tokens are reissued: {audience}");
    let mut claims = self.build_claims(audience, identity, Duration::from_secs(0));
    claims.expires_at = Some(Duration::from_secs(expires_at));
    self.sign(audience, identity, claims)
  }

  /// Verify a token string under the secret, subject tag and issuer of the given audience
  pub fn verify(&self, audience: TokenAudience, token: &str) -> std::result::Result<VerifiedToken, TokenError> {
    check_structure(token)?;

    let options = VerificationOptions {
      required_subject: Some(audience.subject().to_string()),
      allowed_issuers: Some(HashSet::from([self.issuer.clone()])),
      // expiry is absolute, no leeway
      time_tolerance: Some(Duration::from_secs(0)),
      ..Default::default()
    };
    let claims = self
      .key(audience)
      .verify_token::<CustomClaims>(token, Some(options))
      .map_err(|e| {
        let error = classify(&e);
        debug!("{audience} token rejected ({error}): {e}");
        error
      })?;

    let Some(expires_at) = claims.expires_at else {
      return Err(TokenError::InvalidClaims);
    };
    Ok(VerifiedToken {
      subject: claims.subject.unwrap_or_default(),
      audiences: claims
        .audiences
        .map(|a| a.into_set().into_iter().collect())
        .unwrap_or_default(),
      issued_at: claims.issued_at.map(|t| t.as_secs()).unwrap_or_default(),
      expires_at: expires_at.as_secs(),
      claims: claims.custom.claims,
    })
  }

  fn key(&self, audience: TokenAudience) -> &HS256Key {
    if audience.is_admin() {
      &self.admin_key
    } else {
      &self.customer_key
    }
  }

  fn build_claims(
    &self,
    audience: TokenAudience,
    identity: &IdentityClaims,
    valid_for: Duration,
  ) -> JWTClaims<CustomClaims> {
    let token_audience = if audience.is_admin() {
      ADMIN_AUDIENCE.to_string()
    } else {
      identity.role.as_str().to_string()
    };
    let custom = CustomClaims {
      claims: identity.clone(),
    };
    Claims::with_custom_claims(custom, valid_for)
      .with_issuer(&self.issuer)
      .with_subject(audience.subject())
      .with_audiences(HashSet::from([token_audience]))
      .with_jwt_id(Uuid::new_v4().to_string())
  }

  fn sign(&self, audience: TokenAudience, identity: &IdentityClaims, claims: JWTClaims<CustomClaims>) -> Result<String> {
    let token = self
      .key(audience)
      .authenticate(claims)
      .map_err(|e| anyhow!("Failed to sign {audience} token: {e}"))?;
    info!("Issued {audience} token for user {}", identity.id.as_str());
    Ok(token)
  }
}

/// Reject anything that is not `header.claims.signature` with a JSON header declaring HS256
fn check_structure(token: &str) -> std::result::Result<(), TokenError> {
  let parts = token.split('.').collect::<Vec<_>>();
  let [header, claims, signature] = parts.as_slice() else {
    return Err(TokenError::MalformedToken);
  };
  if signature.is_empty() || URL_SAFE_NO_PAD.decode(signature).is_err() || URL_SAFE_NO_PAD.decode(claims).is_err() {
    return Err(TokenError::MalformedToken);
  }
  let header = URL_SAFE_NO_PAD
    .decode(header)
    .map_err(|_| TokenError::MalformedToken)?;
  let header: serde_json::Value = serde_json::from_slice(&header).map_err(|_| TokenError::MalformedToken)?;
  match header.get("alg").and_then(|v| v.as_str()) {
    Some("HS256") => Ok(()),
    _ => Err(TokenError::MalformedToken),
  }
}

fn classify(error: &jwt_simple::Error) -> TokenError {
  if let Some(jwt_error) = error.downcast_ref::<JWTError>() {
    return match jwt_error {
      JWTError::InvalidAuthenticationTag => TokenError::WrongAudienceSecret,
      JWTError::TokenHasExpired => TokenError::ExpiredToken,
      _ => TokenError::InvalidClaims,
    };
  }
  if error.downcast_ref::<serde_json::Error>().is_some() {
    TokenError::InvalidClaims
  } else {
    TokenError::MalformedToken
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::entity::{RoleId, RoleName, TryNewEntity, UserId};

  fn settings() -> JwtSettings {
    JwtSettings {
      issuer: "role-gate-test".to_string(),
      customer_secret: "customer-secret".to_string(),
      admin_secret: "admin-secret".to_string(),
      access_lifetime_secs: 3600,
      refresh_lifetime_secs: 7200,
    }
  }

  fn identity() -> IdentityClaims {
    IdentityClaims {
      id: UserId::new("user-1").unwrap(),
      role: RoleName::new("user").unwrap(),
      role_id: RoleId::new(1).unwrap(),
    }
  }

  fn now() -> u64 {
    chrono::Utc::now().timestamp() as u64
  }

  #[test]
  fn secrets_must_be_distinct() {
    let mut s = settings();
    s.admin_secret = s.customer_secret.clone();
    assert!(TokenCodec::new(&s).is_err());
    s.admin_secret = String::new();
    assert!(TokenCodec::new(&s).is_err());
  }

  #[test]
  fn issued_token_verifies_under_own_audience() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let token = codec.issue(TokenAudience::CustomerAccess, &identity()).unwrap();
    assert_eq!(token.split('.').count(), 3);

    let verified = codec.verify(TokenAudience::CustomerAccess, &token).unwrap();
    assert_eq!(verified.claims, identity());
    assert_eq!(verified.subject, "access-token");
    assert_eq!(verified.audiences, vec!["user".to_string()]);
    assert_eq!(verified.expires_at - verified.issued_at, 3600);
  }

  #[test]
  fn claims_are_nested_on_the_wire() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let token = codec.issue(TokenAudience::CustomerRefresh, &identity()).unwrap();
    let payload = token.split('.').nth(1).unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
    assert_eq!(
      payload["claims"],
      serde_json::json!({"id": "user-1", "role": "user", "role_id": 1})
    );
    assert_eq!(payload["sub"], "refresh-token");
    assert_eq!(payload["iss"], "role-gate-test");
  }

  #[test]
  fn audiences_do_not_cross() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let customer = codec.issue(TokenAudience::CustomerAccess, &identity()).unwrap();
    let admin = codec.issue(TokenAudience::AdminAccess, &identity()).unwrap();
    assert_eq!(
      codec.verify(TokenAudience::AdminAccess, &customer).unwrap_err(),
      TokenError::WrongAudienceSecret
    );
    assert_eq!(
      codec.verify(TokenAudience::CustomerAccess, &admin).unwrap_err(),
      TokenError::WrongAudienceSecret
    );
  }

  #[test]
  fn refresh_token_is_not_an_access_token() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let refresh = codec.issue(TokenAudience::CustomerRefresh, &identity()).unwrap();
    assert_eq!(
      codec.verify(TokenAudience::CustomerAccess, &refresh).unwrap_err(),
      TokenError::InvalidClaims
    );
  }

  #[test]
  fn admin_access_is_short_lived() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let token = codec.issue(TokenAudience::AdminAccess, &identity()).unwrap();
    let verified = codec.verify(TokenAudience::AdminAccess, &token).unwrap();
    assert_eq!(verified.expires_at - verified.issued_at, ADMIN_ACCESS_EXPIRES_SECS);
    assert_eq!(verified.audiences, vec!["admin".to_string()]);

    let refresh = codec.issue(TokenAudience::AdminRefresh, &identity()).unwrap();
    let verified = codec.verify(TokenAudience::AdminRefresh, &refresh).unwrap();
    assert_eq!(verified.expires_at - verified.issued_at, 7200);
  }

  #[test]
  fn reissue_keeps_expiry() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let original = codec.issue(TokenAudience::CustomerRefresh, &identity()).unwrap();
    let original_claims = codec.verify(TokenAudience::CustomerRefresh, &original).unwrap();

    let reissued = codec
      .reissue_with_fixed_expiry(TokenAudience::CustomerRefresh, &identity(), original_claims.expires_at)
      .unwrap();
    assert_ne!(original, reissued);
    let reissued_claims = codec.verify(TokenAudience::CustomerRefresh, &reissued).unwrap();
    assert_eq!(reissued_claims.expires_at, original_claims.expires_at);

    assert!(codec
      .reissue_with_fixed_expiry(TokenAudience::CustomerAccess, &identity(), original_claims.expires_at)
      .is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let token = codec
      .reissue_with_fixed_expiry(TokenAudience::AdminRefresh, &identity(), now() - 3600)
      .unwrap();
    assert_eq!(
      codec.verify(TokenAudience::AdminRefresh, &token).unwrap_err(),
      TokenError::ExpiredToken
    );
  }

  #[test]
  fn token_is_expired_right_after_its_expiry() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let token = codec
      .reissue_with_fixed_expiry(TokenAudience::CustomerRefresh, &identity(), now() - 1)
      .unwrap();
    assert_eq!(
      codec.verify(TokenAudience::CustomerRefresh, &token).unwrap_err(),
      TokenError::ExpiredToken
    );
  }

  #[test]
  fn malformed_tokens() {
    let codec = TokenCodec::new(&settings()).unwrap();
    for token in ["", "abc", "a.b", "not.a.token", "a.b.c.d"] {
      assert_eq!(
        codec.verify(TokenAudience::CustomerAccess, token).unwrap_err(),
        TokenError::MalformedToken,
        "{token}"
      );
    }
    let token = codec.issue(TokenAudience::CustomerAccess, &identity()).unwrap();
    let unsigned = format!("{}.", token.rsplit_once('.').unwrap().0);
    assert_eq!(
      codec.verify(TokenAudience::CustomerAccess, &unsigned).unwrap_err(),
      TokenError::MalformedToken
    );
  }

  #[test]
  fn missing_identity_claims_are_invalid() {
    let s = settings();
    let codec = TokenCodec::new(&s).unwrap();
    let foreign = HS256Key::from_bytes(s.customer_secret.as_bytes())
      .authenticate(
        Claims::create(Duration::from_secs(60))
          .with_issuer(&s.issuer)
          .with_subject("access-token"),
      )
      .unwrap();
    assert_eq!(
      codec.verify(TokenAudience::CustomerAccess, &foreign).unwrap_err(),
      TokenError::InvalidClaims
    );
  }

  #[test]
  fn issuer_is_enforced() {
    let codec = TokenCodec::new(&settings()).unwrap();
    let mut other = settings();
    other.issuer = "someone-else".to_string();
    let other = TokenCodec::new(&other).unwrap();
    let token = other.issue(TokenAudience::CustomerAccess, &identity()).unwrap();
    assert_eq!(
      codec.verify(TokenAudience::CustomerAccess, &token).unwrap_err(),
      TokenError::InvalidClaims
    );
  }
}
