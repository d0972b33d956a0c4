use crate::{
  entity::{Email, Entity, Password, RoleId, SessionId, SessionRecord, User, UserProfile, Username},
  error::*,
  jwt::{IdentityClaims, Realm},
  log::*,
  state::AppState,
  table::{DuplicateColumn, RoleTable, SessionTable, UserSearchKey, UserTable},
};
use serde::Serialize;

/// A user profile, with the token pair of its session when one was issued
#[derive(Debug, Clone, Serialize)]
pub struct Passport {
  pub user: UserProfile,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub token: Option<UserToken>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserToken {
  /// Session record id, stable across refreshes
  pub id: SessionId,
  pub access_token: String,
  pub refresh_token: String,
}

impl AppState {
  /// Register a user under a role taken from the role catalog
  pub async fn sign_up(
    &self,
    email: &Email,
    username: &Username,
    password: &Password,
    role_id: RoleId,
  ) -> Result<Passport, AuthError> {
    let Some(role) = self.table.role.list_roles(Some(role_id)).await?.into_iter().next() else {
      return Err(AuthError::InvalidRequest(format!("role {role_id} does not exist")));
    };
    if self.table.user.find_user(UserSearchKey::Email(email)).await?.is_some() {
      return Err(AuthError::DuplicateUser("email has been used"));
    }
    if self.table.user.find_user(UserSearchKey::Username(username)).await?.is_some() {
      return Err(AuthError::DuplicateUser("username has been used"));
    }

    let user = User::new(email, username, password, &role.role, role.role_id)?;
    // the checks above race with concurrent sign-ups; the unique columns decide
    if let Err(e) = self.table.user.add(&user).await {
      return Err(match e.downcast_ref::<DuplicateColumn>() {
        Some(column) => AuthError::DuplicateUser(column.message()),
        None => e.into(),
      });
    }
    info!("User {} signed up as {}", user.user_id.as_str(), role.role.as_str());

    Ok(Passport {
      user: user.profile(),
      token: None,
    })
  }

  /// Check the credential, mint a token pair and persist it as a new session.
  /// Admins get admin-audience tokens.
  pub async fn sign_in(&self, email: &Email, password: &Password) -> Result<Passport, AuthError> {
    let Some(user) = self.table.user.find_user(UserSearchKey::Email(email)).await? else {
      debug!("Sign-in for unknown email");
      return Err(AuthError::InvalidCredentials);
    };
    if !password.verify(&user.encoded_hash)? {
      debug!("Wrong password for user {}", user.user_id.as_str());
      return Err(AuthError::InvalidCredentials);
    }

    let realm = Realm::of_role(user.role_id);
    let pair = self.crypto.generate_token_pair(&user, realm)?;
    let record = SessionRecord::new(&user.user_id, pair.access_token, pair.refresh_token);
    let id = self.table.session.insert(&record).await?;
    info!("User {} signed in, session {}", user.user_id.as_str(), id.as_str());

    Ok(Passport {
      user: user.profile(),
      token: Some(UserToken {
        id,
        access_token: record.access_token,
        refresh_token: record.refresh_token,
      }),
    })
  }

  /// Rotate the session holding `refresh_token`.
  ///
  /// The new access token carries the current profile, so role changes apply from here on.
  /// The new refresh token keeps the expiry of the old one. The stored pair is replaced only
  /// if the record still holds `refresh_token`, which makes each refresh token single-use.
  pub async fn refresh(&self, refresh_token: &str, realm: Realm) -> Result<Passport, AuthError> {
    let verified = self
      .crypto
      .verify_token(realm.refresh(), refresh_token)
      .map_err(AuthError::InvalidRefreshToken)?;

    let Some(session) = self.table.session.find_by_refresh_token(refresh_token).await? else {
      debug!("No session holds the refresh token of user {}", verified.claims.id.as_str());
      return Err(AuthError::SessionNotFound);
    };
    if session.user_id != verified.claims.id {
      warn!(
        "Session {} belongs to {}, not to the token owner {}",
        session.id.as_str(),
        session.user_id.as_str(),
        verified.claims.id.as_str()
      );
      return Err(AuthError::SessionNotFound);
    }

    let Some(user) = self.table.user.find_user(UserSearchKey::Id(&session.user_id)).await? else {
      return Err(AuthError::ProfileNotFound);
    };

    let identity = IdentityClaims::from(&user);
    let access_token = self.crypto.codec.issue(realm.access(), &identity)?;
    let new_refresh_token = self
      .crypto
      .codec
      .reissue_with_fixed_expiry(realm.refresh(), &identity, verified.expires_at)?;

    let rotated = self
      .table
      .session
      .update_tokens(&session.id, refresh_token, &access_token, &new_refresh_token)
      .await?;
    if !rotated {
      // a concurrent refresh with the same token got there first
      debug!("Session {} was rotated concurrently", session.id.as_str());
      return Err(AuthError::SessionNotFound);
    }
    info!("Session {} rotated", session.id.as_str());

    Ok(Passport {
      user: user.profile(),
      token: Some(UserToken {
        id: session.id,
        access_token,
        refresh_token: new_refresh_token,
      }),
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    constants::{ADMIN_EMAIL, MANAGER_ROLE_ID},
    entity::{Role, RoleName, TryNewEntity, UserId},
    jwt::TokenAudience,
    test_utils::*,
  };

  fn token(passport: &Passport) -> &UserToken {
    passport.token.as_ref().unwrap()
  }

  #[tokio::test]
  async fn sign_in_persists_one_session() {
    let state = test_state().await;
    let profile = add_customer(&state, "alice").await;
    let passport = sign_in(&state, "alice").await;
    let token = token(&passport);
    assert_eq!(passport.user.id, profile.id);

    let session = state
      .table
      .session
      .find_by_refresh_token(&token.refresh_token)
      .await
      .unwrap()
      .unwrap();
    assert_eq!(session.id, token.id);
    assert!(state
      .table
      .session
      .exists_access_token(&profile.id, &token.access_token)
      .await
      .unwrap());

    let verified = state
      .crypto
      .verify_token(TokenAudience::CustomerAccess, &token.access_token)
      .unwrap();
    assert_eq!(verified.claims.id, profile.id);
    assert_eq!(verified.claims.role_id.get(), 1);
  }

  #[tokio::test]
  async fn wrong_credentials_are_rejected() {
    let state = test_state().await;
    add_customer(&state, "alice").await;
    let email = Email::new("alice@example.com").unwrap();
    let res = state.sign_in(&email, &Password::new("nope").unwrap()).await;
    assert!(matches!(res, Err(AuthError::InvalidCredentials)));

    let email = Email::new("bob@example.com").unwrap();
    let res = state.sign_in(&email, &Password::new("bob-password").unwrap()).await;
    assert!(matches!(res, Err(AuthError::InvalidCredentials)));
  }

  #[tokio::test]
  async fn duplicate_and_unknown_role_sign_up() {
    let state = test_state().await;
    add_customer(&state, "alice").await;
    let password = Password::new("pw").unwrap();

    let res = state
      .sign_up(
        &Email::new("alice@example.com").unwrap(),
        &Username::new("alice2").unwrap(),
        &password,
        RoleId::new(1).unwrap(),
      )
      .await;
    assert!(matches!(res, Err(AuthError::DuplicateUser(_))));

    let res = state
      .sign_up(
        &Email::new("alice2@example.com").unwrap(),
        &Username::new("alice").unwrap(),
        &password,
        RoleId::new(1).unwrap(),
      )
      .await;
    assert!(matches!(res, Err(AuthError::DuplicateUser(_))));

    let res = state
      .sign_up(
        &Email::new("carol@example.com").unwrap(),
        &Username::new("carol").unwrap(),
        &password,
        RoleId::new(64).unwrap(),
      )
      .await;
    assert!(matches!(res, Err(AuthError::InvalidRequest(_))));
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_sign_ups_with_one_email() {
    let state = std::sync::Arc::new(test_state().await);
    let handles = (0..8)
      .map(|_| {
        let state = state.clone();
        tokio::spawn(async move {
          state
            .sign_up(
              &Email::new("dup@example.com").unwrap(),
              &Username::new("dup").unwrap(),
              &Password::new("dup-password").unwrap(),
              RoleId::new(1).unwrap(),
            )
            .await
        })
      })
      .collect::<Vec<_>>();

    let mut created = 0;
    for handle in handles {
      match handle.await.unwrap() {
        Ok(_) => created += 1,
        Err(e) => {
          assert!(matches!(e, AuthError::DuplicateUser(_)), "{e:?}");
          assert_eq!(e.status(), axum::http::StatusCode::CONFLICT);
        }
      }
    }
    assert_eq!(created, 1);
  }

  #[tokio::test]
  async fn refresh_is_single_use_and_keeps_expiry() {
    let state = test_state().await;
    add_customer(&state, "alice").await;
    let signed_in = sign_in(&state, "alice").await;
    let original = token(&signed_in);

    let refreshed = state.refresh(&original.refresh_token, Realm::Customer).await.unwrap();
    let rotated = token(&refreshed);
    assert_eq!(rotated.id, original.id);
    assert_ne!(rotated.refresh_token, original.refresh_token);

    let before = state
      .crypto
      .verify_token(TokenAudience::CustomerRefresh, &original.refresh_token)
      .unwrap();
    let after = state
      .crypto
      .verify_token(TokenAudience::CustomerRefresh, &rotated.refresh_token)
      .unwrap();
    assert_eq!(before.expires_at, after.expires_at);

    // the old access token is no longer live
    assert!(!state
      .table
      .session
      .exists_access_token(&signed_in.user.id, &original.access_token)
      .await
      .unwrap());

    let replay = state.refresh(&original.refresh_token, Realm::Customer).await;
    assert!(matches!(replay, Err(AuthError::SessionNotFound)));

    // the rotated token keeps working
    assert!(state.refresh(&rotated.refresh_token, Realm::Customer).await.is_ok());
  }

  #[tokio::test]
  async fn refresh_picks_up_role_change() {
    let state = test_state().await;
    let profile = add_customer(&state, "alice").await;
    let signed_in = sign_in(&state, "alice").await;

    let manager = Role {
      role_id: RoleId::new(MANAGER_ROLE_ID).unwrap(),
      role: RoleName::new("manager").unwrap(),
    };
    assert!(state.table.user.update_role(&profile.id, &manager).await.unwrap());

    let refreshed = state
      .refresh(&token(&signed_in).refresh_token, Realm::Customer)
      .await
      .unwrap();
    let verified = state
      .crypto
      .verify_token(TokenAudience::CustomerAccess, &token(&refreshed).access_token)
      .unwrap();
    assert_eq!(verified.claims.role_id.get(), MANAGER_ROLE_ID);
    assert_eq!(verified.claims.role.as_str(), "manager");
    assert_eq!(refreshed.user.role_id.get(), MANAGER_ROLE_ID);
  }

  #[tokio::test]
  async fn refresh_rejects_wrong_tokens() {
    let state = test_state().await;
    add_customer(&state, "alice").await;
    let signed_in = sign_in(&state, "alice").await;
    let token = token(&signed_in);

    let res = state.refresh(&token.access_token, Realm::Customer).await;
    assert!(matches!(
      res,
      Err(AuthError::InvalidRefreshToken(TokenError::InvalidClaims))
    ));
    let res = state.refresh(&token.refresh_token, Realm::Admin).await;
    assert!(matches!(
      res,
      Err(AuthError::InvalidRefreshToken(TokenError::WrongAudienceSecret))
    ));
    let res = state.refresh("garbage", Realm::Customer).await;
    assert!(matches!(
      res,
      Err(AuthError::InvalidRefreshToken(TokenError::MalformedToken))
    ));
  }

  #[tokio::test]
  async fn refresh_without_profile() {
    let state = test_state().await;
    let identity = IdentityClaims {
      id: UserId::generate(),
      role: RoleName::new("user").unwrap(),
      role_id: RoleId::new(1).unwrap(),
    };
    let refresh_token = state
      .crypto
      .codec
      .issue(TokenAudience::CustomerRefresh, &identity)
      .unwrap();
    let record = SessionRecord::new(&identity.id, "access".to_string(), refresh_token.clone());
    state.table.session.insert(&record).await.unwrap();

    let res = state.refresh(&refresh_token, Realm::Customer).await;
    assert!(matches!(res, Err(AuthError::ProfileNotFound)));
  }

  #[tokio::test]
  async fn refresh_of_someone_elses_session() {
    let state = test_state().await;
    let alice = add_customer(&state, "alice").await;
    let bob = add_customer(&state, "bob").await;
    let identity = IdentityClaims {
      id: bob.id.clone(),
      role: bob.role.clone(),
      role_id: bob.role_id,
    };
    let refresh_token = state
      .crypto
      .codec
      .issue(TokenAudience::CustomerRefresh, &identity)
      .unwrap();
    let record = SessionRecord::new(&alice.id, "access".to_string(), refresh_token.clone());
    state.table.session.insert(&record).await.unwrap();

    let res = state.refresh(&refresh_token, Realm::Customer).await;
    assert!(matches!(res, Err(AuthError::SessionNotFound)));
  }

  #[tokio::test]
  async fn admin_signs_in_to_admin_realm() {
    let state = test_state().await;
    let passport = state
      .sign_in(&Email::new(ADMIN_EMAIL).unwrap(), &Password::new(ADMIN_PASSWORD).unwrap())
      .await
      .unwrap();
    let token = token(&passport);
    let verified = state
      .crypto
      .verify_token(TokenAudience::AdminAccess, &token.access_token)
      .unwrap();
    assert_eq!(verified.audiences, vec!["admin".to_string()]);
    assert!(state
      .crypto
      .verify_token(TokenAudience::CustomerAccess, &token.access_token)
      .is_err());

    let refreshed = state.refresh(&token.refresh_token, Realm::Admin).await.unwrap();
    assert!(state
      .crypto
      .verify_token(TokenAudience::AdminAccess, &refreshed.token.unwrap().access_token)
      .is_ok());
  }

  #[test]
  fn passport_wire_shape() {
    let profile = UserProfile {
      id: UserId::new("u1").unwrap(),
      email: Email::new("alice@example.com").unwrap(),
      username: Username::new("alice").unwrap(),
      role: RoleName::new("user").unwrap(),
      role_id: RoleId::new(1).unwrap(),
    };
    let passport = Passport {
      user: profile,
      token: None,
    };
    assert_eq!(
      serde_json::to_value(&passport).unwrap(),
      serde_json::json!({
        "user": {"id": "u1", "email": "alice@example.com", "username": "alice", "role": "user", "role_id": 1}
      })
    );
  }
}
