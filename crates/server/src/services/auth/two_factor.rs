//! TOTP second factor: verification at login, status, setup and disable.

use serde::Serialize;
use tracing::{info, instrument};

use pulp_core::Email;

use super::{AuthError, AuthService, Authentication, verify_password};
use crate::challenges::Challenge;
use crate::models::SessionUser;
use crate::services::tokens::{SECOND_FACTOR_PENDING, TOTP_SETUP_SECRET, TokenPayload};
use crate::services::totp::generate_secret;

/// Two-factor state of the current session user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TwoFactorStatus {
    /// Whether a TOTP secret is configured.
    pub setup: bool,
    /// Material for configuring one, present only when `setup` is false.
    #[serde(flatten)]
    pub pending: Option<PendingSetup>,
}

/// A freshly generated secret offered for setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSetup {
    /// Base32 secret to enrol in an authenticator app.
    pub secret: String,
    pub email: Email,
    /// Signed `totp_setup_secret` token to send back with the first code.
    pub setup_token: String,
}

impl AuthService<'_> {
    /// Complete a login with the TOTP code.
    ///
    /// `tmp_token` must be the second-factor-pending token handed out by the
    /// password step.
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the token is invalid or of the wrong type,
    /// the user no longer exists, or the code does not match.
    #[instrument(skip_all)]
    pub async fn verify_second_factor(
        &self,
        tmp_token: &str,
        totp_token: &str,
    ) -> Result<Authentication, AuthError> {
        let user_id = match self.state.tokens().verify(tmp_token)? {
            TokenPayload::SecondFactorPending { user_id } => user_id,
            other => {
                return Err(AuthError::WrongTokenType {
                    expected: SECOND_FACTOR_PENDING,
                    actual: other.kind(),
                });
            }
        };

        let user = self
            .state
            .store()
            .find_user(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self.state.totp().check(totp_token, &user.totp_secret) {
            return Err(AuthError::InvalidTotpCode);
        }

        let wurstbrot = format!("wurstbrot@{}", self.state.config().application.domain);
        self.state
            .challenges()
            .solve_if(Challenge::TwoFactorAuthUnsafeSecretStorage, || {
                user.email.as_str() == wurstbrot
            });

        self.issue_session(&user).await
    }

    /// Report whether `user` has 2FA configured, offering a new secret if not.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the setup token cannot be signed.
    pub fn two_factor_status(&self, user: &SessionUser) -> Result<TwoFactorStatus, AuthError> {
        if !user.totp_secret.is_empty() {
            return Ok(TwoFactorStatus {
                setup: true,
                pending: None,
            });
        }

        let secret = generate_secret();
        let setup_token = self.state.tokens().authorize(TokenPayload::TotpSetup {
            secret: secret.clone(),
        })?;

        Ok(TwoFactorStatus {
            setup: false,
            pending: Some(PendingSetup {
                secret,
                email: user.email.clone(),
                setup_token,
            }),
        })
    }

    /// Enable 2FA for the user of session `token`.
    ///
    /// `setup_token` carries the secret offered by [`Self::two_factor_status`];
    /// `initial_token` is a code generated from it, proving the authenticator
    /// was enrolled.
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the password is wrong, 2FA is already on,
    /// the setup token is invalid or of the wrong type, the code does not
    /// match, or the user no longer exists.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn setup_two_factor(
        &self,
        token: &str,
        user: &SessionUser,
        password: &str,
        setup_token: &str,
        initial_token: &str,
    ) -> Result<(), AuthError> {
        verify_password(password, &user.password_hash)?;

        if !user.totp_secret.is_empty() {
            return Err(AuthError::AlreadyConfigured);
        }

        let secret = match self.state.tokens().verify(setup_token)? {
            TokenPayload::TotpSetup { secret } => secret,
            other => {
                return Err(AuthError::WrongTokenType {
                    expected: TOTP_SETUP_SECRET,
                    actual: other.kind(),
                });
            }
        };

        if !self.state.totp().check(initial_token, &secret) {
            return Err(AuthError::InvalidTotpCode);
        }

        self.replace_secret(token, user, &secret).await?;
        info!("Two-factor authentication enabled");
        Ok(())
    }

    /// Disable 2FA for the user of session `token`.
    ///
    /// # Errors
    ///
    /// Returns an `AuthError` if the password is wrong or the user no longer
    /// exists.
    #[instrument(skip_all, fields(user_id = %user.id))]
    pub async fn disable_two_factor(
        &self,
        token: &str,
        user: &SessionUser,
        password: &str,
    ) -> Result<(), AuthError> {
        verify_password(password, &user.password_hash)?;

        self.replace_secret(token, user, "").await?;
        info!("Two-factor authentication disabled");
        Ok(())
    }

    /// Persist `secret` and refresh the cached session user.
    async fn replace_secret(
        &self,
        token: &str,
        user: &SessionUser,
        secret: &str,
    ) -> Result<(), AuthError> {
        let updated = self
            .state
            .store()
            .set_totp_secret(user.id, secret)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        self.state
            .sessions()
            .update(token, SessionUser::from_user(&updated))
            .await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use secrecy::SecretString;

    use super::*;
    use crate::config::ShopConfig;
    use crate::db::MemoryStore;
    use crate::models::{NewUser, User};
    use crate::services::auth::{LoginOutcome, hash_password};
    use crate::services::totp::Totp;
    use crate::state::AppState;

    const SECRET: &str = "IFTXE3SPOEYVURT2MRYGI52TKJ4HC3KH";

    fn state() -> AppState {
        let config = ShopConfig::in_memory(SecretString::from(
            "k3Jq9vXz2LmPw8RtYb6NcHd4FgAs7EuQ".to_owned(),
        ));
        AppState::new(config, Arc::new(MemoryStore::new()))
    }

    async fn add_user(state: &AppState, local: &str, password: &str, secret: &str) -> User {
        state
            .store()
            .create_user(NewUser {
                email: Email::with_domain(local, "pulp-sh.op").unwrap(),
                password_hash: hash_password(password).unwrap(),
                totp_secret: secret.to_owned(),
            })
            .await
            .unwrap()
    }

    async fn tmp_token(state: &AppState, email: &str, password: &str) -> String {
        match AuthService::new(state).login(email, password).await.unwrap() {
            LoginOutcome::SecondFactorRequired { tmp_token } => tmp_token,
            LoginOutcome::Authenticated(_) => panic!("expected second factor"),
        }
    }

    #[tokio::test]
    async fn test_verify_issues_session_and_solves_challenge() {
        let state = state();
        add_user(&state, "wurstbrot", "brot", SECRET).await;
        let tmp = tmp_token(&state, "wurstbrot@pulp-sh.op", "brot").await;
        let code = Totp::default().current_code(SECRET).unwrap();

        let auth = AuthService::new(&state)
            .verify_second_factor(&tmp, &code)
            .await
            .unwrap();

        assert_eq!(auth.umail.as_str(), "wurstbrot@pulp-sh.op");
        let cached = state.sessions().get(&auth.token).await.unwrap();
        assert_eq!(cached.basket_id, Some(auth.bid));
        assert!(
            state
                .challenges()
                .is_solved(Challenge::TwoFactorAuthUnsafeSecretStorage)
        );
    }

    #[tokio::test]
    async fn test_verify_rejects_wrong_code() {
        let state = state();
        add_user(&state, "jim", "ncc-1701", SECRET).await;
        let tmp = tmp_token(&state, "jim@pulp-sh.op", "ncc-1701").await;

        let err = AuthService::new(&state)
            .verify_second_factor(&tmp, "000000x")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidTotpCode));
        assert!(
            !state
                .challenges()
                .is_solved(Challenge::TwoFactorAuthUnsafeSecretStorage)
        );
    }

    #[tokio::test]
    async fn test_verify_rejects_setup_token() {
        let state = state();
        add_user(&state, "jim", "ncc-1701", SECRET).await;
        let setup = state
            .tokens()
            .authorize(TokenPayload::TotpSetup {
                secret: SECRET.to_owned(),
            })
            .unwrap();
        let code = Totp::default().current_code(SECRET).unwrap();

        let err = AuthService::new(&state)
            .verify_second_factor(&setup, &code)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::WrongTokenType {
                actual: TOTP_SETUP_SECRET,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_verify_rejects_unknown_user() {
        let state = state();
        let tmp = state
            .tokens()
            .authorize(TokenPayload::SecondFactorPending {
                user_id: pulp_core::UserId::new(42),
            })
            .unwrap();

        let err = AuthService::new(&state)
            .verify_second_factor(&tmp, "123456")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }

    #[tokio::test]
    async fn test_setup_then_disable() {
        let state = state();
        let user = add_user(&state, "jim", "ncc-1701", "").await;
        let service = AuthService::new(&state);
        let LoginOutcome::Authenticated(auth) =
            service.login("jim@pulp-sh.op", "ncc-1701").await.unwrap()
        else {
            panic!("expected a session");
        };
        let session = state.sessions().get(&auth.token).await.unwrap();

        let status = service.two_factor_status(&session).unwrap();
        assert!(!status.setup);
        let pending = status.pending.unwrap();
        let code = Totp::default().current_code(&pending.secret).unwrap();

        service
            .setup_two_factor(&auth.token, &session, "ncc-1701", &pending.setup_token, &code)
            .await
            .unwrap();

        let refreshed = state.sessions().get(&auth.token).await.unwrap();
        assert_eq!(refreshed.totp_secret, pending.secret);
        assert_eq!(refreshed.basket_id, Some(auth.bid));
        assert!(service.two_factor_status(&refreshed).unwrap().setup);
        assert!(
            state
                .store()
                .find_user(user.id)
                .await
                .unwrap()
                .unwrap()
                .has_two_factor()
        );

        service
            .disable_two_factor(&auth.token, &refreshed, "ncc-1701")
            .await
            .unwrap();
        let disabled = state.sessions().get(&auth.token).await.unwrap();
        assert!(disabled.totp_secret.is_empty());
    }

    #[tokio::test]
    async fn test_setup_rejections() {
        let state = state();
        add_user(&state, "jim", "ncc-1701", "").await;
        let service = AuthService::new(&state);
        let LoginOutcome::Authenticated(auth) =
            service.login("jim@pulp-sh.op", "ncc-1701").await.unwrap()
        else {
            panic!("expected a session");
        };
        let session = state.sessions().get(&auth.token).await.unwrap();
        let pending = service.two_factor_status(&session).unwrap().pending.unwrap();
        let code = Totp::default().current_code(&pending.secret).unwrap();

        let wrong_password = service
            .setup_two_factor(&auth.token, &session, "nope", &pending.setup_token, &code)
            .await
            .unwrap_err();
        assert!(matches!(wrong_password, AuthError::WrongPassword));

        let wrong_type = service
            .setup_two_factor(&auth.token, &session, "ncc-1701", &auth.token, &code)
            .await
            .unwrap_err();
        assert!(matches!(wrong_type, AuthError::WrongTokenType { .. }));

        let wrong_code = service
            .setup_two_factor(
                &auth.token,
                &session,
                "ncc-1701",
                &pending.setup_token,
                "12345",
            )
            .await
            .unwrap_err();
        assert!(matches!(wrong_code, AuthError::InvalidTotpCode));

        let mut configured = session.clone();
        configured.totp_secret = SECRET.to_owned();
        let already = service
            .setup_two_factor(&auth.token, &configured, "ncc-1701", &pending.setup_token, &code)
            .await
            .unwrap_err();
        assert!(matches!(already, AuthError::AlreadyConfigured));
    }

    #[tokio::test]
    async fn test_disable_rejects_wrong_password() {
        let state = state();
        add_user(&state, "jim", "ncc-1701", "").await;
        let service = AuthService::new(&state);
        let LoginOutcome::Authenticated(auth) =
            service.login("jim@pulp-sh.op", "ncc-1701").await.unwrap()
        else {
            panic!("expected a session");
        };
        let session = state.sessions().get(&auth.token).await.unwrap();

        let err = service
            .disable_two_factor(&auth.token, &session, "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
    }
}
