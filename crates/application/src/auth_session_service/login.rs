use tracing::{info, warn};

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EmailAddress, LoginCode};

use crate::{AuthEvent, AuthEventType, RequestContext, TokenKind};

use super::token_crypto::{generate_login_code, hash_token};
use super::*;

const LOGIN_FAILED: &str = "invalid email or code";

impl AuthSessionService {
    /// Issues a one-time login code and emails it.
    ///
    /// Creates the user with the `default` role on first contact. A new code
    /// replaces any code issued earlier.
    pub async fn request_login_code(
        &self,
        email: &str,
        context: &RequestContext,
    ) -> AppResult<()> {
        let email = EmailAddress::new(email)?;
        self.domain_policy.check(&email)?;

        let user = match self
            .ports
            .user_repository
            .find_by_email(email.as_str())
            .await?
        {
            Some(user) => user,
            None => self.create_first_contact_user(&email).await?,
        };

        let code = generate_login_code()?;
        let code_hash = self.ports.code_hasher.hash_code(&code)?;
        self.ports
            .user_repository
            .set_verification_code_hash(user.id, &code_hash)
            .await?;

        let text_body = format!(
            "Your sign-in code is {code}.\n\n\
             If you did not request this code, you can safely ignore this email."
        );
        self.ports
            .email_service
            .send_email(email.as_str(), "Your sign-in code", &text_body, None)
            .await?;

        self.auth_events
            .record_best_effort(AuthEvent::new(
                AuthEventType::LoginCodeRequested,
                "success",
                Some(user.id.to_string()),
                context,
            ))
            .await;

        Ok(())
    }

    /// Exchanges an email and one-time code for a session.
    ///
    /// The code is consumed on success. A presented refresh token owned by
    /// this user is swapped for the new one. A presented token unknown to
    /// every set means reuse, so the user's stored tokens are discarded.
    pub async fn login_with_code(
        &self,
        email: &str,
        code: &str,
        presented_refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> AppResult<IssuedSession> {
        let email = EmailAddress::new(email)?;
        let code = LoginCode::parse(code)?;

        let Some(user) = self
            .ports
            .user_repository
            .find_by_email(email.as_str())
            .await?
        else {
            self.auth_events
                .record_best_effort(AuthEvent::new(
                    AuthEventType::CodeLogin,
                    "unknown_email",
                    None,
                    context,
                ))
                .await;
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_owned()));
        };

        let stored_hash = match user.verification_code_hash.as_deref() {
            Some(hash) if self.ports.code_hasher.verify_code(code.as_str(), hash)? => hash,
            _ => {
                self.auth_events
                    .record_best_effort(AuthEvent::new(
                        AuthEventType::CodeLogin,
                        "invalid_code",
                        Some(user.id.to_string()),
                        context,
                    ))
                    .await;
                return Err(AppError::Unauthorized(LOGIN_FAILED.to_owned()));
            }
        };

        let subject = user.id.to_string();
        let refresh_token = self.ports.token_signer.sign(&subject, TokenKind::Refresh)?;
        let new_hash = hash_token(&refresh_token);
        let session = self.prepare_session(&user, refresh_token).await?;
        let replacement_hash = self.ports.code_hasher.hash_code(&generate_login_code()?)?;

        // Consuming the code and storing the token are the last fallible steps.
        let consumed = self
            .ports
            .user_repository
            .consume_verification_code(user.id, stored_hash, &replacement_hash)
            .await?;
        if !consumed {
            return Err(AppError::Unauthorized(LOGIN_FAILED.to_owned()));
        }
        self.store_login_refresh_token(&user, presented_refresh_token, &new_hash)
            .await?;

        self.auth_events
            .record_best_effort(AuthEvent::new(
                AuthEventType::CodeLogin,
                "success",
                Some(subject),
                context,
            ))
            .await;

        Ok(session)
    }

    /// Creates the user, or loads the row a concurrent first request created.
    async fn create_first_contact_user(&self, email: &EmailAddress) -> AppResult<UserRecord> {
        let users = &self.ports.user_repository;
        match users.create_with_default_role(email.as_str()).await {
            Ok(user) => {
                info!(user_id = %user.id, "created user on first login code request");
                Ok(user)
            }
            Err(AppError::Conflict(_)) => users
                .find_by_email(email.as_str())
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "user '{}' conflicted on create but could not be loaded",
                        email.as_str()
                    ))
                }),
            Err(error) => Err(error),
        }
    }

    async fn store_login_refresh_token(
        &self,
        user: &UserRecord,
        presented_refresh_token: Option<&str>,
        new_hash: &str,
    ) -> AppResult<()> {
        let refresh_tokens = &self.ports.refresh_tokens;

        let Some(presented) = presented_refresh_token else {
            return refresh_tokens.add(user.id, new_hash).await;
        };

        let presented_hash = hash_token(presented);
        match refresh_tokens.find_owner(&presented_hash).await? {
            Some(owner) if owner == user.id => {
                if !refresh_tokens
                    .swap(user.id, &presented_hash, new_hash)
                    .await?
                {
                    refresh_tokens.add(user.id, new_hash).await?;
                }
                Ok(())
            }
            Some(_) => refresh_tokens.add(user.id, new_hash).await,
            None => {
                warn!(
                    user_id = %user.id,
                    "refresh token reuse detected at login, discarding stored tokens"
                );
                refresh_tokens.replace_all(user.id, new_hash).await
            }
        }
    }
}
