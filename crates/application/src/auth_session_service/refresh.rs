use tracing::{info, warn};

use rolegate_core::{AppError, AppResult};
use rolegate_domain::UserId;

use crate::{AuthEvent, AuthEventType, RequestContext, TokenKind};

use super::token_crypto::hash_token;
use super::*;

impl AuthSessionService {
    /// Rotates the presented refresh token.
    ///
    /// - no token: `Unauthorized`
    /// - token not in any set and not verifiable: `Unauthorized`
    /// - token not in any set but verifiable: the subject's whole set is
    ///   revoked, then `Forbidden`
    /// - token in a set but expired, badly signed, or issued for another
    ///   subject: that token alone is removed, then `Forbidden`
    /// - otherwise the token is swapped for a new one
    pub async fn refresh(
        &self,
        presented_refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> AppResult<IssuedSession> {
        let Some(presented) = presented_refresh_token else {
            return Err(AppError::Unauthorized("missing refresh token".to_owned()));
        };

        let presented_hash = hash_token(presented);
        let Some(owner) = self.ports.refresh_tokens.find_owner(&presented_hash).await? else {
            return Err(self.handle_unknown_refresh_token(presented, context).await);
        };

        let claims = self
            .ports
            .token_signer
            .verify(presented, TokenKind::Refresh)
            .ok()
            .filter(|claims| claims.subject == owner.to_string());
        let user = match claims {
            Some(_) => self.ports.user_repository.find_by_id(owner).await?,
            None => None,
        };
        let Some(user) = user else {
            self.ports
                .refresh_tokens
                .remove(owner, &presented_hash)
                .await?;
            self.auth_events
                .record_best_effort(AuthEvent::new(
                    AuthEventType::TokenRefresh,
                    "invalid_token",
                    Some(owner.to_string()),
                    context,
                ))
                .await;
            return Err(AppError::Forbidden("invalid refresh token".to_owned()));
        };

        let refresh_token = self
            .ports
            .token_signer
            .sign(&user.id.to_string(), TokenKind::Refresh)?;
        let new_hash = hash_token(&refresh_token);
        let session = self.prepare_session(&user, refresh_token).await?;

        // Nothing fallible may follow the swap: the presented token is gone
        // once it commits, and a retry would look like reuse.
        let swapped = self
            .ports
            .refresh_tokens
            .swap(user.id, &presented_hash, &new_hash)
            .await?;
        if !swapped {
            warn!(user_id = %user.id, "refresh token rotated concurrently");
            self.auth_events
                .record_best_effort(AuthEvent::new(
                    AuthEventType::TokenRefresh,
                    "lost_race",
                    Some(user.id.to_string()),
                    context,
                ))
                .await;
            return Err(AppError::Forbidden("refresh token already rotated".to_owned()));
        }

        self.auth_events
            .record_best_effort(AuthEvent::new(
                AuthEventType::TokenRefresh,
                "success",
                Some(user.id.to_string()),
                context,
            ))
            .await;

        Ok(session)
    }

    /// Handles a presented token that no stored set contains.
    async fn handle_unknown_refresh_token(
        &self,
        presented: &str,
        context: &RequestContext,
    ) -> AppError {
        let claims = match self.ports.token_signer.verify(presented, TokenKind::Refresh) {
            Ok(claims) => claims,
            Err(_) => return AppError::Unauthorized("invalid refresh token".to_owned()),
        };

        let subject = UserId::parse(&claims.subject).ok();
        let user = match subject {
            Some(user_id) => self
                .ports
                .user_repository
                .find_by_id(user_id)
                .await
                .unwrap_or_else(|error| {
                    warn!(%error, "failed to load refresh token subject");
                    None
                }),
            None => None,
        };

        if let Some(user) = user {
            match self.ports.refresh_tokens.revoke_all(user.id).await {
                Ok(revoked) => {
                    info!(user_id = %user.id, revoked, "refresh token reuse detected, revoked all tokens");
                }
                Err(error) => {
                    warn!(user_id = %user.id, %error, "refresh token reuse detected, revocation failed");
                }
            }
        }

        self.auth_events
            .record_best_effort(AuthEvent::new(
                AuthEventType::RefreshTokenReuse,
                "revoked",
                Some(claims.subject),
                context,
            ))
            .await;

        AppError::Forbidden("refresh token reuse detected".to_owned())
    }
}
