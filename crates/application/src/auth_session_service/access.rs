use rolegate_core::{AppError, AppResult, UserIdentity};
use rolegate_domain::UserId;

use crate::TokenKind;

use super::*;

impl AuthSessionService {
    /// Verifies a bearer access token and resolves the caller identity.
    pub async fn authenticate_access_token(&self, access_token: &str) -> AppResult<UserIdentity> {
        let claims = self
            .ports
            .token_signer
            .verify(access_token, TokenKind::Access)?;
        let user_id = UserId::parse(&claims.subject)
            .map_err(|_| AppError::Unauthorized("invalid access token subject".to_owned()))?;

        let user = self
            .ports
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown access token subject".to_owned()))?;

        self.authorization
            .identity_for_user(user.id, &user.email)
            .await
    }
}
