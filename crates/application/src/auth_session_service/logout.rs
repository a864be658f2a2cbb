use rolegate_core::AppResult;

use crate::{AuthEvent, AuthEventType, RequestContext};

use super::token_crypto::hash_token;
use super::*;

impl AuthSessionService {
    /// Removes the presented refresh token from its owner's set.
    ///
    /// Succeeds without effect when no token or an unknown token is presented.
    pub async fn logout(
        &self,
        presented_refresh_token: Option<&str>,
        context: &RequestContext,
    ) -> AppResult<()> {
        let Some(presented) = presented_refresh_token else {
            return Ok(());
        };

        let presented_hash = hash_token(presented);
        let Some(owner) = self.ports.refresh_tokens.find_owner(&presented_hash).await? else {
            return Ok(());
        };

        self.ports
            .refresh_tokens
            .remove(owner, &presented_hash)
            .await?;

        self.auth_events
            .record_best_effort(AuthEvent::new(
                AuthEventType::Logout,
                "success",
                Some(owner.to_string()),
                context,
            ))
            .await;

        Ok(())
    }
}
