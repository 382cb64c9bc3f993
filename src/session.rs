//! Signed-in operator context.
//!
//! One `SessionContext` is built at the composition root and shared (via
//! `Arc`) by the REST client and every view. The client attaches its bearer
//! token to each request and purges it on the first 401.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Admin,
    #[default]
    User,
}

/// Response body of `POST /api/user/signIn`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub name: String,
    pub id: i64,
    #[serde(default)]
    pub level: UserLevel,
}

struct Credential {
    token: Zeroizing<String>,
    user_id: i64,
    name: String,
    level: UserLevel,
}

#[derive(Default)]
pub struct SessionContext {
    inner: RwLock<Option<Credential>>,
}

impl SessionContext {
    /// An empty context; requests go out without a bearer header.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signed_in(token: impl Into<String>, user_id: i64, name: impl Into<String>) -> Self {
        let ctx = Self::new();
        ctx.establish(token, user_id, name, UserLevel::User);
        ctx
    }

    pub fn establish(
        &self,
        token: impl Into<String>,
        user_id: i64,
        name: impl Into<String>,
        level: UserLevel,
    ) {
        let name = name.into();
        info!(user_id, name = %name, ?level, "session established");
        *self.write() = Some(Credential {
            token: Zeroizing::new(token.into()),
            user_id,
            name,
            level,
        });
    }

    pub fn establish_from(&self, resp: SignInResponse) {
        self.establish(resp.token, resp.id, resp.name, resp.level);
    }

    /// Drop the credential. The token buffer is zeroed on drop.
    pub fn purge(&self) {
        let mut guard = self.write();
        if let Some(cred) = guard.take() {
            warn!(user_id = cred.user_id, "session purged, sign-in required");
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.read().is_some()
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.token.as_str().to_string())
    }

    pub fn user_id(&self) -> Option<i64> {
        self.read().as_ref().map(|c| c.user_id)
    }

    pub fn user_name(&self) -> Option<String> {
        self.read().as_ref().map(|c| c.name.clone())
    }

    pub fn level(&self) -> Option<UserLevel> {
        self.read().as_ref().map(|c| c.level)
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<Credential>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Credential>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id())
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purge_clears_every_field() {
        let ctx = SessionContext::signed_in("tok", 3, "Somchai");
        assert!(ctx.is_signed_in());
        assert_eq!(ctx.bearer_token().as_deref(), Some("tok"));
        assert_eq!(ctx.user_id(), Some(3));

        ctx.purge();
        assert!(!ctx.is_signed_in());
        assert!(ctx.bearer_token().is_none());
        assert!(ctx.user_name().is_none());

        // second purge is a no-op
        ctx.purge();
        assert!(!ctx.is_signed_in());
    }

    #[test]
    fn sign_in_response_defaults_level() {
        let resp: SignInResponse =
            serde_json::from_value(serde_json::json!({ "token": "t", "name": "A", "id": 9 }))
                .expect("parse");
        let ctx = SessionContext::new();
        ctx.establish_from(resp);
        assert_eq!(ctx.level(), Some(UserLevel::User));
        assert_eq!(ctx.user_id(), Some(9));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let ctx = SessionContext::signed_in("secret-token", 1, "A");
        assert!(!format!("{ctx:?}").contains("secret-token"));
    }
}
