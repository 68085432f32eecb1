// src/models/session.rs

use uuid::Uuid;

use crate::config::MAX_LOGIN_ATTEMPTS;

/// Long-lived per-client state carried in the session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: Option<Uuid>,
    pub attempts_left: u8,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self {
            user_id: None,
            attempts_left: MAX_LOGIN_ATTEMPTS,
        }
    }

    /// A successful login identifies the user and clears the attempt counter.
    pub fn sign_in(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            attempts_left: MAX_LOGIN_ATTEMPTS,
        }
    }

    pub fn record_failure(&mut self) {
        self.attempts_left = self.attempts_left.saturating_sub(1);
    }

    /// Locked sessions stay locked until the client drops the session.
    pub fn is_locked(&self) -> bool {
        self.attempts_left == 0
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::anonymous()
    }
}

/// Injected into request extensions by the auth middleware.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_failures_lock_the_session() {
        let mut session = AuthSession::anonymous();
        for _ in 0..2 {
            session.record_failure();
            assert!(!session.is_locked());
        }
        session.record_failure();
        assert!(session.is_locked());

        session.record_failure();
        assert_eq!(session.attempts_left, 0);
    }

    #[test]
    fn test_sign_in_resets_counter() {
        let mut session = AuthSession::anonymous();
        session.record_failure();
        let id = Uuid::new_v4();
        let signed = AuthSession::sign_in(id);
        assert_eq!(signed.user_id, Some(id));
        assert_eq!(signed.attempts_left, MAX_LOGIN_ATTEMPTS);
    }
}
