use std::env;

use crate::error::AccessError;

/// Signed-in state handed to us by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    pub fn signed_in(user: impl Into<String>) -> Self {
        let user = user.into();
        let user = user.trim();
        Self {
            user: (!user.is_empty()).then(|| user.to_string()),
        }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// Local identity: explicit name, then `LIFE_HEATMAP_USER`, then the OS account.
    pub fn local(explicit: Option<String>) -> Self {
        let user = explicit
            .or_else(|| env::var("LIFE_HEATMAP_USER").ok())
            .or_else(|| env::var("USER").ok())
            .or_else(|| env::var("USERNAME").ok());

        match user {
            Some(user) => Self::signed_in(user),
            None => Self::signed_out(),
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn require(&self) -> Result<&str, AccessError> {
        self.user().ok_or(AccessError::SignedOut)
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::error::AccessError;

    #[test]
    fn blank_user_is_signed_out() {
        assert!(!Session::signed_in("  ").is_authenticated());
        assert_eq!(Session::signed_out().require(), Err(AccessError::SignedOut));
    }

    #[test]
    fn explicit_user_wins() {
        let session = Session::local(Some("ada".to_string()));
        assert_eq!(session.require(), Ok("ada"));
    }
}
