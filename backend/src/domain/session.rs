//! Explicit per-call session context.
//!
//! Every core call receives the acting user, the locale for user-facing
//! messages, and the bearer credential issued by the Identity Provider.

use std::fmt;

use zeroize::Zeroizing;

use super::{Locale, UserId};

/// Bearer credential issued by the Identity Provider.
///
/// Redacted from debug output and wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(Zeroizing<String>);

impl BearerToken {
    /// Wrap a raw token. Returns `None` for blank input.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Token text for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Context for one acting user.
///
/// # Examples
/// ```
/// use shared_lists::domain::{Locale, Session, UserId};
///
/// let session = Session::new(UserId::new("u1").expect("id")).with_locale(Locale::Cs);
/// assert_eq!(session.user_id().as_ref(), "u1");
/// assert_eq!(session.locale(), Locale::Cs);
/// assert!(session.credential().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    user_id: UserId,
    locale: Locale,
    credential: Option<BearerToken>,
}

impl Session {
    /// Session for `user_id` with the default locale and no credential.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            locale: Locale::default(),
            credential: None,
        }
    }

    /// Replace the locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Attach a bearer credential.
    pub fn with_credential(mut self, credential: BearerToken) -> Self {
        self.credential = Some(credential);
        self
    }

    /// The acting user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Locale for user-facing messages.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Credential presented to the Persistence Service, if any.
    pub fn credential(&self) -> Option<&BearerToken> {
        self.credential.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_tokens_are_rejected(#[case] raw: &str) {
        assert!(BearerToken::new(raw).is_none());
    }

    #[rstest]
    fn token_is_trimmed_and_redacted() {
        let token = BearerToken::new(" abc.def.ghi ").expect("token");
        assert_eq!(token.expose(), "abc.def.ghi");
        assert!(!format!("{token:?}").contains("abc"));
    }
}
