use std::fmt;

/// A Kerberos identity, `user@REALM`.
///
/// Constructed once from configuration and immutable for the process
/// lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user: String,
    realm: String,
}

impl Principal {
    pub fn new(user: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            realm: realm.into(),
        }
    }

    /// Parse `user` or `user@REALM`, falling back to `default_realm` when
    /// the realm part is absent.
    pub fn parse(spec: &str, default_realm: &str) -> Self {
        match spec.split_once('@') {
            Some((user, realm)) if !realm.is_empty() => Self::new(user, realm),
            Some((user, _)) => Self::new(user, default_realm),
            None => Self::new(spec, default_realm),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.user, self.realm)
    }
}
