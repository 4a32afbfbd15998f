mod kinit;
mod manager;

pub use kinit::KinitAuthenticator;
pub use manager::{CredentialManager, RenewalHandle, DEFAULT_RENEW_INTERVAL};

use crate::{KrbError, Principal};
use async_trait::async_trait;

/// The three authentication operations of the credential lifecycle.
///
/// The password-taking operations are only ever called during bootstrap;
/// everything afterwards goes through the keytab.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Obtain an initial renewable ticket with the principal's password.
    async fn ticket_with_password(
        &self,
        principal: &Principal,
        password: &str,
    ) -> Result<(), KrbError>;

    /// Derive the principal's long-term key from the password into the
    /// keytab.
    async fn write_keytab(&self, principal: &Principal, password: &str) -> Result<(), KrbError>;

    /// Refresh the ticket cache from the keytab, without the password.
    async fn ticket_with_keytab(&self, principal: &Principal) -> Result<(), KrbError>;
}
