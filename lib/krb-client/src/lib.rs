//! krb-client - Kerberos credential lifecycle for long-running collectors
//!
//! Exchanges a principal's password for durable credentials:
//! 1. initial renewable ticket → 2. derived keytab → 3. keytab-based
//! re-authentication, after which the password is never needed again.
//! A background task keeps the ticket cache fresh until shutdown.

pub mod auth;
mod error;
mod principal;
pub mod transfer;

pub use error::KrbError;
pub use principal::Principal;
