//! Startup sequence: fetch both remote configs, then run the three-step
//! credential bootstrap. Everything here is fail-fast; the workload never
//! starts unless all of it succeeded.

use std::sync::Arc;

use krb_client::auth::{Authenticator, CredentialManager};
use krb_client::transfer::{fetch_to, FileTransfer};

use crate::workdir::WorkDir;
use crate::{LauncherError, Settings};

const KRB5_CONF_REMOTE: &str = "/etc/krb5.conf";
const PBS_CONF_REMOTE: &str = "/etc/pbs.conf";

/// Fetch the realm and scheduler configs into the working directory.
///
/// Both files are prerequisites for any Kerberos operation; either failure
/// aborts startup. No retry.
pub async fn fetch_configs(
    transfer: &dyn FileTransfer,
    settings: &Settings,
    workdir: &WorkDir,
) -> Result<(), LauncherError> {
    fetch_to(
        transfer,
        &settings.krb_config_host,
        KRB5_CONF_REMOTE,
        &workdir.krb5_conf(),
    )
    .await?;
    fetch_to(
        transfer,
        &settings.pbs_config_host,
        PBS_CONF_REMOTE,
        &workdir.pbs_conf(),
    )
    .await?;
    Ok(())
}

/// Exchange the configured password for durable credentials.
pub async fn bootstrap_credentials(
    authenticator: Arc<dyn Authenticator>,
    settings: &Settings,
) -> Result<CredentialManager, LauncherError> {
    let manager = CredentialManager::bootstrap(
        authenticator,
        settings.principal.clone(),
        &settings.password,
        settings.renew_interval,
    )
    .await?;
    Ok(manager)
}
