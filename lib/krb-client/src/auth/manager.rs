use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::Authenticator;
use crate::{KrbError, Principal};

pub const DEFAULT_RENEW_INTERVAL: Duration = Duration::from_secs(21_600);

/// Owns the bootstrapped credentials and spawns the renewal loop.
pub struct CredentialManager {
    authenticator: Arc<dyn Authenticator>,
    principal: Principal,
    renew_interval: Duration,
}

impl CredentialManager {
    /// Exchange the password for durable credentials.
    ///
    /// Acquires the initial renewable ticket, derives the keytab, then
    /// re-authenticates from the keytab to prove the derived key before the
    /// password is discarded. Any failure is fatal; there is no partial
    /// success.
    pub async fn bootstrap(
        authenticator: Arc<dyn Authenticator>,
        principal: Principal,
        password: &str,
        renew_interval: Duration,
    ) -> Result<Self, KrbError> {
        authenticator.ticket_with_password(&principal, password).await?;
        authenticator.write_keytab(&principal, password).await?;
        authenticator.ticket_with_keytab(&principal).await?;
        tracing::info!(%principal, "Credential bootstrap complete");

        Ok(Self {
            authenticator,
            principal,
            renew_interval,
        })
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Spawn the background renewal loop and hand over its lifecycle.
    ///
    /// The loop re-authenticates from the keytab on a fixed interval. A
    /// failed attempt is logged and the loop keeps running: the previous
    /// ticket may still be valid and the next tick is the retry. The loop
    /// only exits when shutdown is requested through the returned handle,
    /// or when the handle is dropped.
    pub fn start_renewal(self) -> RenewalHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(self.renew_interval);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately; the bootstrap ticket is
            // still fresh, so renewal starts one interval from now
            ticks.tick().await;

            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = ticks.tick() => {
                        match self.authenticator.ticket_with_keytab(&self.principal).await {
                            Ok(()) => {
                                tracing::debug!(principal = %self.principal, "Ticket renewed")
                            }
                            Err(e) => tracing::warn!(
                                principal = %self.principal,
                                error = %e,
                                "Ticket renewal failed, retrying at next interval"
                            ),
                        }
                    }
                }
            }
            tracing::debug!("Renewal loop stopped");
        });

        RenewalHandle {
            stop: stop_tx,
            task: Some(task),
        }
    }
}

/// Handle to the renewal task, owned by the lifecycle coordinator.
///
/// At most one exists per process; dropping it also stops the loop, so the
/// task can never outlive its owner.
pub struct RenewalHandle {
    stop: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RenewalHandle {
    /// Request termination and wait for the loop to finish.
    ///
    /// Idempotent: safe to call more than once, and a no-op when the loop
    /// has already stopped. An in-flight renewal attempt is allowed to
    /// complete; no further tick is scheduled.
    pub async fn shutdown(&mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().map_or(false, |task| !task.is_finished())
    }
}
