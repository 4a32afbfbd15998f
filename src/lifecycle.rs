//! Keeps the renewal task's lifetime strictly inside the process lifetime.

use krb_client::auth::RenewalHandle;

use crate::workload::Workload;

/// Run the workload in the foreground with renewal in the background.
///
/// The renewal task is shut down before this returns on every exit path,
/// including termination signals. The returned code becomes the process
/// exit code.
pub async fn run(mut renewal: RenewalHandle, workload: Workload) -> i32 {
    let exit_code = tokio::select! {
        result = workload.run() => match result {
            Ok(code) => {
                tracing::info!(code, "Workload finished");
                code
            }
            Err(e) => {
                tracing::error!(error = %e, "Workload failed to run");
                1
            }
        },
        signo = termination_signal() => {
            tracing::info!(signal = signo, "Termination signal received, shutting down");
            128 + signo
        }
    };

    renewal.shutdown().await;
    exit_code
}

/// Resolve on SIGINT or SIGTERM, yielding the signal number.
#[cfg(unix)]
async fn termination_signal() -> i32 {
    use tokio::signal::unix::{signal, SignalKind};

    let mut term = signal(SignalKind::terminate()).expect("Unable to install SIGTERM handler!");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => 2,
        _ = term.recv() => 15,
    }
}

#[cfg(not(unix))]
async fn termination_signal() -> i32 {
    let _ = tokio::signal::ctrl_c().await;
    2
}
