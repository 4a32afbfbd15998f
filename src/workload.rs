//! The foreground collector process. The launcher's only interface to it is
//! the environment it passes down and the exit status it takes back.

use std::path::Path;

use tokio::process::Command;

use crate::workdir::WorkDir;
use crate::{LauncherError, Settings};

pub struct Workload {
    program: String,
    args: Vec<String>,
    envs: Vec<(&'static str, String)>,
}

impl Workload {
    /// Build the workload command; the child finds the fetched configs and
    /// the ticket cache through its environment, so its PBS client calls
    /// authenticate transparently.
    pub fn new(settings: &Settings, workdir: &WorkDir, ticket_cache: &Path) -> Self {
        let mut cmd = settings.workload_cmd.clone();
        let program = cmd.remove(0);

        Self {
            program,
            args: cmd,
            envs: vec![
                ("KRB5_CONFIG", workdir.krb5_conf().display().to_string()),
                ("KRB5CCNAME", format!("FILE:{}", ticket_cache.display())),
                ("PBS_CONF_FILE", workdir.pbs_conf().display().to_string()),
            ],
        }
    }

    /// Run to completion and return the exit code.
    ///
    /// The child is killed if this future is dropped (the signal path), so
    /// the workload cannot outlive the launcher either.
    pub async fn run(&self) -> Result<i32, LauncherError> {
        tracing::info!(program = %self.program, "Starting collector workload");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (*k, v.as_str())))
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LauncherError::Workload {
                program: self.program.clone(),
                source,
            })?;

        let status = child
            .wait()
            .await
            .map_err(|source| LauncherError::Workload {
                program: self.program.clone(),
                source,
            })?;

        Ok(exit_code(status))
    }
}

fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
