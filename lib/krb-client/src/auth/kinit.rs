use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::Authenticator;
use crate::transfer::restrict_to_owner;
use crate::{KrbError, Principal};

/// Maximum renewable lifetime requested for every ticket.
const RENEWABLE_LIFETIME: &str = "7d";
const ENCTYPE: &str = "aes256-cts-hmac-sha1-96";
const KVNO: u32 = 1;

/// Authenticator backed by the MIT Kerberos command line tools.
///
/// Every invocation sees `KRB5_CONFIG` and `KRB5CCNAME` pointing into the
/// launcher's private working directory, so neither the tools nor the
/// downstream scheduler client touch host-global credential state.
pub struct KinitAuthenticator {
    krb5_config: PathBuf,
    ticket_cache: PathBuf,
    keytab: PathBuf,
}

impl KinitAuthenticator {
    pub fn new(krb5_config: PathBuf, ticket_cache: PathBuf, keytab: PathBuf) -> Self {
        Self {
            krb5_config,
            ticket_cache,
            keytab,
        }
    }

    pub fn keytab(&self) -> &Path {
        &self.keytab
    }

    fn command(&self, tool: &'static str) -> Command {
        let mut cmd = Command::new(tool);
        cmd.env("KRB5_CONFIG", &self.krb5_config)
            .env("KRB5CCNAME", format!("FILE:{}", self.ticket_cache.display()))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn run(
        &self,
        mut cmd: Command,
        tool: &'static str,
        principal: &Principal,
        stdin_data: &[u8],
    ) -> Result<(), KrbError> {
        let mut child = cmd
            .spawn()
            .map_err(|source| KrbError::ToolSpawn { tool, source })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(stdin_data).await?;
            // dropping the handle closes the pipe
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(KrbError::AuthFailed {
                tool,
                principal: principal.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }

    fn ktutil_script(&self, principal: &Principal, password: &str) -> String {
        format!(
            "addent -password -p {} -k {} -e {}\n{}\nwkt {}\nquit\n",
            principal,
            KVNO,
            ENCTYPE,
            password,
            self.keytab.display()
        )
    }
}

#[async_trait]
impl Authenticator for KinitAuthenticator {
    async fn ticket_with_password(
        &self,
        principal: &Principal,
        password: &str,
    ) -> Result<(), KrbError> {
        let mut cmd = self.command("kinit");
        cmd.arg("-r").arg(RENEWABLE_LIFETIME).arg(principal.to_string());

        self.run(cmd, "kinit", principal, format!("{}\n", password).as_bytes())
            .await?;
        tracing::debug!(%principal, "Acquired initial renewable ticket");
        Ok(())
    }

    async fn write_keytab(&self, principal: &Principal, password: &str) -> Result<(), KrbError> {
        // ktutil's wkt appends to an existing file; start clean so the
        // keytab holds exactly one entry.
        match std::fs::remove_file(&self.keytab) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let cmd = self.command("ktutil");
        let script = self.ktutil_script(principal, password);
        self.run(cmd, "ktutil", principal, script.as_bytes()).await?;

        restrict_to_owner(&self.keytab)?;
        tracing::debug!(%principal, keytab = %self.keytab.display(), "Derived keytab entry");
        Ok(())
    }

    async fn ticket_with_keytab(&self, principal: &Principal) -> Result<(), KrbError> {
        let mut cmd = self.command("kinit");
        cmd.arg("-r")
            .arg(RENEWABLE_LIFETIME)
            .arg("-kt")
            .arg(&self.keytab)
            .arg(principal.to_string());

        self.run(cmd, "kinit", principal, b"").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator(dir: &Path) -> KinitAuthenticator {
        KinitAuthenticator::new(
            dir.join("krb5.conf"),
            dir.join("krb5cc"),
            dir.join("client.keytab"),
        )
    }

    #[test]
    fn test_ktutil_script_shape() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authenticator(dir.path());
        let principal = Principal::new("alice", "META");

        let script = auth.ktutil_script(&principal, "secret");

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(
            lines[0],
            "addent -password -p alice@META -k 1 -e aes256-cts-hmac-sha1-96"
        );
        assert_eq!(lines[1], "secret");
        assert!(lines[2].starts_with("wkt "));
        assert!(lines[2].ends_with("client.keytab"));
        assert_eq!(lines[3], "quit");
    }

    #[tokio::test]
    async fn test_run_maps_missing_tool_to_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authenticator(dir.path());
        let principal = Principal::new("alice", "META");

        let cmd = {
            let mut cmd = Command::new("definitely-not-a-real-tool");
            cmd.stdin(Stdio::piped()).stderr(Stdio::piped());
            cmd
        };

        let result = auth.run(cmd, "kinit", &principal, b"").await;
        assert!(matches!(result, Err(KrbError::ToolSpawn { tool: "kinit", .. })));
    }

    #[tokio::test]
    async fn test_run_captures_stderr_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authenticator(dir.path());
        let principal = Principal::new("alice", "META");

        let cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c")
                .arg("echo 'Password incorrect' >&2; exit 1")
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::piped());
            cmd
        };

        match auth.run(cmd, "kinit", &principal, b"").await {
            Err(KrbError::AuthFailed {
                tool,
                principal,
                stderr,
            }) => {
                assert_eq!(tool, "kinit");
                assert_eq!(principal, "alice@META");
                assert_eq!(stderr, "Password incorrect");
            }
            other => panic!("expected auth failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_pipes_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let auth = authenticator(dir.path());
        let principal = Principal::new("alice", "META");

        let cmd = {
            let mut cmd = Command::new("sh");
            cmd.arg("-c")
                .arg("read input; test \"$input\" = secret")
                .stdin(Stdio::piped())
                .stdout(Stdio::null())
                .stderr(Stdio::piped());
            cmd
        };

        auth.run(cmd, "kinit", &principal, b"secret\n").await.unwrap();
    }
}
