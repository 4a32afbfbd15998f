//! Launcher configuration, read from the environment before anything else
//! runs. Missing required values abort startup before any network call.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use krb_client::auth::DEFAULT_RENEW_INTERVAL;
use krb_client::Principal;
use zeroize::Zeroizing;

use crate::LauncherError;

const DEFAULT_REALM: &str = "META";
const DEFAULT_WORKLOAD: &str = "zeus-collector";

#[derive(Debug)]
pub struct Settings {
    pub principal: Principal,
    pub password: Zeroizing<String>,
    /// Host serving the Kerberos realm configuration.
    pub krb_config_host: String,
    /// Host serving the PBS client configuration.
    pub pbs_config_host: String,
    pub ticket_cache: Option<PathBuf>,
    pub renew_interval: Duration,
    pub workdir: Option<PathBuf>,
    /// Workload command line, whitespace-split.
    pub workload_cmd: Vec<String>,
}

impl Settings {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, LauncherError> {
        Self::from_environ(&std::env::vars().collect())
    }

    /// Read from an explicit environment (for testing).
    pub fn from_environ(environ: &HashMap<String, String>) -> Result<Self, LauncherError> {
        let user = require(environ, "ZEUS_KRB_USER")?;
        let password = Zeroizing::new(require(environ, "ZEUS_KRB_PASSWORD")?);
        let krb_config_host = require(environ, "ZEUS_KRB_CONFIG_HOST")?;
        let pbs_config_host = require(environ, "ZEUS_PBS_CONFIG_HOST")?;

        let renew_interval = match environ.get("ZEUS_RENEW_INTERVAL") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| LauncherError::InvalidEnv {
                    name: "ZEUS_RENEW_INTERVAL",
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => DEFAULT_RENEW_INTERVAL,
        };

        let workload_cmd: Vec<String> = environ
            .get("ZEUS_COLLECTOR_CMD")
            .map(String::as_str)
            .unwrap_or(DEFAULT_WORKLOAD)
            .split_whitespace()
            .map(str::to_string)
            .collect();
        if workload_cmd.is_empty() {
            return Err(LauncherError::InvalidEnv {
                name: "ZEUS_COLLECTOR_CMD",
                value: String::new(),
            });
        }

        Ok(Self {
            principal: Principal::parse(&user, DEFAULT_REALM),
            password,
            krb_config_host,
            pbs_config_host,
            ticket_cache: environ.get("ZEUS_TICKET_CACHE").map(PathBuf::from),
            renew_interval,
            workdir: environ.get("ZEUS_WORKDIR").map(PathBuf::from),
            workload_cmd,
        })
    }
}

fn require(environ: &HashMap<String, String>, name: &'static str) -> Result<String, LauncherError> {
    match environ.get(name) {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(LauncherError::MissingEnv(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_environ() -> HashMap<String, String> {
        HashMap::from([
            ("ZEUS_KRB_USER".to_string(), "alice@META".to_string()),
            ("ZEUS_KRB_PASSWORD".to_string(), "secret".to_string()),
            (
                "ZEUS_KRB_CONFIG_HOST".to_string(),
                "conf1.example.org".to_string(),
            ),
            (
                "ZEUS_PBS_CONFIG_HOST".to_string(),
                "conf2.example.org".to_string(),
            ),
        ])
    }

    #[test]
    fn test_full_environ_parses() {
        let settings = Settings::from_environ(&full_environ()).unwrap();

        assert_eq!(settings.principal.to_string(), "alice@META");
        assert_eq!(*settings.password, "secret");
        assert_eq!(settings.krb_config_host, "conf1.example.org");
        assert_eq!(settings.pbs_config_host, "conf2.example.org");
        assert_eq!(settings.ticket_cache, None);
        assert_eq!(settings.renew_interval, Duration::from_secs(21_600));
        assert_eq!(settings.workload_cmd, vec!["zeus-collector".to_string()]);
    }

    #[test]
    fn test_bare_user_gets_default_realm() {
        let mut environ = full_environ();
        environ.insert("ZEUS_KRB_USER".to_string(), "alice".to_string());

        let settings = Settings::from_environ(&environ).unwrap();
        assert_eq!(settings.principal.to_string(), "alice@META");
    }

    #[test]
    fn test_missing_password_names_the_variable() {
        let mut environ = full_environ();
        environ.remove("ZEUS_KRB_PASSWORD");

        let err = Settings::from_environ(&environ).unwrap_err();
        assert!(matches!(
            err,
            LauncherError::MissingEnv("ZEUS_KRB_PASSWORD")
        ));
        assert!(err.to_string().contains("ZEUS_KRB_PASSWORD"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut environ = full_environ();
        environ.insert("ZEUS_KRB_CONFIG_HOST".to_string(), String::new());

        let err = Settings::from_environ(&environ).unwrap_err();
        assert!(matches!(
            err,
            LauncherError::MissingEnv("ZEUS_KRB_CONFIG_HOST")
        ));
    }

    #[test]
    fn test_overrides() {
        let mut environ = full_environ();
        environ.insert("ZEUS_RENEW_INTERVAL".to_string(), "60".to_string());
        environ.insert("ZEUS_TICKET_CACHE".to_string(), "/tmp/krb5cc_zeus".to_string());
        environ.insert(
            "ZEUS_COLLECTOR_CMD".to_string(),
            "python3 -m collector".to_string(),
        );

        let settings = Settings::from_environ(&environ).unwrap();
        assert_eq!(settings.renew_interval, Duration::from_secs(60));
        assert_eq!(
            settings.ticket_cache,
            Some(PathBuf::from("/tmp/krb5cc_zeus"))
        );
        assert_eq!(
            settings.workload_cmd,
            vec!["python3".to_string(), "-m".to_string(), "collector".to_string()]
        );
    }

    #[test]
    fn test_unparsable_interval_is_rejected() {
        let mut environ = full_environ();
        environ.insert("ZEUS_RENEW_INTERVAL".to_string(), "6h".to_string());

        let err = Settings::from_environ(&environ).unwrap_err();
        assert!(matches!(
            err,
            LauncherError::InvalidEnv {
                name: "ZEUS_RENEW_INTERVAL",
                ..
            }
        ));
    }
}
