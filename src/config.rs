//! Configuration management for vsts-client.
//!
//! Settings come from two sources:
//! - A TOML file following the XDG Base Directory specification
//! - `VSTS_*` environment variables
//!
//! ## Example
//!
//! ```rust,no_run
//! use vsts_client::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_from_file()?.merge(Config::load_from_env()?);
//! let client = config.into_client()?;
//! println!("Talking to {}", client.instance());
//! # Ok(())
//! # }
//! ```

use crate::api::{ClientOptions, VstsClient};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR_NAME: &str = "vsts-client";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Temporary struct for deserializing TOML configuration
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    instance: Option<String>,
    pat: Option<String>,
    collection: Option<String>,
    protocol: Option<String>,
    timeout_secs: Option<u64>,
    proxy_host: Option<String>,
    proxy_port: Option<u16>,
    proxy_user: Option<String>,
    proxy_password: Option<String>,
}

/// Client settings assembled from the config file and environment.
///
/// Every field is optional so that sources can be layered with [`Config::merge`].
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Server host, e.g. `dev.azure.com/contoso` or `contoso.visualstudio.com`.
    pub instance: Option<String>,
    /// Personal access token.
    pub pat: Option<SecretString>,
    /// Collection for non `dev.azure.com` hosts.
    pub collection: Option<String>,
    /// `https` or `http`.
    pub protocol: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    pub proxy_host: Option<String>,
    pub proxy_port: Option<u16>,
    pub proxy_user: Option<String>,
    pub proxy_password: Option<SecretString>,
}

impl Config {
    /// Load configuration from the XDG config directory.
    ///
    /// A missing file yields an empty configuration.
    pub fn load_from_file() -> Result<Self> {
        Self::load_from_path(&Self::config_path()?)
    }

    /// Load configuration from an explicit TOML file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file: ConfigFile = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;

        Ok(Self {
            instance: file.instance,
            pat: file.pat.map(SecretString::from),
            collection: file.collection,
            protocol: file.protocol,
            timeout_secs: file.timeout_secs,
            proxy_host: file.proxy_host,
            proxy_port: file.proxy_port,
            proxy_user: file.proxy_user,
            proxy_password: file.proxy_password.map(SecretString::from),
        })
    }

    /// Load configuration from `VSTS_*` environment variables.
    pub fn load_from_env() -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            instance: env_var("VSTS_INSTANCE"),
            pat: env_var("VSTS_PAT").map(SecretString::from),
            collection: env_var("VSTS_COLLECTION"),
            protocol: env_var("VSTS_PROTOCOL"),
            timeout_secs: env_parse("VSTS_TIMEOUT_SECS", "timeout_secs")?,
            proxy_host: env_var("VSTS_PROXY_HOST"),
            proxy_port: env_parse("VSTS_PROXY_PORT", "proxy_port")?,
            proxy_user: env_var("VSTS_PROXY_USER"),
            proxy_password: env_var("VSTS_PROXY_PASSWORD").map(SecretString::from),
        })
    }

    /// Path of the config file: `$XDG_CONFIG_HOME/vsts-client/config.toml`,
    /// falling back to the platform config directory.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = match std::env::var_os("XDG_CONFIG_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir().context("Could not determine config directory")?,
        };
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Merge this config with another, preferring values from other when they exist
    pub fn merge(self, other: Self) -> Self {
        Self {
            instance: other.instance.or(self.instance),
            pat: other.pat.or(self.pat),
            collection: other.collection.or(self.collection),
            protocol: other.protocol.or(self.protocol),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            proxy_host: other.proxy_host.or(self.proxy_host),
            proxy_port: other.proxy_port.or(self.proxy_port),
            proxy_user: other.proxy_user.or(self.proxy_user),
            proxy_password: other.proxy_password.or(self.proxy_password),
        }
    }

    /// Client options with defaults filled in for unset fields.
    pub fn client_options(&self) -> ClientOptions {
        let defaults = ClientOptions::default();
        ClientOptions {
            collection: self.collection.clone().unwrap_or(defaults.collection),
            protocol: self.protocol.clone().unwrap_or(defaults.protocol),
            timeout: self
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Validates the required fields and builds a client.
    pub fn into_client(self) -> std::result::Result<VstsClient, ConfigError> {
        let options = self.client_options();
        let instance = self
            .instance
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| missing("instance", "VSTS_INSTANCE"))?;
        let pat = self
            .pat
            .filter(|v| !v.expose_secret().is_empty())
            .ok_or_else(|| missing("pat", "VSTS_PAT"))?;

        let mut client = VstsClient::with_options(instance, pat, options)?;

        if let Some(host) = self.proxy_host {
            let port = self
                .proxy_port
                .ok_or_else(|| missing("proxy_port", "VSTS_PROXY_PORT"))?;
            let password = self.proxy_password.as_ref().map(|p| p.expose_secret());
            client.set_proxy(&host, port, self.proxy_user.as_deref(), password)?;
        }

        Ok(client)
    }
}

fn missing(field: &str, env_var: &str) -> ConfigError {
    ConfigError::MissingRequired {
        field: field.to_string(),
        env_var: env_var.to_string(),
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(
    name: &str,
    field: &str,
) -> std::result::Result<Option<T>, ConfigError> {
    env_var(name)
        .map(|raw| {
            raw.parse().map_err(|_| ConfigError::InvalidValue {
                field: field.to_string(),
                message: format!("'{raw}' from {name} is not a valid number"),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::file_serial;
    use std::env;
    use tempfile::TempDir;

    const ALL_VARS: &[&str] = &[
        "VSTS_INSTANCE",
        "VSTS_PAT",
        "VSTS_COLLECTION",
        "VSTS_PROTOCOL",
        "VSTS_TIMEOUT_SECS",
        "VSTS_PROXY_HOST",
        "VSTS_PROXY_PORT",
        "VSTS_PROXY_USER",
        "VSTS_PROXY_PASSWORD",
    ];

    fn clear_env() {
        for name in ALL_VARS {
            unsafe {
                env::remove_var(name);
            }
        }
    }

    /// # Load Config from Environment Variables
    ///
    /// Tests loading configuration when all environment variables are present.
    ///
    /// ## Test Scenario
    /// - Sets every VSTS_* variable
    /// - Loads configuration from environment
    ///
    /// ## Expected Outcome
    /// - Every field reflects its variable, numbers are parsed
    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_env_all_variables() {
        clear_env();
        unsafe {
            env::set_var("VSTS_INSTANCE", "dev.azure.com/contoso");
            env::set_var("VSTS_PAT", "env-pat");
            env::set_var("VSTS_COLLECTION", "Fabrikam");
            env::set_var("VSTS_PROTOCOL", "http");
            env::set_var("VSTS_TIMEOUT_SECS", "45");
            env::set_var("VSTS_PROXY_HOST", "proxy.local");
            env::set_var("VSTS_PROXY_PORT", "3128");
            env::set_var("VSTS_PROXY_USER", "proxy-user");
            env::set_var("VSTS_PROXY_PASSWORD", "proxy-pass");
        }

        let config = Config::load_from_env();
        clear_env();
        let config = config.unwrap();

        assert_eq!(config.instance.as_deref(), Some("dev.azure.com/contoso"));
        assert_eq!(config.pat.as_ref().unwrap().expose_secret(), "env-pat");
        assert_eq!(config.collection.as_deref(), Some("Fabrikam"));
        assert_eq!(config.protocol.as_deref(), Some("http"));
        assert_eq!(config.timeout_secs, Some(45));
        assert_eq!(config.proxy_host.as_deref(), Some("proxy.local"));
        assert_eq!(config.proxy_port, Some(3128));
        assert_eq!(config.proxy_user.as_deref(), Some("proxy-user"));
        assert_eq!(
            config.proxy_password.as_ref().unwrap().expose_secret(),
            "proxy-pass"
        );
    }

    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_env_no_variables() {
        clear_env();
        let config = Config::load_from_env().unwrap();
        assert!(config.instance.is_none());
        assert!(config.pat.is_none());
        assert!(config.timeout_secs.is_none());
    }

    /// # Invalid Numeric Environment Values
    ///
    /// Tests that a non-numeric port is reported instead of silently dropped.
    ///
    /// ## Test Scenario
    /// - Sets VSTS_PROXY_PORT to a word
    ///
    /// ## Expected Outcome
    /// - ConfigError::InvalidValue naming the field
    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_env_invalid_numeric_values() {
        clear_env();
        unsafe {
            env::set_var("VSTS_PROXY_PORT", "eighty");
        }
        let result = Config::load_from_env();
        clear_env();

        match result {
            Err(ConfigError::InvalidValue { field, message }) => {
                assert_eq!(field, "proxy_port");
                assert!(message.contains("eighty"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    /// # Load Config from TOML File
    ///
    /// Tests that a valid TOML file is read into the config.
    ///
    /// ## Test Scenario
    /// - Writes a config file under a temporary XDG_CONFIG_HOME
    /// - Loads configuration from the file
    ///
    /// ## Expected Outcome
    /// - All values are loaded, unset ones stay None
    #[test]
    #[file_serial(env_tests)]
    fn test_load_from_file_valid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join(CONFIG_DIR_NAME);
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join(CONFIG_FILE_NAME),
            r#"
instance = "contoso.visualstudio.com"
pat = "file-pat"
collection = "Fabrikam"
timeout_secs = 10
proxy_host = "192.168.0.100"
proxy_port = 6000
"#,
        )
        .unwrap();

        let original_xdg = env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }
        let result = Config::load_from_file();
        match original_xdg {
            Some(val) => unsafe {
                env::set_var("XDG_CONFIG_HOME", val);
            },
            None => unsafe {
                env::remove_var("XDG_CONFIG_HOME");
            },
        }

        let config = result.unwrap();
        assert_eq!(config.instance.as_deref(), Some("contoso.visualstudio.com"));
        assert_eq!(config.pat.as_ref().unwrap().expose_secret(), "file-pat");
        assert_eq!(config.collection.as_deref(), Some("Fabrikam"));
        assert_eq!(config.timeout_secs, Some(10));
        assert_eq!(config.proxy_port, Some(6000));
        assert!(config.protocol.is_none());
        assert!(config.proxy_user.is_none());
    }

    #[test]
    fn test_load_from_path_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from_path(&temp_dir.path().join("absent.toml")).unwrap();
        assert!(config.instance.is_none());
    }

    /// # Invalid TOML
    ///
    /// Tests that a malformed file surfaces as a ParseError with its path.
    ///
    /// ## Test Scenario
    /// - Writes an unterminated string and an unknown key
    ///
    /// ## Expected Outcome
    /// - Both fail with ConfigError::ParseError
    #[test]
    fn test_load_from_path_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        for content in ["instance = \"unterminated", "organisation = \"typo\""] {
            fs::write(&path, content).unwrap();
            let err = Config::load_from_path(&path).unwrap_err();
            match err.downcast_ref::<ConfigError>() {
                Some(ConfigError::ParseError { path: reported, .. }) => {
                    assert_eq!(reported, &path)
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    #[file_serial(env_tests)]
    fn test_config_path_uses_xdg_config_home() {
        let temp_dir = TempDir::new().unwrap();
        let original_xdg = env::var("XDG_CONFIG_HOME").ok();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", temp_dir.path());
        }
        let result = Config::config_path();
        match original_xdg {
            Some(val) => unsafe {
                env::set_var("XDG_CONFIG_HOME", val);
            },
            None => unsafe {
                env::remove_var("XDG_CONFIG_HOME");
            },
        }

        assert_eq!(
            result.unwrap(),
            temp_dir.path().join("vsts-client").join("config.toml")
        );
    }

    #[test]
    fn test_config_merge_other_takes_precedence() {
        let file = Config {
            instance: Some("file-instance".to_string()),
            collection: Some("FileCollection".to_string()),
            timeout_secs: Some(10),
            ..Config::default()
        };
        let env = Config {
            instance: Some("env-instance".to_string()),
            pat: Some(SecretString::from("env-pat".to_string())),
            ..Config::default()
        };

        let merged = file.merge(env);
        assert_eq!(merged.instance.as_deref(), Some("env-instance"));
        assert_eq!(merged.collection.as_deref(), Some("FileCollection"));
        assert_eq!(merged.timeout_secs, Some(10));
        assert_eq!(merged.pat.unwrap().expose_secret(), "env-pat");
    }

    #[test]
    fn test_client_options_defaults() {
        let options = Config::default().client_options();
        assert_eq!(options, ClientOptions::default());

        let options = Config {
            protocol: Some("http".to_string()),
            timeout_secs: Some(5),
            ..Config::default()
        }
        .client_options();
        assert_eq!(options.protocol, "http");
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.collection, "DefaultCollection");
    }

    /// # Required Fields
    ///
    /// Tests that into_client names the missing field and its variable.
    ///
    /// ## Test Scenario
    /// - Empty config, config without PAT, proxy host without port
    ///
    /// ## Expected Outcome
    /// - MissingRequired for instance, pat and proxy_port in turn
    #[test]
    fn test_into_client_missing_required() {
        let err = Config::default().into_client().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingRequired { ref field, ref env_var }
                if field == "instance" && env_var == "VSTS_INSTANCE"
        ));

        let err = Config {
            instance: Some("dev.azure.com/contoso".to_string()),
            ..Config::default()
        }
        .into_client()
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { ref field, .. } if field == "pat"));

        let err = Config {
            instance: Some("dev.azure.com/contoso".to_string()),
            pat: Some(SecretString::from("pat".to_string())),
            proxy_host: Some("proxy.local".to_string()),
            ..Config::default()
        }
        .into_client()
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingRequired { ref field, .. } if field == "proxy_port")
        );
    }

    #[test]
    fn test_into_client_with_proxy() {
        let client = Config {
            instance: Some("contoso.visualstudio.com".to_string()),
            pat: Some(SecretString::from("pat".to_string())),
            proxy_host: Some("proxy.local".to_string()),
            proxy_port: Some(8080),
            ..Config::default()
        }
        .into_client()
        .unwrap();

        assert_eq!(client.instance(), "contoso.visualstudio.com/DefaultCollection");
        assert_eq!(client.transport().proxy().unwrap().port, 8080);
    }
}
