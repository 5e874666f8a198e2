//! Runner configuration.
//!
//! Loaded via the `config` crate from environment variables prefixed with
//! `FLOWGATE`, with `__` separating nested keys, e.g.
//! `FLOWGATE__ADMIN__USERNAME=root`.

use serde::Deserialize;

/// Runner configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerConfig {
    /// Default tracing filter. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// The Admin user seeded into the user repository.
    #[serde(default)]
    pub admin: AdminSeed,
}

/// The Admin user created at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    #[serde(default = "default_admin_username")]
    pub username: String,

    #[serde(default = "default_admin_email")]
    pub email: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_admin_username() -> String {
    "admin".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

impl Default for AdminSeed {
    fn default() -> Self {
        Self {
            username: default_admin_username(),
            email: default_admin_email(),
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            admin: AdminSeed::default(),
        }
    }
}

impl RunnerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be deserialized.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::with_prefix("FLOWGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_config_has_correct_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.email, "admin@example.com");
    }

    #[test]
    fn partial_sources_fall_back_to_defaults() {
        let config: RunnerConfig = config::Config::builder()
            .add_source(config::File::from_str(
                r#"{"admin": {"username": "root"}}"#,
                config::FileFormat::Json,
            ))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.admin.username, "root");
        assert_eq!(config.admin.email, "admin@example.com");
        assert_eq!(config.log_filter, "info");
    }
}
