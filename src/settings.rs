use crate::session::validation::DEFAULT_BUFFER_SECONDS;
use crate::storage::DEFAULT_FIRM_ID_KEY;
use crate::utils::redirect_validator::validate_app_path;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default interval between session re-validations: 5 minutes
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 300_000;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct C2bSettings {
    pub session: SessionSettings,
    pub routes: RouteSettings,
    pub cache: CacheSettings,
    pub data: DataSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Tokens expiring within this many seconds count as expired
    pub buffer_seconds: i64,
    /// Delay between re-validations while a session stays valid
    pub check_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    pub login_path: String,
    /// Where signed-in users are sent from guest-only pages
    pub landing_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub firm_id_key: String,
    /// File-backed store location; in-memory storage when unset
    pub store_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub user_model: String,
    pub email_field: String,
    pub firm_field: String,
    pub role_field: String,
    pub list_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            buffer_seconds: DEFAULT_BUFFER_SECONDS,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
        }
    }
}

impl SessionSettings {
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            login_path: "/login".to_string(),
            landing_path: "/dashboard".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            firm_id_key: DEFAULT_FIRM_ID_KEY.to_string(),
            store_path: None,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            user_model: "User".to_string(),
            email_field: "email".to_string(),
            firm_field: "firmId".to_string(),
            role_field: "role".to_string(),
            list_limit: 100,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl C2bSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A settings file exists but cannot be read or parsed
    /// - The resulting settings fail validation
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);
        Self::initialize_logging(&settings.logging);
        settings.validate()?;

        Ok(settings)
    }

    /// Initialize `env_logger` with the configured filter; a logger installed
    /// earlier is left in place
    fn initialize_logging(logging_settings: &LoggingSettings) {
        let result = env_logger::Builder::new()
            .parse_filters(&logging_settings.level)
            .try_init();
        if result.is_err() {
            log::debug!("Logger already initialized");
        }
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `C2B_CONFIG_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but is unreadable or invalid
    fn load_base_settings() -> Result<Self> {
        let default_path = Path::new("Settings.toml");
        let mut settings = Self::from_file(default_path)?.unwrap_or_default();

        if let Ok(config_dir) = std::env::var("C2B_CONFIG_DIR") {
            let config_path = Path::new(&config_dir).join("Settings.toml");
            match Self::from_file(&config_path)? {
                Some(dir_settings) => {
                    log::info!("Overriding settings from {}", config_path.display());
                    settings = dir_settings;
                }
                None => log::info!(
                    "C2B_CONFIG_DIR set but no Settings.toml found at: {}",
                    config_path.display()
                ),
            }
        }

        Ok(settings)
    }

    /// Parse a settings file, `Ok(None)` if it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read {}: {e}", path.display()))?;
        let settings = basic_toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse {}: {e}", path.display()))?;
        Ok(Some(settings))
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_route_env_overrides(&mut settings.routes);
        Self::apply_cache_env_overrides(&mut settings.cache);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        Self::apply_numeric_env_override(
            "SESSION_BUFFER_SECONDS",
            &mut session_settings.buffer_seconds,
        );
        Self::apply_numeric_env_override(
            "SESSION_CHECK_INTERVAL_MS",
            &mut session_settings.check_interval_ms,
        );
    }

    /// Helper function to apply numeric environment variable overrides
    fn apply_numeric_env_override<T: std::str::FromStr>(env_var: &str, target: &mut T) {
        if let Ok(value_str) = std::env::var(env_var) {
            match value_str.parse::<T>() {
                Ok(value) => *target = value,
                Err(_) => log::warn!("Ignoring {env_var}={value_str}: not a number"),
            }
        }
    }

    /// Apply environment overrides for route settings
    fn apply_route_env_overrides(route_settings: &mut RouteSettings) {
        if let Ok(login_path) = std::env::var("LOGIN_PATH") {
            route_settings.login_path = login_path;
        }
        if let Ok(landing_path) = std::env::var("LANDING_PATH") {
            route_settings.landing_path = landing_path;
        }
    }

    /// Apply environment overrides for cache settings
    fn apply_cache_env_overrides(cache_settings: &mut CacheSettings) {
        if let Ok(store_path) = std::env::var("C2B_STORE_PATH") {
            cache_settings.store_path = Some(store_path).filter(|p| !p.is_empty());
        }
    }

    /// Apply environment overrides for logging settings
    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Check values that would otherwise fail silently at runtime
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The buffer is negative or the check interval is zero
    /// - A route is not a local application path
    /// - The cache key is empty
    pub fn validate(&self) -> Result<()> {
        if self.session.buffer_seconds < 0 {
            return Err(anyhow!("session.buffer_seconds must not be negative"));
        }
        if self.session.check_interval_ms == 0 {
            return Err(anyhow!("session.check_interval_ms must be positive"));
        }
        validate_app_path(&self.routes.login_path)
            .map_err(|e| anyhow!("routes.login_path: {e}"))?;
        validate_app_path(&self.routes.landing_path)
            .map_err(|e| anyhow!("routes.landing_path: {e}"))?;
        if self.cache.firm_id_key.trim().is_empty() {
            return Err(anyhow!("cache.firm_id_key must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    // Helper function to clean all relevant environment variables for tests
    fn clean_env_vars() {
        for var in [
            "SESSION_BUFFER_SECONDS",
            "SESSION_CHECK_INTERVAL_MS",
            "LOGIN_PATH",
            "LANDING_PATH",
            "C2B_STORE_PATH",
            "C2B_CONFIG_DIR",
            "RUST_LOG",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = C2bSettings::default();
        assert_eq!(settings.session.buffer_seconds, 300);
        assert_eq!(
            settings.session.check_interval(),
            Duration::from_millis(300_000)
        );
        assert_eq!(settings.cache.firm_id_key, "c2b:myFirmId");
        assert_eq!(settings.routes.login_path, "/login");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: C2bSettings = basic_toml::from_str(
            r#"
            [session]
            check_interval_ms = 60000

            [routes]
            landing_path = "/loads"
            "#,
        )
        .unwrap();

        assert_eq!(settings.session.check_interval_ms, 60_000);
        assert_eq!(settings.session.buffer_seconds, 300);
        assert_eq!(settings.routes.landing_path, "/loads");
        assert_eq!(settings.routes.login_path, "/login");
        assert_eq!(settings.data.user_model, "User");
    }

    #[test]
    #[serial]
    fn test_session_env_overrides() {
        clean_env_vars();
        std::env::set_var("SESSION_BUFFER_SECONDS", "120");
        std::env::set_var("SESSION_CHECK_INTERVAL_MS", "not-a-number");

        let mut session_settings = SessionSettings::default();
        C2bSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.buffer_seconds, 120);
        assert_eq!(
            session_settings.check_interval_ms,
            DEFAULT_CHECK_INTERVAL_MS
        );

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_route_and_cache_env_overrides() {
        clean_env_vars();
        std::env::set_var("LOGIN_PATH", "/auth/sign-in");
        std::env::set_var("C2B_STORE_PATH", "/tmp/c2b-store.json");

        let mut settings = C2bSettings::default();
        C2bSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.routes.login_path, "/auth/sign-in");
        assert_eq!(settings.routes.landing_path, "/dashboard");
        assert_eq!(
            settings.cache.store_path.as_deref(),
            Some("/tmp/c2b-store.json")
        );

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_logging_level_from_file_and_env() {
        clean_env_vars();
        let toml = "[logging]\nlevel = \"debug\"\n";
        let settings: C2bSettings = basic_toml::from_str(toml).unwrap();
        assert_eq!(settings.logging.level, "debug");

        std::env::set_var("RUST_LOG", "c2b_session=trace");
        let mut settings = settings;
        C2bSettings::apply_env_overrides(&mut settings);
        assert_eq!(settings.logging.level, "c2b_session=trace");

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_config_dir_takes_precedence() {
        clean_env_vars();
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Settings.toml"),
            "[routes]\nlogin_path = \"/welcome\"\n",
        )
        .unwrap();
        std::env::set_var("C2B_CONFIG_DIR", dir.path());

        let settings = C2bSettings::load().unwrap();
        assert_eq!(settings.routes.login_path, "/welcome");

        clean_env_vars();
    }

    #[test]
    fn test_from_file_missing_and_invalid() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(C2bSettings::from_file(&missing).unwrap().is_none());

        let bad = dir.path().join("bad.toml");
        fs::write(&bad, "[session\nbuffer_seconds = ").unwrap();
        assert!(C2bSettings::from_file(&bad).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = C2bSettings::default();
        settings.routes.login_path = "https://evil.example.com/login".to_string();
        assert!(settings.validate().is_err());

        let mut settings = C2bSettings::default();
        settings.session.check_interval_ms = 0;
        assert!(settings.validate().is_err());

        let mut settings = C2bSettings::default();
        settings.session.buffer_seconds = -1;
        assert!(settings.validate().is_err());

        let mut settings = C2bSettings::default();
        settings.cache.firm_id_key = "  ".to_string();
        assert!(settings.validate().is_err());
    }
}
