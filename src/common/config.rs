//! Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Automation endpoint settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Capabilities sent when opening a session
    #[serde(default)]
    pub capabilities: Capabilities,

    /// Login credentials used before every scenario
    #[serde(default)]
    pub credentials: Credentials,

    /// Element wait settings
    #[serde(default)]
    pub timeouts: Timeouts,

    /// Fixed pauses between UI actions
    #[serde(default)]
    pub delays: Delays,

    /// Screenshot and results output
    #[serde(default)]
    pub output: OutputConfig,
}

/// Automation endpoint settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Base URL of the Appium server
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Timeout for a single HTTP round trip
    #[serde(default = "default_request_secs")]
    pub request_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            request_secs: default_request_secs(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:4723".to_string()
}
fn default_request_secs() -> u64 {
    120
}

/// Session capabilities for the Android target
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Capabilities {
    #[serde(default = "default_platform_name")]
    pub platform_name: String,
    #[serde(default = "default_platform_version")]
    pub platform_version: String,
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default = "default_app_package")]
    pub app_package: String,
    #[serde(default = "default_app_activity")]
    pub app_activity: String,
    #[serde(default = "default_automation_name")]
    pub automation_name: String,
    #[serde(default = "default_true")]
    pub no_reset: bool,
    /// Needed when the login flow leaves the app for a browser
    #[serde(default)]
    pub auto_grant_permissions: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            platform_name: default_platform_name(),
            platform_version: default_platform_version(),
            device_name: default_device_name(),
            app_package: default_app_package(),
            app_activity: default_app_activity(),
            automation_name: default_automation_name(),
            no_reset: true,
            auto_grant_permissions: false,
        }
    }
}

fn default_platform_name() -> String {
    "Android".to_string()
}
fn default_platform_version() -> String {
    "16".to_string()
}
fn default_device_name() -> String {
    "emulator-5554".to_string()
}
fn default_app_package() -> String {
    "com.example.my_auth_app".to_string()
}
fn default_app_activity() -> String {
    "com.example.my_auth_app.MainActivity".to_string()
}
fn default_automation_name() -> String {
    "UiAutomator2".to_string()
}
fn default_true() -> bool {
    true
}

/// Credentials for the email login and the Spotify OAuth page
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_spotify_username")]
    pub spotify_username: String,
    #[serde(default = "default_spotify_password")]
    pub spotify_password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            email: default_email(),
            password: default_password(),
            spotify_username: default_spotify_username(),
            spotify_password: default_spotify_password(),
        }
    }
}

fn default_email() -> String {
    "john@example.com".to_string()
}
fn default_password() -> String {
    "pass123".to_string()
}
fn default_spotify_username() -> String {
    "test_spotify_user@example.com".to_string()
}
fn default_spotify_password() -> String {
    "test_password".to_string()
}

/// Element wait settings in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Timeouts {
    /// How long a form element lookup polls before giving up
    #[serde(default = "default_element_wait")]
    pub element_wait_ms: u64,

    /// How long the login screen elements are waited for
    #[serde(default = "default_login_wait")]
    pub login_wait_ms: u64,

    /// Pause between lookup attempts
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            element_wait_ms: default_element_wait(),
            login_wait_ms: default_login_wait(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_element_wait() -> u64 {
    5_000
}
fn default_login_wait() -> u64 {
    20_000
}
fn default_poll_interval() -> u64 {
    500
}

impl Timeouts {
    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_wait_ms)
    }

    pub fn login_wait(&self) -> Duration {
        Duration::from_millis(self.login_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Fixed pauses in milliseconds
///
/// The app under test animates most transitions, so the runner sleeps
/// instead of waiting on a condition in these places.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Delays {
    #[serde(default = "default_app_load")]
    pub app_load_ms: u64,
    #[serde(default = "default_after_login")]
    pub after_login_ms: u64,
    #[serde(default = "default_after_terminate")]
    pub after_terminate_ms: u64,
    #[serde(default = "default_after_activate")]
    pub after_activate_ms: u64,
    #[serde(default = "default_field_settle")]
    pub field_settle_ms: u64,
    #[serde(default = "default_dropdown")]
    pub dropdown_ms: u64,
    #[serde(default = "default_after_submit")]
    pub after_submit_ms: u64,
    #[serde(default = "default_between_scenarios")]
    pub between_scenarios_ms: u64,
    /// Pause before retrying the Sign in click
    #[serde(default = "default_retry")]
    pub retry_ms: u64,
    /// Pause after a sign-in attempt that is expected to be rejected
    #[serde(default = "default_sign_in_attempt")]
    pub sign_in_attempt_ms: u64,
    #[serde(default = "default_after_logout")]
    pub after_logout_ms: u64,
    /// Time given to an OAuth provider to hand control back to the app
    #[serde(default = "default_oauth_return")]
    pub oauth_return_ms: u64,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            app_load_ms: default_app_load(),
            after_login_ms: default_after_login(),
            after_terminate_ms: default_after_terminate(),
            after_activate_ms: default_after_activate(),
            field_settle_ms: default_field_settle(),
            dropdown_ms: default_dropdown(),
            after_submit_ms: default_after_submit(),
            between_scenarios_ms: default_between_scenarios(),
            retry_ms: default_retry(),
            sign_in_attempt_ms: default_sign_in_attempt(),
            after_logout_ms: default_after_logout(),
            oauth_return_ms: default_oauth_return(),
        }
    }
}

fn default_app_load() -> u64 {
    5_000
}
fn default_after_login() -> u64 {
    5_000
}
fn default_after_terminate() -> u64 {
    2_000
}
fn default_after_activate() -> u64 {
    5_000
}
fn default_field_settle() -> u64 {
    1_000
}
fn default_dropdown() -> u64 {
    2_000
}
fn default_after_submit() -> u64 {
    5_000
}
fn default_between_scenarios() -> u64 {
    2_000
}
fn default_retry() -> u64 {
    2_000
}
fn default_sign_in_attempt() -> u64 {
    3_000
}
fn default_after_logout() -> u64 {
    3_000
}
fn default_oauth_return() -> u64 {
    10_000
}

impl Delays {
    /// All pauses set to zero, for scripted devices
    pub fn none() -> Self {
        Self {
            app_load_ms: 0,
            after_login_ms: 0,
            after_terminate_ms: 0,
            after_activate_ms: 0,
            field_settle_ms: 0,
            dropdown_ms: 0,
            after_submit_ms: 0,
            between_scenarios_ms: 0,
            retry_ms: 0,
            sign_in_attempt_ms: 0,
            after_logout_ms: 0,
            oauth_return_ms: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Capture a screenshot after each submit attempt
    #[serde(default = "default_true")]
    pub screenshots: bool,

    /// Directory screenshots are written to
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            screenshots: true,
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Pause for the given number of milliseconds; zero returns immediately
pub async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| super::Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_emulator_setup() {
        let config = Config::default();
        assert_eq!(config.server.url, "http://127.0.0.1:4723");
        assert_eq!(config.capabilities.app_package, "com.example.my_auth_app");
        assert_eq!(config.capabilities.automation_name, "UiAutomator2");
        assert!(config.capabilities.no_reset);
        assert_eq!(config.credentials.email, "john@example.com");
        assert_eq!(config.timeouts.element_wait(), Duration::from_secs(5));
        assert_eq!(config.delays.after_submit_ms, 5_000);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
url = "http://10.0.2.2:4723"

[delays]
app_load_ms = 0

[capabilities]
platform_version = "14"
"#,
        )
        .unwrap();

        assert_eq!(config.server.url, "http://10.0.2.2:4723");
        assert_eq!(config.server.request_secs, 120);
        assert_eq!(config.delays.app_load_ms, 0);
        assert_eq!(config.delays.after_login_ms, 5_000);
        assert_eq!(config.capabilities.platform_version, "14");
        assert_eq!(config.capabilities.device_name, "emulator-5554");
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nurl = 1").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(super::super::Error::ConfigParse(_))
        ));
    }

    #[test]
    fn test_to_toml_round_trips_server() {
        let text = Config::default().to_toml().unwrap();
        assert!(text.contains("[server]"));
        assert!(text.contains("127.0.0.1:4723"));
    }
}
