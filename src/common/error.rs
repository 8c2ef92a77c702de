//! Error types for the survey runner
//!
//! Messages end up verbatim in the `message` field of failed results, so
//! they name the thing that went wrong rather than the call that failed.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the survey runner
#[derive(Error, Debug)]
pub enum Error {
    // === Endpoint/Session Errors ===
    #[error("Automation endpoint unreachable at {url}: {reason}")]
    EndpointUnreachable { url: String, reason: String },

    #[error("Failed to create automation session: {0}")]
    SessionCreate(String),

    #[error("No automation session is open")]
    SessionClosed,

    #[error("WebDriver command '{command}' failed ({error}): {message}")]
    WebDriver {
        command: String,
        error: String,
        message: String,
    },

    #[error("Unexpected WebDriver response: {0}")]
    Protocol(String),

    // === Element Errors ===
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    // === App Errors ===
    #[error("Failed to reset app '{package}': {reason}")]
    AppReset { package: String, reason: String },

    #[error("Login failed: {0}")]
    LoginFailed(String),

    #[error("{failed} of {total} {what} failed")]
    ChecksFailed {
        what: String,
        failed: usize,
        total: usize,
    },

    // === Scenario File Errors ===
    #[error("Failed to read scenario file '{path}': {error}")]
    ScenarioRead { path: String, error: String },

    #[error("Failed to parse scenario file '{path}': {error}")]
    ScenarioParse { path: String, error: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to write file '{path}': {error}")]
    FileWrite { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === HTTP Errors ===
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a WebDriver command error from the endpoint's error payload
    pub fn webdriver(command: &str, error: &str, message: &str) -> Self {
        Self::WebDriver {
            command: command.to_string(),
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an app reset error
    pub fn app_reset(package: &str, reason: impl ToString) -> Self {
        Self::AppReset {
            package: package.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Errors after which no further scenario can run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EndpointUnreachable { .. } | Self::SessionClosed)
    }

    /// Whether this is the endpoint telling us an element lookup came back empty
    pub fn is_no_such_element(&self) -> bool {
        match self {
            Self::WebDriver { error, .. } => error == "no such element",
            Self::ElementNotFound(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webdriver_error_message() {
        let e = Error::webdriver("click", "element not interactable", "covered by keyboard");
        assert_eq!(
            e.to_string(),
            "WebDriver command 'click' failed (element not interactable): covered by keyboard"
        );
        assert!(!e.is_no_such_element());
    }

    #[test]
    fn test_no_such_element_detection() {
        assert!(Error::webdriver("find", "no such element", "").is_no_such_element());
        assert!(Error::ElementNotFound("x".into()).is_no_such_element());
        assert!(!Error::SessionClosed.is_no_such_element());
    }

    #[test]
    fn test_fatal_errors() {
        assert!(Error::SessionClosed.is_fatal());
        assert!(Error::EndpointUnreachable {
            url: "http://127.0.0.1:4723".into(),
            reason: "refused".into(),
        }
        .is_fatal());
        assert!(!Error::LoginFailed("x".into()).is_fatal());
    }
}
