//! Login screen flows
//!
//! Email/password login is the precondition of every survey scenario. The
//! other flows (test user, Spotify OAuth, logout, rejected credentials)
//! back the `login` and `credentials` subcommands.

use crate::common::config::{pause, Config};
use crate::common::{Error, Result};
use crate::device::{Device, ElementId, Locator, NATIVE_CONTEXT};

use super::locate::{fill, find_element_safe, Wait};
use super::screens;

/// How many times the Sign in button is tried before giving up
pub const SIGN_IN_ATTEMPTS: usize = 3;

/// Activity reported while the app's own UI is in front
const MAIN_ACTIVITY: &str = ".MainActivity";

async fn require<D: Device + ?Sized>(
    device: &mut D,
    xpath: &str,
    what: &str,
    wait: Wait,
) -> Result<ElementId> {
    find_element_safe(device, &Locator::xpath(xpath), wait)
        .await
        .ok_or_else(|| Error::ElementNotFound(what.to_string()))
}

/// Type credentials and press Sign in
///
/// Does not check where the app ended up; see [`verify_login`].
pub async fn login_with_email<D: Device + ?Sized>(
    device: &mut D,
    config: &Config,
    email: &str,
    password: &str,
) -> Result<()> {
    let wait = Wait::login(&config.timeouts);
    pause(config.delays.app_load_ms).await;
    tracing::info!("App loaded, starting email login");

    let email_input = require(device, screens::EMAIL_INPUT, "email input", wait).await?;
    fill(device, &email_input, email, 0).await?;
    tracing::debug!("Entered email");

    let password_input = require(device, screens::PASSWORD_INPUT, "password input", wait).await?;
    fill(device, &password_input, password, 0).await?;
    tracing::debug!("Entered password");

    ensure_foreground(device, config).await;
    click_sign_in(device, config).await?;

    pause(config.delays.after_login_ms).await;
    Ok(())
}

/// Re-activate the app if the keyboard or an autofill prompt took focus
async fn ensure_foreground<D: Device + ?Sized>(device: &mut D, config: &Config) {
    match device.current_activity().await {
        Ok(activity) if activity != MAIN_ACTIVITY => {
            tracing::warn!("App activity changed to: {}", activity);
            if let Err(e) = device.activate_app(&config.capabilities.app_package).await {
                tracing::warn!("Could not re-activate app: {}", e);
            }
            pause(config.delays.retry_ms).await;
        }
        Ok(_) => {}
        Err(e) => tracing::debug!("Could not read current activity: {}", e),
    }
}

async fn click_sign_in<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<()> {
    let wait = Wait::login(&config.timeouts);
    let mut last_error = None;

    for attempt in 1..=SIGN_IN_ATTEMPTS {
        let clicked = match find_element_safe(device, &Locator::xpath(screens::SIGN_IN_BUTTON), wait)
            .await
        {
            Some(button) => device.click(&button).await,
            None => Err(Error::ElementNotFound("Sign in button".to_string())),
        };

        match clicked {
            Ok(()) => {
                tracing::info!("Sign in button clicked");
                return Ok(());
            }
            Err(e) if attempt < SIGN_IN_ATTEMPTS => {
                tracing::warn!(
                    "Retry {}/{} clicking sign in button: {}",
                    attempt,
                    SIGN_IN_ATTEMPTS,
                    e
                );
                device
                    .activate_app(&config.capabilities.app_package)
                    .await?;
                pause(config.delays.retry_ms).await;
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(Error::LoginFailed(format!(
        "could not click Sign in after {} attempts: {}",
        SIGN_IN_ATTEMPTS,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    )))
}

/// Whether the page source already shows the survey screen
pub async fn on_survey_screen<D: Device + ?Sized>(device: &mut D) -> bool {
    match device.page_source().await {
        Ok(source) => source.contains(screens::SURVEY_MARKER),
        Err(e) => {
            tracing::debug!("Could not read page source: {}", e);
            false
        }
    }
}

/// Whether the survey screen is showing
pub async fn verify_login<D: Device + ?Sized>(device: &mut D, config: &Config) -> bool {
    match device.page_source().await {
        Ok(source) if source.contains(screens::SURVEY_MARKER) => {
            tracing::info!("Login successful, found AI Survey page");
            return true;
        }
        Ok(source) => tracing::debug!("Page source after login:\n{}", source),
        Err(e) => tracing::debug!("Could not read page source: {}", e),
    }

    let found = find_element_safe(
        device,
        &Locator::xpath(screens::SURVEY_HEADER),
        Wait::login(&config.timeouts),
    )
    .await
    .is_some();
    if found {
        tracing::info!("Login successful, found AI Survey header");
    } else {
        tracing::warn!("Not on survey page after login attempt");
    }
    found
}

/// Dismiss the system password manager prompt if it is showing
pub async fn dismiss_password_manager<D: Device + ?Sized>(device: &mut D, config: &Config) -> bool {
    let buttons = match device
        .find_elements(&Locator::xpath(screens::PASSWORD_MANAGER_DISMISS))
        .await
    {
        Ok(buttons) => buttons,
        Err(e) => {
            tracing::debug!("Could not look for password manager popup: {}", e);
            return false;
        }
    };

    let Some(first) = buttons.first() else {
        return false;
    };
    match device.click(first).await {
        Ok(()) => {
            tracing::info!("Dismissed password manager popup");
            pause(config.delays.field_settle_ms).await;
            true
        }
        Err(e) => {
            tracing::debug!("Could not dismiss popup: {}", e);
            false
        }
    }
}

/// Log in through the built-in test user shortcut
pub async fn login_as_test_user<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<bool> {
    pause(config.delays.app_load_ms).await;
    let button = find_element_safe(
        device,
        &Locator::accessibility_id(screens::TEST_USER_LOGIN),
        Wait::login(&config.timeouts),
    )
    .await
    .ok_or_else(|| Error::ElementNotFound("test user login button".to_string()))?;
    device.click(&button).await?;
    tracing::info!("Test login button clicked");

    pause(config.delays.after_login_ms).await;
    Ok(verify_login(device, config).await)
}

/// Log in through Spotify OAuth in a webview
pub async fn login_with_spotify<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<bool> {
    let package = &config.capabilities.app_package;
    pause(config.delays.app_load_ms).await;

    let button = require(
        device,
        screens::SPOTIFY_BUTTON,
        "Spotify button",
        Wait::login(&config.timeouts),
    )
    .await?;
    device.click(&button).await?;
    tracing::info!("Spotify button clicked");

    pause(config.delays.app_load_ms).await;
    match authorize_in_webview(device, config).await {
        Ok(true) => tracing::info!("Spotify authorization submitted"),
        Ok(false) => tracing::info!("No webview context found, remaining in native context"),
        Err(e) => {
            tracing::warn!("Webview handling error: {}", e);
            if let Err(e) = device.set_context(NATIVE_CONTEXT).await {
                tracing::debug!("Could not switch back to native context: {}", e);
            }
        }
    }

    // The provider may leave us in the browser; give it time, then pull
    // the app back to the front if it has not returned on its own.
    pause(config.delays.oauth_return_ms).await;
    let current = device.current_package().await?;
    tracing::info!("Current package: {}", current);
    if &current != package {
        tracing::warn!("Not in the app after authentication flow");
        device.activate_app(package).await?;
        pause(config.delays.app_load_ms).await;
    }

    Ok(verify_login(device, config).await)
}

async fn authorize_in_webview<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<bool> {
    let contexts = device.contexts().await?;
    tracing::debug!("Available contexts: {:?}", contexts);

    let Some(webview) = contexts.iter().find(|c| c.contains("WEBVIEW")) else {
        return Ok(false);
    };
    device.set_context(webview).await?;
    tracing::info!("Switched to context: {}", webview);

    let wait = Wait::login(&config.timeouts);
    let username = find_element_safe(device, &Locator::id(screens::spotify::USERNAME), wait)
        .await
        .ok_or_else(|| Error::ElementNotFound("Spotify username input".to_string()))?;
    device
        .send_keys(&username, &config.credentials.spotify_username)
        .await?;

    let password = find_element_safe(device, &Locator::id(screens::spotify::PASSWORD), Wait::immediate())
        .await
        .ok_or_else(|| Error::ElementNotFound("Spotify password input".to_string()))?;
    device
        .send_keys(&password, &config.credentials.spotify_password)
        .await?;

    let login = find_element_safe(device, &Locator::id(screens::spotify::LOGIN), Wait::immediate())
        .await
        .ok_or_else(|| Error::ElementNotFound("Spotify login button".to_string()))?;
    device.click(&login).await?;

    match find_element_safe(device, &Locator::id(screens::spotify::ACCEPT), wait).await {
        Some(accept) => device.click(&accept).await?,
        None => tracing::info!("No authorization confirmation needed"),
    }

    device.set_context(NATIVE_CONTEXT).await?;
    Ok(true)
}

/// Leave the survey screen through its logout button
pub async fn logout<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<()> {
    let button = require(
        device,
        screens::LOGOUT_BUTTON,
        "logout button",
        Wait::login(&config.timeouts),
    )
    .await?;
    device.click(&button).await?;
    tracing::info!("Logged out");
    pause(config.delays.after_logout_ms).await;
    Ok(())
}

/// A credential pair the app must refuse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialCase {
    pub label: &'static str,
    pub identifier: &'static str,
    pub password: &'static str,
}

/// Rejected-login cases run by the credential sweep
pub const INVALID_CREDENTIALS: [CredentialCase; 7] = [
    CredentialCase {
        label: "Invalid email",
        identifier: "random@example.com",
        password: "pass123",
    },
    CredentialCase {
        label: "Invalid phone",
        identifier: "5333333333",
        password: "1231234321",
    },
    CredentialCase {
        label: "Wrong password",
        identifier: "john@example.com",
        password: "1231234321",
    },
    CredentialCase {
        label: "Empty email/phone",
        identifier: "",
        password: "1231234321",
    },
    CredentialCase {
        label: "Empty password",
        identifier: "john@example.com",
        password: "",
    },
    CredentialCase {
        label: "Malformed email",
        identifier: "john-example.com",
        password: "pass123",
    },
    CredentialCase {
        label: "Malformed phone",
        identifier: "53a1234567",
        password: "pass123",
    },
];

/// Result of one rejected-login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialOutcome {
    pub label: String,
    /// The Sign in button was still on screen afterwards
    pub passed: bool,
    pub error: Option<String>,
}

/// Try each credential pair and check the login screen stays up
///
/// Starts from the login screen. A case that errors is recorded as failed
/// and the sweep moves on.
pub async fn run_credential_sweep<D: Device + ?Sized>(
    device: &mut D,
    config: &Config,
    cases: &[CredentialCase],
) -> Vec<CredentialOutcome> {
    let mut outcomes = Vec::with_capacity(cases.len());
    for (i, case) in cases.iter().enumerate() {
        tracing::info!("Credential case {}: {}", i + 1, case.label);
        let outcome = match attempt_login(device, config, case).await {
            Ok(passed) => CredentialOutcome {
                label: case.label.to_string(),
                passed,
                error: None,
            },
            Err(e) => CredentialOutcome {
                label: case.label.to_string(),
                passed: false,
                error: Some(e.to_string()),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

async fn attempt_login<D: Device + ?Sized>(
    device: &mut D,
    config: &Config,
    case: &CredentialCase,
) -> Result<bool> {
    let wait = Wait::login(&config.timeouts);
    let settle = config.delays.field_settle_ms / 2;

    let email = require(device, screens::EMAIL_INPUT, "email input", wait).await?;
    fill(device, &email, case.identifier, settle).await?;
    pause(settle).await;

    let password = require(device, screens::PASSWORD_INPUT, "password input", wait).await?;
    fill(device, &password, case.password, settle).await?;
    pause(settle).await;

    let sign_in = require(device, screens::SIGN_IN_BUTTON, "Sign in button", wait).await?;
    device.click(&sign_in).await?;
    pause(config.delays.sign_in_attempt_ms).await;

    let still_there = device
        .find_elements(&Locator::xpath(screens::SIGN_IN_BUTTON))
        .await?;
    Ok(!still_there.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_cover_empty_fields() {
        assert!(INVALID_CREDENTIALS.iter().any(|c| c.identifier.is_empty()));
        assert!(INVALID_CREDENTIALS.iter().any(|c| c.password.is_empty()));
        let labels: std::collections::HashSet<_> =
            INVALID_CREDENTIALS.iter().map(|c| c.label).collect();
        assert_eq!(labels.len(), INVALID_CREDENTIALS.len());
    }
}
