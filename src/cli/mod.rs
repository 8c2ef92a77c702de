//! CLI command handling
//!
//! Opens the automation session a command needs, runs it, and always
//! closes the session again before reporting.

use std::path::Path;

use colored::Colorize;

use crate::commands::{Commands, LoginMethod};
use crate::common::{logging, paths, Config, Error, Result};
use crate::device::Device;
use crate::testing::login::{self, CredentialOutcome, INVALID_CREDENTIALS};
use crate::testing::report::{self, Summary};
use crate::testing::{parse_filter, run_suite, TestSuite};
use crate::webdriver::WebDriverSession;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, mut config: Config) -> Result<()> {
    match command {
        Commands::Run {
            json,
            output,
            filter,
            screenshot_dir,
            no_screenshots,
        } => {
            if let Some(dir) = screenshot_dir {
                config.output.screenshot_dir = dir;
            }
            if no_screenshots {
                config.output.screenshots = false;
            }
            run_scenarios(&config, &json, &output, filter.as_deref()).await
        }

        Commands::Login {
            method,
            email,
            password,
            logout,
        } => {
            if method == LoginMethod::Spotify {
                config.capabilities.auto_grant_permissions = true;
            }
            let mut session = open_session(&config).await?;
            let result = login_once(&mut session, &config, method, email, password, logout).await;
            close_session(&mut session).await;
            result
        }

        Commands::Credentials => {
            let mut session = open_session(&config).await?;
            let result = sweep_credentials(&mut session, &config).await;
            close_session(&mut session).await;
            result
        }

        Commands::Config => {
            match paths::config_path() {
                Some(path) if path.exists() => println!("# {}", path.display()),
                Some(path) => println!("# {} (not found, using defaults)", path.display()),
                None => println!("# no config directory available, using defaults"),
            }
            if let Some(log) = logging::log_file_path() {
                println!("# run log: {}", log.display());
            }
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn open_session(config: &Config) -> Result<WebDriverSession> {
    println!(
        "{} {}",
        "Connecting to".cyan(),
        config.server.url.white().bold()
    );
    WebDriverSession::connect(&config.server, &config.capabilities).await
}

async fn close_session(session: &mut WebDriverSession) {
    if let Err(e) = session.quit().await {
        tracing::warn!("Failed to close session: {}", e);
    }
}

async fn run_scenarios(
    config: &Config,
    json: &Path,
    output: &Path,
    filter: Option<&str>,
) -> Result<()> {
    let mut suite = TestSuite::load(json)?;
    if let Some(filter) = filter {
        suite.retain_ids(&parse_filter(filter));
    }
    println!("Loaded {} test cases", suite.test_cases.len());

    let mut session = open_session(config).await?;
    let run = run_suite(&mut session, &suite, config).await;
    close_session(&mut session).await;

    let summary = Summary::from_results(&run.results);
    if summary.total > 0 {
        report::print_summary(&summary);
        match report::write_results(output, &run.results) {
            Ok(()) => println!("\nTest results saved to {}", output.display()),
            Err(e) => eprintln!("Error saving results: {}", e),
        }
    }

    if let Some(e) = run.aborted {
        return Err(e);
    }
    if !summary.all_passed() {
        return Err(Error::ChecksFailed {
            what: "scenarios".to_string(),
            failed: summary.failed,
            total: summary.total,
        });
    }
    Ok(())
}

async fn login_once<D: Device + ?Sized>(
    device: &mut D,
    config: &Config,
    method: LoginMethod,
    email: Option<String>,
    password: Option<String>,
    logout: bool,
) -> Result<()> {
    let logged_in = match method {
        LoginMethod::Email => {
            let email = email.unwrap_or_else(|| config.credentials.email.clone());
            let password = password.unwrap_or_else(|| config.credentials.password.clone());
            login::login_with_email(device, config, &email, &password).await?;
            login::dismiss_password_manager(device, config).await;
            login::verify_login(device, config).await
        }
        LoginMethod::TestUser => login::login_as_test_user(device, config).await?,
        LoginMethod::Spotify => login::login_with_spotify(device, config).await?,
    };

    if !logged_in {
        println!("{} {}", "✗".red(), "Login Failed".red().bold());
        return Err(Error::LoginFailed("survey screen did not appear".to_string()));
    }
    println!("{} {}", "✓".green(), "Login Passed".green().bold());

    if logout {
        login::logout(device, config).await?;
        println!("{} Logged out", "✓".green());
    }
    Ok(())
}

async fn sweep_credentials<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<()> {
    // Start from a clean login screen; the app keeps its session across
    // restarts, so log out if it comes back on the survey
    crate::testing::reset_app(device, config).await?;
    if login::on_survey_screen(device).await {
        login::logout(device, config).await?;
    }

    let outcomes = login::run_credential_sweep(device, config, &INVALID_CREDENTIALS).await;
    print_credential_summary(&outcomes);

    let failed = outcomes.iter().filter(|o| !o.passed).count();
    if failed > 0 {
        return Err(Error::ChecksFailed {
            what: "credential cases".to_string(),
            failed,
            total: outcomes.len(),
        });
    }
    Ok(())
}

fn print_credential_summary(outcomes: &[CredentialOutcome]) {
    println!("\n{}", "Summary:".cyan());
    for (i, outcome) in outcomes.iter().enumerate() {
        let mark = if outcome.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        match &outcome.error {
            Some(e) => println!("  Test {}: {} - {} ({})", i + 1, mark, outcome.label, e.dimmed()),
            None => println!("  Test {}: {} - {}", i + 1, mark, outcome.label),
        }
    }
}

/// Resolve the config file: explicit path, else the platform default
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
