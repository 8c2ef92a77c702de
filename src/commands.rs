//! CLI command definitions
//!
//! Defines the clap commands for the survey runner CLI.

use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run survey scenarios from a JSON or YAML file
    Run {
        /// Path to the file with test cases
        #[arg(long, short = 'j')]
        json: PathBuf,

        /// Path to the JSON file results are written to
        #[arg(long, short, default_value = "test_results.json")]
        output: PathBuf,

        /// Only run these test case ids (comma-separated, e.g. TC1,TC3)
        #[arg(long, short)]
        filter: Option<String>,

        /// Directory for per-scenario screenshots
        #[arg(long)]
        screenshot_dir: Option<PathBuf>,

        /// Do not capture screenshots after submitting
        #[arg(long)]
        no_screenshots: bool,
    },

    /// Log in once and check that the survey screen appears
    Login {
        /// How to log in
        #[arg(long, value_enum, default_value_t = LoginMethod::Email)]
        method: LoginMethod,

        /// Email or phone number (email method only)
        #[arg(long)]
        email: Option<String>,

        /// Password (email method only)
        #[arg(long)]
        password: Option<String>,

        /// Log out again after a successful login
        #[arg(long)]
        logout: bool,
    },

    /// Check that the login screen rejects a set of bad credentials
    Credentials,

    /// Print the effective configuration
    Config,
}

/// Login flows offered by the app's login screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LoginMethod {
    /// Email or phone number and password
    Email,
    /// The "Login as Test User" shortcut
    TestUser,
    /// Spotify OAuth in a webview
    Spotify,
}
