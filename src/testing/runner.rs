//! Test runner implementation
//!
//! Walks the test cases of a scenario file in order. Every scenario starts
//! from a freshly restarted app and a new login, so one scenario's leftover
//! state cannot leak into the next.

use colored::Colorize;

use crate::common::config::{pause, Config};
use crate::common::{Error, Result};
use crate::device::Device;

use super::classify::Verdict;
use super::config::{TestCase, TestSuite};
use super::form;
use super::login;
use super::report::{self, ScenarioResult};

/// Outcome of running a whole scenario file
#[derive(Debug)]
pub struct SuiteRun {
    pub results: Vec<ScenarioResult>,
    /// Set when the run stopped before the last scenario
    pub aborted: Option<Error>,
}

/// Restart the app so it opens on the login screen
pub async fn reset_app<D: Device + ?Sized>(device: &mut D, config: &Config) -> Result<()> {
    let package = &config.capabilities.app_package;
    let wrap = |e: Error| {
        if e.is_fatal() {
            e
        } else {
            Error::app_reset(package, e)
        }
    };
    device.terminate_app(package).await.map_err(wrap)?;
    pause(config.delays.after_terminate_ms).await;
    device.activate_app(package).await.map_err(wrap)?;
    pause(config.delays.after_activate_ms).await;
    Ok(())
}

/// Run every test case, stopping early only on a fatal error
pub async fn run_suite<D: Device + ?Sized>(
    device: &mut D,
    suite: &TestSuite,
    config: &Config,
) -> SuiteRun {
    let mut results = Vec::with_capacity(suite.scenario_count());

    for test_case in &suite.test_cases {
        if let Err(e) = run_test_case(device, test_case, config, &mut results).await {
            tracing::error!("Error running tests: {}", e);
            return SuiteRun {
                results,
                aborted: Some(e),
            };
        }
    }

    SuiteRun {
        results,
        aborted: None,
    }
}

/// Run all scenarios of one test case, appending their results
pub async fn run_test_case<D: Device + ?Sized>(
    device: &mut D,
    test_case: &TestCase,
    config: &Config,
    results: &mut Vec<ScenarioResult>,
) -> Result<()> {
    let rule = "=".repeat(80);
    println!("\n{}", rule);
    println!(
        "{} {} - {}",
        "Running Test Case:".blue().bold(),
        test_case.id.white().bold(),
        test_case.name
    );
    if !test_case.description.is_empty() {
        println!("Description: {}", test_case.description.dimmed());
    }
    println!("{}\n", rule);

    let credentials = &config.credentials;

    for scenario in &test_case.scenarios {
        if let Err(e) = reset_app(device, config).await {
            tracing::error!("Error resetting app: {}", e);
            if e.is_fatal() {
                return Err(e);
            }
            results.push(ScenarioResult::new(
                test_case,
                scenario,
                Verdict::fail("Failed to reset app"),
            ));
            continue;
        }

        if let Err(e) =
            login::login_with_email(device, config, &credentials.email, &credentials.password)
                .await
        {
            tracing::error!("Email/password login failed: {}", e);
            if e.is_fatal() {
                return Err(e);
            }
            results.push(ScenarioResult::new(
                test_case,
                scenario,
                Verdict::fail("Failed to login"),
            ));
            continue;
        }

        let rule = "-".repeat(80);
        println!("\n{}", rule);
        println!(
            "{} {} - {}",
            "Running Scenario:".cyan(),
            scenario.scenario_id.white().bold(),
            scenario.description
        );
        println!("{}\n", rule);

        let verdict = form::run_scenario(device, scenario, config).await;
        let result = ScenarioResult::new(test_case, scenario, verdict);
        report::print_verdict(&result);
        results.push(result);

        pause(config.delays.between_scenarios_ms).await;
    }

    Ok(())
}
