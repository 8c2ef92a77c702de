//! Result records and run summary

use std::path::Path;

use chrono::Local;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};

use super::classify::Verdict;
use super::config::{Scenario, TestCase};

/// Timestamp layout used in the results file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One line of the results file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub test_case_id: String,
    pub scenario_id: String,
    pub description: String,
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

impl ScenarioResult {
    /// Record a verdict, stamped with the current local time
    pub fn new(test_case: &TestCase, scenario: &Scenario, verdict: Verdict) -> Self {
        Self {
            test_case_id: test_case.id.clone(),
            scenario_id: scenario.scenario_id.clone(),
            description: scenario.description.clone(),
            success: verdict.success,
            message: verdict.message,
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Pass/fail counts over a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_results(results: &[ScenarioResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
        }
    }

    /// Percentage of passed scenarios; zero for an empty run
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 / self.total as f64 * 100.0
        }
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Write results as a pretty-printed JSON array
pub fn write_results(path: &Path, results: &[ScenarioResult]) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json).map_err(|e| Error::FileWrite {
        path: path.display().to_string(),
        error: e.to_string(),
    })
}

/// Print the end-of-run summary block
pub fn print_summary(summary: &Summary) {
    let rule = "=".repeat(80);
    println!("\n\n{}", rule);
    println!("{}", "TEST EXECUTION SUMMARY".bold());
    println!("{}", rule);
    println!("Total scenarios: {}", summary.total);
    println!("Passed scenarios: {}", summary.passed.to_string().green());
    let failed = summary.failed.to_string();
    if summary.failed > 0 {
        println!("Failed scenarios: {}", failed.red());
    } else {
        println!("Failed scenarios: {}", failed);
    }
    println!("Success rate: {:.2}%", summary.success_rate());
}

/// Print one scenario's verdict line
pub fn print_verdict(result: &ScenarioResult) {
    if result.success {
        println!(
            "\n{} Scenario {} {}: {}",
            "✓".green(),
            result.scenario_id,
            "PASSED".green().bold(),
            result.message
        );
    } else {
        println!(
            "\n{} Scenario {} {}: {}",
            "✗".red(),
            result.scenario_id,
            "FAILED".red().bold(),
            result.message
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::config::{ExpectedResult, SurveyInputs};

    fn record(id: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            test_case_id: "TC1".to_string(),
            scenario_id: id.to_string(),
            description: String::new(),
            success,
            message: String::new(),
            timestamp: "2025-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn test_summary_counts() {
        let results = vec![record("1", true), record("2", false), record("3", true)];
        let summary = Summary::from_results(&results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.passed, 2);
        assert_eq!(summary.failed, 1);
        assert!((summary.success_rate() - 66.666).abs() < 0.01);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.success_rate(), 0.0);
        assert!(summary.all_passed());
    }

    #[test]
    fn test_new_result_copies_ids_and_stamps_time() {
        let test_case = TestCase {
            id: "TC2".to_string(),
            name: "Birth date".to_string(),
            description: String::new(),
            scenarios: Vec::new(),
        };
        let scenario = Scenario {
            scenario_id: "TC2.4".to_string(),
            description: "Future date".to_string(),
            inputs: SurveyInputs::default(),
            expected_result: ExpectedResult {
                should_submit: false,
                error_message: None,
            },
        };
        let result = ScenarioResult::new(&test_case, &scenario, Verdict::pass("blocked"));
        assert_eq!(result.test_case_id, "TC2");
        assert_eq!(result.scenario_id, "TC2.4");
        assert!(result.success);
        assert!(chrono::NaiveDateTime::parse_from_str(&result.timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_write_results_is_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results(&path, &[record("TC1.1", true)]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<ScenarioResult> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![record("TC1.1", true)]);
        assert!(text.contains("\"scenario_id\": \"TC1.1\""));
    }
}
