//! Scenario file types
//!
//! Defines the data structures for deserializing test case files. Files
//! are JSON unless the extension says YAML.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::common::{Error, Result};

/// A complete scenario file
#[derive(Deserialize, Debug, Clone)]
pub struct TestSuite {
    pub test_cases: Vec<TestCase>,
}

/// A group of related scenarios
#[derive(Deserialize, Debug, Clone)]
pub struct TestCase {
    /// Short identifier used by `--filter` (e.g. "TC1")
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub scenarios: Vec<Scenario>,
}

/// One pass through the survey form
#[derive(Deserialize, Debug, Clone)]
pub struct Scenario {
    /// Identifier such as "TC1.3"; also names the screenshot
    pub scenario_id: String,
    #[serde(default)]
    pub description: String,
    pub inputs: SurveyInputs,
    pub expected_result: ExpectedResult,
}

/// Values typed into the survey form
///
/// Empty strings are meaningful: an empty name or city exercises the
/// form's validation, an empty education or gender skips that control.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct SurveyInputs {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub birth_date: BirthDate,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub gender: String,
    /// Model name to defect text, in the order the checkboxes are ticked
    #[serde(default)]
    pub ai_models_with_defects: IndexMap<String, String>,
    #[serde(default)]
    pub beneficial_use_case: String,
}

/// Birth date components as typed into the three date inputs
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BirthDate {
    #[serde(default, deserialize_with = "string_or_number")]
    pub day: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub month: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
}

/// What the form is expected to do with these inputs
#[derive(Deserialize, Debug, Clone)]
pub struct ExpectedResult {
    pub should_submit: bool,
    /// Validation text expected when the form blocks submission
    pub error_message: Option<String>,
}

/// Accept `"05"` as well as `5` for date parts
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

impl TestSuite {
    /// Load a scenario file, choosing the format from its extension
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ScenarioRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let parsed = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|error| Error::ScenarioParse {
            path: path.display().to_string(),
            error,
        })
    }

    /// Keep only test cases whose id is listed, preserving file order
    pub fn retain_ids(&mut self, ids: &[String]) {
        self.test_cases.retain(|tc| ids.iter().any(|id| id == &tc.id));
    }

    /// Number of scenarios across all test cases
    pub fn scenario_count(&self) -> usize {
        self.test_cases.iter().map(|tc| tc.scenarios.len()).sum()
    }
}

/// Split a `--filter` argument ("TC1, TC2") into ids
pub fn parse_filter(filter: &str) -> Vec<String> {
    filter
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
