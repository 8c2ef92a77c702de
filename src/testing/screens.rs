//! Element locations on the app's login and survey screens
//!
//! The app exposes most controls through hint text or content
//! descriptions; positional XPaths are used where it exposes neither.

use crate::device::Locator;

pub const EMAIL_INPUT: &str = r#"//android.widget.EditText[@hint="Enter your email or phone number"]"#;
pub const PASSWORD_INPUT: &str = r#"//android.widget.EditText[@hint="Enter your password"]"#;
pub const SIGN_IN_BUTTON: &str = r#"//android.widget.Button[@content-desc="Sign in"]"#;
pub const SURVEY_HEADER: &str = r#"//android.view.View[@content-desc="AI Survey"]"#;
pub const LOGOUT_BUTTON: &str =
    r#"//android.view.View[@content-desc="Logout Button"]/android.widget.Button"#;
pub const TEST_USER_LOGIN: &str = "Login as Test User";
pub const SPOTIFY_BUTTON: &str = r#"//android.widget.Button[@content-desc="Continue with Spotify"]"#;
pub const PASSWORD_MANAGER_DISMISS: &str = r#"//*[@text="Never" or @text="Not now" or @text="Cancel" or @content-desc="Never" or @content-desc="Not now" or @content-desc="Cancel"]"#;

/// Marker the survey screen puts in the page source
pub const SURVEY_MARKER: &str = "AI Survey";

pub const NAME_INPUT: &str = r#"//android.widget.EditText[@hint="Name-Surname *"]"#;
pub const DAY_INPUT: &str = "//android.widget.ScrollView/android.widget.EditText[2]/android.widget.EditText";
pub const MONTH_INPUT: &str = "//android.widget.ScrollView/android.widget.EditText[3]/android.widget.EditText";
pub const YEAR_INPUT: &str = "//android.widget.ScrollView/android.widget.EditText[4]/android.widget.EditText";
pub const EDUCATION_DROPDOWN: &str = r#"//android.widget.Button[@content-desc="Education Level *"]"#;
pub const CITY_INPUT: &str = "//android.widget.ScrollView/android.widget.EditText[5]/android.widget.EditText";
pub const CITY_INPUT_BY_TEXT: &str = r#"//android.widget.EditText[@text="City *"]"#;
pub const EDIT_TEXT: &str = "//android.widget.EditText";
pub const USE_CASE_INPUT: &str = "//android.widget.ScrollView/android.widget.EditText/android.widget.EditText";
pub const SEND_BUTTON: &str = r#"//android.widget.Button[@content-desc="Send"]"#;

pub const TEXT_VIEW: &str = "//android.widget.TextView";
pub const SNACKBAR: &str = r#"//android.widget.TextView[contains(@resource-id, "snackbar_text")]"#;

/// Spotify OAuth page element ids (webview context)
pub mod spotify {
    pub const USERNAME: &str = "login-username";
    pub const PASSWORD: &str = "login-password";
    pub const LOGIN: &str = "login-button";
    pub const ACCEPT: &str = "auth-accept";
}

const AI_MODELS_SECTION: &str = r#"//android.view.View[@content-desc="AI Models Section"]"#;

/// Quote a string for use inside an XPath expression
///
/// XPath 1.0 has no escape sequences, so a value holding both quote kinds
/// has to be assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}

fn by_content_desc(class: &str, desc: &str) -> Locator {
    Locator::xpath(format!(
        "//{}[@content-desc={}]",
        class,
        xpath_literal(desc)
    ))
}

pub fn education_option(level: &str) -> Locator {
    by_content_desc("android.widget.Button", level)
}

pub fn gender_option(gender: &str) -> Locator {
    by_content_desc("android.widget.RadioButton", gender)
}

pub fn model_checkbox(model: &str) -> Locator {
    by_content_desc("android.widget.CheckBox", model)
}

/// Defect input that appears after ticking the `position`-th model (1-based)
pub fn defect_input(position: usize) -> Locator {
    if position <= 1 {
        Locator::xpath(format!(
            "{}/android.widget.EditText/android.widget.EditText",
            AI_MODELS_SECTION
        ))
    } else {
        Locator::xpath(format!(
            "{}/android.widget.EditText[{}]/android.widget.EditText",
            AI_MODELS_SECTION, position
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_literal_quoting() {
        assert_eq!(xpath_literal("Male"), "\"Male\"");
        assert_eq!(xpath_literal("Bachelor's Degree"), "\"Bachelor's Degree\"");
        assert_eq!(xpath_literal("say \"hi\""), "'say \"hi\"'");
        assert_eq!(
            xpath_literal("it's \"x\""),
            "concat(\"it's \", '\"', \"x\", '\"', \"\")"
        );
    }

    #[test]
    fn test_option_locators() {
        assert_eq!(
            education_option("Master's Degree").value(),
            r#"//android.widget.Button[@content-desc="Master's Degree"]"#
        );
        assert_eq!(
            gender_option("Female").value(),
            r#"//android.widget.RadioButton[@content-desc="Female"]"#
        );
        assert_eq!(
            model_checkbox("ChatGPT").value(),
            r#"//android.widget.CheckBox[@content-desc="ChatGPT"]"#
        );
    }

    #[test]
    fn test_defect_input_positions() {
        assert_eq!(
            defect_input(1).value(),
            r#"//android.view.View[@content-desc="AI Models Section"]/android.widget.EditText/android.widget.EditText"#
        );
        assert_eq!(
            defect_input(3).value(),
            r#"//android.view.View[@content-desc="AI Models Section"]/android.widget.EditText[3]/android.widget.EditText"#
        );
    }
}
