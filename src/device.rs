//! Device-control seam
//!
//! Everything the runner does to the app goes through [`Device`]. The
//! production implementation is [`crate::webdriver::WebDriverSession`];
//! tests drive the runner with a scripted implementation instead.

use std::fmt;

use async_trait::async_trait;

use crate::common::Result;

/// Opaque handle to an element inside the current session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an element is located in the accessibility tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Locator {
    XPath(String),
    AccessibilityId(String),
    Id(String),
    ClassName(String),
}

impl Locator {
    pub fn xpath(xpath: impl Into<String>) -> Self {
        Self::XPath(xpath.into())
    }

    pub fn accessibility_id(id: impl Into<String>) -> Self {
        Self::AccessibilityId(id.into())
    }

    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    pub fn class_name(name: impl Into<String>) -> Self {
        Self::ClassName(name.into())
    }

    /// W3C/Appium location strategy name
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::XPath(_) => "xpath",
            Self::AccessibilityId(_) => "accessibility id",
            Self::Id(_) => "id",
            Self::ClassName(_) => "class name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Self::XPath(v) | Self::AccessibilityId(v) | Self::Id(v) | Self::ClassName(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}

/// A single-finger swipe gesture in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swipe {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub duration_ms: u64,
}

impl Swipe {
    /// Scroll the survey form down by roughly one screen
    pub const FORM_SCROLL: Swipe = Swipe {
        start_x: 500,
        start_y: 1500,
        end_x: 500,
        end_y: 300,
        duration_ms: 800,
    };

    /// Final scroll that brings the Send button into view
    pub const SUBMIT_SCROLL: Swipe = Swipe {
        start_x: 800,
        start_y: 1800,
        end_x: 800,
        end_y: 800,
        duration_ms: 800,
    };
}

/// Android key code for the hardware back button
pub const KEYCODE_BACK: i32 = 4;

/// Native (non-webview) automation context name
pub const NATIVE_CONTEXT: &str = "NATIVE_APP";

/// Remote control of a single app session
#[async_trait]
pub trait Device: Send {
    /// All elements matching the locator; empty when none match
    async fn find_elements(&mut self, locator: &Locator) -> Result<Vec<ElementId>>;

    async fn click(&mut self, element: &ElementId) -> Result<()>;

    async fn clear(&mut self, element: &ElementId) -> Result<()>;

    async fn send_keys(&mut self, element: &ElementId, text: &str) -> Result<()>;

    /// Attribute value, `None` when the attribute is absent
    async fn attribute(&mut self, element: &ElementId, name: &str) -> Result<Option<String>>;

    async fn is_displayed(&mut self, element: &ElementId) -> Result<bool>;

    /// XML dump of the current view hierarchy
    async fn page_source(&mut self) -> Result<String>;

    /// PNG bytes of the current screen
    async fn screenshot(&mut self) -> Result<Vec<u8>>;

    async fn swipe(&mut self, swipe: Swipe) -> Result<()>;

    async fn terminate_app(&mut self, package: &str) -> Result<()>;

    async fn activate_app(&mut self, package: &str) -> Result<()>;

    async fn current_package(&mut self) -> Result<String>;

    async fn current_activity(&mut self) -> Result<String>;

    /// Available automation contexts (`NATIVE_APP`, `WEBVIEW_*`)
    async fn contexts(&mut self) -> Result<Vec<String>>;

    async fn set_context(&mut self, name: &str) -> Result<()>;

    async fn press_keycode(&mut self, keycode: i32) -> Result<()>;

    /// End the session; further calls fail
    async fn quit(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_strategies() {
        assert_eq!(Locator::xpath("//a").strategy(), "xpath");
        assert_eq!(
            Locator::accessibility_id("Login as Test User").strategy(),
            "accessibility id"
        );
        assert_eq!(Locator::id("login-button").strategy(), "id");
        assert_eq!(
            Locator::class_name("android.widget.Button").strategy(),
            "class name"
        );
    }

    #[test]
    fn test_locator_display() {
        let loc = Locator::xpath(r#"//android.widget.Button[@content-desc="Send"]"#);
        assert_eq!(
            loc.to_string(),
            r#"xpath=//android.widget.Button[@content-desc="Send"]"#
        );
    }
}
