//! Survey E2E - data-driven end-to-end tests for the survey app
//!
//! This library drives the app's login and survey screens through an
//! Appium server and records whether each scenario behaved as expected.

pub mod cli;
pub mod commands;
pub mod common;
pub mod device;
pub mod testing;
pub mod webdriver;

// Re-export commonly used types for tests
pub use common::{Config, Error, Result};
pub use device::{Device, ElementId, Locator, Swipe};
