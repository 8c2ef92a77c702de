//! Appium / W3C WebDriver client
//!
//! Talks JSON over HTTP to the automation server that controls the
//! emulator.

pub mod client;
pub mod protocol;

pub use client::WebDriverSession;
