//! Survey scenario runner
//!
//! Reads test cases from a JSON or YAML file, drives the login and survey
//! screens through a [`crate::device::Device`], and classifies each
//! scenario from what the screen shows afterwards.

pub mod classify;
mod config;
pub mod form;
pub mod locate;
pub mod login;
pub mod report;
mod runner;
pub mod screens;
pub mod signals;

pub use config::*;
pub use runner::{reset_app, run_suite, run_test_case, SuiteRun};
