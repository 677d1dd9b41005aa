//! Shared test utilities for complaintdesk integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated test execution with temp directories
//! - Builder patterns for creating submissions and configurations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
