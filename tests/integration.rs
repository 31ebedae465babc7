//! Integration tests entry point
//!
//! This file serves as the entry point for the end-to-end tests.
//! It includes the integration_tests module which contains:
//! - Feed pipeline tests (fetch, parse, normalize, submit, pacing)

mod common;
mod integration_tests;
