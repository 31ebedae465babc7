//! Integration tests module
//!
//! End-to-end tests for the sluice harvester, including:
//! - Complete catalog → fetch → normalize → submit cycles
//! - Failure isolation within a cycle
//! - Scheduler shutdown

pub mod fixtures;
pub mod pipeline_test;
