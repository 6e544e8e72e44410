//! Test helpers module
//!
//! This module provides utilities and helpers for testing the EventHub API.
//! It includes the in-memory test context, request helpers and test data.

pub mod database_helper;
pub mod test_context;
pub mod test_data;

#[allow(unused_imports)]
pub use database_helper::*;
pub use test_context::*;
pub use test_data::*;
