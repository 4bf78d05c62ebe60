//! Test helpers module
//!
//! This module provides utilities and helpers for testing continuation
//! storage without a running Redis.

#![allow(dead_code, unused_imports)]

pub mod memory_client;
pub mod test_data;

pub use memory_client::*;
pub use test_data::*;
