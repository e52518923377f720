//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;
pub mod helpers;

#[allow(unused_imports)]
pub use fixtures::{fake_bin, FakeBin, TestEnvironment};
#[allow(unused_imports)]
pub use helpers::{body_bytes, body_json, get, multipart_upload};
