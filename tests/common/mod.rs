//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{fixture_info, live_info, test_settings, video_only_info, TEST_CHAT_ID};
