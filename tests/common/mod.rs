#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use spectree::config::ConfigFile;
use spectree::engine::Services;
use spectree::fs::mock::MockFileSystem;
use spectree_test_utils::fake_env::FakeEnvironment;

pub use spectree_test_utils::{init_tracing, with_timeout};

pub const TEST_HOST: &str = "test-host";

/// Environment with no fault variables set.
pub fn quiet_env() -> FakeEnvironment {
    FakeEnvironment::new(TEST_HOST)
}

pub fn mock_services(fs: &MockFileSystem, env: &FakeEnvironment, config: ConfigFile) -> Arc<Services> {
    Arc::new(Services::new(
        Arc::new(fs.clone()),
        Arc::new(env.clone()),
        config,
    ))
}

/// Contents of a real file, empty if it does not exist.
pub fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
