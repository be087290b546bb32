use std::path::PathBuf;
use std::sync::Arc;

use activity_logger::auth::AuthRecord;
use activity_logger::config::FormConfig;
use activity_logger::{ActivityApp, SubmissionStore};
use tempfile::TempDir;

pub const ADMIN_SECRET: &str = "password123";

/// An app backed by a fresh submissions file in a temporary directory.
pub struct TestApp {
    pub app: ActivityApp,
    pub store: Arc<SubmissionStore>,
    pub store_path: PathBuf,
    _temp_dir: TempDir,
}

pub fn setup_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("failed to create temporary directory");
    let store_path = temp_dir.path().join("submissions.csv");
    let store = Arc::new(SubmissionStore::open(&store_path).expect("failed to initialise store"));
    let credential =
        AuthRecord::from_secret(ADMIN_SECRET, 16).expect("failed to hash admin secret");
    let app = ActivityApp::new(store.clone(), credential, FormConfig::default());
    TestApp {
        app,
        store,
        store_path,
        _temp_dir: temp_dir,
    }
}
