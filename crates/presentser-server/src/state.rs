use presentser_core::config::AdminConfig;
use presentser_core::paths;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub admin: Arc<AdminConfig>,
    /// Serializes read-modify-write cycles on the record and visit files.
    pub write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(root: PathBuf, admin: AdminConfig) -> Self {
        Self {
            root,
            admin: Arc::new(admin),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn records_path(&self) -> PathBuf {
        paths::records_path(&self.root)
    }

    pub fn visits_path(&self) -> PathBuf {
        paths::visits_path(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_stores_root() {
        let state = AppState::new(PathBuf::from("/tmp/test"), AdminConfig::default());
        assert_eq!(state.root, PathBuf::from("/tmp/test"));
        assert_eq!(
            state.records_path(),
            PathBuf::from("/tmp/test/.presentser/records.json")
        );
    }
}
