use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DATA_DIR: &str = ".presentser";

pub const CONFIG_FILE: &str = ".presentser/config.yaml";
pub const RECORDS_FILE: &str = ".presentser/records.json";
pub const VISITS_FILE: &str = ".presentser/visits.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn data_dir(root: &Path) -> PathBuf {
    root.join(DATA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn records_path(root: &Path) -> PathBuf {
    root.join(RECORDS_FILE)
}

pub fn visits_path(root: &Path) -> PathBuf {
    root.join(VISITS_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.presentser/config.yaml")
        );
        assert_eq!(
            records_path(root),
            PathBuf::from("/tmp/proj/.presentser/records.json")
        );
        assert_eq!(
            visits_path(root),
            PathBuf::from("/tmp/proj/.presentser/visits.json")
        );
        assert_eq!(data_dir(root), PathBuf::from("/tmp/proj/.presentser"));
    }
}
