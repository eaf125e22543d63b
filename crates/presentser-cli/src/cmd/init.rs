use anyhow::Context;
use presentser_core::config::Config;
use presentser_core::paths;
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let written = Config::init(root).context("failed to initialize data directory")?;
    let config_path = paths::config_path(root);
    if written {
        println!("Initialized {}", config_path.display());
    } else {
        println!("Already initialized: {}", config_path.display());
    }
    Ok(())
}
