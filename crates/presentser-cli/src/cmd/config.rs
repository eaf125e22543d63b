use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use presentser_core::config::Config;
use presentser_core::paths;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,
}

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Path => {
            println!("{}", paths::config_path(root).display());
            Ok(())
        }
    }
}

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    // Never echo the admin key itself.
    if config.admin.key.is_some() {
        config.admin.key = Some("********".to_string());
    }
    if json {
        return print_json(&config);
    }
    print!("{}", serde_yaml::to_string(&config)?);
    Ok(())
}
