use anyhow::Context;
use presentser_core::config::Config;
use std::path::Path;

pub fn run(
    root: &Path,
    port: Option<u16>,
    bind: Option<String>,
    admin_key: Option<String>,
    open: bool,
) -> anyhow::Result<()> {
    let mut config = Config::load(root).context("failed to load config")?;
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(key) = admin_key.filter(|k| !k.is_empty()) {
        config.admin.key = Some(key);
    }
    if config.admin.key.is_none() {
        tracing::warn!("no admin key configured; admin routes are open");
    }

    let rt = tokio::runtime::Runtime::new()?;
    let root_buf = root.to_path_buf();

    rt.block_on(async move {
        tokio::select! {
            res = presentser_server::serve(
                root_buf,
                config.admin,
                &config.server.bind,
                config.server.port,
                open,
            ) => res,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                Ok(())
            }
        }
    })
}
