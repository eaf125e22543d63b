mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "presentser",
    about = "Attendance calculator: classes you must attend and classes you can still skip",
    version,
    propagate_version = true
)]
struct Cli {
    /// Data root (default: nearest directory containing .presentser/, else cwd)
    #[arg(long, global = true, env = "PRESENTSER_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the .presentser/ data directory and default config
    Init,

    /// Project attendance without saving
    Calc {
        #[command(flatten)]
        args: cmd::calc::AttendanceArgs,
    },

    /// Save attendance for a user
    Save {
        /// User key
        username: String,
        #[command(flatten)]
        args: cmd::calc::AttendanceArgs,
    },

    /// Show a saved record and its projection
    Status {
        /// User key (default: guest)
        username: Option<String>,
    },

    /// List all saved records
    Records,

    /// Show visitor statistics
    Stats,

    /// Rebuild records from autosave log lines
    Recover {
        /// Server log file to scan
        log: PathBuf,
        /// Write recovered records here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Merge a recovered-records file into the store
    Merge {
        /// File produced by `presentser recover --out`
        file: PathBuf,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: from config, 5002)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: from config, 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,

        /// Shared key for admin routes (overrides config)
        #[arg(long, env = "PRESENTSER_ADMIN_KEY", hide_env_values = true)]
        admin_key: Option<String>,

        /// Open the health endpoint in a browser once listening
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Calc { args } => cmd::calc::run(&args, cli.json),
        Commands::Save { username, args } => cmd::record::save(&root, &username, &args, cli.json),
        Commands::Status { username } => cmd::record::status(&root, username.as_deref(), cli.json),
        Commands::Records => cmd::record::list(&root, cli.json),
        Commands::Stats => cmd::stats::run(&root, cli.json),
        Commands::Recover { log, out } => cmd::recover::recover(&log, out.as_deref(), cli.json),
        Commands::Merge { file } => cmd::recover::merge(&root, &file, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve {
            port,
            bind,
            admin_key,
            open,
        } => cmd::serve::run(&root, port, bind, admin_key, open),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
