use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Parley chat proxy
#[derive(Debug, Parser)]
#[command(name = "parley", about = "Chat completion proxy with file-context augmentation")]
pub struct Args {
    /// Path to configuration file; built-in defaults apply when it does not exist
    #[arg(short, long, default_value = "parley.toml", env = "PARLEY_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PARLEY_LISTEN")]
    pub listen: Option<SocketAddr>,
}
