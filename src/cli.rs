use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "zano-setup",
    version,
    about = "Install a Zano node, GPU miner and PoS staking wallet as systemd services"
)]
pub struct Args {
    /// Path to configuration file (default: ~/.config/zano-setup/config.toml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Working directory for binaries, wallet and logs (overrides config)
    #[arg(long)]
    pub work_dir: Option<PathBuf>,
}
