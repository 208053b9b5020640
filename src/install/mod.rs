//! Zano node installation
//!
//! - `dependencies` - apt prerequisites
//! - `download` - AppImage and miner tarball fetching
//! - `daemon` - transient `zanod` with RPC readiness polling
//! - `wallet` - wallet creation, address and seed capture
//! - `linux` - systemd units and service control
//! - `orchestration` - the full sequence

pub mod daemon;
pub mod dependencies;
pub mod download;
pub mod error;
pub mod file_ops;
pub mod linux;
pub mod orchestration;
pub mod privilege;
pub mod wallet;
pub mod wizard;

pub use error::SetupError;
pub use orchestration::run_with;

use anyhow::Result;

use crate::config::SetupConfig;
use wallet::InquirePrompter;

/// Run the interactive installer on the terminal.
pub async fn run(cfg: &SetupConfig) -> Result<()> {
    let mut prompter = InquirePrompter;
    run_with(cfg, &mut prompter).await?;
    Ok(())
}
