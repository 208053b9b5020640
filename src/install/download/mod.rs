//! Component download and extraction
//!
//! - `core` - cached HTTP download with progress
//! - `extract` - AppImage and tarball unpacking

mod core;
mod extract;

use std::path::PathBuf;

use log::info;

use crate::config::SetupConfig;
use crate::install::error::SetupError;

pub use self::core::{ensure_downloaded, file_name_from_url};
pub use extract::{extract_appimage, extract_tarball, make_executable};

/// Executables taken out of the Zano AppImage
pub const ZANO_BINARIES: &[&str] = &["zanod", "simplewallet"];

/// Download (unless cached) the Zano AppImage and place `zanod` and
/// `simplewallet` in the working directory.
pub async fn fetch_zano(cfg: &SetupConfig) -> Result<Vec<PathBuf>, SetupError> {
    tokio::fs::create_dir_all(&cfg.work_dir).await?;

    let image = cfg.work_dir.join(file_name_from_url(&cfg.zano_url)?);
    ensure_downloaded(&cfg.zano_url, &image).await?;

    extract_appimage(&image, &cfg.work_dir, ZANO_BINARIES).await
}

/// Download (unless cached) and unpack TT-Miner into `<work_dir>/TT-Miner`.
pub async fn fetch_miner(cfg: &SetupConfig) -> Result<PathBuf, SetupError> {
    tokio::fs::create_dir_all(&cfg.work_dir).await?;

    let archive = cfg.work_dir.join(file_name_from_url(&cfg.miner_url)?);
    ensure_downloaded(&cfg.miner_url, &archive).await?;

    extract_tarball(&archive, &cfg.miner_dir()).await?;

    let miner = cfg.miner_path();
    if !miner.exists() {
        return Err(SetupError::Extract {
            archive,
            reason: format!("{} missing after extraction", miner.display()),
        });
    }
    make_executable(&miner)?;

    info!("TT-Miner ready at {}", miner.display());
    Ok(miner)
}
