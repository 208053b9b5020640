use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Installer configuration. Every step receives what it needs from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Directory holding binaries, wallet and logs
    pub work_dir: PathBuf,
    /// Zano AppImage bundling `zanod` and `simplewallet`
    pub zano_url: String,
    /// TT-Miner release tarball
    pub miner_url: String,
    pub daemon_rpc_port: u16,
    pub stratum_port: u16,
    pub wallet_rpc_port: u16,
    /// Upper bound on waiting for the transient daemon's RPC
    pub daemon_ready_timeout_secs: u64,
    /// Upper bound on waiting for the transient daemon to exit
    pub daemon_stop_timeout_secs: u64,
    /// Pause after starting each service before starting the next
    pub service_start_delay_secs: u64,
    /// apt packages the node, miner and AppImage runtime need
    pub packages: Vec<String>,
    /// Where unit files are installed
    pub unit_dir: PathBuf,
}

impl Default for SetupConfig {
    fn default() -> Self {
        let work_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("zano");

        Self {
            work_dir,
            zano_url: "https://build.zano.org/builds/zano-linux-x64-release-v2.1.0.382[d63feb0].AppImage"
                .to_string(),
            miner_url: "https://github.com/TrailingStop/TT-Miner-release/releases/download/2023.1.0/TT-Miner-2023.1.0.tar.gz"
                .to_string(),
            daemon_rpc_port: 11211,
            stratum_port: 11555,
            wallet_rpc_port: 12233,
            daemon_ready_timeout_secs: 120,
            daemon_stop_timeout_secs: 30,
            service_start_delay_secs: 10,
            packages: [
                "build-essential",
                "curl",
                "libfuse2",
                "ocl-icd-libopencl1",
                "nvidia-cuda-toolkit",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            unit_dir: PathBuf::from("/etc/systemd/system"),
        }
    }
}

impl SetupConfig {
    pub fn daemon_ready_timeout(&self) -> Duration {
        Duration::from_secs(self.daemon_ready_timeout_secs)
    }

    pub fn daemon_stop_timeout(&self) -> Duration {
        Duration::from_secs(self.daemon_stop_timeout_secs)
    }

    pub fn service_start_delay(&self) -> Duration {
        Duration::from_secs(self.service_start_delay_secs)
    }

    pub fn zanod_path(&self) -> PathBuf {
        self.work_dir.join("zanod")
    }

    pub fn simplewallet_path(&self) -> PathBuf {
        self.work_dir.join("simplewallet")
    }

    pub fn miner_dir(&self) -> PathBuf {
        self.work_dir.join("TT-Miner")
    }

    pub fn miner_path(&self) -> PathBuf {
        self.miner_dir().join("TT-Miner")
    }

    pub fn daemon_rpc_url(&self) -> String {
        format!("http://127.0.0.1:{}/json_rpc", self.daemon_rpc_port)
    }

    /// Default location: `~/.config/zano-setup/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("zano-setup")
            .join("config.toml"))
    }

    /// Load the config at `path`, writing the defaults there first if it is missing.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "Config not found at {}, creating default configuration",
                path.display()
            );
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            let default_toml = toml::to_string_pretty(&SetupConfig::default())
                .context("Failed to serialize default config")?;
            fs::write(path, default_toml).context("Failed to write config file")?;
        }

        let cfg_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg: SetupConfig = toml::from_str(&cfg_str).context("Failed to parse config")?;
        Ok(cfg)
    }
}
