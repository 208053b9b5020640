//! Systemd unit generation for the daemon, GPU miner and PoS staking wallet.

use std::path::{Path, PathBuf};

use super::super::error::SetupError;
use super::super::file_ops::write_file_atomic;
use crate::config::SetupConfig;
use crate::install::wallet::WalletRecord;

pub const DAEMON_UNIT: &str = "zanod";
pub const MINER_UNIT: &str = "tt-miner";
pub const STAKING_UNIT: &str = "zano-pos-mining";

/// Start order used when bringing the services up
pub const UNIT_NAMES: [&str; 3] = [DAEMON_UNIT, MINER_UNIT, STAKING_UNIT];

/// One `[Unit]`/`[Service]`/`[Install]` block
#[derive(Debug, Clone)]
pub struct UnitDefinition {
    pub name: String,
    pub description: String,
    pub user: String,
    pub working_dir: PathBuf,
    pub exec_start: Vec<String>,
    /// Units this one is ordered after and wants
    pub after: Vec<String>,
    pub restart_sec: u32,
}

impl UnitDefinition {
    pub fn file_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Render the unit file text
    pub fn render(&self) -> String {
        let mut content = String::with_capacity(1024);

        content.push_str("[Unit]\n");
        content.push_str(&format!("Description={}\n", self.description));
        content.push_str("Wants=network-online.target\n");
        content.push_str("After=network-online.target\n");
        for dep in &self.after {
            content.push_str(&format!("After={dep}.service\n"));
            content.push_str(&format!("Wants={dep}.service\n"));
        }
        content.push('\n');

        content.push_str("[Service]\n");
        content.push_str("Type=simple\n");
        content.push_str(&format!("User={}\n", self.user));
        content.push_str(&format!(
            "WorkingDirectory={}\n",
            escape_specifiers(&self.working_dir.display().to_string())
        ));
        let command: Vec<String> = self.exec_start.iter().map(|arg| exec_arg(arg)).collect();
        content.push_str(&format!("ExecStart={}\n", command.join(" ")));
        content.push_str("Restart=on-failure\n");
        content.push_str(&format!("RestartSec={}s\n", self.restart_sec));
        content.push_str("KillSignal=SIGTERM\n");
        content.push_str("TimeoutStopSec=60s\n");
        content.push('\n');

        content.push_str("[Install]\n");
        content.push_str("WantedBy=multi-user.target\n");

        content
    }

    /// Write the rendered unit into `dir` with mode 0644
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, SetupError> {
        let path = dir.join(self.file_name());
        write_file_atomic(&path, &self.render(), 0o644)?;
        Ok(path)
    }
}

/// Double `%` so systemd does not expand specifiers
fn escape_specifiers(value: &str) -> String {
    value.replace('%', "%%")
}

/// One `ExecStart=` word: specifiers and `$` escaped, quoted when systemd
/// would otherwise split or unescape it.
fn exec_arg(arg: &str) -> String {
    let escaped = escape_specifiers(arg).replace('$', "$$");
    let needs_quotes = escaped.is_empty()
        || escaped
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ';'));
    if needs_quotes {
        format!("\"{}\"", escaped.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        escaped
    }
}

/// Node with the stratum server paying out to the wallet address
pub fn daemon_unit(cfg: &SetupConfig, user: &str, wallet: &WalletRecord) -> UnitDefinition {
    UnitDefinition {
        name: DAEMON_UNIT.to_string(),
        description: "Zano daemon with stratum mining server".to_string(),
        user: user.to_string(),
        working_dir: cfg.work_dir.clone(),
        exec_start: vec![
            cfg.zanod_path().display().to_string(),
            "--no-console".to_string(),
            "--stratum".to_string(),
            format!("--stratum-miner-address={}", wallet.address),
            format!("--stratum-bind-port={}", cfg.stratum_port),
            "--rpc-bind-ip=127.0.0.1".to_string(),
            format!("--rpc-bind-port={}", cfg.daemon_rpc_port),
            format!("--log-file={}", cfg.work_dir.join("zanod.log").display()),
        ],
        after: Vec::new(),
        restart_sec: 10,
    }
}

/// GPU miner pointed at the local stratum port
pub fn miner_unit(cfg: &SetupConfig, user: &str) -> UnitDefinition {
    UnitDefinition {
        name: MINER_UNIT.to_string(),
        description: "TT-Miner GPU miner for the local Zano stratum".to_string(),
        user: user.to_string(),
        working_dir: cfg.miner_dir(),
        exec_start: vec![
            cfg.miner_path().display().to_string(),
            "-luck".to_string(),
            "-coin".to_string(),
            "ZANO".to_string(),
            "-P".to_string(),
            format!("127.0.0.1:{}", cfg.stratum_port),
        ],
        after: vec![DAEMON_UNIT.to_string()],
        restart_sec: 30,
    }
}

/// Wallet in background PoS mining mode, optionally paying rewards elsewhere
pub fn staking_unit(
    cfg: &SetupConfig,
    user: &str,
    wallet: &WalletRecord,
    reward_address: Option<&str>,
) -> UnitDefinition {
    let mut exec_start = vec![
        cfg.simplewallet_path().display().to_string(),
        format!("--wallet-file={}", wallet.file.display()),
        format!("--password={}", wallet.password),
        format!("--daemon-address=127.0.0.1:{}", cfg.daemon_rpc_port),
        "--rpc-bind-ip=127.0.0.1".to_string(),
        format!("--rpc-bind-port={}", cfg.wallet_rpc_port),
        "--do-pos-mining".to_string(),
        "--deaf".to_string(),
        format!("--log-file={}", cfg.work_dir.join("pos-mining.log").display()),
    ];
    if let Some(address) = reward_address {
        exec_start.push(format!("--pos-mining-reward-address={address}"));
    }

    UnitDefinition {
        name: STAKING_UNIT.to_string(),
        description: "Zano PoS mining wallet".to_string(),
        user: user.to_string(),
        working_dir: cfg.work_dir.clone(),
        exec_start,
        after: vec![DAEMON_UNIT.to_string()],
        restart_sec: 30,
    }
}

/// The three units in start order
pub fn build_units(
    cfg: &SetupConfig,
    user: &str,
    wallet: &WalletRecord,
    reward_address: Option<&str>,
) -> Vec<UnitDefinition> {
    vec![
        daemon_unit(cfg, user, wallet),
        miner_unit(cfg, user),
        staking_unit(cfg, user, wallet, reward_address),
    ]
}
