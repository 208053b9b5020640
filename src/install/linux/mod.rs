//! Linux service registration using systemd.
//!
//! # Module Structure
//!
//! - `privileges` - root check and invoking user lookup
//! - `unit` - unit file generation for the three services
//! - `service_control` - `systemctl` operations (reload, enable, start, status)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::config::SetupConfig;
use crate::install::file_ops::write_secret_file;
use crate::install::privilege::install_units_with_elevated_privileges;
use crate::install::wallet::WalletRecord;

mod privileges;
mod service_control;
pub mod unit;

pub use privileges::{current_user, ensure_not_root};
pub(crate) use privileges::is_root;
pub use unit::{UNIT_NAMES, UnitDefinition, build_units};

/// Reference copy of the wallet password next to the wallet
pub const PASSWORD_FILE: &str = "wallet_password.txt";

/// Per-unit result of starting the services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub unit: String,
    pub active: bool,
}

/// Write the three units, install them system-wide, reload systemd and
/// enable each one. Returns the installed unit paths.
pub fn register_services(
    cfg: &SetupConfig,
    wallet: &WalletRecord,
    reward_address: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let user = current_user()?;
    let units = build_units(cfg, &user, wallet, reward_address);

    let staging = tempfile::Builder::new()
        .prefix("zano-setup-units-")
        .tempdir()
        .context("Failed to create unit staging directory")?;

    let staged = units
        .iter()
        .map(|unit| unit.write_to(staging.path()))
        .collect::<Result<Vec<_>, _>>()?;

    let password_file = cfg.work_dir.join(PASSWORD_FILE);
    write_secret_file(&password_file, &format!("{}\n", wallet.password))?;
    info!("Wallet password saved to {}", password_file.display());

    install_units_with_elevated_privileges(&staged, &cfg.unit_dir)?;

    service_control::reload_systemd_daemon()?;
    for unit in &units {
        service_control::enable_systemd_service(&unit.name)?;
        info!("Enabled {}", unit.file_name());
    }

    Ok(units
        .iter()
        .map(|unit| cfg.unit_dir.join(unit.file_name()))
        .collect())
}

/// Start the services in order, pausing `delay` after each, then report
/// which ones systemd considers active.
pub async fn start_services(delay: Duration) -> Result<Vec<ServiceStatus>> {
    for name in UNIT_NAMES {
        info!("Starting {}.service", name);
        if let Err(e) = service_control::start_systemd_service(name) {
            warn!("{}", e);
        }
        tokio::time::sleep(delay).await;
    }

    UNIT_NAMES
        .iter()
        .map(|name| -> Result<ServiceStatus> {
            Ok(ServiceStatus {
                unit: name.to_string(),
                active: service_control::is_service_active(name)?,
            })
        })
        .collect()
}
