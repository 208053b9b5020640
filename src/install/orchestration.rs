//! End-to-end installation sequence
//!
//! packages → zanod/simplewallet → wallet → TT-Miner → systemd units →
//! optional service start. Each step finishes before the next begins; a
//! failure stops the run without undoing earlier steps.

use anyhow::{Context, Result};
use log::info;

use super::dependencies;
use super::download;
use super::linux;
use super::wallet::{self, Prompter};
use super::wizard::{self, InstallationResult};
use crate::config::SetupConfig;

const STEPS: usize = 6;

/// Run the installer, taking every answer from `prompter`.
///
/// Returns `Ok(None)` when the operator declines to continue.
pub async fn run_with(
    cfg: &SetupConfig,
    prompter: &mut dyn Prompter,
) -> Result<Option<InstallationResult>> {
    linux::ensure_not_root()?;

    wizard::show_welcome(cfg);
    if !prompter.confirm("Do you want to continue?")? {
        println!("Installation cancelled.");
        return Ok(None);
    }

    wizard::step(1, STEPS, "Installing system packages");
    dependencies::ensure_packages(&cfg.packages).context("Dependency installation failed")?;
    wizard::done("System packages installed");

    wizard::step(2, STEPS, "Fetching zanod and simplewallet");
    download::fetch_zano(cfg)
        .await
        .context("Failed to fetch Zano binaries")?;
    wizard::done("zanod and simplewallet ready");

    wizard::step(3, STEPS, "Creating wallet");
    let request = wallet::collect_request(prompter, &cfg.work_dir)?;
    let record = wallet::provision(cfg, request)
        .await
        .context("Wallet provisioning failed")?;
    let details_file = record.details_path(&cfg.work_dir);
    wizard::done(&format!("Wallet {} created", record.name));

    wizard::step(4, STEPS, "Fetching TT-Miner");
    download::fetch_miner(cfg)
        .await
        .context("Failed to fetch TT-Miner")?;
    wizard::done("TT-Miner ready");

    wizard::step(5, STEPS, "Registering services");
    let reward_address = wizard::ask_reward_address(prompter)?;
    let unit_files = linux::register_services(cfg, &record, reward_address.as_deref())
        .context("Service registration failed")?;
    wizard::done("zanod, tt-miner and zano-pos-mining enabled");

    wizard::step(6, STEPS, "Starting services");
    let services = if prompter.confirm("Do you want to start the services now?")? {
        let statuses = linux::start_services(cfg.service_start_delay()).await?;
        info!(
            "{}/{} services active",
            statuses.iter().filter(|s| s.active).count(),
            statuses.len()
        );
        Some(statuses)
    } else {
        None
    };

    let result = InstallationResult {
        wallet: record,
        details_file,
        unit_files,
        reward_address,
        services,
    };
    wizard::show_completion(&result);
    Ok(Some(result))
}
