//! Wallet provisioning
//!
//! - `prompt` - operator dialogue
//! - `password` - password choice and generation
//! - `session` - scripted `simplewallet` runs
//! - `parse` - address and seed extraction from console output
//! - `details` - wallet record and details file

pub mod details;
pub mod parse;
pub mod password;
pub mod prompt;
pub mod session;

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::SetupConfig;
use crate::install::daemon;
use crate::install::error::SetupError;

pub use details::WalletRecord;
pub use prompt::{InquirePrompter, Prompter};
use session::WalletCli;

/// Operator choices collected before any process is started
#[derive(Clone)]
pub struct WalletRequest {
    pub name: String,
    pub file: PathBuf,
    pub password: String,
    pub seed_password: String,
}

/// Ask for the wallet name and both passwords.
///
/// An existing wallet file is only replaced after explicit confirmation;
/// declining aborts with `SetupError::WalletExists`.
pub fn collect_request(
    prompter: &mut dyn Prompter,
    work_dir: &Path,
) -> Result<WalletRequest, SetupError> {
    let name = loop {
        let name = prompter.text("Enter a name for your wallet:")?;
        let name = name.trim();
        if is_valid_wallet_name(name) {
            break name.to_string();
        }
        eprintln!("Wallet names may contain letters, digits, '-' and '_' only.");
    };

    let file = work_dir.join(format!("{name}.wallet"));
    if file.exists() {
        warn!("Wallet file {} already exists", file.display());
        if !prompter.confirm(&format!(
            "{} already exists. Overwrite it? Its funds are lost unless you kept its seed",
            file.display()
        ))? {
            return Err(SetupError::WalletExists(file));
        }
    }

    let password = password::choose_password(prompter, "wallet password")?;
    let seed_password = password::choose_password(prompter, "seed password")?;

    Ok(WalletRequest {
        name,
        file,
        password,
        seed_password,
    })
}

/// Create the wallet, read its address and export its seed.
///
/// `zanod` runs only for the duration of this call and is stopped on every
/// path out of it. A confirmed overwrite removes the previous wallet file only
/// after the daemon answers. The details file is written before returning.
pub async fn provision(
    cfg: &SetupConfig,
    request: WalletRequest,
) -> Result<WalletRecord, SetupError> {
    let handle = daemon::start_transient(cfg).await?;
    let cli = WalletCli::new(cfg.simplewallet_path(), cfg.work_dir.clone(), cfg.daemon_rpc_port);

    let result = run_sessions(&cli, &request).await;
    let stopped = handle.stop(cfg.daemon_stop_timeout()).await;

    let (address, seed_phrase) = result?;
    stopped?;

    let record = WalletRecord {
        name: request.name,
        file: request.file,
        password: request.password,
        seed_password: request.seed_password,
        address,
        seed_phrase,
    };

    let details = record.write_details(&cfg.work_dir)?;
    info!("Wallet details saved to {}", details.display());
    Ok(record)
}

async fn run_sessions(
    cli: &WalletCli,
    request: &WalletRequest,
) -> Result<(String, String), SetupError> {
    // Only reached once the daemon answers; a failed start leaves the old wallet.
    if request.file.exists() {
        std::fs::remove_file(&request.file)?;
        warn!("Removed previous wallet {}", request.file.display());
    }

    let generated = cli.generate(&request.file, &request.password).await?;
    info!("Created wallet {}", request.file.display());

    let address = cli.read_address(&request.file, &request.password).await?;
    if address != generated {
        return Err(SetupError::OutputFormat {
            what: "address",
            excerpt: format!("generated {generated} but reopened wallet shows {address}"),
        });
    }
    info!("Wallet address: {}", address);

    let seed = cli
        .export_seed(&request.file, &request.password, &request.seed_password)
        .await?;
    info!("Seed phrase exported ({} words)", seed.split(' ').count());

    Ok((address, seed))
}

fn is_valid_wallet_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
