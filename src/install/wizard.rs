//! Operator-facing banners and questions

use std::io::Write;
use std::path::PathBuf;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use super::error::SetupError;
use super::linux::ServiceStatus;
use super::wallet::Prompter;
use super::wallet::WalletRecord;
use super::wallet::parse::is_valid_address;
use crate::config::SetupConfig;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Outcome of a completed run, for the summary
#[derive(Debug, Clone)]
pub struct InstallationResult {
    pub wallet: WalletRecord,
    pub details_file: PathBuf,
    pub unit_files: Vec<PathBuf>,
    pub reward_address: Option<String>,
    pub services: Option<Vec<ServiceStatus>>,
}

fn rule(stdout: &mut StandardStream) {
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)));
    let _ = writeln!(stdout, "\n{RULE}\n");
    let _ = stdout.reset();
}

/// Display welcome banner
pub fn show_welcome(cfg: &SetupConfig) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    rule(&mut stdout);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = writeln!(stdout, "                 Z A N O   N O D E   S E T U P");
    let _ = stdout.reset();
    rule(&mut stdout);

    let _ = writeln!(stdout, "This will:");
    let _ = writeln!(stdout, "  • Install build tools, GPU runtime and pwgen (sudo)");
    let _ = writeln!(stdout, "  • Download zanod and simplewallet");
    let _ = writeln!(stdout, "  • Create a new wallet and export its seed phrase");
    let _ = writeln!(stdout, "  • Download TT-Miner");
    let _ = writeln!(stdout, "  • Register zanod, tt-miner and zano-pos-mining systemd services (sudo)");
    let _ = writeln!(stdout, "\nWorking directory: {}", cfg.work_dir.display());
    rule(&mut stdout);
}

/// Coloured step header
pub fn step(index: usize, total: usize, message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true));
    let _ = write!(stdout, "\n[{index}/{total}] ");
    let _ = stdout.reset();
    let _ = writeln!(stdout, "{message}");
}

/// Green check line
pub fn done(message: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
    let _ = writeln!(stdout, "✓ {message}");
    let _ = stdout.reset();
}

/// Ask for a separate PoS reward address; `None` keeps rewards in the wallet.
pub fn ask_reward_address(prompter: &mut dyn Prompter) -> Result<Option<String>, SetupError> {
    if !prompter.confirm("Do you want PoS mining rewards sent to a separate address?")? {
        return Ok(None);
    }

    loop {
        let address = prompter.text("Enter the reward address:")?;
        let address = address.trim();
        if is_valid_address(address) {
            return Ok(Some(address.to_string()));
        }
        eprintln!("That does not look like a Zano address, please try again.");
    }
}

/// Display installation completion summary
pub fn show_completion(result: &InstallationResult) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);

    rule(&mut stdout);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true));
    let _ = writeln!(stdout, "                    ✓ INSTALLATION COMPLETE");
    let _ = stdout.reset();
    rule(&mut stdout);

    let _ = writeln!(stdout, "Wallet:          {}", result.wallet.file.display());
    let _ = writeln!(stdout, "Address:         {}", result.wallet.address);
    if let Some(reward) = &result.reward_address {
        let _ = writeln!(stdout, "Reward address:  {reward}");
    }
    let _ = writeln!(stdout, "Details file:    {}", result.details_file.display());

    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)));
    let _ = writeln!(
        stdout,
        "\n⚠ The details file holds your passwords and seed phrase in plain text.\n  Back it up somewhere safe and offline."
    );
    let _ = stdout.reset();

    let _ = writeln!(stdout, "\nService units:");
    for path in &result.unit_files {
        let _ = writeln!(stdout, "  {}", path.display());
    }

    match &result.services {
        Some(statuses) => {
            let _ = writeln!(stdout, "\nService status:");
            for status in statuses {
                if status.active {
                    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                    let _ = writeln!(stdout, "  ✓ {} is active", status.unit);
                } else {
                    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                    let _ = writeln!(
                        stdout,
                        "  ✗ {} failed (see: journalctl -u {})",
                        status.unit, status.unit
                    );
                }
                let _ = stdout.reset();
            }
        }
        None => {
            let _ = writeln!(stdout, "\nServices are enabled but not started. Start them with:");
            let _ = writeln!(
                stdout,
                "  sudo systemctl start zanod tt-miner zano-pos-mining"
            );
        }
    }

    rule(&mut stdout);
}
