//! Scripted `simplewallet` sessions over piped stdin

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::debug;
use tokio::io::AsyncWriteExt;

use super::parse::{parse_address, parse_seed};
use crate::install::error::SetupError;

const SESSION_TIMEOUT: Duration = Duration::from_secs(120);
const PROGRAM: &str = "simplewallet";

/// `simplewallet` bound to one daemon
pub struct WalletCli {
    program: PathBuf,
    work_dir: PathBuf,
    daemon_address: String,
}

impl WalletCli {
    pub fn new(program: PathBuf, work_dir: PathBuf, daemon_rpc_port: u16) -> Self {
        Self {
            program,
            work_dir,
            daemon_address: format!("127.0.0.1:{daemon_rpc_port}"),
        }
    }

    /// Create `wallet_file` protected by `password`; returns the new address.
    pub async fn generate(&self, wallet_file: &Path, password: &str) -> Result<String, SetupError> {
        let args = [
            format!("--generate-new-wallet={}", wallet_file.display()),
            format!("--daemon-address={}", self.daemon_address),
        ];
        let output = self
            .run(&args, &format!("{password}\n{password}\nexit\n"))
            .await?;

        if !wallet_file.exists() {
            return Err(SetupError::Command {
                program: PROGRAM.to_string(),
                detail: format!("{} was not created", wallet_file.display()),
            });
        }
        parse_address(&output)
    }

    /// Open the wallet and read the address it displays.
    pub async fn read_address(&self, wallet_file: &Path, password: &str) -> Result<String, SetupError> {
        let output = self
            .run(&self.open_args(wallet_file), &format!("{password}\nexit\n"))
            .await?;
        parse_address(&output)
    }

    /// Run `show_seed`, securing the exported seed with `seed_password`.
    pub async fn export_seed(
        &self,
        wallet_file: &Path,
        password: &str,
        seed_password: &str,
    ) -> Result<String, SetupError> {
        let input = format!(
            "{password}\nshow_seed\n{password}\n{seed_password}\n{seed_password}\nexit\n"
        );
        let output = self.run(&self.open_args(wallet_file), &input).await?;
        parse_seed(&output)
    }

    fn open_args(&self, wallet_file: &Path) -> [String; 2] {
        [
            format!("--wallet-file={}", wallet_file.display()),
            format!("--daemon-address={}", self.daemon_address),
        ]
    }

    /// Feed `input` to a fresh process and return stdout followed by stderr.
    async fn run(&self, args: &[String], input: &str) -> Result<String, SetupError> {
        let fail = |detail: String| SetupError::Command {
            program: PROGRAM.to_string(),
            detail,
        };

        let mut child = tokio::process::Command::new(&self.program)
            .args(args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| fail(e.to_string()))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| fail("Failed to capture stdin".to_string()))?;
        // A session that exits early closes the pipe; the output still tells what happened.
        if let Err(e) = stdin.write_all(input.as_bytes()).await {
            debug!("simplewallet closed stdin early: {}", e);
        }
        drop(stdin);

        let output = tokio::time::timeout(SESSION_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| fail(format!("session did not finish within {SESSION_TIMEOUT:?}")))??;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!("simplewallet exited with {}", output.status);
        Ok(text)
    }
}
