//! Wallet and seed password selection

use std::process::Command;

use log::{debug, info};

use super::prompt::Prompter;
use crate::install::dependencies::PASSWORD_TOOL;
use crate::install::error::SetupError;

pub const GENERATED_PASSWORD_LEN: usize = 16;

/// Ask whether the operator wants to pick `label`; generate one otherwise.
pub fn choose_password(prompter: &mut dyn Prompter, label: &str) -> Result<String, SetupError> {
    if prompter.confirm(&format!("Do you want to set a custom {label}?"))? {
        prompt_matching(prompter, label)
    } else {
        let password = generate_password();
        info!("Generated a random {} ({} characters)", label, password.len());
        Ok(password)
    }
}

/// Prompt for `label` twice until both entries are identical.
pub fn prompt_matching(prompter: &mut dyn Prompter, label: &str) -> Result<String, SetupError> {
    loop {
        let first = prompter.secret(&format!("Enter {label}:"))?;
        let second = prompter.secret(&format!("Confirm {label}:"))?;
        if first == second {
            return Ok(first);
        }
        eprintln!("Passwords do not match, please try again.");
    }
}

/// 16 characters from `pwgen -s` when available, otherwise generated in-process.
pub fn generate_password() -> String {
    pwgen().unwrap_or_else(random_password)
}

fn pwgen() -> Option<String> {
    let tool = which::which(PASSWORD_TOOL).ok()?;
    let output = Command::new(tool)
        .args(["-s", &GENERATED_PASSWORD_LEN.to_string(), "1"])
        .output()
        .ok()?;

    let password = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if output.status.success() && is_generated_shape(&password) {
        Some(password)
    } else {
        debug!("Ignoring unexpected {} output", PASSWORD_TOOL);
        None
    }
}

/// Alphanumeric password of `GENERATED_PASSWORD_LEN` characters
pub fn random_password() -> String {
    (0..GENERATED_PASSWORD_LEN)
        .map(|_| fastrand::alphanumeric())
        .collect()
}

fn is_generated_shape(password: &str) -> bool {
    password.len() == GENERATED_PASSWORD_LEN && password.chars().all(|c| c.is_ascii_alphanumeric())
}
