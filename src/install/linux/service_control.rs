//! Systemd service control operations.
//!
//! The installer runs as the desktop user, so every state-changing
//! `systemctl` call goes through `sudo`. Status queries do not need it.

use std::process::Command;

use super::super::error::SetupError;
use super::privileges::is_root;

/// Reload systemd to pick up new unit files
pub(crate) fn reload_systemd_daemon() -> Result<(), SetupError> {
    systemctl_privileged(&["daemon-reload"])
}

/// Enable the unit for automatic start at boot
pub(crate) fn enable_systemd_service(unit: &str) -> Result<(), SetupError> {
    systemctl_privileged(&["enable", &format!("{unit}.service")])
}

/// Start the unit now
pub(crate) fn start_systemd_service(unit: &str) -> Result<(), SetupError> {
    systemctl_privileged(&["start", &format!("{unit}.service")])
}

/// `systemctl is-active` exits 0 only for active units
pub(crate) fn is_service_active(unit: &str) -> Result<bool, SetupError> {
    let output = Command::new("systemctl")
        .args(["is-active", "--quiet", &format!("{unit}.service")])
        .output()
        .map_err(|e| SetupError::System(format!("Failed to execute systemctl is-active: {e}")))?;

    Ok(output.status.success())
}

fn systemctl_privileged(args: &[&str]) -> Result<(), SetupError> {
    let output = if is_root() {
        Command::new("systemctl").args(args).output()
    } else {
        Command::new("sudo").arg("systemctl").args(args).output()
    };

    let output = output.map_err(|e| {
        SetupError::System(format!("Failed to execute systemctl {}: {e}", args.join(" ")))
    })?;

    if !output.status.success() {
        return Err(SetupError::command(&format!("systemctl {}", args.join(" ")), &output));
    }

    Ok(())
}
