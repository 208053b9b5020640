//! OS package prerequisites (apt)

use std::process::Command;

use log::{info, warn};

use super::error::SetupError;

/// Command-line password generator installed alongside the build packages
pub const PASSWORD_TOOL: &str = "pwgen";

/// Ensure every package in `packages` plus the password generator is installed.
///
/// Installed packages are skipped; the rest go through a single
/// `sudo apt-get install -y`. Any apt failure aborts the run.
pub fn ensure_packages(packages: &[String]) -> Result<(), SetupError> {
    let mut missing: Vec<&str> = packages
        .iter()
        .map(String::as_str)
        .filter(|pkg| !is_package_installed(pkg))
        .collect();

    if which::which(PASSWORD_TOOL).is_err() {
        missing.push(PASSWORD_TOOL);
    }

    if missing.is_empty() {
        info!("All {} required packages already installed", packages.len());
        return Ok(());
    }

    info!("Installing missing packages: {}", missing.join(" "));
    run_apt(&["update"])?;

    let mut args = vec!["install", "-y"];
    args.extend(missing.iter().copied());
    run_apt(&args)
}

/// `dpkg -s` exits 0 only for installed packages
fn is_package_installed(package: &str) -> bool {
    match Command::new("dpkg").args(["-s", package]).output() {
        Ok(output) => output.status.success(),
        Err(e) => {
            warn!("Failed to query dpkg for {}: {}", package, e);
            false
        }
    }
}

fn run_apt(args: &[&str]) -> Result<(), SetupError> {
    // sudo resets the environment, so the frontend is passed as an assignment
    let output = Command::new("sudo")
        .args(["DEBIAN_FRONTEND=noninteractive", "apt-get"])
        .args(args)
        .output()
        .map_err(|e| SetupError::Command {
            program: "sudo apt-get".to_string(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(SetupError::command("apt-get", &output));
    }
    Ok(())
}
