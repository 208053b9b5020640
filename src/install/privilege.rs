//! Privileged unit installation
//!
//! Units are rendered into a staging directory as the invoking user. Only the
//! copy into the system unit directory runs as root, through one minimal
//! `sudo sh -c` script.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};

use super::linux::is_root;

/// Build the shell script that copies `staged_units` into `unit_dir`.
pub fn build_install_script(staged_units: &[PathBuf], unit_dir: &Path) -> Result<String> {
    let mut script = String::from("#!/bin/sh\nset -e\n\n");

    script.push_str("echo 'Installing service units...'\n");
    let target = shell_quote(&format!("{}/", unit_dir.display()));
    script.push_str(&format!(
        "mkdir -p {}\n",
        shell_quote(&unit_dir.display().to_string())
    ));
    for unit in staged_units {
        let file_name = unit
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid unit path: {}", unit.display()))?;
        script.push_str(&format!("echo {}\n", shell_quote(&format!("  {file_name}"))));
        script.push_str(&format!(
            "install -m 0644 {} {target}\n",
            shell_quote(&unit.display().to_string())
        ));
    }

    script.push_str("\necho '✓ Service units installed'\n");
    Ok(script)
}

/// Single-quote `value` for `sh`, closing and reopening around embedded quotes.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Copy `staged_units` into `unit_dir` as root.
pub fn install_units_with_elevated_privileges(
    staged_units: &[PathBuf],
    unit_dir: &Path,
) -> Result<()> {
    if staged_units.is_empty() {
        anyhow::bail!("No unit files staged");
    }

    let script = build_install_script(staged_units, unit_dir)?;

    eprintln!("🔐 Installing services (requires sudo)...");
    eprintln!("   You may be prompted for your password");

    let mut command = if is_root() {
        Command::new("sh")
    } else {
        let mut sudo = Command::new("sudo");
        sudo.arg("sh");
        sudo
    };

    let status = command
        .arg("-c")
        .arg(&script)
        .status()
        .context("Failed to execute sudo")?;

    if !status.success() {
        anyhow::bail!(
            "Privileged unit installation failed with exit code: {}",
            status.code().unwrap_or(-1)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_copies_each_unit() {
        let staged = vec![
            PathBuf::from("/tmp/stage/zanod.service"),
            PathBuf::from("/tmp/stage/tt-miner.service"),
        ];
        let script = build_install_script(&staged, Path::new("/etc/systemd/system")).unwrap();

        assert!(script.starts_with("#!/bin/sh\nset -e\n"));
        assert!(script.contains(
            "install -m 0644 '/tmp/stage/zanod.service' '/etc/systemd/system/'\n"
        ));
        assert!(script.contains(
            "install -m 0644 '/tmp/stage/tt-miner.service' '/etc/systemd/system/'\n"
        ));
        assert!(script.contains("echo '  tt-miner.service'\n"));
        assert!(!script.contains("systemctl"));
    }

    #[test]
    fn quotes_in_paths_are_escaped() {
        let staged = vec![PathBuf::from("/tmp/o'brien/zanod.service")];
        let script = build_install_script(&staged, Path::new("/etc/systemd/system")).unwrap();

        assert!(script.contains(
            "install -m 0644 '/tmp/o'\\''brien/zanod.service' '/etc/systemd/system/'\n"
        ));
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
