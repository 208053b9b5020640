//! Wallet record and its on-disk details file

use std::fmt;
use std::path::{Path, PathBuf};

use crate::install::error::SetupError;
use crate::install::file_ops::write_secret_file;

/// Everything needed to use or recover the provisioned wallet
#[derive(Clone)]
pub struct WalletRecord {
    pub name: String,
    pub file: PathBuf,
    pub password: String,
    pub seed_password: String,
    pub address: String,
    pub seed_phrase: String,
}

// Secrets stay out of logs.
impl fmt::Debug for WalletRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletRecord")
            .field("name", &self.name)
            .field("file", &self.file)
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl WalletRecord {
    /// `<work_dir>/<name>-details.txt`
    pub fn details_path(&self, work_dir: &Path) -> PathBuf {
        work_dir.join(format!("{}-details.txt", self.name))
    }

    /// One line per field
    pub fn details_text(&self) -> String {
        format!(
            "Wallet Name: {}\n\
             Wallet File: {}\n\
             Wallet Address: {}\n\
             Wallet Password: {}\n\
             Seed Password: {}\n\
             Seed Phrase: {}\n",
            self.name,
            self.file.display(),
            self.address,
            self.password,
            self.seed_password,
            self.seed_phrase,
        )
    }

    /// Write the details file (mode 0600), replacing any previous one.
    pub fn write_details(&self, work_dir: &Path) -> Result<PathBuf, SetupError> {
        let path = self.details_path(work_dir);
        write_secret_file(&path, &self.details_text())?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn record(dir: &Path) -> WalletRecord {
        WalletRecord {
            name: "miner".to_string(),
            file: dir.join("miner.wallet"),
            password: "Q7f2mZp0Lr8sXk4N".to_string(),
            seed_password: "b3VtY2hLa9PqW1eE".to_string(),
            address: "ZxMASi45ub7Qe4ZE36UT5G6cU4ud8Fhhe4deS4F3cw9KTAb8dLcukC7edhDQ7cn5d4gEYkbUrMWeWQLGsCmrG6dLaYyNoVKf5".to_string(),
            seed_phrase: "lion vanish crumble".to_string(),
        }
    }

    #[test]
    fn details_file_has_six_populated_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = record(dir.path()).write_details(dir.path()).unwrap();

        assert_eq!(path, dir.path().join("miner-details.txt"));
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        for line in &lines {
            let (_, value) = line.split_once(": ").unwrap();
            assert!(!value.trim().is_empty(), "{line}");
        }

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn debug_hides_secrets() {
        let dir = tempfile::tempdir().unwrap();
        let shown = format!("{:?}", record(dir.path()));
        assert!(!shown.contains("Q7f2mZp0Lr8sXk4N"));
        assert!(!shown.contains("lion"));
        assert!(shown.contains("miner"));
    }
}
