//! Privilege and identity checks.
//!
//! The installer must run as the desktop user who will own the wallet and
//! services; root-only steps are escalated individually with `sudo`.

use nix::unistd::{User, getuid};

use super::super::error::SetupError;

#[inline]
pub(crate) fn is_root() -> bool {
    getuid().is_root()
}

/// Fail when started as root
pub fn ensure_not_root() -> Result<(), SetupError> {
    if is_root() {
        return Err(SetupError::RunningAsRoot);
    }
    Ok(())
}

/// Login name of the invoking user, used as `User=` in the units
pub fn current_user() -> Result<String, SetupError> {
    let uid = getuid();
    User::from_uid(uid)
        .map_err(|e| SetupError::System(format!("Failed to look up uid {uid}: {e}")))?
        .map(|user| user.name)
        .ok_or_else(|| SetupError::System(format!("No passwd entry for uid {uid}")))
}
