//! Zano node installer library
//!
//! Installs `zanod`, `simplewallet` and TT-Miner into a working directory,
//! provisions a wallet by driving `simplewallet` over piped stdin, and
//! registers the daemon, GPU miner and PoS staking wallet as systemd units.

pub mod config;
pub mod install;
