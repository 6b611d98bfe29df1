//! MegaPass CLI support library
//!
//! The JSON record store and the Wi-Fi join-code renderer used by the
//! `megapass` binary.

pub mod qr;
pub mod storage;

pub use qr::WifiJoinCode;
pub use storage::{Storage, StorageError};
