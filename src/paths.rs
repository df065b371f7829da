//! Where the tracker keeps its files.
//!
//! `INSTALLMENTS_DATA_DIR` and `INSTALLMENTS_CONFIG_DIR` override the
//! platform directories.

use std::path::PathBuf;

const APP: &str = "installments";

/// Payment state, the asset cache and the interactive log.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("INSTALLMENTS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP))
        .unwrap_or_else(|| PathBuf::from(".installments"))
}

#[must_use]
pub fn config_file() -> PathBuf {
    let dir = std::env::var_os("INSTALLMENTS_CONFIG_DIR")
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join(APP)))
        .unwrap_or_else(|| PathBuf::from(".installments"));
    dir.join("config.toml")
}
