//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Everything lives under ~/.rfp-forge/.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the RFP Forge directory (~/.rfp-forge/)
pub fn rfp_forge_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".rfp-forge"))
}

/// Get the config file path (~/.rfp-forge/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(rfp_forge_dir()?.join("config.json"))
}

/// Get the default database file path (~/.rfp-forge/data.db)
pub fn database_path() -> AppResult<PathBuf> {
    Ok(rfp_forge_dir()?.join("data.db"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Ensure the parent directory of a file path exists
pub fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_share_root() {
        let root = rfp_forge_dir().unwrap();
        assert!(config_path().unwrap().starts_with(&root));
        assert!(database_path().unwrap().ends_with("data.db"));
    }

    #[test]
    fn test_ensure_parent_dir_creates_nested() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("a").join("b").join("data.db");
        ensure_parent_dir(&file).unwrap();
        assert!(temp.path().join("a").join("b").is_dir());
    }

    #[test]
    fn test_ensure_parent_dir_bare_filename() {
        assert!(ensure_parent_dir(Path::new("data.db")).is_ok());
    }
}
