// OS abstraction layer for sshpick - Unix implementation
// (c) 2024 Ross Younger

use std::path::PathBuf;

use anyhow::Result;

use super::AbstractPlatform;

/// Name of our own configuration file, which lives in the home directory with a leading dot
pub(crate) const BASE_CONFIG_FILENAME: &str = "sshpick.toml";

#[derive(Debug, Clone, Copy)]
/// Concrete implementation of [`AbstractPlatform`] for Unix-like systems
pub struct Platform {}

impl AbstractPlatform for Platform {
    fn user_ssh_dir() -> Result<PathBuf> {
        let Some(home) = dirs::home_dir() else {
            anyhow::bail!("could not determine home directory");
        };
        Ok(home.join(".ssh"))
    }

    fn user_config_path() -> Option<PathBuf> {
        // ~/.<filename> for now
        let mut d = dirs::home_dir()?;
        d.push(format!(".{BASE_CONFIG_FILENAME}"));
        Some(d)
    }
}
