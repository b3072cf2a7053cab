//! OS abstraction layer
// (c) 2024 Ross Younger

use std::path::PathBuf;

use anyhow::Result;

/// General platform abstraction trait.
/// The active implementation should be pulled into this crate
/// Implementations should be called `Platform`, e.g. [unix::Platform].
///
/// Usage:
/// ```
///    use sshpick::os::Platform;
///    use sshpick::os::AbstractPlatform as _;
///    println!("{:?}", Platform::user_ssh_config());
/// ```
pub trait AbstractPlatform {
    /// The directory holding the user's ssh configuration.
    /// On most platforms this will be `${HOME}/.ssh`
    /// # Errors
    /// If the current user's home directory could not be determined
    fn user_ssh_dir() -> Result<PathBuf>;

    /// Path to the user ssh config file.
    /// On most platforms this will be `${HOME}/.ssh/config`
    /// # Note
    /// This is a _theoretical_ path construction; it does not guarantee that the path actually exists.
    /// That is up to the caller to determine and reason about.
    /// # Errors
    /// If the current user's home directory could not be determined
    fn user_ssh_config() -> Result<PathBuf> {
        Ok(Self::user_ssh_dir()?.join("config"))
    }

    /// The absolute path to the user configuration file for this utility, if one is defined on this platform.
    ///
    /// If somehow we could not determine the path to use, returns None.
    fn user_config_path() -> Option<PathBuf>;
}

/// Unix-like platforms
#[cfg(any(unix, doc))]
pub mod unix;

#[cfg(any(unix, doc))]
pub use unix::*;

static_assertions::assert_cfg!(unix, "This OS is not yet supported");
