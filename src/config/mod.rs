// (c) 2024 Ross Younger
//! # Configuration management
//!
//! sshpick obtains run-time configuration from the following sources, in priority order:
//! 1. Command-line options
//! 2. Environment variables
//!    - `SSHPICK_<FIELD>` sets any field, e.g. `SSHPICK_PICKER=sk`
//!    - `SSH_CONFIG_FILE` sets `ssh_config`
//! 3. The user's configuration file (`~/.sshpick.toml`)
//! 4. Hard-wired defaults
//!
//! Each option may appear in multiple places, but only the highest priority match is used.
//!
//! ## File format
//!
//! The configuration file is TOML. Every field is optional.
//!
//! ### Example
//!
//! ```toml
//! ssh_config = "~/work/ssh_config"
//! picker = "sk"
//! picker_options = ["--cycle"]
//! picker_height = "40%"
//! # Our hosts are annotated with `#: some text`
//! description_tag = "#:"
//! ```
//!
//! ## Configurable options
//!
//! The full list of supported fields is defined by [Configuration].
//!
//! On the command line:
//! * `sshpick --show-config` outputs a list of supported fields, their current values, and where each value came from.
//! * `sshpick --config-files` outputs the list of configuration files for the current user and platform.

mod structure;
pub use structure::{Configuration, Overrides};

mod manager;
pub use manager::{DisplayAdapter, Manager, ENV_PREFIX, SSH_CONFIG_ENV_VAR};
