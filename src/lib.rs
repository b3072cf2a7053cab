// (c) 2024 Ross Younger
//! # sshpick
//!
//! Fuzzy host selection driven by your ssh client configuration.
//!
//! sshpick reads `~/.ssh/config` (and everything it `Include`s), works out which
//! hosts you could connect to, narrows them down by keyword and, when more than
//! one remains, asks you to choose with an interactive picker such as
//! [fzf](https://github.com/junegunn/fzf).
//!
//! ## Usage
//!
//! ```text
//! $ sshpick prod db          # prints the chosen alias
//! $ ssh "$(sshpick prod)"
//! $ sshpick --list web       # shows the candidates
//! ```
//!
//! Shell integrations call `sshpick --complete "$BUFFER"` from a key binding.
//! A buffer of the form `ssh <partial>` is completed to `ssh <alias>`;
//! anything else is left to the shell's default completion.
//!
//! ## Annotating hosts
//!
//! A comment starting with `#_Desc` attaches a description to the hosts in its paragraph
//! (a run of lines without a blank line between them).
//! The description is shown in the picker and can be searched:
//!
//! ```text
//! #_Desc primary database, handle with care
//! Host db1
//!     HostName 10.0.0.1
//! ```
//!
//! ## Library layout
//!
//! * [`ssh`] reads the configuration tree and extracts host entries
//! * [`filter`] narrows and deduplicates them
//! * [`resolve`] decides between auto-selection and asking the user
//! * [`picker`] runs the interactive picker
//! * [`completion`] ties it all together for line-buffer completion
//! * [`config`] holds sshpick's own settings

mod cli;
pub use cli::cli;

pub mod completion;
pub mod config;
pub mod filter;
/// OS abstraction layer
pub mod os;
pub mod picker;
pub mod preview;
pub mod resolve;
pub mod ssh;
/// Utilities
pub mod util;
