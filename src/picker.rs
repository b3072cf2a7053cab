//! Interactive selection via an external picker
// (c) 2024 Ross Younger

use std::{
    io::Write as _,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use tracing::{debug, trace};

use crate::config::Configuration;
use crate::resolve::{DisplayTable, HEADER_LINES};
use crate::ssh::FIELD_DELIMITER;

/// Things that can go wrong when asking the user to choose
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The picker program could not be found
    #[error("picker `{program}` is not available")]
    PickerUnavailable {
        /// The program we looked for
        program: String,
        /// Why we couldn't use it
        #[source]
        source: which::Error,
    },
    /// The picker ran, but did not behave
    #[error("picker `{program}` failed: {reason}")]
    PickerFailed {
        /// The program we ran
        program: String,
        /// What went wrong
        reason: String,
    },
}

/// Something that can ask the user to choose one row of a [`DisplayTable`].
pub trait Picker {
    /// Presents the table, pre-seeded with `query`.
    ///
    /// Returns the line the user chose (as the picker reported it), or None if they cancelled.
    fn pick(&self, table: &DisplayTable, query: &str) -> Result<Option<String>, Error>;
}

/// Exit statuses with which fzf reports that nothing was chosen
const NO_CHOICE_EXIT_CODES: [i32; 2] = [1, 130];

/// Runs an fzf-compatible picker as a subprocess.
///
/// The table is written to its stdin; the chosen row is read from its stdout.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct FzfPicker {
    program: String,
    options: Vec<String>,
    height: String,
    preview: Option<String>,
}

/// The preview command for fzf, which runs it with `sh -c`
fn preview_command(exe: &Path) -> String {
    format!(
        "{} --preview {{1}}",
        shell_words::quote(&exe.to_string_lossy())
    )
}

impl FzfPicker {
    /// Sets up the picker described by the configuration.
    ///
    /// If previews are enabled, the preview pane calls back into the running executable.
    #[must_use]
    pub fn new(config: &Configuration) -> Self {
        let preview = if config.preview {
            match std::env::current_exe() {
                Ok(exe) => Some(preview_command(&exe)),
                Err(e) => {
                    debug!("previews disabled, could not determine current executable: {e}");
                    None
                }
            }
        } else {
            None
        };
        Self {
            program: config.picker.clone(),
            options: config.picker_options.clone(),
            height: config.picker_height.clone(),
            preview,
        }
    }

    /// The picker's command line, not including the program name
    pub(crate) fn arguments(&self, query: &str) -> Vec<String> {
        let mut args = vec![
            format!("--query={query}"),
            format!("--header-lines={HEADER_LINES}"),
            format!("--delimiter={FIELD_DELIMITER}"),
            format!("--height={}", self.height),
            "--reverse".into(),
            "--no-multi".into(),
            "--bind=tab:down,btab:up,ctrl-j:down,ctrl-k:up".into(),
        ];
        if let Some(preview) = &self.preview {
            args.push(format!("--preview={preview}"));
            args.push("--preview-window=right:50%:wrap".into());
        }
        args.extend(self.options.iter().cloned());
        args
    }

    fn locate(&self) -> Result<PathBuf, Error> {
        which::which(&self.program).map_err(|source| Error::PickerUnavailable {
            program: self.program.clone(),
            source,
        })
    }

    fn failed<E: std::fmt::Display>(&self, e: E) -> Error {
        Error::PickerFailed {
            program: self.program.clone(),
            reason: e.to_string(),
        }
    }
}

impl Picker for FzfPicker {
    fn pick(&self, table: &DisplayTable, query: &str) -> Result<Option<String>, Error> {
        let exe = self.locate()?;
        let args = self.arguments(query);
        debug!("running picker {} {args:?}", exe.display());
        let mut child = Command::new(&exe)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.failed(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(table.to_string().as_bytes()) {
                Ok(()) => (),
                // The picker may exit before reading everything
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    trace!("picker closed its input early");
                }
                Err(e) => return Err(self.failed(e)),
            }
            // stdin is dropped here so the picker sees EOF
        }

        let output = child.wait_with_output().map_err(|e| self.failed(e))?;
        if !output.status.success() {
            return match output.status.code() {
                Some(code) if NO_CHOICE_EXIT_CODES.contains(&code) => {
                    debug!("picker exited {code}, nothing chosen");
                    Ok(None)
                }
                _ => Err(self.failed(format!("exited with {}", output.status))),
            };
        }
        let chosen = String::from_utf8_lossy(&output.stdout).trim().to_string();
        trace!("picker returned {chosen:?}");
        Ok((!chosen.is_empty()).then_some(chosen))
    }
}
