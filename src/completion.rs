//! Line-buffer completion for shell integrations
// (c) 2024 Ross Younger

use tracing::{debug, warn};

use crate::config::Configuration;
use crate::filter::{filter, keywords_from};
use crate::picker::{self, Picker};
use crate::resolve::{decode_selection, resolve, Resolution};
use crate::ssh::load_entries;

/// What the caller should do with its line buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Replace the buffer with `line`
    Replace {
        /// The new buffer contents
        line: String,
        /// Whether the line should be submitted straight away.
        /// This is true when the user chose it in the picker.
        accept: bool,
    },
    /// Run the default completion behaviour instead
    Fallback,
    /// The user cancelled; leave the buffer alone
    Unchanged,
}

/// Completes `<connect-command> <partial>` line buffers to `<connect-command> <alias>`
#[derive(Clone, Copy)]
pub struct Completer<'a> {
    config: &'a Configuration,
    picker: &'a dyn Picker,
}

impl std::fmt::Debug for Completer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}

impl<'a> Completer<'a> {
    /// Constructor
    #[must_use]
    pub fn new(config: &'a Configuration, picker: &'a dyn Picker) -> Self {
        Self { config, picker }
    }

    /// Returns the partial text following the connect command,
    /// or None if this buffer is not ours to complete.
    fn partial<'b>(&self, buffer: &'b str) -> Option<&'b str> {
        let rest = buffer
            .trim_start()
            .strip_prefix(self.config.connect_command.as_str())?;
        if !rest.starts_with(char::is_whitespace) {
            // a different command, e.g. `sshfs`
            return None;
        }
        let rest = rest.trim();
        (!rest.is_empty()).then_some(rest)
    }

    fn replacement(&self, alias: &str, accept: bool) -> Outcome {
        Outcome::Replace {
            line: format!("{} {alias}", self.config.connect_command),
            accept,
        }
    }

    /// Works out what to do with a line buffer
    #[must_use]
    pub fn complete(&self, buffer: &str) -> Outcome {
        let Some(partial) = self.partial(buffer) else {
            debug!("not completing {buffer:?}");
            return Outcome::Fallback;
        };
        let path = match self.config.ssh_config_path() {
            Ok(p) => p,
            Err(e) => {
                warn!("{e:#}");
                return Outcome::Fallback;
            }
        };
        let entries = match load_entries(&path, &self.config.description_tag) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("{e}");
                return Outcome::Fallback;
            }
        };
        let keywords = keywords_from(partial.split_whitespace());
        let matches = filter(entries, &keywords);
        debug!("{} entries match {keywords:?}", matches.len());

        match resolve(&matches, partial) {
            Resolution::NoMatch => Outcome::Fallback,
            Resolution::Resolved(alias) => self.replacement(&alias, false),
            Resolution::NeedsChoice { table, query } => {
                match self.picker.pick(&table, &query) {
                    Ok(Some(line)) => match decode_selection(&line) {
                        Some(alias) => self.replacement(&alias, true),
                        None => Outcome::Unchanged,
                    },
                    Ok(None) => Outcome::Unchanged,
                    Err(e @ picker::Error::PickerUnavailable { .. }) => {
                        debug!("{e}");
                        Outcome::Fallback
                    }
                    Err(e) => {
                        warn!("{e}");
                        Outcome::Fallback
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use super::{Completer, Outcome};
    use crate::config::Configuration;
    use crate::picker::{Error, Picker};
    use crate::resolve::{DisplayTable, HEADER_LINES};
    use crate::util::make_test_tempfile;

    /// Stands in for the picker, returning the n'th data row (or nothing)
    #[derive(Debug, Default)]
    struct Scripted {
        row: Option<usize>,
        unavailable: bool,
        seen: RefCell<Vec<String>>,
    }

    impl Picker for Scripted {
        fn pick(&self, table: &DisplayTable, query: &str) -> Result<Option<String>, Error> {
            if self.unavailable {
                return Err(Error::PickerUnavailable {
                    program: "fzf".into(),
                    source: which::Error::CannotFindBinaryPath,
                });
            }
            self.seen.borrow_mut().push(query.to_string());
            let text = table.to_string();
            Ok(self
                .row
                .and_then(|n| text.lines().nth(HEADER_LINES + n))
                .map(str::to_string))
        }
    }

    const SSH_CONFIG: &str = "\
#_Desc prod box
Host db1
    HostName 10.0.0.1

Host web1 web2
    HostName 10.0.0.2
    User www

Host *.internal
    User admin
";

    fn config_for(path: &std::path::Path) -> Configuration {
        Configuration {
            ssh_config: path.to_string_lossy().into_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn not_our_buffer() {
        let (path, _dir) = make_test_tempfile(SSH_CONFIG, "config");
        let config = config_for(&path);
        let picker = Scripted::default();
        let c = Completer::new(&config, &picker);
        assert_eq!(c.complete("ssh"), Outcome::Fallback);
        assert_eq!(c.complete("ssh   "), Outcome::Fallback);
        assert_eq!(c.complete("sshfs db"), Outcome::Fallback);
        assert_eq!(c.complete("ls -l"), Outcome::Fallback);
        assert_eq!(c.complete(""), Outcome::Fallback);
        assert!(picker.seen.borrow().is_empty());
    }

    #[test]
    fn single_match_resolves_without_picker() {
        let (path, _dir) = make_test_tempfile(SSH_CONFIG, "config");
        let config = config_for(&path);
        let picker = Scripted::default();
        let c = Completer::new(&config, &picker);
        assert_eq!(
            c.complete("ssh prod"),
            Outcome::Replace {
                line: "ssh db1".into(),
                accept: false
            }
        );
        assert!(picker.seen.borrow().is_empty());
    }

    #[test]
    fn several_matches_ask_the_picker() {
        let (path, _dir) = make_test_tempfile(SSH_CONFIG, "config");
        let config = config_for(&path);
        let picker = Scripted {
            row: Some(1),
            ..Default::default()
        };
        let c = Completer::new(&config, &picker);
        assert_eq!(
            c.complete("ssh -v web"),
            Outcome::Replace {
                line: "ssh web2".into(),
                accept: true
            }
        );
        assert_eq!(*picker.seen.borrow(), ["-v web"]);
    }

    #[test]
    fn cancel_leaves_buffer_alone() {
        let (path, _dir) = make_test_tempfile(SSH_CONFIG, "config");
        let config = config_for(&path);
        let picker = Scripted::default();
        let c = Completer::new(&config, &picker);
        assert_eq!(c.complete("ssh web"), Outcome::Unchanged);
    }

    #[test]
    fn fallbacks() {
        let (path, _dir) = make_test_tempfile(SSH_CONFIG, "config");
        let config = config_for(&path);
        let picker = Scripted {
            unavailable: true,
            ..Default::default()
        };
        let c = Completer::new(&config, &picker);
        // no match
        assert_eq!(c.complete("ssh zebra"), Outcome::Fallback);
        // wildcard blocks are never offered
        assert_eq!(c.complete("ssh internal"), Outcome::Fallback);
        // picker unavailable
        assert_eq!(c.complete("ssh web"), Outcome::Fallback);
        // but a single match doesn't need it
        assert_eq!(
            c.complete("ssh 10.0.0.1"),
            Outcome::Replace {
                line: "ssh db1".into(),
                accept: false
            }
        );

        let missing = config_for(&path.with_file_name("no-such-config"));
        assert_eq!(
            Completer::new(&missing, &picker).complete("ssh db"),
            Outcome::Fallback
        );
    }

    #[test]
    fn custom_connect_command() {
        let (path, _dir) = make_test_tempfile(SSH_CONFIG, "config");
        let config = Configuration {
            connect_command: "mosh".into(),
            ..config_for(&path)
        };
        let picker = Scripted::default();
        let c = Completer::new(&config, &picker);
        assert_eq!(c.complete("ssh db1"), Outcome::Fallback);
        assert_eq!(
            c.complete("mosh db1"),
            Outcome::Replace {
                line: "mosh db1".into(),
                accept: false
            }
        );
    }
}
