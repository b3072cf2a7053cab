// Main CLI entrypoint
// (c) 2024 Ross Younger

use std::process::ExitCode;

use anstream::{eprintln, print, println};
use anyhow::Context as _;
use clap::Parser as _;
use tracing::debug;

use super::args::CliArgs;
use super::styles::{ERROR, WARNING};
use crate::{
    completion::{Completer, Outcome},
    config::{Configuration, Manager},
    filter::{filter, keywords_from},
    picker::{FzfPicker, Picker},
    preview,
    resolve::{decode_selection, resolve, DisplayTable, Resolution},
    ssh::{load_entries, FilteredEntry},
    util::setup_tracing,
};

/// Exit status when nothing matched, or the caller should use its default behaviour
const EXIT_NO_MATCH: u8 = 1;
/// Exit status from `--complete` when the line should be replaced but not submitted
const EXIT_REPLACE_ONLY: u8 = 2;
/// Exit status when the user cancelled
const EXIT_CANCELLED: u8 = 130;

/// Main CLI entrypoint
pub fn cli() -> anyhow::Result<ExitCode> {
    let args = CliArgs::parse();
    if args.config_files {
        for file in Manager::config_files() {
            println!("{file}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    setup_tracing(args.trace_level(), args.log_file.as_deref())
        .inspect_err(|e| eprintln!("{e:?}"))?;

    let mut manager = Manager::new();
    manager.merge_provider(args.overrides.clone());
    if args.show_config {
        println!("{}", manager.to_display_adapter::<Configuration>(true));
        return Ok(ExitCode::SUCCESS);
    }
    let config: Configuration = manager
        .get()
        .inspect_err(|e| eprintln!("{}ERROR{}: {e}", ERROR.render(), ERROR.render_reset()))
        .context("invalid configuration")?;
    debug!("{config:?}");

    if let Some(host) = &args.preview {
        return Ok(run_preview(&config, host));
    }
    let picker = FzfPicker::new(&config);
    if let Some(line) = &args.complete {
        return Ok(run_complete(&config, &picker, line));
    }

    let keywords = keywords_from(&args.keywords);
    let matches = match matching_entries(&config, &keywords) {
        Ok(m) => m,
        Err(e) => return Ok(cannot_choose(&e)),
    };
    if args.list {
        return Ok(run_list(&matches, args.aliases));
    }
    Ok(run_choose(&matches, &keywords.join(" "), &picker))
}

fn matching_entries(
    config: &Configuration,
    keywords: &[String],
) -> anyhow::Result<Vec<FilteredEntry>> {
    let path = config.ssh_config_path()?;
    let entries = load_entries(&path, &config.description_tag)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(filter(entries, keywords))
}

fn no_match() -> ExitCode {
    eprintln!(
        "{}No matching hosts{}",
        WARNING.render(),
        WARNING.render_reset()
    );
    ExitCode::from(EXIT_NO_MATCH)
}

/// Reports a failure to read the hosts or run the picker.
/// The exit status tells the caller to use its default behaviour.
fn cannot_choose(e: &dyn std::fmt::Display) -> ExitCode {
    eprintln!("{}ERROR{}: {e:#}", ERROR.render(), ERROR.render_reset());
    ExitCode::from(EXIT_NO_MATCH)
}

fn run_choose(matches: &[FilteredEntry], query: &str, picker: &dyn Picker) -> ExitCode {
    let alias = match resolve(matches, query) {
        Resolution::NoMatch => return no_match(),
        Resolution::Resolved(alias) => alias,
        Resolution::NeedsChoice { table, query } => match picker.pick(&table, &query) {
            Ok(chosen) => match chosen.as_deref().and_then(decode_selection) {
                Some(alias) => alias,
                None => return ExitCode::from(EXIT_CANCELLED),
            },
            Err(e) => return cannot_choose(&e),
        },
    };
    println!("{alias}");
    ExitCode::SUCCESS
}

fn run_list(matches: &[FilteredEntry], aliases_only: bool) -> ExitCode {
    if matches.is_empty() {
        return no_match();
    }
    if aliases_only {
        for entry in matches {
            println!("{}", entry.alias);
        }
    } else {
        print!("{}", DisplayTable::new(matches));
    }
    ExitCode::SUCCESS
}

fn run_complete(config: &Configuration, picker: &FzfPicker, line: &str) -> ExitCode {
    match Completer::new(config, picker).complete(line) {
        Outcome::Replace { line, accept } => {
            println!("{line}");
            if accept {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_REPLACE_ONLY)
            }
        }
        Outcome::Fallback => ExitCode::from(EXIT_NO_MATCH),
        Outcome::Unchanged => ExitCode::from(EXIT_CANCELLED),
    }
}

fn run_preview(config: &Configuration, host: &str) -> ExitCode {
    let host = decode_selection(host).unwrap_or_else(|| host.to_string());
    match preview::render(&config.connect_command, &host) {
        Ok(text) => {
            print!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            // The preview pane shows stdout
            println!("{}{e:#}{}", ERROR.render(), ERROR.render_reset());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod test {
    use std::process::ExitCode;

    use super::{
        cannot_choose, matching_entries, run_choose, run_list, EXIT_CANCELLED, EXIT_NO_MATCH,
    };
    use crate::config::Configuration;
    use crate::picker::{Error, Picker};
    use crate::resolve::{DisplayTable, HEADER_LINES};
    use crate::ssh::FilteredEntry;
    use crate::util::make_test_tempfile;

    #[derive(Debug)]
    enum Behaviour {
        Choose(usize),
        Cancel,
        Fail,
        Unavailable,
    }

    impl Picker for Behaviour {
        fn pick(&self, table: &DisplayTable, _query: &str) -> Result<Option<String>, Error> {
            match self {
                Behaviour::Choose(n) => Ok(table
                    .to_string()
                    .lines()
                    .nth(HEADER_LINES + n)
                    .map(str::to_string)),
                Behaviour::Cancel => Ok(None),
                Behaviour::Fail => Err(Error::PickerFailed {
                    program: "fzf".into(),
                    reason: "exited with 2".into(),
                }),
                Behaviour::Unavailable => Err(Error::PickerUnavailable {
                    program: "fzf".into(),
                    source: which::Error::CannotFindBinaryPath,
                }),
            }
        }
    }

    /// `ExitCode` can only be compared by what it shows
    fn assert_exit(actual: ExitCode, expected: u8) {
        assert_eq!(format!("{actual:?}"), format!("{:?}", ExitCode::from(expected)));
    }

    fn entry(alias: &str) -> FilteredEntry {
        FilteredEntry {
            alias: alias.into(),
            address: format!("{alias}.example.com"),
            user: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn choosing() {
        let two = [entry("db1"), entry("db2")];
        assert_exit(run_choose(&two, "db", &Behaviour::Choose(1)), 0);
        assert_exit(run_choose(&two, "db", &Behaviour::Cancel), EXIT_CANCELLED);
        assert_exit(run_choose(&[entry("db1")], "db", &Behaviour::Fail), 0);
        assert_exit(run_choose(&[], "db", &Behaviour::Cancel), EXIT_NO_MATCH);
    }

    #[test]
    fn picker_errors_fall_back() {
        let two = [entry("db1"), entry("db2")];
        assert_exit(run_choose(&two, "db", &Behaviour::Fail), EXIT_NO_MATCH);
        assert_exit(run_choose(&two, "db", &Behaviour::Unavailable), EXIT_NO_MATCH);
    }

    #[test]
    fn unreadable_config_falls_back() {
        let (path, _dir) = make_test_tempfile("Host db1\n", "config");
        let config = Configuration {
            ssh_config: path.with_file_name("no-such-config").to_string_lossy().into_owned(),
            ..Default::default()
        };
        let err = matching_entries(&config, &[]).unwrap_err();
        assert!(format!("{err:#}").contains("no-such-config"));
        assert_exit(cannot_choose(&err), EXIT_NO_MATCH);

        let config = Configuration {
            ssh_config: path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let found = matching_entries(&config, &[]).unwrap();
        assert_exit(run_list(&found, true), 0);
        assert_exit(run_list(&[], false), EXIT_NO_MATCH);
    }
}
