// sshpick top-level command-line arguments
// (c) 2024 Ross Younger

use clap::Parser;

use crate::config::Overrides;

/// Options that switch us into another mode i.e. which don't take keywords
pub(crate) const MODE_OPTIONS: &[&str] = &["complete", "preview", "show_config", "config_files"];

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version(env!("SSHPICK_VERSION_STRING")),
    about,
    before_help = "e.g.   sshpick prod db",
    infer_long_args(true)
)]
#[command(help_template(
    "\
{name} version {version}
{about-with-newline}
{usage-heading} {usage}
{before-help}
{all-args}{after-help}
"
))]
#[command(styles=super::styles::CLAP_STYLES)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct CliArgs {
    // MODE SELECTION ======================================================================
    /// Lists the matching hosts instead of choosing one
    #[arg(long, help_heading("Modes"), conflicts_with_all(MODE_OPTIONS))]
    pub list: bool,

    /// With --list, outputs only the aliases, one per line
    #[arg(long, requires("list"), help_heading("Modes"))]
    pub aliases: bool,

    /// Completes a line buffer, for shell integrations.
    ///
    /// If the line is `<connect-command> <partial>`, the replacement line is printed.
    /// Exit status 0 means the line should be submitted, 2 means it should only be replaced;
    /// 1 means the shell should run its default completion; 130 means the user cancelled.
    #[arg(long, value_name("LINE"), help_heading("Modes"), allow_hyphen_values(true))]
    pub complete: Option<String>,

    /// Outputs a summary of the effective configuration of a host.
    ///
    /// This is what the picker's preview pane runs.
    #[arg(long, value_name("HOST"), help_heading("Modes"), hide = true)]
    pub preview: Option<String>,

    /// Outputs the configuration, then exits.
    ///
    /// This shows every configurable field, its current value and where the value came from.
    #[arg(long, help_heading("Configuration"))]
    pub show_config: bool,

    /// Outputs the paths to configuration file(s), then exits
    #[arg(long, help_heading("Configuration"))]
    pub config_files: bool,

    #[command(flatten)]
    pub overrides: Overrides,

    // DEBUG ----------------------------
    /// Quiet mode: reports only errors
    #[arg(short, long, action, conflicts_with("debug"), help_heading("Debug"))]
    pub quiet: bool,

    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=sshpick=debug` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, action, help_heading("Debug"))]
    pub debug: bool,

    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(short('l'), long, action, help_heading("Debug"), value_name("FILE"))]
    pub log_file: Option<String>,

    // POSITIONAL ARGUMENTS ================================================================
    /// Keywords to filter the hosts by. Every keyword must match (case-insensitively)
    /// somewhere in a host's alias, address, user or description.
    #[arg(conflicts_with_all(MODE_OPTIONS), value_name = "KEYWORDS")]
    pub keywords: Vec<String>,
}

impl CliArgs {
    pub(crate) fn trace_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}
