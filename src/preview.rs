//! Preview pane content
// (c) 2024 Ross Younger

use std::process::{Command, Stdio};

use anyhow::{Context as _, Result};
use tracing::debug;

/// The effective-config keys worth showing, in display order
pub const SHOWN_KEYS: [&str; 9] = [
    "hostname",
    "user",
    "port",
    "identityfile",
    "proxyjump",
    "proxycommand",
    "localforward",
    "remoteforward",
    "forwardagent",
];

/// Reduces the output of `ssh -G` to the interesting keys, aligned in two columns.
///
/// Keys are shown in [`SHOWN_KEYS`] order. Repeated keys (such as `identityfile`)
/// are all shown, in the order given.
#[must_use]
pub fn format_effective_config(output: &str) -> String {
    let pairs: Vec<(&str, &str)> = output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once(char::is_whitespace)?;
            Some((key, value.trim()))
        })
        .collect();

    let mut selected = Vec::new();
    for wanted in SHOWN_KEYS {
        selected.extend(
            pairs
                .iter()
                .filter(|(key, _)| key.eq_ignore_ascii_case(wanted))
                .map(|&(_, value)| (wanted, value)),
        );
    }

    let width = selected.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    selected
        .iter()
        .map(|(key, value)| format!("{key:<width$}  {value}\n"))
        .collect()
}

/// Obtains the effective configuration for `host` by running `<connect_command> -G <host>`,
/// and formats it for display.
pub fn render(connect_command: &str, host: &str) -> Result<String> {
    debug!("running {connect_command} -G {host}");
    let output = Command::new(connect_command)
        .arg("-G")
        .arg(host)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("running {connect_command}"))?;
    if !output.status.success() {
        anyhow::bail!(
            "{connect_command} -G {host} failed ({}): {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(format_effective_config(&String::from_utf8_lossy(
        &output.stdout,
    )))
}

#[cfg(test)]
mod test {
    use assertables::assert_contains;

    use super::{format_effective_config, render};

    const SAMPLE: &str = "\
user postgres
hostname 10.0.0.1
port 22
compression no
identityfile ~/.ssh/id_ed25519
identityfile ~/.ssh/id_rsa
forwardagent no
proxyjump bastion.example.com
sendenv LANG
";

    #[test]
    fn keeps_and_orders_interesting_keys() {
        let text = format_effective_config(SAMPLE);
        assert_eq!(
            text,
            "\
hostname      10.0.0.1
user          postgres
port          22
identityfile  ~/.ssh/id_ed25519
identityfile  ~/.ssh/id_rsa
proxyjump     bastion.example.com
forwardagent  no
"
        );
    }

    #[test]
    fn nothing_interesting() {
        assert_eq!(format_effective_config(""), "");
        assert_eq!(format_effective_config("compression yes\nbogus\n"), "");
    }

    #[test]
    fn values_with_spaces() {
        let text = format_effective_config("proxycommand ssh -W %h:%p jump\n");
        assert_eq!(text, "proxycommand  ssh -W %h:%p jump\n");
    }

    #[test]
    fn command_must_exist() {
        let err = render("surely-no-such-connect-command", "x").unwrap_err();
        assert_contains!(err.to_string(), "surely-no-such-connect-command");
    }
}
