//! Include directive logic
// (c) 2024 Ross Younger

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob_with, MatchOptions};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref ENV_REFERENCE: Regex =
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
            .expect("environment reference regex is valid");
}

/// Expands `${VAR}` and `$VAR` references from the process environment.
///
/// A reference to an unset variable is an error, as it is for ssh.
pub(super) fn expand_environment(arg: &str) -> Result<String> {
    let mut missing = None;
    let expanded = ENV_REFERENCE.replace_all(arg, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        if let Ok(value) = std::env::var(name) {
            value
        } else {
            if missing.is_none() {
                missing = Some(name.to_string());
            }
            String::new()
        }
    });
    if let Some(name) = missing {
        anyhow::bail!("environment variable {name} is not set");
    }
    Ok(expanded.into_owned())
}

/// Environment, ~ and wildcard expansion for Include directives.
///
/// Relative paths are taken relative to `base_dir`.
/// The result is sorted; patterns which match nothing produce an empty list.
pub(super) fn find_include_files(arg: &str, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let arg = expand_environment(arg)?;
    let mut path = if arg.starts_with('~') {
        expanduser::expanduser(&arg)
            .with_context(|| format!("expanding include expression {arg}"))?
    } else {
        PathBuf::from(&arg)
    };
    if !path.is_absolute() {
        path = base_dir.join(path);
    }

    let options = MatchOptions {
        case_sensitive: true,
        require_literal_leading_dot: true,
        require_literal_separator: true,
    };
    let mut result: Vec<PathBuf> = glob_with(path.to_string_lossy().as_ref(), options)
        .with_context(|| format!("bad include pattern {arg}"))?
        .flatten()
        .collect();
    result.sort();
    Ok(result)
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use super::{expand_environment, find_include_files};

    #[test]
    fn environment_references() {
        std::env::set_var("SP_TEST_INCLUDE_DIR", "/opt/conf");
        assert_eq!(
            expand_environment("${SP_TEST_INCLUDE_DIR}/a.conf").unwrap(),
            "/opt/conf/a.conf"
        );
        assert_eq!(
            expand_environment("$SP_TEST_INCLUDE_DIR/b").unwrap(),
            "/opt/conf/b"
        );
        assert_eq!(expand_environment("plain/path").unwrap(), "plain/path");
        let err = expand_environment("$SP_TEST_SURELY_UNSET_VAR/x").unwrap_err();
        assert!(err.to_string().contains("SP_TEST_SURELY_UNSET_VAR"));
    }

    #[test]
    fn relative_to_base_dir() {
        let tempdir = tempfile::tempdir().unwrap();
        let confd = tempdir.path().join("conf.d");
        std::fs::create_dir(&confd).unwrap();
        for name in ["b.conf", "a.conf", "c.txt", ".hidden.conf"] {
            std::fs::write(confd.join(name), "").unwrap();
        }
        let found = find_include_files("conf.d/*.conf", tempdir.path()).unwrap();
        assert_eq!(found, vec![confd.join("a.conf"), confd.join("b.conf")]);
    }

    #[test]
    fn no_match_is_empty() {
        let tempdir = tempfile::tempdir().unwrap();
        assert!(find_include_files("nothing-here/*", tempdir.path())
            .unwrap()
            .is_empty());
        assert!(find_include_files("missing.conf", tempdir.path())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn absolute_paths_ignore_base_dir() {
        let tempdir = tempfile::tempdir().unwrap();
        let file = tempdir.path().join("x.conf");
        std::fs::write(&file, "").unwrap();
        let found =
            find_include_files(file.to_string_lossy().as_ref(), Path::new("/nonexistent"))
                .unwrap();
        assert_eq!(found, vec![file]);
    }

    #[test]
    #[ignore] // this test is dependent on the current user filespace
    fn tilde_expansion_current_user() {
        let a = find_include_files("~/.ssh/*", Path::new("/"))
            .expect("~ should expand to home directory");
        assert!(!a.is_empty());
    }
}
