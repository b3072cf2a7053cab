//! Host records and selectable entries
// (c) 2024 Ross Younger

use std::fmt::Display;

/// Characters which make an alias or address a pattern rather than a concrete host
const WILDCARDS: [char; 2] = ['*', '?'];

/// Column delimiter of the serialized entry form
pub const FIELD_DELIMITER: char = '|';

/// Does this alias or address begin or end with a wildcard?
#[must_use]
pub fn is_wildcard_pattern(s: &str) -> bool {
    s.starts_with(WILDCARDS) || s.ends_with(WILDCARDS)
}

/// Everything we extracted from one `Host` (or `Match`) block
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HostRecord {
    /// The arguments of the `Host` line, in order
    pub aliases: Vec<String>,
    /// The `HostName`, if one was given
    pub hostname: Option<String>,
    /// The `User`, if one was given
    pub user: Option<String>,
    /// Free text from the description comment, if present
    pub description: Option<String>,
    /// True if this block was introduced by `Match`
    pub is_match_conditional: bool,
}

impl HostRecord {
    /// The address ssh would connect to.
    /// This is the `HostName` if given, otherwise the first alias.
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.hostname
            .as_deref()
            .or_else(|| self.aliases.first().map(String::as_str))
    }

    /// True if the record's address is a wildcard pattern
    #[must_use]
    pub fn is_wildcard_pattern(&self) -> bool {
        self.address().is_some_and(is_wildcard_pattern)
    }

    /// Is this record able to produce any selectable entries at all?
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        !self.aliases.is_empty() && !self.is_match_conditional && !self.is_wildcard_pattern()
    }

    /// Produces one selectable entry per concrete alias.
    ///
    /// Nothing is produced for `Match` blocks, or if the address is a pattern.
    /// Aliases which are themselves patterns are skipped.
    #[must_use]
    pub fn entries(&self) -> Vec<FilteredEntry> {
        if !self.is_eligible() {
            return Vec::new();
        }
        let address = self.address().unwrap_or_default();
        self.aliases
            .iter()
            .filter(|alias| !alias.is_empty() && !is_wildcard_pattern(alias))
            .map(|alias| FilteredEntry {
                alias: alias.clone(),
                address: address.to_string(),
                user: self.user.clone().unwrap_or_default(),
                description: self.description.clone().unwrap_or_default(),
            })
            .collect()
    }
}

/// A host as presented for selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilteredEntry {
    /// What the user types to select this host
    pub alias: String,
    /// Where it connects to
    pub address: String,
    /// Login user; empty means the system default
    pub user: String,
    /// Optional annotation; may be empty
    pub description: String,
}

impl FilteredEntry {
    /// The serialized form, `alias|address|user|description`.
    ///
    /// Filtering, deduplication and ordering all operate on this form.
    #[must_use]
    pub fn serialized(&self) -> String {
        self.to_string()
    }
}

impl Display for FilteredEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = FIELD_DELIMITER;
        write!(
            f,
            "{}{d}{}{d}{}{d}{}",
            self.alias, self.address, self.user, self.description
        )
    }
}

#[cfg(test)]
mod test {
    use super::{is_wildcard_pattern, FilteredEntry, HostRecord};

    fn record(aliases: &[&str], hostname: Option<&str>) -> HostRecord {
        HostRecord {
            aliases: aliases.iter().map(|s| (*s).to_string()).collect(),
            hostname: hostname.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn wildcard_detection() {
        for (s, expected) in [
            ("*", true),
            ("*.internal", true),
            ("10.0.0.*", true),
            ("db?", true),
            ("?db", true),
            ("db*1", false),
            ("db1", false),
            ("", false),
        ] {
            assert_eq!(is_wildcard_pattern(s), expected, "{s}");
        }
    }

    #[test]
    fn address_defaults_to_first_alias() {
        let r = record(&["db1", "db"], None);
        assert_eq!(r.address(), Some("db1"));
        let r = record(&["db1"], Some("10.0.0.1"));
        assert_eq!(r.address(), Some("10.0.0.1"));
        assert_eq!(HostRecord::default().address(), None);
    }

    #[test]
    fn multi_alias_entries() {
        let r = HostRecord {
            user: Some("admin".into()),
            ..record(&["web1", "web2"], Some("10.0.0.2"))
        };
        let entries = r.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].alias, "web1");
        assert_eq!(entries[1].alias, "web2");
        assert!(entries
            .iter()
            .all(|e| e.address == "10.0.0.2" && e.user == "admin"));
    }

    #[test]
    fn ineligible_records() {
        assert!(record(&[], Some("x")).entries().is_empty());
        assert!(record(&["*.internal"], None).entries().is_empty());
        assert!(record(&["web"], Some("*.internal")).entries().is_empty());
        let conditional = HostRecord {
            is_match_conditional: true,
            ..record(&["web"], None)
        };
        assert!(conditional.entries().is_empty());
    }

    #[test]
    fn pattern_aliases_are_skipped_individually() {
        let entries = record(&["web1", "web-*"], Some("10.0.0.3")).entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].alias, "web1");
    }

    #[test]
    fn pattern_first_alias_poisons_default_address() {
        // The address is taken from the first alias, and re-checked
        assert!(record(&["*", "web1"], None).entries().is_empty());
    }

    #[test]
    fn serialized_form() {
        let e = FilteredEntry {
            alias: "db1".into(),
            address: "10.0.0.1".into(),
            user: String::new(),
            description: "prod box".into(),
        };
        assert_eq!(e.serialized(), "db1|10.0.0.1||prod box");
    }
}
