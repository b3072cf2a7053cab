//! Resolution policy: auto-select, or ask the user
// (c) 2024 Ross Younger

use std::fmt::Display;

use tabled::{
    builder::Builder,
    settings::style::{HorizontalLine, Style},
    Table,
};

use crate::ssh::{FilteredEntry, FIELD_DELIMITER};

/// Column headings of the selection table
pub const HEADINGS: [&str; 5] = ["Alias", "→", "Hostname", "User", "Desc"];

/// The two rows ([`HEADINGS`] and a separator) which precede the data in a [`DisplayTable`]
pub const HEADER_LINES: usize = 2;

/// What to do with a set of filtered entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Nothing matched; defer to the default completion behaviour
    NoMatch,
    /// Exactly one entry matched; this is its alias
    Resolved(String),
    /// Several entries matched; the user must choose
    NeedsChoice {
        /// Candidates, formatted for the picker
        table: DisplayTable,
        /// Initial query for the picker
        query: String,
    },
}

/// Applies the resolution policy.
///
/// `query` is passed through unchanged to pre-seed the picker.
#[must_use]
pub fn resolve(entries: &[FilteredEntry], query: &str) -> Resolution {
    match entries {
        [] => Resolution::NoMatch,
        [only] => Resolution::Resolved(only.alias.clone()),
        _ => Resolution::NeedsChoice {
            table: DisplayTable::new(entries),
            query: query.to_string(),
        },
    }
}

/// Extracts the alias from a line returned by the picker.
///
/// The picker may return the whole formatted row, so we take the first column and the
/// first word within it. Returns None if the user made no choice.
#[must_use]
pub fn decode_selection(line: &str) -> Option<String> {
    line.split(FIELD_DELIMITER)
        .next()
        .and_then(|field| field.split_whitespace().next())
        .map(str::to_string)
}

/// Selection candidates laid out as an aligned, `|`-delimited table.
///
/// The first [`HEADER_LINES`] rows are headings and are not selectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTable {
    rows: Vec<[String; 5]>,
}

impl DisplayTable {
    /// Lays out the entries, in the order given
    #[must_use]
    pub fn new(entries: &[FilteredEntry]) -> Self {
        let rows = entries
            .iter()
            .map(|e| {
                [
                    e.alias.clone(),
                    HEADINGS[1].to_string(),
                    e.address.clone(),
                    e.user.clone(),
                    e.description.clone(),
                ]
            })
            .collect();
        Self { rows }
    }

    /// Number of selectable rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Are there no selectable rows?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn to_table(&self) -> Table {
        let mut builder = Builder::default();
        builder.push_record(HEADINGS);
        for row in &self.rows {
            builder.push_record(row.iter().map(String::as_str));
        }
        let mut table = builder.build();
        let _ = table.with(
            Style::empty()
                .vertical(FIELD_DELIMITER)
                .horizontals([(1, HorizontalLine::new('-').intersection(FIELD_DELIMITER))]),
        );
        table
    }
}

impl Display for DisplayTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for line in self.to_table().to_string().lines() {
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{decode_selection, resolve, DisplayTable, Resolution, HEADER_LINES};
    use crate::ssh::FilteredEntry;

    fn entry(alias: &str, address: &str, user: &str, description: &str) -> FilteredEntry {
        FilteredEntry {
            alias: alias.into(),
            address: address.into(),
            user: user.into(),
            description: description.into(),
        }
    }

    #[test]
    fn zero_one_many() {
        assert_eq!(resolve(&[], "x"), Resolution::NoMatch);
        assert_eq!(
            resolve(&[entry("db1", "10.0.0.1", "", "")], "d"),
            Resolution::Resolved("db1".into())
        );
        let two = [entry("a", "1", "", ""), entry("b", "2", "", "")];
        match resolve(&two, "partial q") {
            Resolution::NeedsChoice { table, query } => {
                assert_eq!(query, "partial q");
                assert_eq!(table.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn table_layout() {
        let table = DisplayTable::new(&[
            entry("db1", "10.0.0.1", "postgres", "prod box"),
            entry("web-frontend", "web.example.com", "", ""),
        ]);
        let text = table.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), HEADER_LINES + 2);
        assert_eq!(
            lines[0],
            " Alias        | → | Hostname        | User     | Desc"
        );
        assert_eq!(
            lines[1],
            "--------------|---|-----------------|----------|----------"
        );
        assert_eq!(
            lines[2],
            " db1          | → | 10.0.0.1        | postgres | prod box"
        );
        assert_eq!(lines[3], " web-frontend | → | web.example.com |          |");
    }

    #[test]
    fn columns_align() {
        let table = DisplayTable::new(&[
            entry("a", "x", "u", "d"),
            entry("longer-alias", "longer.address", "someone", "words here"),
        ]);
        let text = table.to_string();
        let positions: Vec<Vec<usize>> = text
            .lines()
            .map(|l| {
                l.chars()
                    .enumerate()
                    .filter(|(_, c)| *c == '|')
                    .map(|(i, _)| i)
                    .collect()
            })
            .collect();
        assert!(positions.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn selection_decoding() {
        assert_eq!(decode_selection(""), None);
        assert_eq!(decode_selection("   "), None);
        assert_eq!(decode_selection("db1").as_deref(), Some("db1"));
        assert_eq!(decode_selection("db1\n").as_deref(), Some("db1"));
        assert_eq!(
            decode_selection("db1          | → | 10.0.0.1 | postgres | prod box").as_deref(),
            Some("db1")
        );
        assert_eq!(decode_selection("  web  extra | →").as_deref(), Some("web"));
    }

    #[test]
    fn decoding_a_rendered_row_round_trips() {
        let entries = [entry("db1", "10.0.0.1", "", ""), entry("db2", "10.0.0.2", "", "")];
        let text = DisplayTable::new(&entries).to_string();
        let picked = text.lines().nth(HEADER_LINES + 1).unwrap();
        assert_eq!(decode_selection(picked).as_deref(), Some("db2"));
    }
}
