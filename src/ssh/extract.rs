//! Host record extraction
// (c) 2024 Ross Younger

use tracing::{trace, warn};

use super::{classify, ConfigLine, HostRecord, Line};

/// The default reserved comment token marking a description line
pub const DEFAULT_DESCRIPTION_TAG: &str = "#_Desc";

type Setter = fn(&mut HostRecord, Vec<String>);

fn set_aliases(record: &mut HostRecord, args: Vec<String>) {
    record.aliases = args;
}

fn set_hostname(record: &mut HostRecord, args: Vec<String>) {
    record.hostname = args.into_iter().next();
}

fn set_user(record: &mut HostRecord, args: Vec<String>) {
    record.user = args.into_iter().next();
}

#[allow(clippy::needless_pass_by_value)]
fn set_conditional(record: &mut HostRecord, _: Vec<String>) {
    record.is_match_conditional = true;
}

/// The directives we understand. Anything else passes through unexamined.
const DIRECTIVES: &[(&str, Setter)] = &[
    ("host", set_aliases),
    ("hostname", set_hostname),
    ("user", set_user),
    ("match", set_conditional),
];

/// Groups configuration lines into host records.
#[derive(Debug, Clone)]
pub struct Extractor {
    description_tag: String,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_DESCRIPTION_TAG)
    }
}

impl Extractor {
    /// Creates an extractor using a custom description tag
    #[must_use]
    pub fn new(description_tag: &str) -> Self {
        Self {
            description_tag: description_tag.to_string(),
        }
    }

    /// Scans the lines and returns every record which names at least one alias (or is a `Match` block).
    ///
    /// Each blank-line-delimited paragraph is one record. Directives seen later in a
    /// paragraph overwrite earlier ones, and a `Match` anywhere marks the whole paragraph.
    #[must_use]
    pub fn extract<I>(&self, lines: I) -> Vec<HostRecord>
    where
        I: IntoIterator<Item = ConfigLine>,
    {
        let mut output = Vec::new();
        let mut current = HostRecord::default();

        for line in lines {
            let parsed = match classify(&line.text, &self.description_tag) {
                Ok(l) => l,
                Err(e) => {
                    warn!(
                        "ignoring {} line {}: {e}",
                        line.source.display(),
                        line.line_number
                    );
                    continue;
                }
            };
            match parsed {
                Line::Comment => (),
                Line::Blank => flush(&mut current, &mut output),
                Line::Description(text) => {
                    if !text.is_empty() {
                        current.description = Some(text);
                    }
                }
                Line::Directive { keyword, args } => {
                    if let Some((_, setter)) = DIRECTIVES.iter().find(|(k, _)| *k == keyword) {
                        setter(&mut current, args);
                    }
                }
            }
        }
        flush(&mut current, &mut output);
        output
    }
}

/// Ends the paragraph. Records with neither aliases nor a `Match` are global settings.
fn flush(current: &mut HostRecord, output: &mut Vec<HostRecord>) {
    let record = std::mem::take(current);
    if !record.aliases.is_empty() || record.is_match_conditional {
        trace!("record {:?}", record.aliases);
        output.push(record);
    }
}

/// Extracts host records using the default description tag
#[must_use]
pub fn extract<I>(lines: I) -> Vec<HostRecord>
where
    I: IntoIterator<Item = ConfigLine>,
{
    Extractor::default().extract(lines)
}
