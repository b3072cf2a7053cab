// (c) 2024 Ross Younger
//! # ssh configuration reading
//!
//! This module turns an OpenSSH-style client configuration file into a list of
//! hosts the user might want to connect to.
//!
//! 1. [`Reader`] flattens the root file and everything it `Include`s into a single
//!    sequence of [`ConfigLine`]s.
//! 2. [`Extractor`] groups those lines into [`HostRecord`]s.
//! 3. [`HostRecord::entries`] yields one [`FilteredEntry`] per concrete alias.
//!
//! Only `Host`, `HostName`, `User`, `Match` and `Include` are interpreted.
//! Blocks introduced by `Match` are never offered, nor are wildcard patterns
//! such as `Host *.internal`.
//!
//! A block may be annotated with a description comment:
//!
//! ```text
//! #_Desc primary database, handle with care
//! Host db1
//!     HostName 10.0.0.1
//!     User postgres
//! ```

mod errors;
pub use errors::{Error, Result};

mod extract;
pub use extract::{extract, Extractor, DEFAULT_DESCRIPTION_TAG};

mod hosts;
pub use hosts::{is_wildcard_pattern, FilteredEntry, HostRecord, FIELD_DELIMITER};

mod includes;
use includes::find_include_files;

mod lines;
use lines::{classify, include_args, Line};

mod reader;
pub use reader::{read, ConfigLine, Reader};

use std::path::Path;

/// Reads a configuration tree and returns every selectable entry, in file order.
///
/// Problems with included files are logged and skipped; only a failure to read
/// the root file is returned as an error.
pub fn load_entries<P: AsRef<Path>>(
    path: P,
    description_tag: &str,
) -> Result<Vec<FilteredEntry>> {
    let reader = Reader::open(path)?;
    Ok(Extractor::new(description_tag)
        .extract(reader)
        .iter()
        .flat_map(HostRecord::entries)
        .collect())
}
