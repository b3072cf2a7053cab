//! Recursive configuration reader
// (c) 2024 Ross Younger

use std::{
    collections::VecDeque,
    fs::File,
    io::{BufRead as _, BufReader, Split},
    path::{Path, PathBuf},
    rc::Rc,
};

use tracing::{debug, trace, warn};

use super::{find_include_files, include_args, Error, Result};

/// A single raw line of configuration text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLine {
    /// The file this line came from (diagnostics only)
    pub source: Rc<Path>,
    /// 1-based line number within `source`.
    /// For the blank separator preceding an included file, this is the line of the `Include`.
    pub line_number: usize,
    /// The line, without its line terminator
    pub text: String,
}

impl ConfigLine {
    fn separator(source: Rc<Path>, line_number: usize) -> Self {
        Self {
            source,
            line_number,
            text: String::new(),
        }
    }

    /// Is this line empty or whitespace only?
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug)]
enum State {
    /// Reading lines from this file
    Normal,
    /// Working through the targets of an `Include` directive
    Expanding {
        line_number: usize,
        pending: VecDeque<PathBuf>,
    },
}

#[derive(Debug)]
struct Frame {
    path: Rc<Path>,
    lines: Split<BufReader<File>>,
    line_number: usize,
    state: State,
}

impl Frame {
    fn open(path: PathBuf) -> std::io::Result<Self> {
        let file = File::open(&path)?;
        if !file.metadata()?.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        Ok(Self {
            path: path.into(),
            lines: BufReader::new(file).split(b'\n'),
            line_number: 0,
            state: State::Normal,
        })
    }
}

/// Reads an ssh configuration file, splicing in the contents of any `Include`d files
/// at the point of reference.
///
/// This is an [`Iterator`] over the flattened [`ConfigLine`]s. Each included file is
/// preceded by one blank line, so that its contents always start a fresh paragraph.
/// `Include` lines themselves are not output; every other line is output verbatim.
///
/// Include problems are not fatal. The offending target is skipped, a warning is logged
/// and the problem is recorded in [`issues()`](Self::issues).
///
/// Cycle safety: a file which is already open further up the include stack is not
/// re-entered, and includes nest at most [`Reader::INCLUDE_DEPTH_LIMIT`] deep.
#[derive(Debug)]
pub struct Reader {
    stack: Vec<Frame>,
    base_dir: PathBuf,
    issues: Vec<Error>,
}

impl Reader {
    /// Maximum nesting of included files, counting the root file as 1
    pub const INCLUDE_DEPTH_LIMIT: usize = 16;

    /// Opens the root configuration file.
    ///
    /// Relative include paths are resolved against the directory containing the
    /// (canonicalized) root file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let not_found = |source| Error::ResourceNotFound {
            path: path.to_path_buf(),
            source,
        };
        let canonical = std::fs::canonicalize(path).map_err(not_found)?;
        let base_dir = canonical
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
        let frame = Frame::open(canonical).map_err(not_found)?;
        debug!("reading ssh configuration from {}", frame.path.display());
        Ok(Self {
            stack: vec![frame],
            base_dir,
            issues: Vec::new(),
        })
    }

    /// Non-fatal problems encountered so far
    #[must_use]
    pub fn issues(&self) -> &[Error] {
        &self.issues
    }

    fn record(issues: &mut Vec<Error>, issue: Error) {
        warn!("{issue}");
        issues.push(issue);
    }

    /// Attempts to start reading an include target.
    /// On success, returns the separator line to emit.
    fn enter(
        &mut self,
        target: PathBuf,
        origin: Rc<Path>,
        line_number: usize,
    ) -> Option<ConfigLine> {
        let canonical = match std::fs::canonicalize(&target) {
            Ok(p) => p,
            Err(source) => {
                Self::record(
                    &mut self.issues,
                    Error::IncludePathUnresolvable {
                        path: target,
                        source,
                    },
                );
                return None;
            }
        };
        if canonical.is_dir() {
            debug!("ignoring directory {} in Include", canonical.display());
            return None;
        }
        let depth = self.stack.len();
        if depth >= Self::INCLUDE_DEPTH_LIMIT
            || self
                .stack
                .iter()
                .any(|frame| frame.path.as_ref() == canonical.as_path())
        {
            Self::record(
                &mut self.issues,
                Error::IncludeCycleExceeded {
                    path: canonical,
                    depth,
                },
            );
            return None;
        }
        match Frame::open(canonical) {
            Ok(frame) => {
                trace!("including {}", frame.path.display());
                self.stack.push(frame);
                Some(ConfigLine::separator(origin, line_number))
            }
            Err(source) => {
                Self::record(
                    &mut self.issues,
                    Error::IncludePathUnresolvable {
                        path: target,
                        source,
                    },
                );
                None
            }
        }
    }
}

/// Expands all the arguments of one Include directive into concrete paths
fn include_targets(
    args: &[String],
    base_dir: &Path,
    source: &Path,
    line: usize,
    issues: &mut Vec<Error>,
) -> VecDeque<PathBuf> {
    let mut targets = VecDeque::new();
    for arg in args {
        match find_include_files(arg, base_dir) {
            Ok(files) => {
                if files.is_empty() {
                    trace!("Include {arg} matched nothing");
                }
                targets.extend(files);
            }
            Err(e) => Reader::record(
                issues,
                Error::BadInclude {
                    source_file: source.to_path_buf(),
                    line,
                    reason: format!("{e:#}"),
                },
            ),
        }
    }
    targets
}

fn decode(mut bytes: Vec<u8>) -> String {
    if bytes.last() == Some(&b'\r') {
        let _ = bytes.pop();
    }
    String::from_utf8(bytes)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

impl Iterator for Reader {
    type Item = ConfigLine;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            if let State::Expanding {
                line_number,
                pending,
            } = &mut frame.state
            {
                let line_number = *line_number;
                let Some(target) = pending.pop_front() else {
                    frame.state = State::Normal;
                    continue;
                };
                let origin = Rc::clone(&frame.path);
                if let Some(separator) = self.enter(target, origin, line_number) {
                    return Some(separator);
                }
                continue;
            }

            match frame.lines.next() {
                None => {
                    let _ = self.stack.pop();
                }
                Some(Err(e)) => {
                    warn!("error reading {}: {e}", frame.path.display());
                    let _ = self.stack.pop();
                }
                Some(Ok(bytes)) => {
                    frame.line_number += 1;
                    let text = decode(bytes);
                    match include_args(&text) {
                        None => {
                            return Some(ConfigLine {
                                source: Rc::clone(&frame.path),
                                line_number: frame.line_number,
                                text,
                            })
                        }
                        Some(Ok(args)) => {
                            let pending = include_targets(
                                &args,
                                &self.base_dir,
                                &frame.path,
                                frame.line_number,
                                &mut self.issues,
                            );
                            frame.state = State::Expanding {
                                line_number: frame.line_number,
                                pending,
                            };
                        }
                        Some(Err(e)) => Self::record(
                            &mut self.issues,
                            Error::BadInclude {
                                source_file: frame.path.to_path_buf(),
                                line: frame.line_number,
                                reason: e.to_string(),
                            },
                        ),
                    }
                }
            }
        }
    }
}

/// Reads a configuration file and its includes into a flat list of lines.
///
/// Non-fatal include problems are logged and otherwise ignored.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Vec<ConfigLine>> {
    Ok(Reader::open(path)?.collect())
}

///////////////////////////////////////////////////////////////////////////////////////
