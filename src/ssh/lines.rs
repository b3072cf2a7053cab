//! Line parsing internals
// (c) 2024 Ross Younger

use anyhow::Result;

/// The keyword that splices another file into the configuration
pub(crate) const INCLUDE_KEYWORD: &str = "include";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A classified line from an ssh config file
pub(crate) enum Line {
    /// Blank, or whitespace only
    Blank,
    /// An ordinary `#` comment, discarded
    Comment,
    /// A comment carrying the reserved description tag; holds the trimmed remainder
    Description(String),
    /// Any `Keyword Args...` line
    Directive {
        keyword: String, /*lowercase!*/
        args: Vec<String>,
    },
}

///////////////////////////////////////////////////////////////////////////////////////

/// Tokenizes directive arguments.
///
/// Tokens are separated by spaces or tabs. Single or double quotes group a token,
/// and a backslash escapes a quote or another backslash. A `#` at the start of a
/// token begins a trailing comment.
pub(crate) fn split_args(input: &str) -> Result<Vec<String>> {
    let mut chars = input.chars().peekable();
    let mut output = Vec::<String>::new();
    loop {
        while chars.next_if(|c| matches!(c, ' ' | '\t')).is_some() {}
        if matches!(chars.peek(), None | Some('#')) {
            break;
        }

        let mut token = String::new();
        let mut open_quote: Option<char> = None;
        while let Some(ch) = chars.next() {
            match (ch, open_quote) {
                ('\\', _) => {
                    // any other backslash is literal
                    let escaped = chars.next_if(|c| matches!(c, '\'' | '"' | '\\'));
                    token.push(escaped.unwrap_or(ch));
                }
                (' ' | '\t', None) => break,
                ('\'' | '"', None) => open_quote = Some(ch),
                (c, Some(q)) if c == q => open_quote = None,
                (c, _) => token.push(c),
            }
        }
        anyhow::ensure!(open_quote.is_none(), "unterminated quote");
        output.push(token);
    }
    Ok(output)
}

/// Separates the keyword of a directive line from its arguments.
///
/// The keyword may be delimited by whitespace (`Key Value`), by equals (`Key=Value`),
/// or both (`Key = Value`). The keyword is returned lowercase.
/// Returns None for blank lines.
pub(crate) fn split_keyword(line: &str) -> Option<(String, &str)> {
    let line = line.trim();
    let mut splitter = line.splitn(2, [' ', '\t', '=']);
    let keyword = match splitter.next() {
        None | Some("") => return None,
        Some(kw) => kw.to_lowercase(),
    };
    let rest = splitter.next().unwrap_or_default().trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim_start();
    Some((keyword, rest))
}

/// Returns the arguments of an `Include` directive, or None if this line is something else.
///
/// An `Include` with no arguments is not treated as a directive.
pub(crate) fn include_args(line: &str) -> Option<Result<Vec<String>>> {
    let (keyword, rest) = split_keyword(line)?;
    if keyword != INCLUDE_KEYWORD {
        return None;
    }
    match split_args(rest) {
        Ok(args) if args.is_empty() => None,
        other => Some(other),
    }
}

/// Classifies a single line.
///
/// `description_tag` is the reserved comment token which marks a description line.
pub(crate) fn classify(line: &str, description_tag: &str) -> Result<Line> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Line::Blank);
    }
    if trimmed.starts_with('#') {
        if !description_tag.is_empty() {
            if let Some(rest) = trimmed.strip_prefix(description_tag) {
                if rest.is_empty() || rest.starts_with([' ', '\t']) {
                    return Ok(Line::Description(rest.trim().to_string()));
                }
            }
        }
        return Ok(Line::Comment);
    }
    let Some((keyword, rest)) = split_keyword(trimmed) else {
        return Ok(Line::Blank);
    };
    let args = split_args(rest)?;
    Ok(Line::Directive { keyword, args })
}

///////////////////////////////////////////////////////////////////////////////////////
