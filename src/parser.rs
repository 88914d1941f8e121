//! Line tokenizer: a raw input line becomes a [`Pipeline`] of [`Stage`]s.
//!
//! Splitting happens in three passes: on `|` into stages, once on `>`
//! within a stage into command text and redirect target, and on runs of
//! delimiter characters within the command text into argv tokens.

use crate::types::{Pipeline, Stage};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("empty redirect target")]
    EmptyRedirect,
    #[error("redirect target must be a single word")]
    RedirectNotWord,
    #[error("redirection is only allowed on the last pipeline stage")]
    RedirectNotLast,
}

/// Token delimiters within a command: space, tab, CR, LF, and BEL.
fn is_delim(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x07')
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(is_delim).filter(|w| !w.is_empty())
}

fn parse_stage(text: &str) -> Result<Stage, ParseError> {
    let (cmd, redirect) = match text.split_once('>') {
        Some((cmd, target)) => {
            let mut targets = words(target);
            let path = targets.next().ok_or(ParseError::EmptyRedirect)?;
            if targets.next().is_some() || path.contains('>') {
                return Err(ParseError::RedirectNotWord);
            }
            (cmd, Some(path.to_string()))
        }
        None => (text, None),
    };
    let argv = words(cmd).map(str::to_string).collect();
    Ok(Stage { argv, redirect })
}

/// Tokenize one line. Blank commands (a blank line, or nothing between
/// two pipe delimiters) become stages with an empty argv rather than
/// errors; the launcher runs them as no-ops.
pub fn parse_line(line: &str) -> Result<Pipeline, ParseError> {
    let raw: Vec<&str> = line.split('|').collect();
    let last = raw.len() - 1;
    let mut stages = Vec::with_capacity(raw.len());
    for (i, text) in raw.into_iter().enumerate() {
        let stage = parse_stage(text)?;
        if stage.redirect.is_some() && i != last {
            return Err(ParseError::RedirectNotLast);
        }
        stages.push(stage);
    }
    Ok(Pipeline { stages })
}
