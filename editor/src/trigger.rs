//! Detection of in-progress completion tokens around the caret.
//!
//! The composer opens one of four completion surfaces when the text behind
//! the caret contains an unterminated trigger token: `@` for files, `/` for
//! commands, `#` for agents, `!` for prompts. Detection runs over the
//! virtual text so the scan sees exactly what the user typed, with existing
//! file tags collapsed into opaque spans that can never re-trigger.

use std::ops::Range;

use strum_macros::EnumIter;

/// The four trigger characters, one per completion surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum TriggerChar {
    /// `@`: file references.
    File,
    /// `/`: slash commands.
    Command,
    /// `#`: agents.
    Agent,
    /// `!`: saved prompts.
    Prompt,
}

impl TriggerChar {
    pub fn symbol(self) -> char {
        match self {
            TriggerChar::File => '@',
            TriggerChar::Command => '/',
            TriggerChar::Agent => '#',
            TriggerChar::Prompt => '!',
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '@' => Some(TriggerChar::File),
            '/' => Some(TriggerChar::Command),
            '#' => Some(TriggerChar::Agent),
            '!' => Some(TriggerChar::Prompt),
            _ => None,
        }
    }
}

/// An unterminated completion token: the trigger character at virtual offset
/// `start`, with `query` running up to the caret at `end` (half-open range).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerToken {
    pub trigger: TriggerChar,
    pub query: String,
    pub start: usize,
    pub end: usize,
}

/// Scan backward from `cursor` for the nearest open trigger token.
///
/// A trigger only counts when it sits at a valid boundary (start of text,
/// after whitespace, or after a line break) and no whitespace has closed
/// the token between it and the caret. Positions covered by `tag_spans`
/// (existing file tags in the virtual text) terminate the scan: an atomic
/// tag can neither be part of a token nor re-trigger through its own `@`.
///
/// `None` means "no open token"; callers treat that as "close every
/// completion surface".
pub fn find_trigger_token(
    virtual_text: &str,
    cursor: usize,
    tag_spans: &[Range<usize>],
) -> Option<TriggerToken> {
    let mut cursor = cursor.min(virtual_text.len());
    while cursor > 0 && !virtual_text.is_char_boundary(cursor) {
        cursor -= 1;
    }

    for (index, ch) in virtual_text[..cursor].char_indices().rev() {
        if tag_spans.iter().any(|span| span.contains(&index)) {
            return None;
        }
        if ch.is_whitespace() {
            return None;
        }
        if let Some(trigger) = TriggerChar::from_char(ch) {
            let at_boundary = virtual_text[..index]
                .chars()
                .next_back()
                .is_none_or(char::is_whitespace);
            if at_boundary {
                return Some(TriggerToken {
                    trigger,
                    query: virtual_text[index + ch.len_utf8()..cursor].to_string(),
                    start: index,
                    end: cursor,
                });
            }
            // Mid-word trigger characters (paths, "foo@bar") don't count;
            // keep scanning left.
        }
    }
    None
}
