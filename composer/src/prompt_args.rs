//! Expansion of `/prompts:<name>` commands against saved prompt templates.
//!
//! A template is interpreted in exactly one of two modes. If its content
//! contains any `$NAME` placeholder it is a named-argument template and the
//! command must supply every name as `key="value"` pairs. Otherwise `$1..$9`
//! and `$ARGUMENTS` substitute positionally. `$$` escapes a literal dollar.

use std::collections::HashMap;
use std::collections::HashSet;
use std::ops::Range;

use codemoss_protocol::custom_prompts::CustomPrompt;
use codemoss_protocol::custom_prompts::PROMPTS_CMD_PREFIX;
use lazy_static::lazy_static;
use regex_lite::Regex;
use shlex::Shlex;
use thiserror::Error;

lazy_static! {
    static ref PROMPT_ARG_REGEX: Regex =
        Regex::new(r"\$[A-Z][A-Z0-9_]*").unwrap_or_else(|_| std::process::abort());
}

/// Why a prompt command could not be expanded. The rendered message is the
/// user-facing text; callers surface it next to the composer rather than
/// crashing out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptExpansionError {
    #[error(
        "Could not parse {command}: expected key=value but found '{token}'. Wrap values in double quotes if they contain spaces."
    )]
    MissingAssignment { command: String, token: String },
    #[error("Could not parse {command}: expected a name before '=' in '{token}'.")]
    MissingKey { command: String, token: String },
    #[error(
        "Missing required args for {command}: {list}. Provide as key=value (quote values with spaces).",
        list = .missing.join(", ")
    )]
    MissingArgs { command: String, missing: Vec<String> },
}

/// Parse a first-line slash command of the form `/name <rest>`.
/// Returns `(name, rest_after_name, rest_offset)` if the line begins with `/`
/// and contains a non-empty name; otherwise returns `None`.
///
/// `rest_offset` is the byte index into the original line where
/// `rest_after_name` starts after trimming leading whitespace.
pub fn parse_slash_name(line: &str) -> Option<(&str, &str, usize)> {
    let stripped = line.strip_prefix('/')?;
    let mut name_end = stripped.len();
    for (index, ch) in stripped.char_indices() {
        if ch.is_whitespace() {
            name_end = index;
            break;
        }
    }
    let name = &stripped[..name_end];
    if name.is_empty() {
        return None;
    }
    let rest_untrimmed = &stripped[name_end..];
    let rest = rest_untrimmed.trim_start();
    let rest_offset = name_end + (rest_untrimmed.len() - rest.len()) + 1;
    Some((name, rest, rest_offset))
}

/// Placeholder variable names in a template, without the leading `$`,
/// de-duplicated in order of first appearance. `$$`-escaped placeholders and
/// the positional aggregate `$ARGUMENTS` are excluded.
pub fn prompt_argument_names(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for found in PROMPT_ARG_REGEX.find_iter(content) {
        if found.start() > 0 && content.as_bytes()[found.start() - 1] == b'$' {
            continue;
        }
        let name = &content[found.start() + 1..found.end()];
        if name == "ARGUMENTS" {
            continue;
        }
        if seen.insert(name.to_string()) {
            names.push(name.to_string());
        }
    }
    names
}

/// Whether `content` uses positional placeholders (`$1..$9` or `$ARGUMENTS`).
pub fn prompt_has_numeric_placeholders(content: &str) -> bool {
    if content.contains("$ARGUMENTS") {
        return true;
    }
    let bytes = content.as_bytes();
    bytes
        .windows(2)
        .any(|pair| pair[0] == b'$' && (b'1'..=b'9').contains(&pair[1]))
}

/// Parse the `key=value` pairs that follow a named-argument prompt command.
/// Tokenization follows shlex rules, so `USER="Alice Smith"` is one pair.
pub fn parse_prompt_inputs(
    command: &str,
    rest: &str,
) -> Result<HashMap<String, String>, PromptExpansionError> {
    let mut map = HashMap::new();
    if rest.trim().is_empty() {
        return Ok(map);
    }
    for token in Shlex::new(rest) {
        let Some((key, value)) = token.split_once('=') else {
            return Err(PromptExpansionError::MissingAssignment {
                command: command.to_string(),
                token,
            });
        };
        if key.is_empty() {
            return Err(PromptExpansionError::MissingKey {
                command: command.to_string(),
                token,
            });
        }
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

/// Expand a `/prompts:<name> ...` command against the saved prompts.
///
/// `Ok(None)` means the text is not a prompt command (or names no known
/// prompt), meaning nothing to do. Errors carry the user-facing message.
pub fn expand_custom_prompt_text(
    text: &str,
    custom_prompts: &[CustomPrompt],
) -> Result<Option<String>, PromptExpansionError> {
    let Some((name, rest, _)) = parse_slash_name(text) else {
        return Ok(None);
    };
    let Some(prompt_name) = name.strip_prefix(&format!("{PROMPTS_CMD_PREFIX}:")) else {
        return Ok(None);
    };
    let Some(prompt) = custom_prompts.iter().find(|p| p.name == prompt_name) else {
        return Ok(None);
    };

    // Named placeholders switch the whole template to key=value mode.
    let required = prompt_argument_names(&prompt.content);
    if !required.is_empty() {
        let command = format!("/{name}");
        let inputs = parse_prompt_inputs(&command, rest)?;
        let missing: Vec<String> = required
            .into_iter()
            .filter(|key| !inputs.contains_key(key))
            .collect();
        if !missing.is_empty() {
            return Err(PromptExpansionError::MissingArgs { command, missing });
        }
        return Ok(Some(expand_named_placeholders(&prompt.content, &inputs)));
    }

    let args: Vec<String> = Shlex::new(rest).collect();
    Ok(Some(expand_numeric_placeholders(&prompt.content, &args)))
}

fn expand_named_placeholders(content: &str, args: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    for found in PROMPT_ARG_REGEX.find_iter(content) {
        let (start, end) = (found.start(), found.end());
        if start > 0 && content.as_bytes()[start - 1] == b'$' {
            // `$$NAME` is an escape: emit the placeholder literally, minus
            // the escaping dollar.
            out.push_str(&content[cursor..start - 1]);
            out.push_str(&content[start..end]);
            cursor = end;
            continue;
        }
        out.push_str(&content[cursor..start]);
        cursor = end;
        let key = &content[start + 1..end];
        match args.get(key) {
            Some(value) => out.push_str(value),
            None => out.push_str(&content[start..end]),
        }
    }
    out.push_str(&content[cursor..]);
    out
}

/// Expand `$1..$9` and `$ARGUMENTS` in `content`. Missing positional args
/// leave their slot empty; `$$` emits a literal `$`.
pub fn expand_numeric_placeholders(content: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut index = 0;
    while let Some(offset) = content[index..].find('$') {
        let at = index + offset;
        out.push_str(&content[index..at]);
        let rest = &content[at..];
        let bytes = rest.as_bytes();
        if bytes.len() >= 2 {
            match bytes[1] {
                b'$' => {
                    out.push('$');
                    index = at + 2;
                    continue;
                }
                b'1'..=b'9' => {
                    let position = (bytes[1] - b'1') as usize;
                    if let Some(arg) = args.get(position) {
                        out.push_str(arg);
                    }
                    index = at + 2;
                    continue;
                }
                _ => {}
            }
        }
        if rest.len() > "ARGUMENTS".len() && rest[1..].starts_with("ARGUMENTS") {
            out.push_str(&args.join(" "));
            index = at + 1 + "ARGUMENTS".len();
            continue;
        }
        out.push('$');
        index = at + 1;
    }
    out.push_str(&content[index..]);
    out
}

/// Constructs a command text for a custom prompt with arguments.
/// Returns the text and the cursor position (inside the first double quote).
pub fn prompt_command_with_arg_placeholders(name: &str, args: &[String]) -> (String, usize) {
    let mut text = format!("/{PROMPTS_CMD_PREFIX}:{name}");
    let mut cursor = text.len();
    for (index, arg) in args.iter().enumerate() {
        text.push_str(&format!(" {arg}=\"\""));
        if index == 0 {
            cursor = text.len() - 1; // inside the first ""
        }
    }
    (text, cursor)
}

/// Quoted `="..."` value spans on the first line of `text`, used by the
/// click/tab-to-next-argument UX. Escaped quotes do not close a span; an
/// unclosed span runs to the end of the line.
fn quoted_arg_value_ranges(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut ranges = Vec::new();
    let mut index = 0;
    while index + 1 < bytes.len() {
        if bytes[index] == b'=' && bytes[index + 1] == b'"' {
            let start = index + 2;
            let mut end = start;
            while end < bytes.len() {
                if bytes[end] == b'"' && !is_escaped(bytes, end) {
                    break;
                }
                end += 1;
            }
            ranges.push(start..end);
            index = end + 1;
        } else {
            index += 1;
        }
    }
    ranges
}

fn is_escaped(bytes: &[u8], position: usize) -> bool {
    let mut backslashes = 0;
    while backslashes < position && bytes[position - backslashes - 1] == b'\\' {
        backslashes += 1;
    }
    backslashes % 2 == 1
}

fn first_line(text: &str) -> &str {
    text.split('\n').next().unwrap_or(text)
}

/// The quoted argument-value span containing `cursor`, if any. Only the
/// first line is scanned.
pub fn find_prompt_arg_range_at_cursor(text: &str, cursor: usize) -> Option<Range<usize>> {
    let line = first_line(text);
    if cursor > line.len() {
        return None;
    }
    quoted_arg_value_ranges(line)
        .into_iter()
        .find(|range| range.start <= cursor && cursor <= range.end)
}

/// Cursor position inside the next quoted argument value after `cursor`,
/// wrapping around to the first one. `None` when the first line has no
/// quoted values.
pub fn find_next_prompt_arg_cursor(text: &str, cursor: usize) -> Option<usize> {
    let ranges = quoted_arg_value_ranges(first_line(text));
    ranges
        .iter()
        .find(|range| range.start > cursor)
        .or_else(|| ranges.first())
        .map(|range| range.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prompt(name: &str, content: &str) -> CustomPrompt {
        CustomPrompt {
            name: name.to_string(),
            content: content.to_string(),
            description: None,
            argument_hint: None,
        }
    }

    #[test]
    fn named_expansion_basic() {
        let prompts = vec![prompt("greet", "Hello $NAME, total $AMOUNT")];
        let out =
            expand_custom_prompt_text("/prompts:greet NAME=\"Ann\" AMOUNT=\"5\"", &prompts)
                .expect("expansion");
        assert_eq!(out, Some("Hello Ann, total 5".to_string()));
    }

    #[test]
    fn missing_named_arg_is_an_error_naming_it() {
        let prompts = vec![prompt("greet", "Hello $NAME, total $AMOUNT")];
        let err = expand_custom_prompt_text("/prompts:greet NAME=\"Ann\"", &prompts)
            .expect_err("missing arg");
        let message = err.to_string();
        assert!(message.contains("Missing required args"));
        assert!(message.contains("AMOUNT"));
        assert!(message.contains("/prompts:greet"));
    }

    #[test]
    fn partial_expansion_never_happens() {
        let prompts = vec![prompt("greet", "Hello $NAME and $OTHER")];
        assert!(expand_custom_prompt_text("/prompts:greet NAME=x", &prompts).is_err());
    }

    #[test]
    fn positional_expansion_with_arguments_aggregate() {
        let prompts = vec![prompt("run", "Run $1 on $2 ($ARGUMENTS)")];
        let out = expand_custom_prompt_text("/prompts:run a b", &prompts).expect("expansion");
        assert_eq!(out, Some("Run a on b (a b)".to_string()));
    }

    #[test]
    fn missing_positional_args_leave_empty_slots() {
        let prompts = vec![prompt("run", "Run $1 then $2.")];
        let out = expand_custom_prompt_text("/prompts:run only", &prompts).expect("expansion");
        assert_eq!(out, Some("Run only then .".to_string()));
    }

    #[test]
    fn double_dollar_escapes_a_literal_dollar() {
        assert_eq!(
            expand_numeric_placeholders("cost: $$5 and $1", &["x".to_string()]),
            "cost: $5 and x"
        );
    }

    #[test]
    fn escaped_named_placeholder_stays_literal() {
        let prompts = vec![prompt("doc", "literal $$USER and $REAL")];
        let out =
            expand_custom_prompt_text("/prompts:doc REAL=\"yes\"", &prompts).expect("expansion");
        assert_eq!(out, Some("literal $USER and yes".to_string()));
        assert_eq!(prompt_argument_names("literal $$USER"), Vec::<String>::new());
    }

    #[test]
    fn quoted_values_keep_spaces() {
        let prompts = vec![prompt("pair", "Pair $USER with $BRANCH")];
        let out = expand_custom_prompt_text(
            "/prompts:pair USER=\"Alice Smith\" BRANCH=dev-main",
            &prompts,
        )
        .expect("expansion");
        assert_eq!(out, Some("Pair Alice Smith with dev-main".to_string()));
    }

    #[test]
    fn malformed_token_names_token_and_command() {
        let prompts = vec![prompt("greet", "Hello $NAME")];
        let err = expand_custom_prompt_text("/prompts:greet NAME=x stray", &prompts)
            .expect_err("stray token");
        let message = err.to_string();
        assert!(message.contains("expected key=value"));
        assert!(message.contains("'stray'"));
        assert!(message.contains("/prompts:greet"));

        let err = expand_custom_prompt_text("/prompts:greet =x", &prompts)
            .expect_err("bare value");
        assert!(err.to_string().contains("expected a name before '='"));
    }

    #[test]
    fn non_prompt_commands_are_not_expansions() {
        let prompts = vec![prompt("greet", "Hello $NAME")];
        assert_eq!(expand_custom_prompt_text("/clear", &prompts), Ok(None));
        assert_eq!(
            expand_custom_prompt_text("plain message", &prompts),
            Ok(None)
        );
        assert_eq!(
            expand_custom_prompt_text("/prompts:unknown a", &prompts),
            Ok(None)
        );
    }

    #[test]
    fn parse_slash_name_splits_name_and_rest() {
        assert_eq!(
            parse_slash_name("/prompts:x  a b"),
            Some(("prompts:x", "a b", 12))
        );
        assert_eq!(parse_slash_name("/solo"), Some(("solo", "", 5)));
        assert_eq!(parse_slash_name("no-slash"), None);
        assert_eq!(parse_slash_name("/ "), None);
    }

    #[test]
    fn command_skeleton_places_cursor_in_first_quotes() {
        let (text, cursor) = prompt_command_with_arg_placeholders(
            "review",
            &["USER".to_string(), "BRANCH".to_string()],
        );
        assert_eq!(text, "/prompts:review USER=\"\" BRANCH=\"\"");
        assert_eq!(&text[cursor - 1..cursor + 1], "\"\"");
        assert_eq!(cursor, "/prompts:review USER=\"".len());
    }

    #[test]
    fn arg_range_at_cursor_respects_escaped_quotes() {
        let text = "/prompts:x A=\"a \\\" b\" B=\"c\"";
        let a_start = text.find("a \\").expect("value");
        let range = find_prompt_arg_range_at_cursor(text, a_start + 1).expect("range");
        assert_eq!(&text[range.clone()], "a \\\" b");
        // The escaped quote did not close the span.
        assert!(range.end > a_start + 3);
    }

    #[test]
    fn arg_range_scans_only_the_first_line() {
        let text = "plain first line\nA=\"second\"";
        let second = text.find("second").expect("value");
        assert_eq!(find_prompt_arg_range_at_cursor(text, second), None);
        assert_eq!(find_next_prompt_arg_cursor(text, 0), None);
    }

    #[test]
    fn next_arg_cursor_advances_and_wraps() {
        let text = "/prompts:x A=\"one\" B=\"two\"";
        let first = text.find("one").expect("first");
        let second = text.find("two").expect("second");
        assert_eq!(find_next_prompt_arg_cursor(text, 0), Some(first));
        assert_eq!(find_next_prompt_arg_cursor(text, first), Some(second));
        assert_eq!(find_next_prompt_arg_cursor(text, second), Some(first));
    }
}
