use serde::Deserialize;
use serde::Serialize;

/// Leading token that identifies a saved-prompt invocation in the composer,
/// i.e. commands of the form `/prompts:<name> ...`.
pub const PROMPTS_CMD_PREFIX: &str = "prompts";

/// A saved prompt template the user can invoke from the command surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPrompt {
    pub name: String,
    /// Template body. May contain `$NAME` named placeholders or `$1..$9` /
    /// `$ARGUMENTS` positional placeholders; the presence of any named
    /// placeholder puts the whole template in named-argument mode.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short hint rendered next to the command in the completion list,
    /// e.g. `[file] [instructions]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argument_hint: Option<String>,
}
