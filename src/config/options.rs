use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_OUTPUT: &str = "roundcube.sieve";

/// Knobs of the conversion itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Mailbox every converted folder path is placed under.
    pub folder_prefix: String,
    /// Hierarchy separator of the target server.
    pub folder_separator: char,
    /// Emit one `if`/`elsif` chain instead of independent `if` blocks.
    pub chain: bool,
    /// List skipped rules as comments at the end of the script.
    pub comment_skipped: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            folder_prefix: "INBOX".to_string(),
            folder_separator: '.',
            chain: true,
            comment_skipped: false,
        }
    }
}

/// Contents of the settings file. The output path is resolved by the
/// caller, which falls back to [`DEFAULT_OUTPUT`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub output: Option<PathBuf>,
    #[serde(flatten)]
    pub convert: ConvertOptions,
}
