use std::path::Path;

use crate::error::{Error, Result};

pub fn load_filters(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::FileAccess {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the script, replacing any existing file.
pub fn save_script(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|source| Error::OutputWrite {
        path: path.to_path_buf(),
        source,
    })
}
