//! Concat-list file writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::DomainError;

/// Render one `file '<path>'` line of the concat demuxer grammar.
///
/// Single quotes cannot appear inside a quoted string, so each one closes the
/// string, is escaped, and reopens it.
pub fn concat_entry(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{}'\n", escaped)
}

/// Full list contents, one newline-terminated entry per path, in the given order
pub fn concat_list_contents(paths: &[PathBuf]) -> String {
    paths.iter().map(|path| concat_entry(path)).collect()
}

/// Write the list atomically: temp file in the same directory, then rename
pub fn write_concat_list(list_path: &Path, paths: &[PathBuf]) -> Result<(), DomainError> {
    let temp_path = list_path.with_extension("txt.tmp");

    {
        let file = File::create(&temp_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(concat_list_contents(paths).as_bytes())?;
        writer.flush()?;
    }
    std::fs::rename(&temp_path, list_path)?;

    debug!(
        list = %list_path.display(),
        entries = paths.len(),
        "Concat list written"
    );
    Ok(())
}
