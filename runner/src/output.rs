//! The trace file: header bootstrap and append handle.

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::Path;

use processor::format_header;

/// Writes the `m=`/`p=` header when the file is missing or blank.
///
/// Returns `true` when the header was written. A file that already has
/// content is left untouched, apart from a missing final newline.
pub fn ensure_header(path: &Path, quantum: usize, probability: f64) -> io::Result<bool> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err),
    };

    if content.trim().is_empty() {
        fs::write(path, format_header(quantum, probability))?;
        return Ok(true);
    }

    if !content.ends_with('\n') {
        let mut file = open_trace(path)?;
        io::Write::write_all(&mut file, b"\n")?;
    }
    Ok(false)
}

/// Opens the trace file for appending records.
pub fn open_trace(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}
