//! The `File` class.
//!
//! Line numbers start at 1. Operations that rewrite a file line by line
//! terminate every line with the platform newline; an out-of-range line
//! number fails before anything is written.

use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::Path;

use crate::error::{RuntimeError, RuntimeResult};

#[cfg(windows)]
pub const NEWLINE: &str = "\r\n";
#[cfg(not(windows))]
pub const NEWLINE: &str = "\n";

pub(crate) fn map_missing(err: std::io::Error, kind: &'static str, path: &Path) -> RuntimeError {
    if err.kind() == IoErrorKind::NotFound {
        RuntimeError::not_found(kind, path.display().to_string())
    } else {
        err.into()
    }
}

pub fn read_contents(path: impl AsRef<Path>) -> RuntimeResult<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| map_missing(e, "File", path))
}

/// Replaces the whole file with `contents`
pub fn write_contents(path: impl AsRef<Path>, contents: &str) -> RuntimeResult<()> {
    let path = path.as_ref();
    fs::write(path, contents)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}

/// Splits on `\n`, `\r\n` and lone `\r`
pub fn split_lines(contents: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = contents.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub fn read_all_lines(path: impl AsRef<Path>) -> RuntimeResult<Vec<String>> {
    Ok(split_lines(&read_contents(path)?))
}

pub fn write_all_lines(path: impl AsRef<Path>, lines: &[String]) -> RuntimeResult<()> {
    let mut contents = String::new();
    for line in lines {
        contents.push_str(line);
        contents.push_str(NEWLINE);
    }
    write_contents(path, &contents)
}

fn line_index(line_number: i64, count: usize, allow_append: bool) -> RuntimeResult<usize> {
    let upper = if allow_append { count + 1 } else { count };
    if line_number < 1 || line_number as u64 > upper as u64 {
        return Err(RuntimeError::invalid_argument(format!(
            "line {line_number} is outside 1..={upper}"
        )));
    }
    Ok((line_number - 1) as usize)
}

pub fn read_line(path: impl AsRef<Path>, line_number: i64) -> RuntimeResult<String> {
    let mut lines = read_all_lines(path)?;
    let index = line_index(line_number, lines.len(), false)?;
    Ok(lines.swap_remove(index))
}

/// Overwrites one existing line
pub fn write_line(path: impl AsRef<Path>, line_number: i64, text: &str) -> RuntimeResult<()> {
    let path = path.as_ref();
    let mut lines = read_all_lines(path)?;
    let index = line_index(line_number, lines.len(), false)?;
    lines[index] = text.to_string();
    write_all_lines(path, &lines)
}

/// Inserts a line before `line_number`; `count + 1` appends
pub fn insert_line(path: impl AsRef<Path>, line_number: i64, text: &str) -> RuntimeResult<()> {
    let path = path.as_ref();
    let mut lines = read_all_lines(path)?;
    let index = line_index(line_number, lines.len(), true)?;
    lines.insert(index, text.to_string());
    write_all_lines(path, &lines)
}

/// Appends `contents` followed by a newline, creating the file if needed
pub fn append_contents(path: impl AsRef<Path>, contents: &str) -> RuntimeResult<()> {
    let path = path.as_ref();
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    file.write_all(NEWLINE.as_bytes())?;
    Ok(())
}

/// Copies `source` over `destination`, replacing any existing file
pub fn copy_file(source: impl AsRef<Path>, destination: impl AsRef<Path>) -> RuntimeResult<()> {
    let source = source.as_ref();
    fs::copy(source, destination.as_ref()).map_err(|e| map_missing(e, "File", source))?;
    Ok(())
}

pub fn delete_file(path: impl AsRef<Path>) -> RuntimeResult<()> {
    let path = path.as_ref();
    fs::remove_file(path).map_err(|e| map_missing(e, "File", path))?;
    tracing::debug!(path = %path.display(), "Deleted file");
    Ok(())
}

/// Returns `false` when the directory already existed
pub fn create_directory(path: impl AsRef<Path>) -> RuntimeResult<bool> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(path)?;
    Ok(true)
}

/// Deletes a directory with everything beneath it
pub fn delete_directory(path: impl AsRef<Path>) -> RuntimeResult<()> {
    let path = path.as_ref();
    fs::remove_dir_all(path).map_err(|e| map_missing(e, "Directory", path))?;
    tracing::debug!(path = %path.display(), "Deleted directory");
    Ok(())
}

fn list(path: &Path, want_dirs: bool) -> RuntimeResult<String> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| map_missing(e, "Directory", path))? {
        let entry = entry?;
        if entry.file_type()?.is_dir() == want_dirs {
            entries.push(entry.path().display().to_string());
        }
    }
    entries.sort();
    Ok(entries.join(NEWLINE))
}

/// Full paths of the files directly inside `path`, one per line
pub fn get_files(path: impl AsRef<Path>) -> RuntimeResult<String> {
    list(path.as_ref(), false)
}

/// Full paths of the subdirectories of `path`, one per line
pub fn get_directories(path: impl AsRef<Path>) -> RuntimeResult<String> {
    list(path.as_ref(), true)
}
