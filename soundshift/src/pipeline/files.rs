//! Loading rule and inventory files with size and encoding checks

use crate::config::compile_time::file_processing::MAX_FILE_SIZE;
use crate::logging::codes;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

/// Errors raised while reading an input file
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceFileError {
    #[error("File not found: {path}")]
    NotFound { path: String },

    #[error("File too large: {path} is {size} bytes (max: {max_size})")]
    TooLarge { path: String, size: u64, max_size: u64 },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl SourceFileError {
    pub fn error_code(&self) -> crate::logging::Code {
        match self {
            SourceFileError::NotFound { .. } => codes::file_processing::FILE_NOT_FOUND,
            SourceFileError::TooLarge { .. } => codes::file_processing::FILE_TOO_LARGE,
            SourceFileError::InvalidEncoding { .. } => codes::file_processing::INVALID_ENCODING,
            SourceFileError::Io { .. } => codes::file_processing::IO_ERROR,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.error_code().as_str())
    }
}

/// Contents of an input file with what was learned while reading it
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub contents: String,
    pub size: u64,
    pub read_duration: Duration,
}

impl SourceFile {
    pub fn line_count(&self) -> usize {
        self.contents.lines().count()
    }
}

/// Read a UTF-8 text file no larger than the configured limit
pub fn read_source_file(path: &Path) -> Result<SourceFile, SourceFileError> {
    let started = Instant::now();
    let display = path.display().to_string();

    crate::log_debug!("Reading input file", "file" => display);

    let result = read_checked(path, &display);
    if let Err(error) = &result {
        crate::log_error!(error.error_code(), &error.to_string(), "file" => display);
    }
    let (contents, size) = result?;

    let file = SourceFile {
        path: display,
        contents,
        size,
        read_duration: started.elapsed(),
    };

    crate::log_success!(
        codes::success::FILE_PROCESSING_SUCCESS,
        "Input file read",
        "file" => file.path,
        "size_bytes" => file.size,
        "lines" => file.line_count(),
        "duration_ms" => format!("{:.2}", file.read_duration.as_secs_f64() * 1000.0)
    );

    Ok(file)
}

fn read_checked(path: &Path, display: &str) -> Result<(String, u64), SourceFileError> {
    let metadata = fs::metadata(path).map_err(|err| io_error(err, display))?;
    if !metadata.is_file() {
        return Err(SourceFileError::NotFound {
            path: display.to_string(),
        });
    }

    let size = metadata.len();
    if size > MAX_FILE_SIZE {
        return Err(SourceFileError::TooLarge {
            path: display.to_string(),
            size,
            max_size: MAX_FILE_SIZE,
        });
    }

    let bytes = fs::read(path).map_err(|err| io_error(err, display))?;
    let contents = String::from_utf8(bytes).map_err(|_| SourceFileError::InvalidEncoding {
        path: display.to_string(),
    })?;

    Ok((contents, size))
}

fn io_error(err: io::Error, path: &str) -> SourceFileError {
    match err.kind() {
        io::ErrorKind::NotFound => SourceFileError::NotFound {
            path: path.to_string(),
        },
        _ => SourceFileError::Io {
            path: path.to_string(),
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_utf8_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "h > ∅").unwrap();

        let source = read_source_file(file.path()).unwrap();
        assert_eq!(source.contents, "h > ∅\n");
        assert_eq!(source.line_count(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.txt");
        assert_matches!(
            read_source_file(&missing),
            Err(SourceFileError::NotFound { .. })
        );
        assert_matches!(
            read_source_file(dir.path()),
            Err(SourceFileError::NotFound { .. })
        );
    }

    #[test]
    fn test_invalid_encoding() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x61, 0xff, 0xfe]).unwrap();
        let err = read_source_file(file.path()).unwrap_err();
        assert_matches!(err, SourceFileError::InvalidEncoding { .. });
        assert_eq!(err.error_code().as_str(), "E010");
    }
}
