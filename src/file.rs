use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Lines};
use std::path::Path;
use thiserror::Error;

/// Content of a file read into memory
#[derive(Debug, Clone)]
pub struct FileContent {
    /// Path to the file as given
    pub path: String,
    /// File content as valid UTF-8 string
    pub content: String,
    /// Byte length of the content
    pub len: usize,
    /// BLAKE3 hash of the content (hex-encoded)
    pub checksum: String,
}

impl FileContent {
    /// Non-blank lines with surrounding whitespace removed, numbered from 1
    pub fn meaningful_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.content
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty())
    }
}

/// Error types for file operations
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Invalid UTF-8 in file: {0}")]
    InvalidUtf8(String),
}

impl FileError {
    pub fn path(&self) -> &str {
        match self {
            FileError::NotFound(p) | FileError::InvalidUtf8(p) => p,
            FileError::Io { path, .. } => path,
        }
    }

    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            FileError::NotFound(path.display().to_string())
        } else {
            FileError::Io {
                path: path.display().to_string(),
                source,
            }
        }
    }
}

/// Read a file from disk with UTF-8 validation
///
/// # Arguments
/// * `path` - Path to the file to read
///
/// # Returns
/// * `Ok(FileContent)` - File content with metadata
/// * `Err(FileError)` - File not found, I/O error, or invalid UTF-8
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<FileContent, FileError> {
    let path_ref = path.as_ref();

    if !path_ref.exists() {
        return Err(FileError::NotFound(path_ref.display().to_string()));
    }

    let bytes = fs::read(path_ref).map_err(|e| FileError::io(path_ref, e))?;

    let content = String::from_utf8(bytes)
        .map_err(|_| FileError::InvalidUtf8(path_ref.display().to_string()))?;

    let len = content.len();
    let checksum = blake3::hash(content.as_bytes()).to_hex().to_string();

    Ok(FileContent {
        path: path_ref.display().to_string(),
        content,
        len,
        checksum,
    })
}

/// Open a text file for line-by-line streaming
///
/// Lines are yielded without their `\n` / `\r\n` terminator.
pub fn open_lines<P: AsRef<Path>>(path: P) -> Result<Lines<BufReader<File>>, FileError> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).map_err(|e| FileError::io(path_ref, e))?;
    Ok(BufReader::new(file).lines())
}

/// Create (or truncate) a file for buffered writing
pub fn create_output<P: AsRef<Path>>(path: P) -> Result<BufWriter<File>, FileError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|e| FileError::io(path_ref, e))?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_valid_utf8() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("words.txt");
        let content = "school\n\n  spelling \nthe\n";
        fs::write(&file_path, content).unwrap();

        let file_content = read_file(&file_path).unwrap();

        assert_eq!(file_content.content, content);
        assert_eq!(file_content.len, content.len());
        assert_eq!(file_content.path, file_path.display().to_string());
        assert_eq!(file_content.checksum.len(), 64);
        assert!(file_content.checksum.chars().all(|c| c.is_ascii_hexdigit()));

        let lines: Vec<_> = file_content.meaningful_lines().collect();
        assert_eq!(lines, vec![(1, "school"), (3, "spelling"), (4, "the")]);
    }

    #[test]
    fn test_read_file_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("broken.txt");
        fs::write(&file_path, [0xFF, 0xFE, 0xFD]).unwrap();

        match read_file(&file_path) {
            Err(FileError::InvalidUtf8(p)) => assert_eq!(p, file_path.display().to_string()),
            other => panic!("Expected FileError::InvalidUtf8, got {:?}", other),
        }
    }

    #[test]
    fn test_read_file_not_found() {
        let file_path = PathBuf::from("/nonexistent/path/that/does/not/exist.txt");

        match read_file(&file_path) {
            Err(FileError::NotFound(p)) => assert!(p.contains("nonexistent")),
            other => panic!("Expected FileError::NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_open_lines_strips_terminators() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("orig.txt");
        fs::write(&file_path, "He go to school .\r\nI like cats .\n").unwrap();

        let lines: Vec<String> = open_lines(&file_path)
            .unwrap()
            .map(|l| l.unwrap())
            .collect();
        // BufRead::lines drops "\n" and a preceding "\r"
        assert_eq!(lines, vec!["He go to school .", "I like cats ."]);

        let missing = dir.path().join("missing.txt");
        assert!(matches!(open_lines(&missing), Err(FileError::NotFound(_))));
    }

    #[test]
    fn test_create_output() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("out.m2");
        {
            let mut out = create_output(&file_path).unwrap();
            out.write_all(b"S a\n\n").unwrap();
        }
        assert_eq!(fs::read_to_string(&file_path).unwrap(), "S a\n\n");

        let bad = dir.path().join("no/such/dir/out.m2");
        let err = create_output(&bad).unwrap_err();
        assert!(err.path().contains("out.m2"));
    }
}
