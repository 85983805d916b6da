//! M2 serialization.
//!
//! Each sentence becomes one block:
//!
//! ```text
//! S He go to school .
//! A 1 2|||R:VERB:SVA|||goes|||REQUIRED|||-NONE-|||0
//!
//! ```

use std::io::{self, Write};

use crate::edit::{Edit, NONE_FIELD};

/// Constant fourth field of every edit line
pub const REQUIRED_FIELD: &str = "REQUIRED";

/// One original sentence with the edits of every coder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Original sentence exactly as read
    pub sentence: String,
    /// Edits per coder, indexed by coder
    pub coders: Vec<Vec<Edit>>,
}

impl AnnotationRecord {
    pub fn new(sentence: impl Into<String>) -> Self {
        Self {
            sentence: sentence.into(),
            coders: Vec::new(),
        }
    }

    /// Number of real (non-noop) edits across all coders
    pub fn edit_count(&self) -> usize {
        self.edits().filter(|e| !e.is_noop()).count()
    }

    pub fn noop_count(&self) -> usize {
        self.edits().filter(|e| e.is_noop()).count()
    }

    fn edits(&self) -> impl Iterator<Item = &Edit> {
        self.coders.iter().flatten()
    }
}

/// Render one edit line
pub fn format_edit(edit: &Edit, coder: usize) -> String {
    format!(
        "A {} {}|||{}|||{}|||{}|||{}|||{}",
        edit.start,
        edit.end,
        edit.category_str(),
        edit.replacement,
        REQUIRED_FIELD,
        NONE_FIELD,
        coder
    )
}

/// Destination for M2 lines
pub trait LineSink {
    /// Append one line; `line` never contains the terminator
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

/// Collects lines in memory, one element per line
impl LineSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_string());
        Ok(())
    }
}

/// Streams lines to a writer and hashes everything written
pub struct M2Writer<W: Write> {
    inner: W,
    hasher: blake3::Hasher,
}

impl<W: Write> M2Writer<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: blake3::Hasher::new(),
        }
    }

    /// Flush and return the BLAKE3 checksum of the output (hex-encoded)
    pub fn finish(mut self) -> io::Result<String> {
        self.inner.flush()?;
        Ok(self.hasher.finalize().to_hex().to_string())
    }
}

impl<W: Write> LineSink for M2Writer<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        for chunk in [line.as_bytes(), b"\n".as_slice()] {
            self.inner.write_all(chunk)?;
            self.hasher.update(chunk);
        }
        Ok(())
    }
}

/// Write the sentence line, every coder's edits in order, then a blank line
pub fn write_record<S: LineSink + ?Sized>(sink: &mut S, record: &AnnotationRecord) -> io::Result<()> {
    sink.write_line(&format!("S {}", record.sentence))?;
    for (coder, edits) in record.coders.iter().enumerate() {
        for edit in edits {
            sink.write_line(&format_edit(edit, coder))?;
        }
    }
    sink.write_line("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AnnotationRecord {
        AnnotationRecord {
            sentence: "He go to  school .".to_string(),
            coders: vec![
                vec![Edit::new(1, 2, 1, 2, "goes").with_category("R:VERB:SVA")],
                vec![Edit::noop()],
            ],
        }
    }

    #[test]
    fn test_format_noop() {
        assert_eq!(
            format_edit(&Edit::noop(), 3),
            "A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||3"
        );
    }

    #[test]
    fn test_format_deletion_has_empty_replacement() {
        let edit = Edit::new(2, 3, 2, 2, "").with_category("U:DET");
        let line = format_edit(&edit, 0);
        assert_eq!(line, "A 2 3|||U:DET||||||REQUIRED|||-NONE-|||0");
        assert_eq!(line.split("|||").count(), 6);
    }

    #[test]
    fn test_write_record_to_lines() {
        let mut lines: Vec<String> = Vec::new();
        write_record(&mut lines, &record()).unwrap();
        assert_eq!(
            lines,
            vec![
                "S He go to  school .",
                "A 1 2|||R:VERB:SVA|||goes|||REQUIRED|||-NONE-|||0",
                "A -1 -1|||noop|||-NONE-|||REQUIRED|||-NONE-|||1",
                "",
            ]
        );
        assert_eq!(record().edit_count(), 1);
        assert_eq!(record().noop_count(), 1);
    }

    #[test]
    fn test_writer_checksum_matches_output() {
        let mut writer = M2Writer::new(Vec::new());
        write_record(&mut writer, &record()).unwrap();
        let expected = blake3::hash(&writer.inner).to_hex().to_string();
        let text = String::from_utf8(writer.inner.clone()).unwrap();
        assert!(text.starts_with("S He go to  school .\n"));
        assert!(text.ends_with("|||1\n\n"));
        assert_eq!(writer.finish().unwrap(), expected);
    }
}
