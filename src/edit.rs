use thiserror::Error;

/// Category of the edit that stands for "no correction needed"
pub const NOOP_CATEGORY: &str = "noop";

/// Replacement field used by noop edits
pub const NONE_FIELD: &str = "-NONE-";

/// Category reported while an edit has not been classified yet
pub const UNSET_CATEGORY: &str = "NA";

/// A token-span edit from the original sentence toward a reference
///
/// Edits come out of the aligner with `category: None` and are completed
/// by [`Edit::with_category`] once classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Start token index in the original sentence (inclusive, -1 for noop)
    pub start: i64,
    /// End token index in the original sentence (exclusive, -1 for noop)
    pub end: i64,
    /// Start token index in the reference sentence
    pub cor_start: i64,
    /// End token index in the reference sentence (exclusive)
    pub cor_end: i64,
    /// Reference tokens for this span joined by a single space
    pub replacement: String,
    /// Error category, set by the classifier
    pub category: Option<String>,
}

impl Edit {
    /// Create an unclassified edit
    pub fn new(start: usize, end: usize, cor_start: usize, cor_end: usize, replacement: impl Into<String>) -> Self {
        Self {
            start: start as i64,
            end: end as i64,
            cor_start: cor_start as i64,
            cor_end: cor_end as i64,
            replacement: replacement.into(),
            category: None,
        }
    }

    /// The "no edit for this coder" marker
    pub fn noop() -> Self {
        Self {
            start: -1,
            end: -1,
            cor_start: -1,
            cor_end: -1,
            replacement: NONE_FIELD.to_string(),
            category: Some(NOOP_CATEGORY.to_string()),
        }
    }

    /// Return a copy of this edit carrying `category`
    pub fn with_category(self, category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..self
        }
    }

    pub fn category_str(&self) -> &str {
        self.category.as_deref().unwrap_or(UNSET_CATEGORY)
    }

    pub fn is_noop(&self) -> bool {
        self.start == -1 && self.end == -1 && self.category.as_deref() == Some(NOOP_CATEGORY)
    }

    /// Whether original token `index` lies inside this edit's span
    pub fn covers(&self, index: usize) -> bool {
        let index = index as i64;
        self.start <= index && index < self.end
    }

    /// Original span as `usize` bounds; noop edits yield an empty range at 0
    pub fn orig_range(&self) -> (usize, usize) {
        (self.start.max(0) as usize, self.end.max(0) as usize)
    }

    /// Reference span as `usize` bounds
    pub fn cor_range(&self) -> (usize, usize) {
        (self.cor_start.max(0) as usize, self.cor_end.max(0) as usize)
    }
}

/// Error types for edit validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// Span is reversed
    #[error("Invalid span: end ({end}) < start ({start})")]
    InvalidSpan { start: i64, end: i64 },
    /// Span points past the end of the sentence
    #[error("Token span {start}..{end} out of bounds (sentence length: {len})")]
    OutOfBounds { start: i64, end: i64, len: usize },
    /// Edits are not in left-to-right order
    #[error("Edit starting at {start} follows an edit starting at {previous}")]
    OutOfOrder { start: i64, previous: i64 },
}

/// Validate an edit's token span against the original and reference lengths
///
/// # Arguments
/// * `edit` - The edit to validate
/// * `orig_len` - Number of tokens in the original sentence
/// * `cor_len` - Number of tokens in the reference sentence
pub fn validate_span(edit: &Edit, orig_len: usize, cor_len: usize) -> Result<(), EditError> {
    if edit.is_noop() {
        return Ok(());
    }

    if edit.end < edit.start || edit.start < 0 {
        return Err(EditError::InvalidSpan {
            start: edit.start,
            end: edit.end,
        });
    }
    if edit.end as usize > orig_len {
        return Err(EditError::OutOfBounds {
            start: edit.start,
            end: edit.end,
            len: orig_len,
        });
    }

    if edit.cor_end < edit.cor_start || edit.cor_start < 0 {
        return Err(EditError::InvalidSpan {
            start: edit.cor_start,
            end: edit.cor_end,
        });
    }
    if edit.cor_end as usize > cor_len {
        return Err(EditError::OutOfBounds {
            start: edit.cor_start,
            end: edit.cor_end,
            len: cor_len,
        });
    }

    Ok(())
}

/// Check that edits appear in non-decreasing order of their start index
pub fn validate_order(edits: &[Edit]) -> Result<(), EditError> {
    for pair in edits.windows(2) {
        if pair[1].start < pair[0].start {
            return Err(EditError::OutOfOrder {
                start: pair[1].start,
                previous: pair[0].start,
            });
        }
    }
    Ok(())
}

/// Sort edits left to right by original span, then by reference span
///
/// The sort is stable, so edits with identical spans keep their relative order.
pub fn sort_by_position(edits: &mut [Edit]) {
    edits.sort_by(|a, b| (a.start, a.end, a.cor_start).cmp(&(b.start, b.end, b.cor_start)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_edit() {
        let edit = Edit::noop();
        assert!(edit.is_noop());
        assert_eq!(edit.category_str(), "noop");
        assert_eq!(edit.replacement, "-NONE-");
        assert_eq!((edit.start, edit.end), (-1, -1));
    }

    #[test]
    fn test_with_category_fills_unset_category() {
        let edit = Edit::new(1, 2, 1, 2, "goes");
        assert_eq!(edit.category, None);
        assert_eq!(edit.category_str(), "NA");

        let classified = edit.clone().with_category("R:VERB:SVA");
        assert_eq!(classified.category_str(), "R:VERB:SVA");
        assert_eq!(classified.replacement, edit.replacement);
        assert_eq!((classified.start, classified.end), (1, 2));
    }

    #[test]
    fn test_covers() {
        let sub = Edit::new(1, 3, 1, 2, "x");
        assert!(!sub.covers(0));
        assert!(sub.covers(1));
        assert!(sub.covers(2));
        assert!(!sub.covers(3));

        let ins = Edit::new(2, 2, 2, 3, "the");
        assert!(!ins.covers(2));
        assert_eq!(ins.orig_range(), (2, 2));
    }

    #[test]
    fn test_validate_span() {
        assert!(validate_span(&Edit::new(0, 1, 0, 1, "a"), 3, 3).is_ok());
        assert!(validate_span(&Edit::noop(), 0, 0).is_ok());

        let reversed = Edit {
            start: 2,
            end: 1,
            ..Edit::new(0, 0, 0, 0, "")
        };
        assert_eq!(
            validate_span(&reversed, 3, 3),
            Err(EditError::InvalidSpan { start: 2, end: 1 })
        );

        match validate_span(&Edit::new(2, 5, 0, 1, "a"), 3, 3) {
            Err(EditError::OutOfBounds { len, .. }) => assert_eq!(len, 3),
            other => panic!("Expected EditError::OutOfBounds, got {:?}", other),
        }
    }

    #[test]
    fn test_sort_by_position() {
        let mut edits = vec![
            Edit::new(4, 5, 4, 5, "c"),
            Edit::new(0, 1, 0, 1, "a"),
            Edit::new(2, 2, 2, 3, "b"),
        ];
        assert!(validate_order(&edits).is_err());

        sort_by_position(&mut edits);

        assert_eq!(edits[0].start, 0);
        assert_eq!(edits[1].start, 2);
        assert_eq!(edits[2].start, 4);
        assert!(validate_order(&edits).is_ok());
    }
}
