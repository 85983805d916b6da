//! Language resources shared by every sentence pair of a run.
//!
//! A [`Resources`] value is built once, wrapped in an `Arc` and handed to the
//! pipeline; nothing in it is mutated after loading.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::annotate::{Annotator, LexiconAnnotator};
use crate::file::{FileContent, FileError, read_file};
use crate::stem::LancasterStemmer;

/// Coarse class reported for tags missing from the tag map
pub const UNKNOWN_POS: &str = "X";

/// Tags the bundled map lacks but the annotator may produce
const EXTRA_TAGS: &[(&str, &str)] = &[
    ("\"\"", "PUNCT"),
    ("SP", "SPACE"),
    ("ADD", "X"),
    ("GW", "X"),
    ("NFP", "X"),
    ("XX", "X"),
];

/// Errors raised while loading language resources
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("resource file not found: {path}")]
    Missing { path: String },
    #[error("cannot read resource file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: FileError,
    },
    #[error("{path}:{line}: {message}")]
    Malformed { path: String, line: usize, message: String },
}

impl From<FileError> for ResourceError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound(path) => ResourceError::Missing { path },
            other => ResourceError::Unreadable {
                path: other.path().to_string(),
                source: other,
            },
        }
    }
}

/// Locations of the on-disk resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    /// Word list, one word per line
    pub dictionary: PathBuf,
    /// Tab-separated PTB tag to coarse class map
    pub tag_map: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources");
        Self {
            dictionary: root.join("en_GB-words.txt"),
            tag_map: root.join("en-ptb_map"),
        }
    }
}

impl ResourcePaths {
    /// Default paths with optional per-file overrides
    pub fn with_overrides(dictionary: Option<PathBuf>, tag_map: Option<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            dictionary: dictionary.unwrap_or(defaults.dictionary),
            tag_map: tag_map.unwrap_or(defaults.tag_map),
        }
    }
}

/// Load a word list into a set
pub fn load_dictionary<P: AsRef<Path>>(path: P) -> Result<HashSet<String>, ResourceError> {
    let file = read_file(path)?;
    let words: HashSet<String> = file.meaningful_lines().map(|(_, w)| w.to_string()).collect();
    if words.is_empty() {
        return Err(ResourceError::Malformed {
            path: file.path,
            line: 0,
            message: "dictionary contains no words".to_string(),
        });
    }
    log_loaded("dictionary", &file, words.len());
    Ok(words)
}

/// Load the PTB to coarse class map
///
/// `ADP` is renamed `PREP` and `PROPN` folded into `NOUN`.
pub fn load_tag_map<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, ResourceError> {
    let file = read_file(path)?;
    let mut map = HashMap::new();

    for (line, row) in file.meaningful_lines() {
        let Some((tag, class)) = row.split_once('\t') else {
            return Err(ResourceError::Malformed {
                path: file.path.clone(),
                line,
                message: format!("expected `TAG<TAB>CLASS`, found {:?}", row),
            });
        };
        let class = match class.trim() {
            "ADP" => "PREP",
            "PROPN" => "NOUN",
            other => other,
        };
        map.insert(tag.trim().to_string(), class.to_string());
    }

    for &(tag, class) in EXTRA_TAGS {
        map.insert(tag.to_string(), class.to_string());
    }

    log_loaded("tag map", &file, map.len());
    Ok(map)
}

fn log_loaded(kind: &str, file: &FileContent, entries: usize) {
    debug!(
        resource = kind,
        path = %file.path,
        bytes = file.len,
        entries,
        checksum = %file.checksum,
        "Loaded resource"
    );
}

/// Everything the annotator, aligner and classifier read during a run
pub struct Resources {
    pub annotator: Box<dyn Annotator>,
    pub stemmer: LancasterStemmer,
    pub dictionary: HashSet<String>,
    pub tag_map: HashMap<String, String>,
}

impl fmt::Debug for Resources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resources")
            .field("dictionary", &self.dictionary.len())
            .field("tag_map", &self.tag_map.len())
            .finish_non_exhaustive()
    }
}

impl Resources {
    /// Load the dictionary and tag map and set up the default annotator
    pub fn load(paths: &ResourcePaths) -> Result<Self, ResourceError> {
        let dictionary = load_dictionary(&paths.dictionary)?;
        let tag_map = load_tag_map(&paths.tag_map)?;
        Ok(Self {
            annotator: Box::new(LexiconAnnotator::new()),
            stemmer: LancasterStemmer::new(),
            dictionary,
            tag_map,
        })
    }

    /// Replace the annotator, keeping the loaded data
    pub fn with_annotator(self, annotator: impl Annotator + 'static) -> Self {
        Self {
            annotator: Box::new(annotator),
            ..self
        }
    }

    /// Coarse class of a PTB tag; unknown tags are `X`
    pub fn coarse_pos(&self, tag: &str) -> &str {
        self.tag_map.get(tag).map(String::as_str).unwrap_or(UNKNOWN_POS)
    }

    /// Whether `word` (or its lower-cased form) is a known word
    pub fn is_known_word(&self, word: &str) -> bool {
        self.dictionary.contains(word) || self.dictionary.contains(&word.to_lowercase())
    }
}
