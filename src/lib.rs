// Tokens and annotated sentences
pub mod token;

// Token-span edits
pub mod edit;

// Part-of-speech annotation
pub mod annotate;

// Lancaster stemmer
pub mod stem;

// Token alignment and edit merging
pub mod align;

// Error categories
pub mod classify;

// File operations module
pub mod file;

// Dictionary, tag map and shared resource context
pub mod resources;

// Sentence-pair processing
pub mod pipeline;

// M2 output
pub mod m2;

// In-memory batch entry point
pub mod batch;

// File-pipeline entry point
pub mod cli;

// JSON run report
pub mod json;

pub mod error;

// Re-exports
pub use token::{AnnotatedSentence, Token, tokenize};
pub use edit::{Edit, EditError, validate_order, validate_span, sort_by_position};
pub use annotate::{AnnotateError, Annotator, LexiconAnnotator};
pub use stem::LancasterStemmer;
pub use align::{AlignConfig, AlignError, Aligner, DamerauAligner, MergeStrategy, char_ratio};
pub use classify::{ClassifyError, Classifier, RuleClassifier};
pub use file::{FileContent, FileError, read_file};
pub use resources::{ResourceError, ResourcePaths, Resources, load_dictionary, load_tag_map};
pub use pipeline::SentencePairProcessor;
pub use m2::{AnnotationRecord, LineSink, M2Writer, format_edit, write_record};
pub use batch::{BatchOptions, References, parallel_to_m2, parallel_to_m2_with};
pub use cli::{RunConfig, run_files};
pub use json::{RunReport, generate_execution_id};
pub use error::M2Error;
