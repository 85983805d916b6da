//! In-memory entry point: sentences in, M2 lines out.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, warn};

use crate::align::AlignConfig;
use crate::error::M2Error;
use crate::m2::{AnnotationRecord, write_record};
use crate::pipeline::SentencePairProcessor;
use crate::resources::Resources;

/// Sentence pairs handed to the worker pool at a time
pub const CHUNK_SIZE: usize = 256;

/// References for a batch of original sentences
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum References {
    /// One reference per original sentence
    Single(Vec<String>),
    /// Any number of references per original sentence
    Multi(Vec<Vec<String>>),
}

impl References {
    /// One reference list per original sentence
    pub fn normalize(self) -> Vec<Vec<String>> {
        match self {
            References::Single(refs) => refs.into_iter().map(|r| vec![r]).collect(),
            References::Multi(refs) => refs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            References::Single(refs) => refs.len(),
            References::Multi(refs) => refs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<String>> for References {
    fn from(refs: Vec<String>) -> Self {
        References::Single(refs)
    }
}

impl From<Vec<Vec<String>>> for References {
    fn from(refs: Vec<Vec<String>>) -> Self {
        References::Multi(refs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads; 0 or 1 processes pairs on the calling thread
    pub jobs: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { jobs: 1 }
    }
}

/// Annotate every pair and return the M2 lines, blank separators included
pub fn parallel_to_m2(
    resources: Arc<Resources>,
    originals: &[String],
    references: References,
    config: AlignConfig,
) -> Result<Vec<String>, M2Error> {
    parallel_to_m2_with(resources, originals, references, config, BatchOptions::default())
}

pub fn parallel_to_m2_with(
    resources: Arc<Resources>,
    originals: &[String],
    references: References,
    config: AlignConfig,
    options: BatchOptions,
) -> Result<Vec<String>, M2Error> {
    let references = references.normalize();
    let count = originals.len().min(references.len());
    if originals.len() != references.len() {
        warn!(
            originals = originals.len(),
            references = references.len(),
            "Input lengths differ; pairing stops at the shorter input"
        );
    }

    let processor = SentencePairProcessor::new(resources, config);
    let workers = Workers::new(options.jobs)?;

    let mut lines = Vec::new();
    for start in (0..count).step_by(CHUNK_SIZE) {
        let end = (start + CHUNK_SIZE).min(count);
        let records = workers.run(&processor, start, &originals[start..end], &references[start..end])?;
        for record in &records {
            write_record(&mut lines, record)?;
        }
    }
    Ok(lines)
}

/// Runs chunks of sentence pairs sequentially or on a dedicated rayon pool
pub(crate) enum Workers {
    Sequential,
    Pool(ThreadPool),
}

impl Workers {
    pub(crate) fn new(jobs: usize) -> Result<Self, M2Error> {
        if jobs <= 1 {
            return Ok(Workers::Sequential);
        }
        let pool = ThreadPoolBuilder::new().num_threads(jobs).build()?;
        debug!(jobs, "Started worker pool");
        Ok(Workers::Pool(pool))
    }

    pub(crate) fn is_parallel(&self) -> bool {
        matches!(self, Workers::Pool(_))
    }

    /// Records for `originals[i]` / `references[i]`, in input order
    ///
    /// `first_index` is the sentence index of `originals[0]`, used in errors.
    pub(crate) fn run<S: AsRef<str> + Sync>(
        &self,
        processor: &SentencePairProcessor,
        first_index: usize,
        originals: &[String],
        references: &[Vec<S>],
    ) -> Result<Vec<AnnotationRecord>, M2Error> {
        let process = |(offset, (orig, refs)): (usize, (&String, &Vec<S>))| {
            processor.process(first_index + offset, orig, refs.as_slice())
        };
        match self {
            Workers::Sequential => originals.iter().zip(references).enumerate().map(process).collect(),
            Workers::Pool(pool) => pool.install(|| {
                originals
                    .par_iter()
                    .zip(references.par_iter())
                    .enumerate()
                    .map(process)
                    .collect()
            }),
        }
    }
}
