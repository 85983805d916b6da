//! Turns one original sentence and its references into an [`AnnotationRecord`].

use std::sync::Arc;

use tracing::trace;

use crate::align::{AlignConfig, Aligner, DamerauAligner};
use crate::classify::{Classifier, RuleClassifier};
use crate::edit::{Edit, validate_order, validate_span};
use crate::error::M2Error;
use crate::m2::AnnotationRecord;
use crate::resources::Resources;
use crate::token::{AnnotatedSentence, tokenize};

/// Annotates sentence pairs against a shared, read-only resource set
pub struct SentencePairProcessor {
    resources: Arc<Resources>,
    config: AlignConfig,
    aligner: Box<dyn Aligner>,
    classifier: Box<dyn Classifier>,
}

impl SentencePairProcessor {
    pub fn new(resources: Arc<Resources>, config: AlignConfig) -> Self {
        Self {
            resources,
            config,
            aligner: Box::new(DamerauAligner),
            classifier: Box::new(RuleClassifier),
        }
    }

    pub fn with_aligner(self, aligner: impl Aligner + 'static) -> Self {
        Self {
            aligner: Box::new(aligner),
            ..self
        }
    }

    pub fn with_classifier(self, classifier: impl Classifier + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
            ..self
        }
    }

    /// Annotate `original` against every reference; coder `k` is `references[k]`
    ///
    /// A reference identical to the original (ignoring surrounding
    /// whitespace) yields a single noop without being aligned.
    pub fn process<S: AsRef<str>>(
        &self,
        index: usize,
        original: &str,
        references: &[S],
    ) -> Result<AnnotationRecord, M2Error> {
        let mut record = AnnotationRecord::new(original);
        let mut annotated_orig: Option<AnnotatedSentence> = None;

        for (coder, reference) in references.iter().enumerate() {
            let reference = reference.as_ref();
            if original.trim() == reference.trim() {
                trace!(index, coder, "Identical pair");
                record.coders.push(vec![Edit::noop()]);
                continue;
            }

            let orig: &AnnotatedSentence = match annotated_orig {
                Some(ref cached) => cached,
                None => annotated_orig.insert(self.annotate(index, original)?),
            };
            let cor = self.annotate(index, reference)?;

            let edits = self.edits(index, orig, &cor)?;
            trace!(index, coder, edits = edits.len(), "Annotated pair");
            record.coders.push(edits);
        }

        Ok(record)
    }

    /// Blank lines become empty sentences without reaching the annotator
    fn annotate(&self, index: usize, text: &str) -> Result<AnnotatedSentence, M2Error> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return Ok(AnnotatedSentence::default());
        }
        self.resources
            .annotator
            .annotate(&tokens)
            .map_err(|e| M2Error::annotation(index, e))
    }

    /// Align, check and classify one pair; never returns an empty list
    fn edits(&self, index: usize, orig: &AnnotatedSentence, cor: &AnnotatedSentence) -> Result<Vec<Edit>, M2Error> {
        let raw = self
            .aligner
            .align(orig, cor, &self.config)
            .map_err(|e| M2Error::annotation(index, e))?;

        for edit in &raw {
            validate_span(edit, orig.len(), cor.len()).map_err(|e| M2Error::annotation(index, e))?;
        }
        validate_order(&raw).map_err(|e| M2Error::annotation(index, e))?;

        // Only spacing differs
        if raw.is_empty() {
            return Ok(vec![Edit::noop()]);
        }

        raw.into_iter()
            .map(|edit| {
                let category = self
                    .classifier
                    .classify(&edit, orig, cor, &self.resources)
                    .map_err(|e| M2Error::annotation(index, e))?;
                Ok(edit.with_category(category))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignError, MergeStrategy};
    use crate::resources::ResourcePaths;
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resources() -> Arc<Resources> {
        static RESOURCES: OnceLock<Arc<Resources>> = OnceLock::new();
        RESOURCES
            .get_or_init(|| Arc::new(Resources::load(&ResourcePaths::default()).unwrap()))
            .clone()
    }

    fn processor() -> SentencePairProcessor {
        SentencePairProcessor::new(resources(), AlignConfig::default())
    }

    /// Counts calls, then delegates to the default aligner
    struct Counting(Arc<AtomicUsize>);

    impl Aligner for Counting {
        fn align(
            &self,
            orig: &AnnotatedSentence,
            cor: &AnnotatedSentence,
            config: &AlignConfig,
        ) -> Result<Vec<Edit>, AlignError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            DamerauAligner.align(orig, cor, config)
        }
    }

    /// Gives every edit the same category
    struct Fixed(&'static str);

    impl Classifier for Fixed {
        fn classify(
            &self,
            _: &Edit,
            _: &AnnotatedSentence,
            _: &AnnotatedSentence,
            _: &Resources,
        ) -> Result<String, crate::classify::ClassifyError> {
            Ok(self.0.to_string())
        }
    }

    /// Returns edits right to left
    struct Backwards;

    impl Aligner for Backwards {
        fn align(&self, _: &AnnotatedSentence, _: &AnnotatedSentence, _: &AlignConfig) -> Result<Vec<Edit>, AlignError> {
            Ok(vec![Edit::new(2, 3, 2, 3, "b"), Edit::new(0, 1, 0, 1, "a")])
        }
    }

    #[test]
    fn test_identical_pair_skips_alignment() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = processor().with_aligner(Counting(calls.clone()));

        let record = processor.process(0, "I am fine .", &["  I am fine . "]).unwrap();

        assert_eq!(record.coders, vec![vec![Edit::noop()]]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subject_verb_agreement_edit() {
        let record = processor().process(0, "He go to school .", &["He goes to school ."]).unwrap();
        assert_eq!(record.sentence, "He go to school .");
        assert_eq!(record.coders.len(), 1);

        let edit = &record.coders[0][0];
        assert_eq!((edit.start, edit.end), (1, 2));
        assert_eq!(edit.replacement, "goes");
        assert_eq!(edit.category_str(), "R:VERB:SVA");
    }

    #[test]
    fn test_one_group_per_reference() {
        let record = processor()
            .process(0, "I am fine .", &["I am fine .", "I'm fine ."])
            .unwrap();

        assert_eq!(record.coders.len(), 2);
        assert_eq!(record.coders[0], vec![Edit::noop()]);
        assert!(!record.coders[1].is_empty());
        assert!(record.coders[1].iter().any(|e| e.covers(1) && e.replacement.contains("'m")));
    }

    #[test]
    fn test_spacing_only_difference_is_noop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = processor().with_aligner(Counting(calls.clone()));

        let record = processor.process(0, "He  goes home .", &["He goes home ."]).unwrap();

        assert_eq!(record.coders, vec![vec![Edit::noop()]]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // The sentence line keeps the original spacing
        assert_eq!(record.sentence, "He  goes home .");
    }

    #[test]
    fn test_empty_reference_deletes_everything() {
        let record = processor().process(0, "Hello world", &[""]).unwrap();
        let edits = &record.coders[0];
        assert!(!edits.is_empty());
        assert!(edits.iter().all(|e| e.replacement.is_empty() && e.category_str().starts_with("U:")));
    }

    #[test]
    fn test_empty_original_inserts_everything() {
        let record = processor().process(4, "   ", &["Hello ."]).unwrap();
        assert_eq!(record.sentence, "   ");

        let edits = &record.coders[0];
        assert_eq!(edits.len(), 1);
        assert_eq!((edits[0].start, edits[0].end), (0, 0));
        assert_eq!(edits[0].replacement, "Hello .");
        assert!(edits[0].category_str().starts_with("M:"));
    }

    #[test]
    fn test_custom_classifier_labels_every_edit() {
        let processor = processor().with_classifier(Fixed("R:OTHER"));
        let record = processor
            .process(0, "He go to school yesterday .", &["He went to the school ."])
            .unwrap();

        let edits = &record.coders[0];
        assert!(edits.len() > 1);
        assert!(edits.iter().all(|e| e.category_str() == "R:OTHER"));
    }

    #[test]
    fn test_out_of_order_aligner_output_is_rejected() {
        let processor = processor().with_aligner(Backwards);
        let err = processor.process(2, "a b c", &["x b y"]).unwrap_err();
        assert!(matches!(err, M2Error::Annotation { index: 2, .. }));
    }

    #[test]
    fn test_each_reference_is_aligned() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = SentencePairProcessor::new(
            resources(),
            AlignConfig {
                use_levenshtein: false,
                merge: MergeStrategy::AllSplit,
            },
        )
        .with_aligner(Counting(calls.clone()));

        let record = processor
            .process(0, "He go to school .", &["He goes to school .", "He went to school ."])
            .unwrap();
        assert_eq!(record.coders.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(record.coders[1][0].replacement, "went");
    }
}
