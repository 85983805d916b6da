//! Error categories for edits.
//!
//! Categories are ERRANT-style: an operation prefix (`M:` missing,
//! `U:` unnecessary, `R:` replacement) followed by a part-of-speech or
//! phenomenon label, e.g. `R:VERB:SVA` or `M:DET`.

use std::collections::HashSet;

use thiserror::Error;

use crate::align::char_ratio;
use crate::edit::Edit;
use crate::resources::Resources;
use crate::token::{AnnotatedSentence, Token};

/// Category for edits that cannot be classified
pub const UNKNOWN: &str = "UNK";

/// Classes that never form a category of their own
const RARE_POS: &[&str] = &["INTJ", "NUM", "SYM", "X"];

/// Classes that may carry inflectional morphology
const OPEN_POS: &[&str] = &["ADJ", "ADV", "NOUN", "VERB"];

const CONTRACTIONS: &[&str] = &["'d", "'ll", "'m", "n't", "'re", "'s", "'ve"];

/// Clipped auxiliaries left by splitting "can't", "won't", "shan't"
const AUX_CONTRACTIONS: &[(&str, &str)] = &[("ca", "can"), ("sha", "shall"), ("wo", "will")];

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("edit span {start}..{end} exceeds sentence length {len}")]
    SpanOutOfRange { start: usize, end: usize, len: usize },
    #[error("classifier failed: {0}")]
    Other(String),
}

/// Assigns an error category to an edit
pub trait Classifier: Send + Sync {
    fn classify(
        &self,
        edit: &Edit,
        orig: &AnnotatedSentence,
        cor: &AnnotatedSentence,
        resources: &Resources,
    ) -> Result<String, ClassifyError>;
}

/// Rule-based English classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleClassifier;

impl Classifier for RuleClassifier {
    fn classify(
        &self,
        edit: &Edit,
        orig: &AnnotatedSentence,
        cor: &AnnotatedSentence,
        resources: &Resources,
    ) -> Result<String, ClassifyError> {
        let (o_start, o_end) = edit.orig_range();
        let (c_start, c_end) = edit.cor_range();
        check_span(o_start, o_end, orig.len())?;
        check_span(c_start, c_end, cor.len())?;

        let rules = Rules {
            orig,
            cor,
            resources,
        };
        Ok(rules.category(&orig.tokens()[o_start..o_end], &cor.tokens()[c_start..c_end]))
    }
}

fn check_span(start: usize, end: usize, len: usize) -> Result<(), ClassifyError> {
    if start > end || end > len {
        return Err(ClassifyError::SpanOutOfRange { start, end, len });
    }
    Ok(())
}

struct Rules<'a> {
    orig: &'a AnnotatedSentence,
    cor: &'a AnnotatedSentence,
    resources: &'a Resources,
}

impl Rules<'_> {
    fn category(&self, o: &[Token], c: &[Token]) -> String {
        match (o.is_empty(), c.is_empty()) {
            (true, true) => UNKNOWN.to_string(),
            (true, false) => format!("M:{}", self.one_sided(c)),
            (false, true) => format!("U:{}", self.one_sided(o)),
            (false, false) => {
                if texts(o) == texts(c) {
                    return UNKNOWN.to_string();
                }
                // "a big" -> "the big": classify without the shared last word
                let shared_tail = o.len() > 1 || c.len() > 1;
                if shared_tail && o[o.len() - 1].lower() == c[c.len() - 1].lower() {
                    return self.category(&o[..o.len() - 1], &c[..c.len() - 1]);
                }
                format!("R:{}", self.two_sided(o, c))
            }
        }
    }

    fn pos<'t>(&'t self, token: &Token) -> &'t str {
        self.resources.coarse_pos(&token.tag)
    }

    fn one_sided(&self, toks: &[Token]) -> String {
        if let [tok] = toks {
            if tok.tag == "POS" {
                return "NOUN:POSS".to_string();
            }
            if CONTRACTIONS.contains(&tok.lower().as_str()) {
                return "CONTR".to_string();
            }
            if tok.tag == "TO" && tok.lower() == "to" {
                return "VERB:FORM".to_string();
            }
        }
        if toks.iter().all(is_aux) {
            return "VERB:TENSE".to_string();
        }

        let classes: HashSet<&str> = toks.iter().map(|t| self.pos(t)).collect();
        if classes.len() == 1 {
            if let Some(&class) = classes.iter().next() {
                if !RARE_POS.contains(&class) {
                    return class.to_string();
                }
            }
        }
        if classes == HashSet::from(["PART", "VERB"]) {
            return "VERB".to_string();
        }
        "OTHER".to_string()
    }

    fn two_sided(&self, o: &[Token], c: &[Token]) -> String {
        if only_orthography(o, c) {
            return "ORTH".to_string();
        }
        if exact_reordering(o, c) {
            return "WO".to_string();
        }
        match (o, c) {
            ([ot], [ct]) => self.one_to_one(ot, ct),
            _ => self.many(o, c),
        }
    }

    fn one_to_one(&self, ot: &Token, ct: &Token) -> String {
        let (o_pos, c_pos) = (self.pos(ot), self.pos(ct));
        let (o_low, c_low) = (ot.lower(), ct.lower());

        if ot.tag == "POS" || ct.tag == "POS" {
            return "NOUN:POSS".to_string();
        }
        let is_contraction = |w: &str| CONTRACTIONS.contains(&w);
        if (is_contraction(&o_low) || is_contraction(&c_low)) && o_pos == c_pos {
            return "CONTR".to_string();
        }
        if AUX_CONTRACTIONS
            .iter()
            .any(|&(clipped, full)| (o_low == clipped && c_low == full) || (o_low == full && c_low == clipped))
        {
            return "CONTR".to_string();
        }
        if AUX_CONTRACTIONS.iter().any(|&(clipped, _)| o_low == clipped || c_low == clipped) {
            return "VERB:TENSE".to_string();
        }
        if matches!((o_low.as_str(), c_low.as_str()), ("was", "were") | ("were", "was")) {
            return "VERB:SVA".to_string();
        }

        // Spelling: unknown alphabetic original words
        if ot.text.chars().all(char::is_alphabetic) && !self.resources.is_known_word(&ot.text) {
            if ot.lemma == ct.lemma {
                if o_pos == c_pos && matches!(o_pos, "NOUN" | "VERB") {
                    return format!("{}:INFL", o_pos);
                }
                return "MORPH".to_string();
            }
            if char_ratio(&ot.text, &ct.text) > 0.5 {
                return "SPELL".to_string();
            }
            if o_pos == c_pos && !RARE_POS.contains(&o_pos) {
                return o_pos.to_string();
            }
            return "OTHER".to_string();
        }

        // Inflection of the same lemma
        let open = OPEN_POS.contains(&o_pos) && OPEN_POS.contains(&c_pos);
        if ot.lemma == ct.lemma && open {
            if o_pos == c_pos {
                match o_pos {
                    "ADJ" => return "ADJ:FORM".to_string(),
                    "NOUN" => return "NOUN:NUM".to_string(),
                    "VERB" => {
                        if let Some(category) = self.verb_inflection(ot, ct) {
                            return category.to_string();
                        }
                    }
                    _ => {}
                }
            }
            if o_pos == "ADJ" && ct.tag == "NNS" {
                return "NOUN:NUM".to_string();
            }
            match ct.tag.as_str() {
                "VBG" | "VBN" => return "VERB:FORM".to_string(),
                "VBD" => return "VERB:TENSE".to_string(),
                "VBZ" => return "VERB:SVA".to_string(),
                _ => {}
            }
            return "MORPH".to_string();
        }

        // Derivation: "quick" -> "quickly"
        let stemmer = &self.resources.stemmer;
        if open && stemmer.stem(&o_low) == stemmer.stem(&c_low) {
            return "MORPH".to_string();
        }

        if is_aux(ot) && is_aux(ct) {
            return "VERB:TENSE".to_string();
        }
        if o_pos == c_pos && !RARE_POS.contains(&o_pos) {
            return o_pos.to_string();
        }
        if matches!((o_pos, c_pos), ("PART", "PREP") | ("PREP", "PART")) {
            return "PART".to_string();
        }
        "OTHER".to_string()
    }

    /// Sub-type of a verb replaced by another form of the same verb
    fn verb_inflection(&self, ot: &Token, ct: &Token) -> Option<&'static str> {
        if self.preceded_by_aux(ot, ct) {
            return Some("VERB:FORM");
        }
        let either = |tags: &[&str]| tags.contains(&ot.tag.as_str()) || tags.contains(&ct.tag.as_str());
        if either(&["VBG", "VBN"]) {
            return Some("VERB:FORM");
        }
        if either(&["VBD"]) {
            return Some("VERB:TENSE");
        }
        if either(&["VBZ"]) {
            return Some("VERB:SVA");
        }
        if is_aux(ot) && is_aux(ct) {
            return Some("VERB:TENSE");
        }
        None
    }

    /// Both verbs follow an auxiliary, so only their form can differ
    fn preceded_by_aux(&self, ot: &Token, ct: &Token) -> bool {
        has_aux_before(self.orig, ot.index) && has_aux_before(self.cor, ct.index)
    }

    fn many(&self, o: &[Token], c: &[Token]) -> String {
        if o.iter().chain(c).all(is_aux) {
            return "VERB:TENSE".to_string();
        }

        let o_classes: Vec<&str> = o.iter().map(|t| self.pos(t)).collect();
        let c_classes: Vec<&str> = c.iter().map(|t| self.pos(t)).collect();
        let all: HashSet<&str> = o_classes.iter().chain(&c_classes).copied().collect();
        let (o_last, c_last) = (&o[o.len() - 1], &c[c.len() - 1]);

        if all.len() == 1 {
            if let Some(&class) = all.iter().next() {
                if class == "VERB" && o_last.lemma == c_last.lemma {
                    return "VERB:TENSE".to_string();
                }
                if !RARE_POS.contains(&class) {
                    return class.to_string();
                }
            }
        }
        if all == HashSet::from(["PART", "VERB"]) {
            if o_last.lemma == c_last.lemma {
                return "VERB:FORM".to_string();
            }
            return "VERB".to_string();
        }
        let noun_part = |classes: &[&str]| classes == ["NOUN", "PART"];
        if (noun_part(&o_classes) || noun_part(&c_classes)) && o[0].lemma == c[0].lemma {
            return "NOUN:POSS".to_string();
        }
        let degree = |t: &Token| matches!(t.lower().as_str(), "more" | "most");
        if (degree(&o[0]) || degree(&c[0]))
            && o.len() <= 2
            && c.len() <= 2
            && o_last.lemma == c_last.lemma
        {
            return "ADJ:FORM".to_string();
        }
        "OTHER".to_string()
    }
}

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn is_aux(token: &Token) -> bool {
    token.pos == "AUX"
}

/// An auxiliary within the two tokens before `index`, skipping adverbs
fn has_aux_before(sentence: &AnnotatedSentence, index: usize) -> bool {
    sentence.tokens()[..index.min(sentence.len())]
        .iter()
        .rev()
        .filter(|t| t.pos != "ADV")
        .take(2)
        .any(is_aux)
}

/// Same characters ignoring case and spacing
fn only_orthography(o: &[Token], c: &[Token]) -> bool {
    let squash = |toks: &[Token]| toks.iter().map(Token::lower).collect::<String>();
    squash(o) == squash(c)
}

/// Same words in a different order
fn exact_reordering(o: &[Token], c: &[Token]) -> bool {
    if o.len() < 2 || o.len() != c.len() {
        return false;
    }
    let sorted = |toks: &[Token]| {
        let mut words: Vec<String> = toks.iter().map(Token::lower).collect();
        words.sort();
        words
    };
    sorted(o) == sorted(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignConfig, Aligner, DamerauAligner};
    use crate::resources::ResourcePaths;
    use std::sync::OnceLock;

    fn resources() -> &'static Resources {
        static RESOURCES: OnceLock<Resources> = OnceLock::new();
        RESOURCES.get_or_init(|| Resources::load(&ResourcePaths::default()).unwrap())
    }

    /// Align and classify, returning `(start, end, replacement, category)`
    fn categorize(orig: &str, cor: &str) -> Vec<(i64, i64, String, String)> {
        let res = resources();
        let o_toks: Vec<&str> = orig.split_whitespace().collect();
        let c_toks: Vec<&str> = cor.split_whitespace().collect();
        let o = res.annotator.annotate(&o_toks).unwrap();
        let c = res.annotator.annotate(&c_toks).unwrap();
        DamerauAligner
            .align(&o, &c, &AlignConfig::default())
            .unwrap()
            .into_iter()
            .map(|e| {
                let cat = RuleClassifier.classify(&e, &o, &c, res).unwrap();
                (e.start, e.end, e.replacement, cat)
            })
            .collect()
    }

    fn single(orig: &str, cor: &str) -> String {
        let edits = categorize(orig, cor);
        assert_eq!(edits.len(), 1, "expected one edit, got {:?}", edits);
        edits[0].3.clone()
    }

    #[test]
    fn test_subject_verb_agreement() {
        let edits = categorize("He go to school .", "He goes to school .");
        assert_eq!(edits, vec![(1, 2, "goes".to_string(), "R:VERB:SVA".to_string())]);
        assert_eq!(single("They was late .", "They were late ."), "R:VERB:SVA");
    }

    #[test]
    fn test_missing_and_unnecessary_words() {
        assert_eq!(single("I like cat .", "I like the cat ."), "M:DET");
        assert_eq!(single("I like the the cat .", "I like the cat ."), "U:DET");
        assert_eq!(single("He eaten the apple .", "He has eaten the apple ."), "M:VERB:TENSE");
    }

    #[test]
    fn test_spelling_orthography_and_order() {
        assert_eq!(single("I like speling .", "I like spelling ."), "R:SPELL");
        assert_eq!(single("i like cats .", "I like cats ."), "R:ORTH");
        assert_eq!(single("I like very much it .", "I like it very much ."), "R:WO");
    }

    #[test]
    fn test_verb_forms() {
        assert_eq!(single("I have eat lunch .", "I have eaten lunch ."), "R:VERB:FORM");
        assert_eq!(single("I eat lunch .", "I have eaten lunch ."), "R:VERB:TENSE");
    }

    #[test]
    fn test_noun_number_and_morphology() {
        assert_eq!(single("I like cat .", "I like cats ."), "R:NOUN:NUM");
        assert_eq!(single("He ran quick .", "He ran quickly ."), "R:MORPH");
    }

    #[test]
    fn test_inflections_of_dictionary_words() {
        assert_eq!(single("He is tall .", "He is taller ."), "R:ADJ:FORM");
        assert_eq!(single("I receive it .", "I received it ."), "R:VERB:TENSE");
        assert_eq!(
            categorize("The colour is nice .", "The colours are nice ."),
            vec![
                (1, 2, "colours".to_string(), "R:NOUN:NUM".to_string()),
                (2, 3, "are".to_string(), "R:VERB:SVA".to_string()),
            ]
        );
    }

    #[test]
    fn test_same_class_replacement() {
        assert_eq!(single("I live on London .", "I live in London ."), "R:PREP");
    }

    #[test]
    fn test_empty_and_identical_spans() {
        let res = resources();
        let o = res.annotator.annotate(&["a", "cat"]).unwrap();
        let c = res.annotator.annotate(&["a", "cat"]).unwrap();

        let nothing = Edit::new(1, 1, 1, 1, "");
        assert_eq!(RuleClassifier.classify(&nothing, &o, &c, res).unwrap(), "UNK");
        let same = Edit::new(0, 2, 0, 2, "a cat");
        assert_eq!(RuleClassifier.classify(&same, &o, &c, res).unwrap(), "UNK");
    }

    #[test]
    fn test_span_out_of_range() {
        let res = resources();
        let o = res.annotator.annotate(&["a", "cat"]).unwrap();
        let edit = Edit::new(1, 4, 0, 1, "cat");
        assert!(matches!(
            RuleClassifier.classify(&edit, &o, &o, res),
            Err(ClassifyError::SpanOutOfRange { end: 4, len: 2, .. })
        ));
    }

    #[test]
    fn test_one_sided_contraction_and_possessive() {
        let res = resources();
        let o = res.annotator.annotate(&["I", "do", "not", "know"]).unwrap();
        let c = res.annotator.annotate(&["I", "do", "n't", "know"]).unwrap();
        let contraction = Edit::new(2, 2, 2, 3, "n't");
        assert_eq!(RuleClassifier.classify(&contraction, &o, &c, res).unwrap(), "M:CONTR");

        let c = res.annotator.annotate(&["the", "dog", "'s", "bone"]).unwrap();
        let o = res.annotator.annotate(&["the", "dog", "bone"]).unwrap();
        let possessive = Edit::new(2, 2, 2, 3, "'s");
        assert_eq!(RuleClassifier.classify(&possessive, &o, &c, res).unwrap(), "M:NOUN:POSS");
    }
}
