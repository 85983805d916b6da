//! Part-of-speech tagging and lemmatization of pre-tokenized sentences.
//!
//! [`LexiconAnnotator`] is a small deterministic English tagger: closed-class
//! words and common irregular forms come from word tables, open-class words
//! are tagged from their suffix and the tag of the token on their left.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::token::{AnnotatedSentence, Token};

/// Errors raised while annotating a sentence
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("cannot annotate an empty token sequence")]
    Empty,
    #[error("annotator failed: {0}")]
    Other(String),
}

/// Turns a token sequence into an [`AnnotatedSentence`]
pub trait Annotator: Send + Sync {
    fn annotate(&self, tokens: &[&str]) -> Result<AnnotatedSentence, AnnotateError>;
}

/// Closed-class words: (word, PTB tag, lemma)
const CLOSED_CLASS: &[(&str, &str, &str)] = &[
    // Pronouns
    ("i", "PRP", "i"), ("me", "PRP", "i"), ("you", "PRP", "you"), ("he", "PRP", "he"),
    ("him", "PRP", "he"), ("she", "PRP", "she"), ("it", "PRP", "it"), ("we", "PRP", "we"),
    ("us", "PRP", "we"), ("they", "PRP", "they"), ("them", "PRP", "they"),
    ("myself", "PRP", "myself"), ("yourself", "PRP", "yourself"), ("himself", "PRP", "himself"),
    ("herself", "PRP", "herself"), ("itself", "PRP", "itself"), ("ourselves", "PRP", "ourselves"),
    ("themselves", "PRP", "themselves"), ("mine", "PRP", "mine"), ("yours", "PRP", "yours"),
    ("ours", "PRP", "ours"), ("theirs", "PRP", "theirs"), ("hers", "PRP", "hers"),
    ("my", "PRP$", "my"), ("your", "PRP$", "your"), ("his", "PRP$", "his"), ("her", "PRP$", "her"),
    ("its", "PRP$", "its"), ("our", "PRP$", "our"), ("their", "PRP$", "their"),
    ("who", "WP", "who"), ("whom", "WP", "who"), ("what", "WP", "what"), ("whose", "WP$", "whose"),
    ("which", "WDT", "which"), ("where", "WRB", "where"), ("when", "WRB", "when"),
    ("why", "WRB", "why"), ("how", "WRB", "how"),
    // Determiners
    ("the", "DT", "the"), ("a", "DT", "a"), ("an", "DT", "an"), ("this", "DT", "this"),
    ("that", "DT", "that"), ("these", "DT", "these"), ("those", "DT", "those"),
    ("some", "DT", "some"), ("any", "DT", "any"), ("no", "DT", "no"), ("every", "DT", "every"),
    ("each", "DT", "each"), ("either", "DT", "either"), ("neither", "DT", "neither"),
    ("another", "DT", "another"), ("all", "DT", "all"), ("both", "DT", "both"),
    ("many", "JJ", "many"), ("much", "JJ", "much"), ("few", "JJ", "few"), ("several", "JJ", "several"),
    ("there", "EX", "there"),
    // Prepositions and subordinators
    ("to", "TO", "to"), ("of", "IN", "of"), ("in", "IN", "in"), ("on", "IN", "on"), ("at", "IN", "at"),
    ("by", "IN", "by"), ("for", "IN", "for"), ("with", "IN", "with"), ("about", "IN", "about"),
    ("from", "IN", "from"), ("into", "IN", "into"), ("onto", "IN", "onto"), ("over", "IN", "over"),
    ("under", "IN", "under"), ("after", "IN", "after"), ("before", "IN", "before"),
    ("during", "IN", "during"), ("since", "IN", "since"), ("until", "IN", "until"),
    ("through", "IN", "through"), ("between", "IN", "between"), ("among", "IN", "among"),
    ("against", "IN", "against"), ("without", "IN", "without"), ("within", "IN", "within"),
    ("because", "IN", "because"), ("if", "IN", "if"), ("than", "IN", "than"),
    ("while", "IN", "while"), ("although", "IN", "although"), ("though", "IN", "though"),
    ("whether", "IN", "whether"), ("as", "IN", "as"), ("near", "IN", "near"),
    ("up", "RP", "up"), ("out", "RP", "out"), ("off", "RP", "off"), ("down", "RP", "down"),
    // Conjunctions
    ("and", "CC", "and"), ("or", "CC", "or"), ("but", "CC", "but"), ("nor", "CC", "nor"),
    ("so", "RB", "so"), ("yet", "RB", "yet"),
    // Adverbs
    ("not", "RB", "not"), ("n't", "RB", "not"), ("very", "RB", "very"), ("too", "RB", "too"),
    ("also", "RB", "also"), ("just", "RB", "just"), ("only", "RB", "only"), ("never", "RB", "never"),
    ("always", "RB", "always"), ("often", "RB", "often"), ("sometimes", "RB", "sometimes"),
    ("already", "RB", "already"), ("still", "RB", "still"), ("again", "RB", "again"),
    ("here", "RB", "here"), ("now", "RB", "now"), ("then", "RB", "then"), ("soon", "RB", "soon"),
    ("today", "NN", "today"), ("tomorrow", "NN", "tomorrow"), ("yesterday", "NN", "yesterday"),
    ("well", "RB", "well"), ("even", "RB", "even"), ("ever", "RB", "ever"),
    ("more", "RBR", "more"), ("most", "RBS", "most"), ("less", "RBR", "less"),
    ("least", "RBS", "least"),
    // Auxiliaries and modals
    ("be", "VB", "be"), ("am", "VBP", "be"), ("are", "VBP", "be"), ("is", "VBZ", "be"),
    ("was", "VBD", "be"), ("were", "VBD", "be"), ("been", "VBN", "be"), ("being", "VBG", "be"),
    ("'m", "VBP", "be"), ("'re", "VBP", "be"),
    ("have", "VBP", "have"), ("has", "VBZ", "have"), ("had", "VBD", "have"),
    ("having", "VBG", "have"), ("'ve", "VBP", "have"),
    ("do", "VBP", "do"), ("does", "VBZ", "do"), ("did", "VBD", "do"), ("done", "VBN", "do"),
    ("doing", "VBG", "do"),
    ("will", "MD", "will"), ("would", "MD", "would"), ("shall", "MD", "shall"),
    ("should", "MD", "should"), ("can", "MD", "can"), ("could", "MD", "could"),
    ("may", "MD", "may"), ("might", "MD", "might"), ("must", "MD", "must"),
    ("'ll", "MD", "will"), ("'d", "MD", "would"), ("ca", "MD", "can"), ("wo", "MD", "will"),
    ("sha", "MD", "shall"),
    // Interjections
    ("yes", "UH", "yes"), ("oh", "UH", "oh"), ("hello", "UH", "hello"), ("please", "UH", "please"),
];

/// Irregular inflections of open-class words: (word, PTB tag, lemma)
const IRREGULAR: &[(&str, &str, &str)] = &[
    ("goes", "VBZ", "go"), ("went", "VBD", "go"), ("gone", "VBN", "go"), ("going", "VBG", "go"),
    ("ate", "VBD", "eat"), ("eaten", "VBN", "eat"), ("saw", "VBD", "see"), ("seen", "VBN", "see"),
    ("came", "VBD", "come"), ("took", "VBD", "take"), ("taken", "VBN", "take"),
    ("made", "VBD", "make"), ("knew", "VBD", "know"), ("known", "VBN", "know"),
    ("thought", "VBD", "think"), ("said", "VBD", "say"), ("got", "VBD", "get"),
    ("gotten", "VBN", "get"), ("gave", "VBD", "give"), ("given", "VBN", "give"),
    ("found", "VBD", "find"), ("told", "VBD", "tell"), ("felt", "VBD", "feel"),
    ("became", "VBD", "become"), ("left", "VBD", "leave"), ("meant", "VBD", "mean"),
    ("kept", "VBD", "keep"), ("began", "VBD", "begin"), ("begun", "VBN", "begin"),
    ("heard", "VBD", "hear"), ("ran", "VBD", "run"), ("brought", "VBD", "bring"),
    ("wrote", "VBD", "write"), ("written", "VBN", "write"), ("sat", "VBD", "sit"),
    ("stood", "VBD", "stand"), ("lost", "VBD", "lose"), ("paid", "VBD", "pay"),
    ("met", "VBD", "meet"), ("led", "VBD", "lead"), ("understood", "VBD", "understand"),
    ("spoke", "VBD", "speak"), ("spoken", "VBN", "speak"), ("spent", "VBD", "spend"),
    ("grew", "VBD", "grow"), ("grown", "VBN", "grow"), ("won", "VBD", "win"),
    ("taught", "VBD", "teach"), ("bought", "VBD", "buy"), ("sent", "VBD", "send"),
    ("built", "VBD", "build"), ("fell", "VBD", "fall"), ("fallen", "VBN", "fall"),
    ("drove", "VBD", "drive"), ("driven", "VBN", "drive"), ("swam", "VBD", "swim"),
    ("sang", "VBD", "sing"), ("sung", "VBN", "sing"), ("slept", "VBD", "sleep"),
    ("drank", "VBD", "drink"), ("drunk", "VBN", "drink"), ("chose", "VBD", "choose"),
    ("chosen", "VBN", "choose"), ("forgot", "VBD", "forget"), ("forgotten", "VBN", "forget"),
    ("children", "NNS", "child"), ("men", "NNS", "man"), ("women", "NNS", "woman"),
    ("people", "NNS", "person"), ("feet", "NNS", "foot"), ("teeth", "NNS", "tooth"),
    ("mice", "NNS", "mouse"), ("lives", "NNS", "life"), ("wives", "NNS", "wife"),
    ("better", "JJR", "good"), ("best", "JJS", "good"), ("worse", "JJR", "bad"),
    ("worst", "JJS", "bad"), ("further", "JJR", "far"), ("farther", "JJR", "far"),
];

/// Base forms of common verbs, used to lemmatize regular inflections
const VERBS: &[&str] = &[
    "go", "eat", "like", "want", "make", "take", "see", "come", "know", "think", "say", "get",
    "give", "find", "tell", "work", "call", "try", "ask", "need", "feel", "become", "leave",
    "put", "mean", "keep", "let", "begin", "seem", "help", "talk", "turn", "start", "show",
    "hear", "play", "run", "move", "live", "believe", "bring", "happen", "write", "sit",
    "stand", "lose", "pay", "meet", "include", "continue", "learn", "change", "lead",
    "understand", "watch", "follow", "stop", "create", "speak", "read", "spend", "grow",
    "open", "walk", "win", "teach", "offer", "remember", "love", "consider", "appear", "buy",
    "wait", "serve", "die", "send", "expect", "build", "stay", "fall", "cut", "reach", "kill",
    "remain", "suggest", "raise", "pass", "sell", "require", "report", "decide", "pull",
    "study", "visit", "travel", "enjoy", "arrive", "agree", "look", "use", "drive", "swim",
    "sing", "sleep", "drink", "choose", "forget", "listen", "cook", "clean", "close", "carry",
    "hope", "plan", "prefer", "answer", "explain", "finish", "miss", "wish", "improve",
    "discuss", "describe", "hate", "laugh", "cry", "smile", "dance", "jump", "pick", "hold",
    "wake", "worry", "receive", "allow", "accept", "provide", "return", "apologise",
];

/// Common nouns whose base form should not be mistaken for a verb
const NOUNS: &[&str] = &[
    "cat", "dog", "school", "book", "house", "time", "day", "year", "man", "woman", "child",
    "person", "friend", "family", "teacher", "student", "car", "city", "country", "world",
    "life", "job", "money", "water", "food", "home", "room", "door", "table", "problem",
    "question", "idea", "thing", "way", "week", "month", "morning", "night", "weather",
    "computer", "phone", "letter", "word", "sentence", "language", "class", "lesson",
    "information", "advice", "news", "music", "film", "movie", "game", "sport", "team",
    "company", "office", "work", "play", "walk", "change", "answer", "report", "plan", "help",
    "talk", "visit", "love", "hope", "cook", "name", "people", "street", "shop", "bus",
    "train", "trip", "holiday", "party", "park", "garden", "tree", "apple", "paper",
    "homework", "exam", "test", "subject", "parent", "mother", "father", "brother", "sister",
    "baby", "boy", "girl", "story", "hour", "minute", "place", "part", "group", "area",
    "colour", "government", "behaviour", "neighbour", "centre", "theatre",
];

/// Common adjectives, used to recognise comparatives and superlatives
const ADJECTIVES: &[&str] = &[
    "good", "bad", "big", "small", "happy", "sad", "fine", "new", "old", "great", "little",
    "long", "short", "young", "important", "different", "large", "easy", "hard", "difficult",
    "nice", "beautiful", "pretty", "quick", "slow", "fast", "high", "low", "early", "late",
    "free", "full", "hot", "cold", "warm", "cheap", "expensive", "interesting", "boring",
    "busy", "tired", "strong", "weak", "rich", "poor", "clean", "dirty", "safe", "sure",
    "real", "true", "clear", "close", "simple", "kind", "funny", "famous", "popular", "healthy",
    "tall", "dark", "heavy", "quiet", "bright", "necessary",
];

const SUBJECT_PRONOUNS: &[&str] = &["i", "you", "we", "they", "he", "she", "it"];

/// English annotator backed by word tables and suffix heuristics
#[derive(Debug, Clone)]
pub struct LexiconAnnotator {
    closed: HashMap<&'static str, (&'static str, &'static str)>,
    irregular: HashMap<&'static str, (&'static str, &'static str)>,
    verbs: HashSet<&'static str>,
    nouns: HashSet<&'static str>,
    adjectives: HashSet<&'static str>,
}

impl Default for LexiconAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

impl Annotator for LexiconAnnotator {
    fn annotate(&self, tokens: &[&str]) -> Result<AnnotatedSentence, AnnotateError> {
        if tokens.is_empty() {
            return Err(AnnotateError::Empty);
        }

        let mut annotated: Vec<Token> = Vec::with_capacity(tokens.len());
        for (index, text) in tokens.iter().enumerate() {
            let (tag, lemma) = self.tag_word(text, annotated.last(), index);
            let pos = universal_pos(&tag);
            annotated.push(Token::new(*text, tag, pos, lemma, index));
        }
        mark_auxiliaries(&mut annotated);
        Ok(AnnotatedSentence::new(annotated))
    }
}

impl LexiconAnnotator {
    pub fn new() -> Self {
        let table = |rows: &[(&'static str, &'static str, &'static str)]| {
            rows.iter().map(|&(w, t, l)| (w, (t, l))).collect::<HashMap<_, _>>()
        };
        Self {
            closed: table(CLOSED_CLASS),
            irregular: table(IRREGULAR),
            verbs: VERBS.iter().copied().collect(),
            nouns: NOUNS.iter().copied().collect(),
            adjectives: ADJECTIVES.iter().copied().collect(),
        }
    }

    /// Tag one word given the already-tagged token on its left
    fn tag_word(&self, text: &str, prev: Option<&Token>, index: usize) -> (String, String) {
        let lower = text.to_lowercase();

        if let Some(tag) = punctuation_tag(text, prev) {
            return (tag.to_string(), text.to_string());
        }
        if is_number(text) {
            return ("CD".to_string(), lower);
        }
        if lower == "'s" {
            // Possessive after nouns, "is"/"has" elsewhere
            return match prev {
                Some(p) if p.tag.starts_with("NN") => ("POS".to_string(), "'s".to_string()),
                _ => ("VBZ".to_string(), "be".to_string()),
            };
        }
        if let Some(&(tag, lemma)) = self.closed.get(lower.as_str()) {
            return (tag.to_string(), lemma.to_string());
        }
        if let Some(&(tag, lemma)) = self.irregular.get(lower.as_str()) {
            return (tag.to_string(), lemma.to_string());
        }
        if index > 0 && starts_uppercase(text) {
            return ("NNP".to_string(), lower);
        }

        let prev_tag = prev.map(|p| p.tag.as_str()).unwrap_or("");
        let after_subject = prev
            .map(|p| p.tag == "PRP" && SUBJECT_PRONOUNS.contains(&p.lower().as_str()))
            .unwrap_or(false);
        let after_nominal = prev_tag.starts_with("NN") || after_subject;
        let after_determiner = matches!(prev_tag, "DT" | "PRP$" | "JJ" | "JJR" | "JJS" | "CD" | "POS" | "WP$");
        let after_have = prev.map(|p| p.lemma == "have" || p.lemma == "be").unwrap_or(false);

        // Base forms from the word tables
        let is_verb = self.verbs.contains(lower.as_str());
        let is_noun = self.nouns.contains(lower.as_str());
        if is_verb || is_noun {
            let verb_context = matches!(prev_tag, "MD" | "TO") || after_subject;
            let tag = if is_verb && (verb_context || !is_noun) && !after_determiner {
                match prev_tag {
                    "MD" | "TO" => "VB",
                    _ if after_subject => "VBP",
                    _ => "VB",
                }
            } else {
                "NN"
            };
            return (tag.to_string(), lower);
        }
        if self.adjectives.contains(lower.as_str()) {
            return ("JJ".to_string(), lower);
        }

        // Regular inflections of known words
        if let Some(lemma) = self.verb_lemma(&lower, "ing") {
            return ("VBG".to_string(), lemma);
        }
        if let Some(lemma) = self.verb_lemma(&lower, "ed") {
            let tag = if after_have { "VBN" } else { "VBD" };
            return (tag.to_string(), lemma);
        }
        if let Some(lemma) = singular(&lower) {
            let as_noun = self.nouns.contains(lemma.as_str());
            let as_verb = self.verbs.contains(lemma.as_str());
            if as_verb && (!as_noun || after_nominal) && !after_determiner {
                return ("VBZ".to_string(), lemma);
            }
            if as_noun || as_verb {
                return ("NNS".to_string(), lemma);
            }
        }
        if let Some((tag, lemma)) = self.adjective_degree(&lower) {
            return (tag.to_string(), lemma);
        }

        // Unknown words: guess from the suffix
        let len = lower.chars().count();
        if len > 4 && lower.ends_with("ly") {
            return ("RB".to_string(), lower);
        }
        if len > 4 && lower.ends_with("ing") {
            return ("VBG".to_string(), strip_suffix(&lower, "ing"));
        }
        if len > 3 && lower.ends_with("ed") {
            let tag = if after_have { "VBN" } else { "VBD" };
            return (tag.to_string(), strip_suffix(&lower, "ed"));
        }
        const ADJECTIVE_SUFFIXES: &[&str] = &["ful", "ous", "ive", "able", "ible", "ical", "less", "ish"];
        if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
            return ("JJ".to_string(), lower);
        }
        if len > 3 && lower.ends_with('s') && !lower.ends_with("ss") && !lower.ends_with("us") && !lower.ends_with("is") {
            let lemma = singular(&lower).unwrap_or_else(|| lower.clone());
            let tag = if after_nominal && !after_determiner { "VBZ" } else { "NNS" };
            return (tag.to_string(), lemma);
        }
        if after_subject || matches!(prev_tag, "MD" | "TO") {
            let tag = if after_subject { "VBP" } else { "VB" };
            return (tag.to_string(), lower);
        }

        ("NN".to_string(), lower)
    }

    /// Lemma of a regular `-ing` / `-ed` form of a known verb
    fn verb_lemma(&self, word: &str, suffix: &str) -> Option<String> {
        let stem = word.strip_suffix(suffix)?;
        if stem.is_empty() {
            return None;
        }
        let candidates = [
            stem.to_string(),
            format!("{}e", stem),
            undouble(stem),
            // studied -> study
            stem.strip_suffix('i').map(|s| format!("{}y", s)).unwrap_or_default(),
        ];
        candidates
            .into_iter()
            .find(|c| !c.is_empty() && self.verbs.contains(c.as_str()))
    }

    /// Comparative and superlative forms of known adjectives
    fn adjective_degree(&self, word: &str) -> Option<(&'static str, String)> {
        for (suffix, tag) in [("est", "JJS"), ("er", "JJR")] {
            let Some(stem) = word.strip_suffix(suffix) else {
                continue;
            };
            let candidates = [
                stem.to_string(),
                format!("{}e", stem),
                undouble(stem),
                stem.strip_suffix('i').map(|s| format!("{}y", s)).unwrap_or_default(),
            ];
            if let Some(lemma) = candidates
                .into_iter()
                .find(|c| !c.is_empty() && self.adjectives.contains(c.as_str()))
            {
                return Some((tag, lemma));
            }
        }
        None
    }
}

/// Coarse universal class for a Penn Treebank tag
pub fn universal_pos(tag: &str) -> &'static str {
    match tag {
        "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP" => "PUNCT",
        "$" | "#" | "SYM" => "SYM",
        "CC" => "CCONJ",
        "CD" => "NUM",
        "DT" | "PDT" | "WDT" | "PRP$" | "WP$" => "DET",
        "EX" | "PRP" | "WP" => "PRON",
        "IN" => "ADP",
        "JJ" | "JJR" | "JJS" | "AFX" => "ADJ",
        "MD" => "AUX",
        "NN" | "NNS" => "NOUN",
        "NNP" | "NNPS" => "PROPN",
        "POS" | "RP" | "TO" => "PART",
        "RB" | "RBR" | "RBS" | "WRB" => "ADV",
        "UH" => "INTJ",
        t if t.starts_with("VB") => "VERB",
        _ => "X",
    }
}

/// Forms of be/have/do that head a verb group become AUX.
///
/// Adverbs and pronouns between the auxiliary and the verb are skipped, so
/// "does n't go" and "did you go" both count.
fn mark_auxiliaries(tokens: &mut [Token]) {
    for i in 0..tokens.len() {
        let candidate = &tokens[i];
        if !candidate.tag.starts_with("VB") || !matches!(candidate.lemma.as_str(), "be" | "have" | "do") {
            continue;
        }
        let heads_verb = tokens[i + 1..]
            .iter()
            .find(|t| !matches!(t.pos.as_str(), "ADV" | "PRON" | "PART") || t.tag == "TO")
            .map(|t| t.tag.starts_with("VB"))
            .unwrap_or(false);
        if heads_verb {
            tokens[i].pos = "AUX".to_string();
        }
    }
}

/// Singular form of a regular plural (or third-person verb form)
fn singular(word: &str) -> Option<String> {
    if word.len() <= 2 || !word.ends_with('s') || word.ends_with("ss") {
        return None;
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if stem.len() > 1 {
            return Some(format!("{}y", stem));
        }
    }
    for ending in ["ches", "shes", "xes", "sses", "zes"] {
        if word.ends_with(ending) {
            return Some(word[..word.len() - 2].to_string());
        }
    }
    word.strip_suffix('s').map(str::to_string)
}

fn undouble(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    match chars.as_slice() {
        [.., a, b] if a == b => chars[..chars.len() - 1].iter().collect(),
        _ => String::new(),
    }
}

fn strip_suffix(word: &str, suffix: &str) -> String {
    word.strip_suffix(suffix).unwrap_or(word).to_string()
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().map(char::is_uppercase).unwrap_or(false)
}

fn is_number(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit())
        && text.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '/' | ':'))
}

/// PTB tag for tokens made only of punctuation and symbols
fn punctuation_tag(text: &str, prev: Option<&Token>) -> Option<&'static str> {
    if text.is_empty() || text.chars().any(char::is_alphanumeric) {
        return None;
    }
    let tag = match text {
        "." | "!" | "?" | "..." => ".",
        "," => ",",
        ":" | ";" | "--" | "-" => ":",
        "(" | "[" | "{" => "-LRB-",
        ")" | "]" | "}" => "-RRB-",
        "``" => "``",
        "\"" | "''" => "''",
        "'" => match prev {
            Some(p) if p.tag == "NNS" => "POS",
            _ => "''",
        },
        "$" => "$",
        "#" => "#",
        _ => "SYM",
    };
    Some(tag)
}
