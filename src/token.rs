/// A single token of an annotated sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface text exactly as it appeared in the input
    pub text: String,
    /// Penn Treebank part-of-speech tag
    pub tag: String,
    /// Coarse universal part-of-speech class (NOUN, VERB, AUX, ...)
    pub pos: String,
    /// Lower-cased lemma
    pub lemma: String,
    /// Position within the sentence (0-indexed)
    pub index: usize,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        tag: impl Into<String>,
        pos: impl Into<String>,
        lemma: impl Into<String>,
        index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            tag: tag.into(),
            pos: pos.into(),
            lemma: lemma.into(),
            index,
        }
    }

    /// Lower-cased surface text
    pub fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn is_punct(&self) -> bool {
        self.pos == "PUNCT"
    }
}

/// One side of a sentence pair after annotation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotatedSentence {
    tokens: Vec<Token>,
}

impl AnnotatedSentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Surface texts of all tokens, in order
    pub fn texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    /// Tokens in `start..end`, clamped to the sentence length
    pub fn span(&self, start: usize, end: usize) -> &[Token] {
        let end = end.min(self.tokens.len());
        let start = start.min(end);
        &self.tokens[start..end]
    }
}

/// Split pre-tokenized text on whitespace.
///
/// Leading and trailing whitespace is ignored, so `"  a  b "` yields
/// `["a", "b"]`.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}
