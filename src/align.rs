//! Token alignment between an original sentence and a reference.
//!
//! Alignment runs in two stages: a Wagner-Fischer table with adjacent
//! transpositions produces a sequence of [`AlignOp`]s, then a
//! [`MergeStrategy`] groups the non-matching operations into [`Edit`]s.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use similar::TextDiff;
use thiserror::Error;

use crate::edit::{Edit, sort_by_position};
use crate::token::{AnnotatedSentence, Token};

/// Universal classes treated as content words
const OPEN_POS: &[&str] = &["ADJ", "ADV", "NOUN", "VERB"];

const EPSILON: f64 = 1e-9;

/// Policy for grouping adjacent non-matching alignment operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Linguistically motivated merging
    #[default]
    Rules,
    /// Merge nothing; e.g. MSSDI -> M, S, S, D, I
    AllSplit,
    /// Merge adjacent non-matches; e.g. MSSDI -> M, SSDI
    AllMerge,
    /// Merge adjacent same-type non-matches; e.g. MSSDI -> M, SS, D, I
    AllEqual,
}

impl MergeStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MergeStrategy::Rules => "rules",
            MergeStrategy::AllSplit => "all-split",
            MergeStrategy::AllMerge => "all-merge",
            MergeStrategy::AllEqual => "all-equal",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Alignment options shared by every sentence of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AlignConfig {
    /// Use plain Levenshtein costs instead of the linguistic ones
    pub use_levenshtein: bool,
    pub merge: MergeStrategy,
}

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("aligner failed: {0}")]
    Other(String),
}

/// Computes the edits that turn `orig` into `cor`
pub trait Aligner: Send + Sync {
    /// Edits come back ordered by start index with `category` unset.
    fn align(
        &self,
        orig: &AnnotatedSentence,
        cor: &AnnotatedSentence,
        config: &AlignConfig,
    ) -> Result<Vec<Edit>, AlignError>;
}

/// One step of a token alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Match,
    Substitute,
    Delete,
    Insert,
    /// Reordering of `k` adjacent tokens
    Transpose(usize),
    /// Several operations grouped into one edit
    Merged,
}

impl Op {
    /// Grouping key used by the all-equal strategy
    fn kind(&self) -> char {
        match self {
            Op::Match => 'M',
            Op::Substitute => 'S',
            Op::Delete => 'D',
            Op::Insert => 'I',
            Op::Transpose(_) => 'T',
            Op::Merged => 'X',
        }
    }
}

/// An alignment operation with its spans in both sentences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignOp {
    pub op: Op,
    pub o_start: usize,
    pub o_end: usize,
    pub c_start: usize,
    pub c_end: usize,
}

/// Damerau-Levenshtein aligner with linguistically weighted substitutions
#[derive(Debug, Clone, Copy, Default)]
pub struct DamerauAligner;

impl Aligner for DamerauAligner {
    fn align(
        &self,
        orig: &AnnotatedSentence,
        cor: &AnnotatedSentence,
        config: &AlignConfig,
    ) -> Result<Vec<Edit>, AlignError> {
        let alignment = align_tokens(orig.tokens(), cor.tokens(), config.use_levenshtein);
        let grouped = match config.merge {
            MergeStrategy::Rules => merge_by_rules(&alignment, orig, cor),
            MergeStrategy::AllSplit => split_all(&alignment),
            MergeStrategy::AllMerge => merge_all(&alignment),
            MergeStrategy::AllEqual => merge_equal(&alignment),
        };

        let cor_texts = cor.texts();
        let mut edits: Vec<Edit> = grouped
            .iter()
            .map(|g| {
                let replacement = cor_texts[g.c_start..g.c_end].join(" ");
                Edit::new(g.o_start, g.o_end, g.c_start, g.c_end, replacement)
            })
            .collect();
        sort_by_position(&mut edits);
        Ok(edits)
    }
}

/// Compute the cheapest alignment of two token sequences
///
/// Ties are broken in a fixed order (match/substitute, transpose, delete,
/// insert) so the result is deterministic.
pub fn align_tokens(orig: &[Token], cor: &[Token], use_levenshtein: bool) -> Vec<AlignOp> {
    let (n, m) = (orig.len(), cor.len());
    let mut cost = vec![vec![0.0f64; m + 1]; n + 1];
    let mut back = vec![vec![Op::Match; m + 1]; n + 1];
    let lowered = LoweredTokens::new(orig, cor);
    let mut balance = vec![0i32; lowered.vocabulary];

    for i in 1..=n {
        cost[i][0] = i as f64;
        back[i][0] = Op::Delete;
    }
    for j in 1..=m {
        cost[0][j] = j as f64;
        back[0][j] = Op::Insert;
    }

    for i in 1..=n {
        for j in 1..=m {
            let (a, b) = (&orig[i - 1], &cor[j - 1]);
            let diagonal_op = if a.text == b.text { Op::Match } else { Op::Substitute };
            let diagonal = if lowered.same(i - 1, j - 1) {
                0.0
            } else {
                substitution_cost(a, b, use_levenshtein)
            };
            let mut best = (cost[i - 1][j - 1] + diagonal, diagonal_op);

            if !use_levenshtein {
                if let Some(k) = lowered.transposition(&cost, i, j, &mut balance) {
                    let candidate = cost[i - k][j - k] + (k - 1) as f64;
                    if candidate < best.0 - EPSILON {
                        best = (candidate, Op::Transpose(k));
                    }
                }
            }

            let deletion = cost[i - 1][j] + 1.0;
            if deletion < best.0 - EPSILON {
                best = (deletion, Op::Delete);
            }
            let insertion = cost[i][j - 1] + 1.0;
            if insertion < best.0 - EPSILON {
                best = (insertion, Op::Insert);
            }

            cost[i][j] = best.0;
            back[i][j] = best.1;
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        let op = back[i][j];
        let (di, dj) = match op {
            Op::Match | Op::Substitute => (1, 1),
            Op::Transpose(k) => (k, k),
            Op::Delete => (1, 0),
            Op::Insert => (0, 1),
            Op::Merged => (1, 1),
        };
        ops.push(AlignOp {
            op,
            o_start: i - di,
            o_end: i,
            c_start: j - dj,
            c_end: j,
        });
        i -= di;
        j -= dj;
    }
    ops.reverse();
    ops
}

/// Lower-cased tokens of both sentences, interned to small integer ids
struct LoweredTokens {
    orig: Vec<usize>,
    cor: Vec<usize>,
    vocabulary: usize,
}

impl LoweredTokens {
    fn new(orig: &[Token], cor: &[Token]) -> Self {
        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut intern = |token: &Token| {
            let next = ids.len();
            *ids.entry(token.lower()).or_insert(next)
        };
        let orig = orig.iter().map(&mut intern).collect();
        let cor = cor.iter().map(&mut intern).collect();
        Self {
            orig,
            cor,
            vocabulary: ids.len(),
        }
    }

    fn same(&self, i: usize, j: usize) -> bool {
        self.orig[i] == self.cor[j]
    }

    /// Length of the shortest reordering ending at cell `(i, j)`
    ///
    /// Walks back along the diagonal only while each step adds cost, and
    /// stops at the first span whose tokens are a permutation of each other.
    /// `balance` must be all zeros and is left that way.
    fn transposition(&self, cost: &[Vec<f64>], i: usize, j: usize, balance: &mut [i32]) -> Option<usize> {
        let mut unbalanced = 0usize;
        let mut found = None;
        let mut len = 0;
        loop {
            len += 1;
            for (id, delta) in [(self.orig[i - len], 1), (self.cor[j - len], -1)] {
                let before = balance[id];
                balance[id] += delta;
                if before == 0 {
                    unbalanced += 1;
                } else if balance[id] == 0 {
                    unbalanced -= 1;
                }
            }
            if len >= 2 && unbalanced == 0 && self.orig[i - len..i] != self.cor[j - len..j] {
                found = Some(len);
                break;
            }
            if len == i || len == j || cost[i - len][j - len] - cost[i - len - 1][j - len - 1] <= EPSILON {
                break;
            }
        }
        for back in 1..=len {
            balance[self.orig[i - back]] = 0;
            balance[self.cor[j - back]] = 0;
        }
        found
    }
}

fn substitution_cost(a: &Token, b: &Token, use_levenshtein: bool) -> f64 {
    if a.text == b.text || a.lower() == b.lower() {
        return 0.0;
    }
    if use_levenshtein {
        return 1.0;
    }

    let lemma_cost = if a.lemma == b.lemma { 0.0 } else { 0.499 };
    let pos_cost = if a.pos == b.pos {
        0.0
    } else if is_open(a) && is_open(b) {
        0.25
    } else {
        0.5
    };
    let char_cost = 1.0 - char_ratio(&a.text, &b.text);
    lemma_cost + pos_cost + char_cost
}

fn is_open(token: &Token) -> bool {
    OPEN_POS.contains(&token.pos.as_str())
}

/// Character similarity of two strings in `[0, 1]`: twice the matched
/// characters over the total length; two empty strings are identical
pub fn char_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio())
}

fn merge_ops(seq: &[AlignOp]) -> Vec<AlignOp> {
    match (seq.first(), seq.last()) {
        (Some(first), Some(last)) => vec![AlignOp {
            op: Op::Merged,
            o_start: first.o_start,
            o_end: last.o_end,
            c_start: first.c_start,
            c_end: last.c_end,
        }],
        _ => Vec::new(),
    }
}

fn split_all(alignment: &[AlignOp]) -> Vec<AlignOp> {
    alignment.iter().filter(|a| a.op != Op::Match).copied().collect()
}

fn merge_all(alignment: &[AlignOp]) -> Vec<AlignOp> {
    group_runs(alignment, |a| a.op != Op::Match)
        .into_iter()
        .filter(|run| run[0].op != Op::Match)
        .flat_map(merge_ops)
        .collect()
}

fn merge_equal(alignment: &[AlignOp]) -> Vec<AlignOp> {
    group_runs(alignment, |a| a.op.kind())
        .into_iter()
        .filter(|run| run[0].op != Op::Match)
        .flat_map(merge_ops)
        .collect()
}

/// Split `alignment` into maximal runs sharing the same key
fn group_runs<K: PartialEq>(alignment: &[AlignOp], key: impl Fn(&AlignOp) -> K) -> Vec<&[AlignOp]> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=alignment.len() {
        if i == alignment.len() || key(&alignment[i]) != key(&alignment[start]) {
            runs.push(&alignment[start..i]);
            start = i;
        }
    }
    runs
}

fn merge_by_rules(alignment: &[AlignOp], orig: &AnnotatedSentence, cor: &AnnotatedSentence) -> Vec<AlignOp> {
    let mut edits = Vec::new();
    let key = |a: &AlignOp| match a.op {
        Op::Match => 'M',
        Op::Transpose(_) => 'T',
        _ => '-',
    };
    for run in group_runs(alignment, key) {
        match run[0].op {
            Op::Match => {}
            // Transpositions are never merged
            Op::Transpose(_) => edits.extend_from_slice(run),
            _ => edits.extend(RuleMerger { orig, cor }.process(run)),
        }
    }
    edits
}

struct RuleMerger<'a> {
    orig: &'a AnnotatedSentence,
    cor: &'a AnnotatedSentence,
}

impl RuleMerger<'_> {
    /// Merge a run of S, D and I operations
    fn process(&self, seq: &[AlignOp]) -> Vec<AlignOp> {
        if seq.len() <= 1 {
            return seq.to_vec();
        }
        let ops: Vec<Op> = seq.iter().map(|a| a.op).collect();
        if ops.iter().all(|&op| op == Op::Delete) || ops.iter().all(|&op| op == Op::Insert) {
            return merge_ops(seq);
        }

        // Largest spans first; the sort is stable so equal sizes keep order
        let mut combos: Vec<(usize, usize)> = (0..seq.len())
            .flat_map(|s| (s + 1..seq.len()).map(move |e| (s, e)))
            .collect();
        combos.sort_by(|a, b| (b.1 - b.0).cmp(&(a.1 - a.0)));

        let mut content = false;
        for (start, end) in combos {
            if !ops[start..=end].contains(&Op::Substitute) {
                continue;
            }
            let o = self.orig.span(seq[start].o_start, seq[end].o_end);
            let c = self.cor.span(seq[start].c_start, seq[end].c_end);
            let (Some(o_first), Some(o_last), Some(c_first), Some(c_last)) =
                (o.first(), o.last(), c.first(), c.last())
            else {
                continue;
            };

            // Leading possessive suffix
            if start == 0 && (o_first.tag == "POS" || c_first.tag == "POS") {
                return [vec![seq[0]], self.process(&seq[1..])].concat();
            }
            // Trailing possessive suffix: [friends -> friend 's]
            if o_last.tag == "POS" || c_last.tag == "POS" {
                return self.around(seq, end - 1, end);
            }
            // Case change on the final token
            if o_last.lower() == c_last.lower() {
                // [Cat -> The big cat]
                if (start == 0 && o.len() == 1 && starts_upper(c_first)) || (c.len() == 1 && starts_upper(o_first)) {
                    return self.around(seq, start, end);
                }
                // [, we -> . We]
                if (o.len() > 1 && o[o.len() - 2].is_punct()) || (c.len() > 1 && c[c.len() - 2].is_punct()) {
                    return self.around(seq, end - 1, end);
                }
            }
            // Whitespace and hyphens: [bestfriend -> best friend]
            if squash(o) == squash(c) {
                return self.around(seq, start, end);
            }
            // Same POS, or a verb complex of different length: [to eat -> eating]
            let pos_set: HashSet<&str> = o.iter().chain(c.iter()).map(|t| t.pos.as_str()).collect();
            if o.len() != c.len()
                && (pos_set.len() == 1 || pos_set.iter().all(|p| matches!(*p, "AUX" | "PART" | "VERB")))
            {
                return self.around(seq, start, end);
            }
            if end - start < 2 {
                // Adjacent substitutions
                if o.len() == 2 && c.len() == 2 {
                    return [self.process(&seq[..start + 1]), self.process(&seq[start + 1..])].concat();
                }
                // Similar substitutions at the boundaries
                if (ops[start] == Op::Substitute && char_ratio(&o_first.text, &c_first.text) > 0.75)
                    || (ops[end] == Op::Substitute && char_ratio(&o_last.text, &c_last.text) > 0.75)
                {
                    return [self.process(&seq[..start + 1]), self.process(&seq[start + 1..])].concat();
                }
                // Final determiners
                let last = seq.len() - 1;
                if end == last
                    && ((matches!(ops[last], Op::Delete | Op::Substitute) && o_last.pos == "DET")
                        || (matches!(ops[last], Op::Insert | Op::Substitute) && c_last.pos == "DET"))
                {
                    return [self.process(&seq[..last]), vec![seq[last]]].concat();
                }
            }
            if pos_set.iter().any(|p| OPEN_POS.contains(p)) {
                content = true;
            }
        }

        if content { merge_ops(seq) } else { seq.to_vec() }
    }

    /// Process the parts before and after `start..=end`, merging that range
    fn around(&self, seq: &[AlignOp], start: usize, end: usize) -> Vec<AlignOp> {
        [
            self.process(&seq[..start]),
            merge_ops(&seq[start..=end]),
            self.process(&seq[end + 1..]),
        ]
        .concat()
    }
}

fn starts_upper(token: &Token) -> bool {
    token.text.chars().next().map(char::is_uppercase).unwrap_or(false)
}

/// Lower-cased concatenation without apostrophes or hyphens
fn squash(tokens: &[Token]) -> String {
    tokens
        .iter()
        .flat_map(|t| t.lower().chars().collect::<Vec<_>>())
        .filter(|c| *c != '\'' && *c != '-')
        .collect()
}
