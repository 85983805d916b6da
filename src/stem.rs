use std::collections::HashMap;

/// Paice/Husk rule table. Each rule reads: reversed ending, optional `*`
/// (word must be intact), number of letters to remove, letters to append,
/// and `>` (continue) or `.` (stop).
const RULE_TABLE: &[&str] = &[
    "ai*2.", "a*1.", "bb1.", "city3s.", "ci2>", "cn1t>", "dd1.", "dei3y>", "deec2ss.", "dee1.",
    "de2>", "dooh4>", "e1>", "feil1v.", "fi2>", "gni3>", "gai3y.", "ga2>", "gg1.", "ht*2.",
    "hsiug5ct.", "hsi3>", "i*1.", "i1y>", "ji1d.", "juf1s.", "ju1d.", "jo1d.", "jeh1r.", "jrev1t.",
    "jsim2t.", "jn1d.", "j1s.", "lbaifi6.", "lbai4y.", "lba3>", "lbi3.", "lib2l>", "lc1.", "lufi4y.",
    "luf3>", "lu2.", "lai3>", "lau3>", "la2>", "ll1.", "mui3.", "mu*2.", "msi3>", "mm1.",
    "nois4j>", "noix4ct.", "noi3>", "nai3>", "na2>", "nee0.", "ne2>", "nn1.", "pihs4>", "pp1.",
    "re2>", "rae0.", "ra2.", "ro2>", "ru2>", "rr1.", "rt1>", "rei3y>", "sei3y>", "sis2.",
    "si2>", "ssen4>", "ss0.", "suo3>", "su*2.", "s*1>", "s0.", "tacilp4y.", "ta2>", "tnem4>",
    "tne3>", "tna3>", "tpir2b.", "tpro2b.", "tcud1.", "tpmus2.", "tpec2iv.", "tulo2v.", "tsis0.", "tsi3>",
    "tt1.", "uqi3.", "ugo1.", "vis3j>", "vie0.", "vi2>", "ylb1>", "yli3y>", "ylp0.", "yl2>",
    "ygo1.", "yhp1.", "ymo1.", "ypo1.", "yti3>", "yte3>", "ytl2.", "yrtsi5.", "yra3>", "yro3>",
    "yfi3.", "ycn2t>", "yca3>", "zi2>", "zy1s.",
];

#[derive(Debug, Clone, PartialEq, Eq)]
struct Rule {
    /// Word ending in reading order
    ending: Vec<char>,
    intact: bool,
    remove: usize,
    append: Vec<char>,
    proceed: bool,
}

impl Rule {
    fn parse(raw: &str) -> Option<Rule> {
        let chars: Vec<char> = raw.chars().collect();
        let mut pos = 0;

        let mut reversed = Vec::new();
        while pos < chars.len() && chars[pos].is_ascii_lowercase() {
            reversed.push(chars[pos]);
            pos += 1;
        }
        if reversed.is_empty() {
            return None;
        }

        let intact = chars.get(pos) == Some(&'*');
        if intact {
            pos += 1;
        }

        let remove = chars.get(pos)?.to_digit(10)? as usize;
        pos += 1;

        let mut append = Vec::new();
        while pos < chars.len() && chars[pos].is_ascii_lowercase() {
            append.push(chars[pos]);
            pos += 1;
        }

        let proceed = match chars.get(pos) {
            Some('>') => true,
            Some('.') | None => false,
            Some(_) => return None,
        };
        if pos + 1 < chars.len() {
            return None;
        }

        reversed.reverse();
        Some(Rule {
            ending: reversed,
            intact,
            remove,
            append,
            proceed,
        })
    }
}

/// Lancaster (Paice/Husk) stemmer
///
/// An aggressive iterative stemmer: rules are indexed by the final letter of
/// the word and applied repeatedly until a rule says stop or none matches.
#[derive(Debug, Clone)]
pub struct LancasterStemmer {
    rules: HashMap<char, Vec<Rule>>,
}

impl Default for LancasterStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl LancasterStemmer {
    pub fn new() -> Self {
        let mut rules: HashMap<char, Vec<Rule>> = HashMap::new();
        for rule in RULE_TABLE.iter().filter_map(|raw| Rule::parse(raw)) {
            if let Some(&key) = rule.ending.last() {
                rules.entry(key).or_default().push(rule);
            }
        }
        Self { rules }
    }

    /// Stem a single word. Input is lower-cased first.
    ///
    /// Only the leading alphabetic run is stemmed; anything after it
    /// (`'t` in `don't`) is kept as is.
    pub fn stem(&self, word: &str) -> String {
        let lowered: Vec<char> = word.to_lowercase().chars().collect();
        let letters = lowered.iter().take_while(|c| c.is_alphabetic()).count();
        let (intact, rest) = lowered.split_at(letters);
        let mut word = intact.to_vec();

        loop {
            let Some(candidates) = word.last().and_then(|c| self.rules.get(c)) else {
                break;
            };

            let mut applied = None;
            for rule in candidates {
                if !word.ends_with(&rule.ending) {
                    continue;
                }
                if rule.intact && word != intact {
                    continue;
                }
                if !acceptable(&word, rule.remove) {
                    continue;
                }
                word.truncate(word.len() - rule.remove);
                word.extend_from_slice(&rule.append);
                applied = Some(rule.proceed);
                break;
            }

            match applied {
                Some(true) => continue,
                _ => break,
            }
        }

        word.iter().chain(rest).collect()
    }
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// A stem must keep two letters when it starts with a vowel, otherwise three
/// letters with a vowel in second or third position.
fn acceptable(word: &[char], remove: usize) -> bool {
    if word.len() < remove || word.is_empty() {
        return false;
    }
    let remaining = word.len() - remove;
    if is_vowel(word[0]) {
        remaining >= 2
    } else {
        remaining >= 3 && (is_vowel(word[1]) || is_vowel(word[2]))
    }
}
