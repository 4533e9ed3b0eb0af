//! Sentence splitting for synthesis chunking.
//!
//! A punctuation heuristic: every `.`, `?` and `!` ends a sentence unless a
//! rule recognizes it as part of a title, acronym, decimal number, domain,
//! ellipsis or company suffix. The word lists those rules use are plain data
//! in [`SentenceRules`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Stand-in for a period that must not end a sentence.
const PROTECTED_PERIOD: char = '\u{E000}';
/// Sentence boundary marker.
const STOP: char = '\u{E001}';

/// Word lists driving the boundary heuristic.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceRules {
    /// Titles written with a trailing period ("Dr. Smith").
    pub titles: Vec<String>,
    /// Company/person suffixes ("Acme Inc.", "John Jr.").
    pub suffixes: Vec<String>,
    /// Words that open a new sentence when they follow an acronym or a
    /// company suffix ("U.S. He", "Acme Inc. They").
    pub starters: Vec<String>,
    /// Domain endings ("example.com").
    pub domains: Vec<String>,
}

impl Default for SentenceRules {
    fn default() -> Self {
        let list = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            titles: list(&[
                "Mr", "St", "Mrs", "Ms", "Dr", "Prof", "Capt", "Cpt", "Lt", "Mt",
            ]),
            suffixes: list(&["Inc", "Ltd", "Jr", "Sr", "Co"]),
            starters: list(&[
                "Mr", "Mrs", "Ms", "Dr", "Prof", "Capt", "Cpt", "Lt", "He", "She", "It", "They",
                "Their", "Our", "We", "But", "However", "That", "This", "Wherever",
            ]),
            domains: list(&["com", "net", "org", "io", "gov", "edu", "me"]),
        }
    }
}

/// A rewrite step: every match of `pattern` becomes `replacement`.
#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    replacement: String,
}

/// Splits a document into sentences.
///
/// Construction compiles the rules once; [`tokenize`](Self::tokenize) is a
/// pure function of its input.
#[derive(Debug, Clone)]
pub struct SentenceTokenizer {
    rules: Vec<Rule>,
}

impl Default for SentenceTokenizer {
    fn default() -> Self {
        Self::new(&SentenceRules::default())
    }
}

fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

impl SentenceTokenizer {
    /// Build a tokenizer from the given word lists.
    pub fn new(rules: &SentenceRules) -> Self {
        let prd = PROTECTED_PERIOD;
        let stop = STOP;
        let titles = alternation(&rules.titles);
        let suffixes = alternation(&rules.suffixes);
        let starters = format!(r"(?:{})\b", alternation(&rules.starters));
        let domains = alternation(&rules.domains);
        let acronym = r"([A-Z][.][A-Z][.](?:[A-Z][.])?)";

        let specs: Vec<(String, String)> = vec![
            (format!(r"({titles})[.]"), format!("${{1}}{prd}")),
            (format!(r"[.]({domains})"), format!("{prd}${{1}}")),
            (r"([0-9])[.]([0-9])".to_string(), format!("${{1}}{prd}${{2}}")),
            (r"\.\.\.".to_string(), format!("{prd}{prd}{prd}")),
            (r"Ph\.D\.".to_string(), format!("Ph{prd}D{prd}")),
            (r"\s([A-Za-z])[.] ".to_string(), format!(" ${{1}}{prd} ")),
            (
                format!(r"{acronym} ({starters})"),
                format!("${{1}}{stop} ${{2}}"),
            ),
            (
                r"([A-Za-z])[.]([A-Za-z])[.]([A-Za-z])[.]".to_string(),
                format!("${{1}}{prd}${{2}}{prd}${{3}}{prd}"),
            ),
            (
                r"([A-Za-z])[.]([A-Za-z])[.]".to_string(),
                format!("${{1}}{prd}${{2}}{prd}"),
            ),
            (
                format!(r" ({suffixes})[.] ({starters})"),
                format!(" ${{1}}{prd}{stop} ${{2}}"),
            ),
            (format!(r" ({suffixes})[.]"), format!(" ${{1}}{prd}")),
            (r" ([A-Za-z])[.]".to_string(), format!(" ${{1}}{prd}")),
        ];

        // Word lists are escaped, so every pattern compiles.
        let rules = specs
            .into_iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(&pattern).ok().map(|pattern| Rule {
                    pattern,
                    replacement,
                })
            })
            .collect();

        Self { rules }
    }

    /// Split `text` into sentences, in order.
    ///
    /// Newlines become spaces, so no sentence keeps a line break. Empty
    /// input yields no sentences; input without terminal punctuation yields
    /// exactly one.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut work = format!(" {}  ", text.replace(['\r', '\n'], " "));

        for rule in &self.rules {
            work = rule
                .pattern
                .replace_all(&work, rule.replacement.as_str())
                .into_owned();
        }

        // Keep closing quotes inside the sentence they end.
        work = work
            .replace(".\u{201d}", "\u{201d}.")
            .replace(".\"", "\".")
            .replace("!\"", "\"!")
            .replace("?\"", "\"?")
            .replace("...", &PROTECTED_PERIOD.to_string().repeat(3));

        let mut marked = String::with_capacity(work.len() + 16);
        for c in work.chars() {
            match c {
                '.' | '?' | '!' => {
                    marked.push(c);
                    marked.push(STOP);
                }
                PROTECTED_PERIOD => marked.push('.'),
                other => marked.push(other),
            }
        }

        marked
            .split(STOP)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

static DEFAULT_TOKENIZER: Lazy<SentenceTokenizer> = Lazy::new(SentenceTokenizer::default);

/// Tokenize with the default rules.
pub fn tokenize(text: &str) -> Vec<String> {
    DEFAULT_TOKENIZER.tokenize(text)
}
