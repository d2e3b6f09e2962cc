use lazy_static::lazy_static;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref DEFAULT_STOPWORDS: Vec<&'static str> = vec![
        "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
        "be","because","been","before","being","below","between","both","but","by",
        "can","can't","cannot","could","couldn't",
        "did","didn't","do","does","doesn't","doing","don't","down","during",
        "each","few","for","from","further",
        "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
        "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
        "let's","me","more","most","mustn't","my","myself",
        "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
        "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
        "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
        "under","until","up","very",
        "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
        "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
    ];
}

/// Turns raw text into the stem sequence fed to the index and the query
/// engine. Owns its stop-word set and stemmer; no process-wide state.
pub struct Normalizer {
    stemmer: Stemmer,
    stopwords: HashSet<String>,
}

impl Normalizer {
    pub fn new(stopwords: HashSet<String>) -> Self {
        Self { stemmer: Stemmer::create(Algorithm::English), stopwords }
    }

    /// Built-in English stop-word list.
    pub fn with_default_stopwords() -> Self {
        Self::new(DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect())
    }

    /// Line-oriented stop-word file, one word per line, surrounding
    /// whitespace trimmed. The list is assumed lower-case.
    pub fn from_stopword_file<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let f = File::open(path)?;
        let mut stopwords = HashSet::new();
        for line in BufReader::new(f).lines() {
            let word = line?.trim().to_string();
            if !word.is_empty() {
                stopwords.insert(word);
            }
        }
        Ok(Self::new(stopwords))
    }

    /// Normalization steps, in order: NFKC, replace `.`/`-` with spaces,
    /// split on whitespace, drop fully-numeric tokens, strip punctuation
    /// and lower-case, drop stop words, stem, drop empty stems. Each token
    /// goes through the steps in sequence; a drop short-circuits to the
    /// next token. Stem order follows the input text.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let text: String = text
            .nfkc()
            .map(|c| if c == '.' || c == '-' { ' ' } else { c })
            .collect();

        let mut stems = Vec::new();
        for word in text.split_whitespace() {
            // `.`-separated abbreviations were already split apart above,
            // so ph.d becomes two tokens rather than one junk token.
            if word.chars().all(|c| c.is_numeric()) {
                continue;
            }
            let token: String = word
                .chars()
                .filter(|c| !c.is_ascii_punctuation())
                .flat_map(|c| c.to_lowercase())
                .collect();
            if self.stopwords.contains(token.as_str()) {
                continue;
            }
            let stem = self.stemmer.stem(&token).to_string();
            if stem.is_empty() {
                continue;
            }
            stems.push(stem);
        }
        stems
    }
}
