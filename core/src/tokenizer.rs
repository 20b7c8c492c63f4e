use crate::query::Normalize;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
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
        words.iter().copied().collect()
    };
}

/// Turns raw text into index terms: NFKC normalization, lowercase, word
/// extraction, stopword removal and optional English stemming.
///
/// Documents and queries must go through the same normalizer or lookups miss.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    /// Replaces the built-in English list when set.
    stopwords: Option<HashSet<String>>,
    stem: bool,
}

impl Normalizer {
    pub fn new() -> Self { Self::default() }

    pub fn with_stemming(mut self, stem: bool) -> Self {
        self.stem = stem;
        self
    }

    pub fn with_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stopwords = Some(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect());
        self
    }

    /// Loads a whitespace-separated stopword file in place of the built-in list.
    pub fn with_stopwords_file<P: AsRef<Path>>(self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).with_context(|| format!("reading stopwords from {}", path.display()))?;
        let normalizer = self.with_stopwords(text.split_whitespace());
        tracing::info!(count = normalizer.stopword_count(), path = %path.display(), "loaded stopwords");
        Ok(normalizer)
    }

    pub fn stopword_count(&self) -> usize {
        match &self.stopwords {
            Some(words) => words.len(),
            None => STOPWORDS.len(),
        }
    }

    fn is_stopword(&self, token: &str) -> bool {
        match &self.stopwords {
            Some(words) => words.contains(token),
            None => STOPWORDS.contains(token),
        }
    }

    /// Tokenize text into (term, position). Positions count every extracted
    /// word, stopwords included.
    pub fn tokenize(&self, text: &str) -> Vec<(String, usize)> {
        let normalized = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();
        for (pos, mat) in RE.find_iter(&normalized).enumerate() {
            let token = mat.as_str();
            if self.is_stopword(token) { continue; }
            let term = if self.stem { STEMMER.stem(token).to_string() } else { token.to_string() };
            tokens.push((term, pos));
        }
        tokens
    }
}

impl Normalize for Normalizer {
    fn clean(&self, text: &str) -> Vec<String> {
        self.tokenize(text).into_iter().map(|(term, _)| term).collect()
    }
}
