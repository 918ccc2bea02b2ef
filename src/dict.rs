//! Regional spelling dictionaries, and the filter that keeps only words they recognise.
use std::fs;
use std::path::{Path, PathBuf};

use fxhash::FxHashSet;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// The dictionaries consulted by default: generic English plus four regional spellings.
pub const DEFAULT_DICTIONARIES: [&str; 5] = ["en", "en_US", "en_GB", "en_CA", "en_AU"];

pub trait WordValidator: Send + Sync {
    fn name(&self) -> &str;
    fn check(&self, word: &str) -> bool;
}

/// A flat, fully inflected word list held in memory.
#[derive(Debug, Clone)]
pub struct WordList {
    name: String,
    words: FxHashSet<String>,
}

impl WordList {
    pub fn new(name: impl Into<String>, words: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a one-word-per-line list. A leading entry count (as in hunspell `.dic` files) is
    /// skipped. Entries carrying `/FLAGS` are rejected: they only mean something together with
    /// the matching `.aff` rules, and matching bare stems would silently drop every inflection.
    pub fn parse(name: impl Into<String>, contents: &str) -> Result<Self> {
        let name = name.into();
        match parse_words(contents) {
            Ok(words) => Ok(Self::new(name, words)),
            Err(reason) => Err(Error::DictionaryUnavailable {
                name,
                path: PathBuf::new(),
                reason,
            }),
        }
    }

    /// Looks for `<name>.dic` then `<name>.txt` under `dir`.
    pub fn load(dir: &Path, name: &str) -> Result<Self> {
        let candidates = [
            dir.join(format!("{name}.dic")),
            dir.join(format!("{name}.txt")),
        ];
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            return Err(Error::DictionaryUnavailable {
                name: name.into(),
                path: candidates[0].clone(),
                reason: "no .dic or .txt word list found".into(),
            });
        };
        let unavailable = |reason: String| Error::DictionaryUnavailable {
            name: name.into(),
            path: path.clone(),
            reason,
        };
        let contents = fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
        let list = Self::new(name, parse_words(&contents).map_err(unavailable)?);
        if list.is_empty() {
            return Err(unavailable("word list is empty".into()));
        }
        debug!("loaded {} words for dictionary {}", list.len(), name);
        Ok(list)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn parse_words(contents: &str) -> std::result::Result<Vec<String>, String> {
    let mut lines = contents.lines().map(str::trim).peekable();
    if lines
        .peek()
        .map_or(false, |l| !l.is_empty() && l.chars().all(|c| c.is_ascii_digit()))
    {
        lines.next();
    }
    lines
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split(['\t', ' ']).next())
        .map(|w| match w.split_once('/') {
            Some((stem, flags)) if !flags.is_empty() => Err(format!(
                "entry '{w}' carries affix flags; '{stem}' would match without its inflections, \
                 supply a fully inflected word list instead"
            )),
            _ => Ok(w.trim_end_matches('/').to_owned()),
        })
        .filter(|w| w.as_ref().map_or(true, |w| !w.is_empty()))
        .collect()
}

impl WordValidator for WordList {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, word: &str) -> bool {
        self.words.contains(word)
    }
}

/// Any-of combination: a word is real if at least one dictionary knows it, so regional
/// variants like "color" and "colour" both pass.
pub struct DictionarySet {
    validators: Vec<Box<dyn WordValidator>>,
}

impl std::fmt::Debug for DictionarySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|v| v.name()))
            .finish()
    }
}

impl DictionarySet {
    pub fn new(validators: Vec<Box<dyn WordValidator>>) -> Result<Self> {
        if validators.is_empty() {
            return Err(Error::DictionaryUnavailable {
                name: "<none>".into(),
                path: PathBuf::new(),
                reason: "no dictionaries configured".into(),
            });
        }
        Ok(Self { validators })
    }

    pub fn load(dir: &Path, names: &[String]) -> Result<Self> {
        let validators = names
            .iter()
            .map(|name| WordList::load(dir, name).map(|l| Box::new(l) as Box<dyn WordValidator>))
            .collect::<Result<Vec<_>>>()?;
        let set = Self::new(validators)?;
        info!("using dictionaries {:?} from {}", set, dir.display());
        Ok(set)
    }

    pub fn check(&self, word: &str) -> bool {
        self.validators.iter().any(|v| v.check(word))
    }
}

/// Drop single letters and anything no dictionary recognises. Order and repeats are preserved.
pub fn filter_words(
    tokens: impl IntoIterator<Item = String>,
    dictionaries: &DictionarySet,
) -> Vec<String> {
    tokens
        .into_iter()
        .filter(|t| t.chars().count() > 1)
        .filter(|t| dictionaries.check(t))
        .collect()
}
