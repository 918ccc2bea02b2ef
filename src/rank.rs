use fxhash::FxHashMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedWord {
    pub word: String,
    pub frequency: usize,
}

/// Distinct words, most frequent first. Words with equal counts stay in the order they were
/// first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedWordList(Vec<RankedWord>);

impl RankedWordList {
    pub fn iter(&self) -> std::slice::Iter<'_, RankedWord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|w| w.word.as_str())
    }

    /// Feed the list back through the ranker, e.g. to apply a tighter limit.
    pub fn rerank(&self, limit: Option<usize>) -> Self {
        rank_counts(self.iter().map(|w| (w.word.clone(), w.frequency)), limit)
    }
}

impl<'a> IntoIterator for &'a RankedWordList {
    type Item = &'a RankedWord;
    type IntoIter = std::slice::Iter<'a, RankedWord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Count each token and rank them. `limit = None` keeps every distinct word.
pub fn rank(tokens: impl IntoIterator<Item = String>, limit: Option<usize>) -> RankedWordList {
    rank_counts(tokens.into_iter().map(|t| (t, 1)), limit)
}

/// Like [`rank`], but over pre-counted `(word, count)` pairs. Repeated words are summed.
pub fn rank_counts(
    counts: impl IntoIterator<Item = (String, usize)>,
    limit: Option<usize>,
) -> RankedWordList {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut ranked: Vec<RankedWord> = vec![];

    for (word, count) in counts {
        match index.get(&word) {
            Some(&i) => ranked[i].frequency += count,
            None => {
                index.insert(word.clone(), ranked.len());
                ranked.push(RankedWord {
                    word,
                    frequency: count,
                });
            }
        }
    }

    // stable, so ties keep first-seen order
    ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    RankedWordList(ranked)
}
