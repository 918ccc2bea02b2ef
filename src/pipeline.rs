//! Text → filtered tokens → ranked words → vocabulary table, for one grade at a time.
use std::path::PathBuf;
use std::sync::Arc;

use tokio::task;
use tracing::info;

use crate::corpus;
use crate::dict::{filter_words, DictionarySet};
use crate::enrich::{enrich, EnrichOptions};
use crate::error::Result;
use crate::grade::Grade;
use crate::lookup::{LookupService, Throttle};
use crate::rank::{rank, RankedWordList};
use crate::store::VocabularyStore;
use crate::tokenize::tokenize;

/// The offline half of the pipeline: no network calls.
pub fn mine(text: &str, dictionaries: &DictionarySet, limit: Option<usize>) -> RankedWordList {
    let tokens = tokenize(text);
    let token_count = tokens.len();
    let words = filter_words(tokens, dictionaries);
    info!(
        "{} tokens, {} passed the dictionary filter",
        token_count,
        words.len()
    );
    rank(words, limit)
}

/// Everything a grade needs that is shared across grades.
pub struct Pipeline<L, S> {
    pub dictionaries: Arc<DictionarySet>,
    pub lookup: Arc<L>,
    pub store: Arc<S>,
    pub options: EnrichOptions,
    /// One pace for every grade using this pipeline, however many run at once.
    pub throttle: Arc<Throttle>,
    pub data_dir: PathBuf,
    pub drop_first_and_last_pages: bool,
    pub limit: Option<usize>,
}

impl<L, S> Clone for Pipeline<L, S> {
    fn clone(&self) -> Self {
        Self {
            dictionaries: self.dictionaries.clone(),
            lookup: self.lookup.clone(),
            store: self.store.clone(),
            options: self.options.clone(),
            throttle: self.throttle.clone(),
            data_dir: self.data_dir.clone(),
            drop_first_and_last_pages: self.drop_first_and_last_pages,
            limit: self.limit,
        }
    }
}

impl<L: LookupService, S: VocabularyStore> Pipeline<L, S> {
    pub fn grade_dir(&self, grade: Grade) -> PathBuf {
        self.data_dir.join(grade.dir_name())
    }

    pub async fn read_text(&self, grade: Grade) -> Result<String> {
        let dir = self.grade_dir(grade);
        let drop = self.drop_first_and_last_pages;
        task::spawn_blocking(move || corpus::read_grade_text(&dir, drop))
            .await?
    }

    pub async fn rank_grade(&self, grade: Grade) -> Result<RankedWordList> {
        let text = self.read_text(grade).await?;
        Ok(mine(&text, &self.dictionaries, self.limit))
    }

    /// Mine, enrich and store one grade's list. Returns the table's location, if one was written.
    pub async fn make_list(&self, grade: Grade) -> Result<Option<PathBuf>> {
        info!("starting grade {}", grade);
        let words = self.rank_grade(grade).await?;
        let entries = enrich(
            &words,
            self.lookup.as_ref(),
            &self.options,
            &self.throttle,
        )
        .await?;
        let saved = self.store.save(grade, &entries)?;
        info!("finished grade {}", grade);
        Ok(saved)
    }
}

/// Plain-text dump of a ranked list, `word<TAB>count` per line.
pub fn format_ranked(words: &RankedWordList) -> String {
    words
        .iter()
        .map(|w| format!("{}\t{}\n", w.word, w.frequency))
        .collect()
}
