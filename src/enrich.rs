//! Turn ranked words into vocabulary entries by asking the lookup services about each one.
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LookupSection;
use crate::error::{Error, Result};
use crate::lookup::{join_readings, katakana_to_hiragana, LookupService, Throttle, Transliteration};
use crate::rank::RankedWordList;

/// One row of the vocabulary table. Field names are the table's column headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    #[serde(rename = "Word")]
    pub word: String,
    #[serde(rename = "Frequency")]
    pub frequency: usize,
    #[serde(rename = "Pronunciation (katakana)")]
    pub pronunciation_kana: String,
    #[serde(rename = "Pronunciation (hiragana)")]
    pub pronunciation_hira: String,
    #[serde(rename = "Translation (kanji)")]
    pub translation_script: String,
    #[serde(rename = "Translation (hiragana)")]
    pub translation_hira: String,
}

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    pub target_locale: String,
    pub placeholder: String,
    pub timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self::from(&LookupSection::default())
    }
}

impl From<&LookupSection> for EnrichOptions {
    fn from(config: &LookupSection) -> Self {
        Self {
            target_locale: config.target_locale.clone(),
            placeholder: config.placeholder.clone(),
            timeout: config.timeout(),
        }
    }
}

async fn bounded<T>(
    service: &'static str,
    word: &str,
    limit: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| Error::Timeout {
            service,
            word: word.into(),
        })?
}

/// Look up a single word. A missing or timed-out pronunciation becomes the placeholder;
/// any translation or reading failure is returned.
pub async fn enrich_word<L: LookupService>(
    lookup: &L,
    word: &str,
    frequency: usize,
    opts: &EnrichOptions,
) -> Result<VocabularyEntry> {
    let pronunciation_kana =
        match bounded("transliterate", word, opts.timeout, lookup.transliterate(word)).await {
            Ok(Transliteration::Found(kana)) => kana,
            Ok(Transliteration::NotFound) => {
                warn!("no pronunciation found for '{}', using placeholder", word);
                opts.placeholder.clone()
            }
            Err(e) if e.is_data_quality() => {
                warn!("{}, using placeholder", e);
                opts.placeholder.clone()
            }
            Err(e) => return Err(e),
        };
    let pronunciation_hira = katakana_to_hiragana(&pronunciation_kana);

    let translation_script = bounded(
        "translate",
        word,
        opts.timeout,
        lookup.translate(word, &opts.target_locale),
    )
    .await?;
    let segments = bounded(
        "reading",
        word,
        opts.timeout,
        lookup.reading(&translation_script),
    )
    .await
    .map_err(|e| match e {
        // report the English word, not the translation we asked about
        Error::Lookup { service, reason, .. } => Error::Lookup {
            service,
            word: word.into(),
            reason,
        },
        Error::Timeout { service, .. } => Error::Timeout {
            service,
            word: word.into(),
        },
        e => e,
    })?;
    let translation_hira = join_readings(&segments);

    debug!(
        "{} -> {} / {} ({})",
        word, pronunciation_kana, translation_script, translation_hira
    );
    Ok(VocabularyEntry {
        word: word.into(),
        frequency,
        pronunciation_kana,
        pronunciation_hira,
        translation_script,
        translation_hira,
    })
}

/// Enrich every ranked word in rank order. Each word waits its turn on `throttle`, which may be
/// shared with other batches running at the same time. Stops at the first escalated failure.
pub async fn enrich<L: LookupService>(
    words: &RankedWordList,
    lookup: &L,
    opts: &EnrichOptions,
    throttle: &Throttle,
) -> Result<Vec<VocabularyEntry>> {
    let mut entries = Vec::with_capacity(words.len());
    for (i, ranked) in words.iter().enumerate() {
        throttle.wait().await;
        entries.push(enrich_word(lookup, &ranked.word, ranked.frequency, opts).await?);
        if (i + 1) % 100 == 0 {
            info!("enriched {}/{} words", i + 1, words.len());
        }
    }
    Ok(entries)
}
