//! External pronunciation, translation and reading services.
use std::future::Future;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::Result;

mod http;

pub use http::HttpLookup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transliteration {
    Found(String),
    NotFound,
}

/// One morpheme of a reading response, with its hiragana reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub surface: String,
    pub reading: String,
}

pub trait LookupService: Send + Sync {
    /// Katakana approximation of how an English word sounds.
    fn transliterate(&self, word: &str) -> impl Future<Output = Result<Transliteration>> + Send;

    fn translate(&self, word: &str, target_locale: &str)
        -> impl Future<Output = Result<String>> + Send;

    /// Segment `text` and give each piece's reading, in order.
    fn reading(&self, text: &str) -> impl Future<Output = Result<Vec<Segment>>> + Send;
}

/// Glue the per-segment readings back into one continuous reading.
pub fn join_readings(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.reading.as_str()).collect()
}

/// Map katakana to the matching hiragana code points. The long vowel mark and anything that
/// isn't katakana pass through untouched.
pub fn katakana_to_hiragana(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{30a1}'..='\u{30f6}' | '\u{30fd}'..='\u{30fe}' => {
                char::from_u32(c as u32 - 0x60).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Keeps consecutive calls at least `period` apart, across every task holding the same
/// throttle. Waiters are let through in arrival order.
#[derive(Debug)]
pub struct Throttle {
    period: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last.lock().await;
        if let Some(prev) = *last {
            tokio::time::sleep_until(prev + self.period).await;
        }
        *last = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn katakana_maps_to_hiragana() {
        assert_eq!(katakana_to_hiragana("アップル"), "あっぷる");
        assert_eq!(katakana_to_hiragana("ヴァイオリン"), "ゔぁいおりん");
    }

    #[test]
    fn long_vowel_mark_and_latin_pass_through() {
        assert_eq!(katakana_to_hiragana("コーヒー"), "こーひー");
        assert_eq!(katakana_to_hiragana("none"), "none");
        assert_eq!(katakana_to_hiragana("ひらがな"), "ひらがな");
    }

    #[test]
    fn readings_concatenate_without_separator() {
        let segments = vec![
            Segment {
                surface: "大".into(),
                reading: "だい".into(),
            },
            Segment {
                surface: "好き".into(),
                reading: "すき".into(),
            },
        ];
        assert_eq!(join_readings(&segments), "だいすき");
        assert_eq!(join_readings(&[]), "");
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_spaces_calls() {
        let throttle = Throttle::new(Duration::from_millis(200));
        let start = Instant::now();
        throttle.wait().await;
        assert!(start.elapsed() < Duration::from_millis(200));
        throttle.wait().await;
        throttle.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn shared_throttle_spaces_concurrent_callers() {
        let throttle = std::sync::Arc::new(Throttle::new(Duration::from_millis(300)));
        let start = Instant::now();
        let tasks: Vec<_> = (0..3)
            .map(|_| {
                let throttle = throttle.clone();
                tokio::spawn(async move {
                    throttle.wait().await;
                    start.elapsed()
                })
            })
            .collect();
        let mut times = vec![];
        for task in tasks {
            times.push(task.await.unwrap());
        }
        times.sort();
        assert!(times[1] - times[0] >= Duration::from_millis(300));
        assert!(times[2] - times[1] >= Duration::from_millis(300));
    }
}
