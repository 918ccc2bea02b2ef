use std::time::Duration;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use wana_kana::to_hiragana::to_hiragana;

use super::{LookupService, Segment, Transliteration};
use crate::config::LookupSection;
use crate::error::{Error, Result};

lazy_static! {
    static ref KANA_RE: Regex =
        Regex::new(r#"(?s)<[a-zA-Z]+[^>]*class="(?:[^"]*\s)?kana(?:\s[^"]*)?"[^>]*>(.*?)</"#)
            .unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Talks to the transliteration site, a Google-Translate-v2-style endpoint and a Yahoo
/// furigana-v2-style endpoint.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    client: reqwest::Client,
    transliterate_url: String,
    translate_url: String,
    reading_url: String,
    translate_api_key: Option<String>,
    reading_app_id: Option<String>,
}

impl HttpLookup {
    pub fn new(config: &LookupSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("couldn't build http client: {e}")))?;
        Ok(Self {
            client,
            transliterate_url: config.transliterate_url.clone(),
            translate_url: config.translate_url.clone(),
            reading_url: config.reading_url.clone(),
            translate_api_key: config.translate_api_key.clone(),
            reading_app_id: config.reading_app_id.clone(),
        })
    }

    /// Fails early when credentials are missing, so a batch doesn't get halfway first.
    pub fn check_credentials(&self) -> Result<()> {
        if self.translate_api_key.is_none() {
            return Err(Error::Config("no translation API key configured".into()));
        }
        if self.reading_app_id.is_none() {
            return Err(Error::Config("no reading service app id configured".into()));
        }
        Ok(())
    }
}

fn http_error(service: &'static str, word: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout {
            service,
            word: word.into(),
        }
    } else {
        Error::Lookup {
            service,
            word: word.into(),
            reason: e.to_string(),
        }
    }
}

/// Text of the first element carrying the `kana` class, if any.
fn extract_kana(html: &str) -> Option<String> {
    let inner = KANA_RE.captures(html)?.get(1)?.as_str();
    let text = TAG_RE.replace_all(inner, "");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

#[derive(Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Deserialize)]
struct ReadingResponse {
    result: Option<ReadingResult>,
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ReadingResult {
    #[serde(default)]
    word: Vec<ReadingWord>,
}

#[derive(Deserialize)]
struct ReadingWord {
    surface: String,
    furigana: Option<String>,
}

fn parse_reading(word: &str, body: ReadingResponse) -> Result<Vec<Segment>> {
    if let Some(err) = body.error {
        return Err(Error::Lookup {
            service: "reading",
            word: word.into(),
            reason: err.to_string(),
        });
    }
    let Some(result) = body.result else {
        return Err(Error::Lookup {
            service: "reading",
            word: word.into(),
            reason: "response has neither result nor error".into(),
        });
    };
    Ok(result
        .word
        .into_iter()
        .map(|w| {
            // kana-only segments come back without furigana
            let reading = w.furigana.unwrap_or_else(|| to_hiragana(&w.surface));
            Segment {
                surface: w.surface,
                reading,
            }
        })
        .collect())
}

impl LookupService for HttpLookup {
    async fn transliterate(&self, word: &str) -> Result<Transliteration> {
        let html = self
            .client
            .post(&self.transliterate_url)
            .form(&[("englishtext", word), ("prontype", "kana")])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| http_error("transliterate", word, e))?
            .text()
            .await
            .map_err(|e| http_error("transliterate", word, e))?;

        Ok(match extract_kana(&html) {
            Some(kana) => Transliteration::Found(kana),
            None => Transliteration::NotFound,
        })
    }

    async fn translate(&self, word: &str, target_locale: &str) -> Result<String> {
        let key = self
            .translate_api_key
            .as_deref()
            .ok_or_else(|| Error::Config("no translation API key configured".into()))?;
        let body: TranslateResponse = self
            .client
            .post(&self.translate_url)
            .query(&[("key", key)])
            .json(&json!({ "q": word, "target": target_locale, "format": "text" }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| http_error("translate", word, e))?
            .json()
            .await
            .map_err(|e| http_error("translate", word, e))?;

        body.data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| Error::Lookup {
                service: "translate",
                word: word.into(),
                reason: "empty translation list".into(),
            })
    }

    async fn reading(&self, text: &str) -> Result<Vec<Segment>> {
        let app_id = self
            .reading_app_id
            .as_deref()
            .ok_or_else(|| Error::Config("no reading service app id configured".into()))?;
        let body: ReadingResponse = self
            .client
            .post(&self.reading_url)
            .header(reqwest::header::USER_AGENT, format!("Yahoo AppID: {app_id}"))
            .json(&json!({
                "id": "1",
                "jsonrpc": "2.0",
                "method": "jlp.furiganaservice.furigana",
                "params": { "q": text, "grade": 1 },
            }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| http_error("reading", text, e))?
            .json()
            .await
            .map_err(|e| http_error("reading", text, e))?;

        let segments = parse_reading(text, body)?;
        debug!("reading of {} split into {} segments", text, segments.len());
        Ok(segments)
    }
}
