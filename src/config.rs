//! `eikenvocab.toml` loading. Every key is optional.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::dict::DEFAULT_DICTIONARIES;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "eikenvocab.toml";
pub const TRANSLATE_KEY_ENV: &str = "EIKENVOCAB_TRANSLATE_API_KEY";
pub const READING_APP_ID_ENV: &str = "EIKENVOCAB_READING_APP_ID";

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub dictionaries: DictionariesSection,
    #[serde(default)]
    pub lookup: LookupSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub corpus: CorpusSection,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DictionariesSection {
    /// Directory holding `<name>.dic` or `<name>.txt` word lists.
    pub dir: PathBuf,
    pub names: Vec<String>,
}

impl Default for DictionariesSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("dictionaries"),
            names: DEFAULT_DICTIONARIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LookupSection {
    pub transliterate_url: String,
    pub translate_url: String,
    pub reading_url: String,
    pub target_locale: String,
    pub translate_api_key: Option<String>,
    pub reading_app_id: Option<String>,
    pub timeout_secs: u64,
    /// Minimum gap between words, to stay under the providers' rate limits.
    pub throttle_ms: u64,
    /// Stand-in pronunciation when the transliteration site has nothing for a word.
    pub placeholder: String,
}

impl Default for LookupSection {
    fn default() -> Self {
        Self {
            transliterate_url: "https://freeenglish.jp/convertp.php".into(),
            translate_url: "https://translation.googleapis.com/language/translate/v2".into(),
            reading_url: "https://jlp.yahooapis.jp/FuriganaService/V2/furigana".into(),
            target_locale: "ja".into(),
            translate_api_key: None,
            reading_app_id: None,
            timeout_secs: 30,
            throttle_ms: 250,
            placeholder: "none".into(),
        }
    }
}

impl LookupSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct CorpusSection {
    /// Skip the cover and back page of every exam PDF.
    pub drop_first_and_last_pages: bool,
}

impl Default for CorpusSection {
    fn default() -> Self {
        Self {
            drop_first_and_last_pages: true,
        }
    }
}

impl AppConfig {
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// An explicit path must exist; otherwise `eikenvocab.toml` in the working directory is used
    /// if present, and defaults if not. Credentials from the environment win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                debug!("no {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config = Self::parse(&contents)?;
        // relative dictionary dirs are relative to the config file
        if config.dictionaries.dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.dictionaries.dir = parent.join(&config.dictionaries.dir);
            }
        }
        Ok(config)
    }

    pub(crate) fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(key) = var(TRANSLATE_KEY_ENV).filter(|v| !v.is_empty()) {
            self.lookup.translate_api_key = Some(key);
        }
        if let Some(id) = var(READING_APP_ID_ENV).filter(|v| !v.is_empty()) {
            self.lookup.reading_app_id = Some(id);
        }
    }
}
