//! Split extracted document text into lowercase candidate words.
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[a-z']+").unwrap();
}

/// UTF-8 bytes of `’` read back as Windows-1252, which is how the text layer of some exam PDFs
/// hands us apostrophes.
const MOJIBAKE_APOSTROPHE: &str = "\u{e2}\u{20ac}\u{2122}";
const RIGHT_SINGLE_QUOTE: char = '\u{2019}';

/// Fold curly and mis-decoded apostrophes into `'` so contractions survive tokenizing.
pub fn normalize_apostrophes(text: &str) -> String {
    text.replace(MOJIBAKE_APOSTROPHE, "'")
        .replace(RIGHT_SINGLE_QUOTE, "'")
}

/// Every maximal run of ASCII letters and apostrophes, lowercased, in reading order.
/// Duplicates are kept; counting happens later.
pub fn tokenize(text: &str) -> Vec<String> {
    let text = normalize_apostrophes(text).to_lowercase();
    WORD_RE
        .find_iter(&text)
        .map(|m| m.as_str().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_contractions_together() {
        assert_eq!(tokenize("It’s a Test."), vec!["it's", "a", "test"]);
    }

    #[test]
    fn repairs_mojibake_apostrophe() {
        assert_eq!(tokenize("Don\u{e2}\u{20ac}\u{2122}t stop"), vec!["don't", "stop"]);
    }

    #[test]
    fn splits_on_digits_and_punctuation() {
        assert_eq!(
            tokenize("Question 12: (A) choose-one\nNEXT"),
            vec!["question", "a", "choose", "one", "next"]
        );
    }

    #[test]
    fn drops_non_ascii_letters() {
        // only the ascii runs on either side of the accented letter survive
        assert_eq!(tokenize("café 日本 ok"), vec!["caf", "ok"]);
    }

    #[test]
    fn every_token_is_lowercase_ascii_or_apostrophe() {
        let text = "The QUICK brown fox’s 3 jumps — over 'the' lazy dog!";
        for token in tokenize(text) {
            assert!(!token.is_empty());
            assert!(token.chars().all(|c| c.is_ascii_lowercase() || c == '\''));
        }
    }

    #[test]
    fn empty_text_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("123 ... !!!").is_empty());
    }
}
