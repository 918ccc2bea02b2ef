use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Eiken exam levels, easiest first. The `Pre-` grades sit between their neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Grade {
    Five,
    Four,
    Three,
    PreTwo,
    Two,
    PreOne,
    One,
}

#[derive(Debug, Error)]
#[error("unknown grade '{0}', expected one of 5, 4, 3, p2, 2, p1, 1")]
pub struct ParseGradeError(String);

impl Grade {
    pub const ALL: [Grade; 7] = [
        Grade::Five,
        Grade::Four,
        Grade::Three,
        Grade::PreTwo,
        Grade::Two,
        Grade::PreOne,
        Grade::One,
    ];

    /// Short code used on the command line and in file names.
    pub fn code(self) -> &'static str {
        match self {
            Grade::Five => "5",
            Grade::Four => "4",
            Grade::Three => "3",
            Grade::PreTwo => "p2",
            Grade::Two => "2",
            Grade::PreOne => "p1",
            Grade::One => "1",
        }
    }

    /// Label printed on the cards, e.g. `Pre-2`.
    pub fn label(self) -> String {
        self.code().replace('p', "Pre-")
    }

    pub fn dir_name(self) -> String {
        format!("grade_{}", self.code())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Grade {
    type Err = ParseGradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let s = s.strip_prefix("pre-").map_or(s.clone(), |rest| format!("p{rest}"));
        Grade::ALL
            .into_iter()
            .find(|g| g.code() == s)
            .ok_or(ParseGradeError(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_codes_and_labels() {
        assert_eq!("p2".parse::<Grade>().unwrap(), Grade::PreTwo);
        assert_eq!("Pre-1".parse::<Grade>().unwrap(), Grade::PreOne);
        assert_eq!(" 5 ".parse::<Grade>().unwrap(), Grade::Five);
        assert!("p3".parse::<Grade>().is_err());
        assert!("".parse::<Grade>().is_err());
    }

    #[test]
    fn labels_and_dirs() {
        assert_eq!(Grade::PreTwo.label(), "Pre-2");
        assert_eq!(Grade::Three.label(), "3");
        assert_eq!(Grade::PreOne.dir_name(), "grade_p1");
    }

    #[test]
    fn every_code_round_trips() {
        for grade in Grade::ALL {
            assert_eq!(grade.code().parse::<Grade>().unwrap(), grade);
        }
    }
}
