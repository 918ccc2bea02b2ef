use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::grade::Grade;

/// Mine Eiken exam papers for vocabulary and lay out flashcards for duplex printing.
#[derive(Clone, Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ./eikenvocab.toml when present)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Build the vocabulary tables, looking up pronunciations and translations
    MakeLists(MakeListsArgs),
    /// Print word frequencies for a grade without any online lookups
    Rank(RankArgs),
    /// Reorder a rendered flashcard PDF for two-up duplex printing
    Reorder(ReorderArgs),
}

#[derive(Clone, Debug, Args)]
pub struct GradeArgs {
    /// Grade to process (5, 4, 3, p2, 2, p1, 1). Can be repeated; defaults to all grades
    #[clap(long = "grade", short = 'g')]
    pub grades: Vec<Grade>,
    /// Directory holding one grade_<code> folder of exam papers per grade
    #[clap(long, short = 'd')]
    pub datapath: Option<PathBuf>,
    /// Maximum number of words per list
    #[clap(long, short = 'l')]
    pub wordlimit: Option<usize>,
}

impl GradeArgs {
    pub fn grades(&self) -> Vec<Grade> {
        if self.grades.is_empty() {
            Grade::ALL.to_vec()
        } else {
            self.grades.clone()
        }
    }
}

#[derive(Clone, Debug, Args)]
pub struct MakeListsArgs {
    #[command(flatten)]
    pub grades: GradeArgs,
    /// Where the vocabulary tables are written
    #[clap(long, short = 'o')]
    pub outputpath: Option<PathBuf>,
    /// Process grades concurrently
    #[clap(long)]
    pub parallel: bool,
}

#[derive(Clone, Debug, Args)]
pub struct RankArgs {
    #[command(flatten)]
    pub grades: GradeArgs,
}

#[derive(Clone, Debug, Args)]
pub struct ReorderArgs {
    /// Rendered flashcard PDF (front, back, front, back, ...)
    pub input: PathBuf,
    /// Output file, defaults to <input>.duplex.pdf
    #[clap(long, short = 'o')]
    pub output: Option<PathBuf>,
}
