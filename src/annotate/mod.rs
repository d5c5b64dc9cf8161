// Move text tokenizing and search-statistic extraction
pub mod stats;
pub mod tokenizer;

pub use stats::{extract, Annotation, Depth, Dialect, Score, Statistic, StatisticError, SuffixPolicy};
pub use tokenizer::{tokenize, RawPly};
