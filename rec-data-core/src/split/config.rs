use serde::{Deserialize, Serialize};

use crate::accessor::DataAccessor;
use crate::error::Result;

use super::{DataSplitter, GivenNumberSplitter, RandomSplitOptions, RatioSplitter, StratifiedRandomSplitter};

/// Declarative description of a field-keyed splitter
///
/// ```json
/// {"type": "random", "field": "user", "ratio": 0.8, "seed": 7}
/// {"type": "ratio", "field": "user", "ratio": 0.8}
/// {"type": "given_number", "field": "user", "number": 5}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitterConfig {
    /// [`StratifiedRandomSplitter`]
    Random {
        /// Discrete field to stratify by
        field: String,

        /// Probability of a position going to training
        ratio: f64,

        /// Random seed
        #[serde(default)]
        seed: u64,
    },

    /// [`RatioSplitter`]
    Ratio {
        /// Discrete field to group by
        field: String,

        /// Share of every group going to training
        ratio: f64,
    },

    /// [`GivenNumberSplitter`]
    GivenNumber {
        /// Discrete field to group by
        field: String,

        /// Number of leading positions of every group going to training
        number: usize,
    },
}

impl SplitterConfig {
    /// Parse a splitter description from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the described splitter over `accessor`
    pub fn build<'a, A>(&self, accessor: &'a A) -> Result<Box<dyn DataSplitter<Accessor = A> + 'a>>
    where
        A: DataAccessor + ?Sized,
    {
        let splitter: Box<dyn DataSplitter<Accessor = A> + 'a> = match self {
            SplitterConfig::Random { field, ratio, seed } => {
                let options = RandomSplitOptions {
                    train_ratio: *ratio,
                    seed: *seed,
                };
                Box::new(StratifiedRandomSplitter::new(accessor, field, options)?)
            }
            SplitterConfig::Ratio { field, ratio } => Box::new(RatioSplitter::new(accessor, field, *ratio)?),
            SplitterConfig::GivenNumber { field, number } => {
                Box::new(GivenNumberSplitter::new(accessor, field, *number)?)
            }
        };
        Ok(splitter)
    }
}
