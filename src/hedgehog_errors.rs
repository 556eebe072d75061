use thiserror::Error;

use crate::spines::csv_reader::ParseSpineError;

#[derive(Error, Debug)]
pub enum HedgehogError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Error while parsing the spine on line {line}: {source}")]
    SpineParse {
        line: u64,
        #[source]
        source: ParseSpineError,
    },

    #[error("Spine has {samples} samples but {positions} sample positions")]
    SamplePositionMismatch { samples: usize, positions: usize },

    #[error("Invalid analysis parameters: {0}")]
    InvalidAnalysisParams(String),
}

impl PartialEq for HedgehogError {
    fn eq(&self, other: &Self) -> bool {
        use HedgehogError::*;
        match (self, other) {
            // not comparable, equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (
                SpineParse {
                    line: la,
                    source: sa,
                },
                SpineParse {
                    line: lb,
                    source: sb,
                },
            ) => la == lb && sa == sb,
            (
                SamplePositionMismatch {
                    samples: sa,
                    positions: pa,
                },
                SamplePositionMismatch {
                    samples: sb,
                    positions: pb,
                },
            ) => sa == sb && pa == pb,
            (InvalidAnalysisParams(a), InvalidAnalysisParams(b)) => a == b,

            _ => false,
        }
    }
}
