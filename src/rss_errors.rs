use thiserror::Error;

#[derive(Error, Debug)]
pub enum RssError {
    #[error("Keyword {0} is missing from the observation log")]
    MissingKeyword(String),

    #[error("Keyword {keyword} has {found} values for {expected} files")]
    ColumnLengthMismatch {
        keyword: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid value {value:?} for keyword {keyword} in {file}")]
    InvalidHeaderValue {
        keyword: String,
        file: String,
        value: String,
    },

    #[error("Cannot read an image number from file name: {0}")]
    InvalidImageName(String),

    #[error("Invalid observation date: {0}")]
    InvalidObservationDate(String),

    #[error("File {0} is not listed in the observation log")]
    FileNotInLog(String),

    #[error("Invalid partition parameter: {0}")]
    InvalidPartitionParameter(String),

    #[error("Cannot calibrate any images: no arc found for any configuration")]
    NoArcsToCalibrate,

    #[error("Invalid dated file pattern (expected a yyyymmdd_vnn placeholder): {0}")]
    InvalidDatedPattern(String),

    #[error("No calibration record in {file} applies to {date}")]
    NoCalibrationRecord { file: String, date: u32 },

    #[error("Invalid calibration value in {file}: {reason}")]
    InvalidCalibrationValue { file: String, reason: String },

    #[error("Unknown grating: {0}")]
    UnknownGrating(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

impl PartialEq for RssError {
    fn eq(&self, other: &Self) -> bool {
        use RssError::*;
        match (self, other) {
            (MissingKeyword(a), MissingKeyword(b)) => a == b,
            (
                ColumnLengthMismatch {
                    keyword: k1,
                    expected: e1,
                    found: f1,
                },
                ColumnLengthMismatch {
                    keyword: k2,
                    expected: e2,
                    found: f2,
                },
            ) => k1 == k2 && e1 == e2 && f1 == f2,
            (
                InvalidHeaderValue {
                    keyword: k1,
                    file: f1,
                    value: v1,
                },
                InvalidHeaderValue {
                    keyword: k2,
                    file: f2,
                    value: v2,
                },
            ) => k1 == k2 && f1 == f2 && v1 == v2,
            (InvalidImageName(a), InvalidImageName(b)) => a == b,
            (InvalidObservationDate(a), InvalidObservationDate(b)) => a == b,
            (FileNotInLog(a), FileNotInLog(b)) => a == b,
            (InvalidPartitionParameter(a), InvalidPartitionParameter(b)) => a == b,
            (InvalidDatedPattern(a), InvalidDatedPattern(b)) => a == b,
            (
                NoCalibrationRecord { file: f1, date: d1 },
                NoCalibrationRecord { file: f2, date: d2 },
            ) => f1 == f2 && d1 == d2,
            (
                InvalidCalibrationValue {
                    file: f1,
                    reason: r1,
                },
                InvalidCalibrationValue {
                    file: f2,
                    reason: r2,
                },
            ) => f1 == f2 && r1 == r2,
            (UnknownGrating(a), UnknownGrating(b)) => a == b,

            // not comparable, same variant is enough
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (NoArcsToCalibrate, NoArcsToCalibrate) => true,

            _ => false,
        }
    }
}
