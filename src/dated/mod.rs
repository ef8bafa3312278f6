//! # Dated calibration records
//!
//! Calibration files of the spectrograph accumulate corrections over the life of the
//! instrument. Each correction is a line whose first token is a **dated label**
//! `yyyymmdd_vnn` (date of first applicability, two-digit version), followed by the
//! payload fields:
//!
//! ```text
//! # datever   row0    col0    C0
//! 20110501_v01 -10.5   4.2   0.12
//! 20120815_v01  -9.8   3.9   0.12
//! 20120815_v02  -9.9   3.9   0.13
//! ```
//!
//! ## Selection rule
//!
//! [`select_latest`] picks the record applicable to an observation date without sorting
//! the input. For every record dated on or before the query, it scans forward and adopts
//! each later record whose date does **not exceed the running candidate's date**. The last
//! adopted record wins. On a file sorted by `(date, version)` this is "latest date, then
//! highest version"; on an unsorted file, a later line with an equal or earlier date
//! overrides earlier lines, i.e. file order takes precedence over value order.
//!
//! ## Public API
//!
//! * [`DatedLabel`] – parsed `yyyymmdd_vnn` label (`nom` parser).
//! * [`Dated`] – anything carrying a date usable by [`select_latest`].
//! * [`DatedRecordStore`] – a parsed calibration text file.
//! * [`dated_file::dated_file`] – the same selection over versioned file names.
pub mod dated_file;

use std::fmt;

use camino::Utf8Path;
use nom::{
    bytes::complete::{tag, take_while_m_n},
    combinator::map_res,
    IResult, Parser,
};

use crate::{rss_errors::RssError, time::ObservationDate};

/// A `yyyymmdd_vnn` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatedLabel {
    pub date: ObservationDate,
    pub version: u8,
}

impl fmt::Display for DatedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_v{:02}", self.date, self.version)
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Parse a dated label at the start of `input`.
pub(crate) fn parse_dated_label(input: &str) -> IResult<&str, DatedLabel> {
    map_res(
        (
            take_while_m_n(8, 8, is_digit),
            tag("_v"),
            take_while_m_n(2, 2, is_digit),
        ),
        |(date, _, version): (&str, &str, &str)| -> Result<DatedLabel, std::num::ParseIntError> {
            Ok(DatedLabel {
                date: ObservationDate::from_yyyymmdd(date.parse()?),
                version: version.parse()?,
            })
        },
    )
    .parse(input)
}

impl std::str::FromStr for DatedLabel {
    type Err = RssError;

    /// Parse a complete token; trailing characters are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_dated_label(s) {
            Ok(("", label)) => Ok(label),
            _ => Err(RssError::InvalidCalibrationValue {
                file: String::new(),
                reason: format!("{s:?} is not a yyyymmdd_vnn label"),
            }),
        }
    }
}

/// Something that can take part in a dated selection.
pub trait Dated {
    fn date(&self) -> ObservationDate;
}

/// Select the record applicable at `query` (see the module documentation for the rule).
///
/// Arguments
/// -----------------
/// * `records`: candidates in file order; no ordering is assumed.
/// * `query`: observation date.
///
/// Return
/// ----------
/// * The selected record, or `None` if the input is empty or every record is dated after
///   `query`.
pub fn select_latest<T: Dated>(records: &[T], query: ObservationDate) -> Option<&T> {
    let mut selected = None;
    for (i, record) in records.iter().enumerate() {
        if query < record.date() {
            continue;
        }
        let mut current = record.date();
        for (j, later) in records.iter().enumerate().skip(i) {
            if later.date() > current {
                continue;
            }
            current = later.date();
            selected = Some(j);
        }
    }
    selected.map(|j| &records[j])
}

/// One dated line of a calibration file.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRecord {
    pub label: DatedLabel,
    /// Whitespace-separated fields following the label.
    pub payload: Vec<String>,
}

impl Dated for DatedRecord {
    fn date(&self) -> ObservationDate {
        self.label.date
    }
}

impl DatedRecord {
    /// Payload fields as floating point values.
    pub fn values(&self) -> Result<Vec<f64>, RssError> {
        parse_floats(&self.payload).map_err(|reason| RssError::InvalidCalibrationValue {
            file: self.label.to_string(),
            reason,
        })
    }
}

fn parse_floats(fields: &[String]) -> Result<Vec<f64>, String> {
    fields
        .iter()
        .map(|v| v.parse::<f64>().map_err(|_| format!("{v:?} is not a number")))
        .collect()
}

/// A parsed calibration text file.
///
/// Blank lines and lines starting with `#` are ignored. Every other line is a data row;
/// the rows starting with a dated label are also kept as [`DatedRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct DatedRecordStore {
    source: String,
    rows: Vec<Vec<String>>,
    records: Vec<DatedRecord>,
}

impl DatedRecordStore {
    /// Parse the text content of a calibration file.
    ///
    /// `source` only names the content in error messages.
    pub fn parse(source: &str, content: &str) -> Self {
        let mut rows = Vec::new();
        let mut records = Vec::new();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            if let Ok(("", label)) = parse_dated_label(&fields[0]) {
                records.push(DatedRecord {
                    label,
                    payload: fields[1..].to_vec(),
                });
            }
            rows.push(fields);
        }

        DatedRecordStore {
            source: source.to_string(),
            rows,
            records,
        }
    }

    /// Read and parse a calibration file.
    pub fn from_file(path: &Utf8Path) -> Result<Self, RssError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(path.as_str(), &content))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Dated records, in file order.
    pub fn records(&self) -> &[DatedRecord] {
        &self.records
    }

    /// All data rows (dated or not), in file order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Numeric columns `columns` of data row `row`.
    pub fn row_values(&self, row: usize, columns: &[usize]) -> Result<Vec<f64>, RssError> {
        let fields = self
            .rows
            .get(row)
            .ok_or_else(|| RssError::InvalidCalibrationValue {
                file: self.source.clone(),
                reason: format!("missing data row {row}"),
            })?;
        let selected = columns
            .iter()
            .map(|&c| {
                fields
                    .get(c)
                    .cloned()
                    .ok_or_else(|| format!("row {row} has no column {c}"))
            })
            .collect::<Result<Vec<String>, String>>()
            .and_then(|f| parse_floats(&f))
            .map_err(|reason| RssError::InvalidCalibrationValue {
                file: self.source.clone(),
                reason,
            })?;
        Ok(selected)
    }

    /// The record applicable at `date`, if any.
    pub fn select(&self, date: ObservationDate) -> Option<&DatedRecord> {
        select_latest(&self.records, date)
    }

    /// Like [`select`](Self::select) but a missing record is an error, with the payload
    /// already parsed as numbers.
    pub fn select_values(&self, date: ObservationDate) -> Result<Vec<f64>, RssError> {
        let record = self
            .select(date)
            .ok_or_else(|| RssError::NoCalibrationRecord {
                file: self.source.clone(),
                date: date.yyyymmdd(),
            })?;
        record
            .values()
            .map_err(|_| RssError::InvalidCalibrationValue {
                file: self.source.clone(),
                reason: format!("non-numeric payload in record {}", record.label),
            })
    }
}

#[cfg(test)]
mod test_dated {
    use super::*;

    fn date(d: u32) -> ObservationDate {
        ObservationDate::from_yyyymmdd(d)
    }

    const ALIGN: &str = "\
# datever row0 col0 C0
flexrow   1.5  -0.5
flexcol   0.2   0.8

20110501_v01 -10.5 4.2 0.12
20120815_v01  -9.8 3.9 0.12
20120815_v02  -9.9 3.9 0.13
";

    #[test]
    fn test_parse_dated_label() {
        let (rest, label) = parse_dated_label("20120815_v02 -9.9").unwrap();
        assert_eq!(rest, " -9.9");
        assert_eq!(label.date, date(20120815));
        assert_eq!(label.version, 2);
        assert_eq!(label.to_string(), "20120815_v02");

        assert!(parse_dated_label("2012081_v02").is_err());
        assert!(parse_dated_label("20120815-v02").is_err());
        assert!("20120815_v02x".parse::<DatedLabel>().is_err());
    }

    #[test]
    fn test_store_rows_and_records() {
        let store = DatedRecordStore::parse("RSSimgalign.txt", ALIGN);
        assert_eq!(store.rows().len(), 5);
        assert_eq!(store.records().len(), 3);
        assert_eq!(store.row_values(0, &[1, 2]).unwrap(), vec![1.5, -0.5]);
        assert_eq!(store.row_values(1, &[1, 2]).unwrap(), vec![0.2, 0.8]);
        assert!(store.row_values(0, &[3]).is_err());
    }

    #[test]
    fn test_latest_date_is_selected() {
        let store = DatedRecordStore::parse("align", ALIGN);
        let record = store.select(date(20120815)).unwrap();
        assert_eq!(record.label.to_string(), "20120815_v02");

        let record = store.select(date(20120101)).unwrap();
        assert_eq!(record.label.to_string(), "20110501_v01");
        assert_eq!(record.values().unwrap(), vec![-10.5, 4.2, 0.12]);
    }

    #[test]
    fn test_version_tie_break() {
        let store = DatedRecordStore::parse(
            "t",
            "20150101_v01 a\n20150101_v02 b\n",
        );
        let record = store.select(date(20150101)).unwrap();
        assert_eq!(record.payload, vec!["b".to_string()]);
    }

    #[test]
    fn test_query_before_all_records() {
        let store = DatedRecordStore::parse("align", ALIGN);
        assert!(store.select(date(20100101)).is_none());
        assert_eq!(
            store.select_values(date(20100101)),
            Err(RssError::NoCalibrationRecord {
                file: "align".into(),
                date: 20100101
            })
        );

        let empty = DatedRecordStore::parse("empty", "");
        assert!(empty.select(date(20200101)).is_none());
    }

    #[test]
    fn test_later_line_with_earlier_date_overrides() {
        // unsorted: the 2019 line comes after the 2020 line
        let store = DatedRecordStore::parse("t", "20200101_v01 new\n20190101_v01 old\n");
        let record = store.select(date(20210101)).unwrap();
        assert_eq!(record.payload, vec!["old".to_string()]);

        // query before 2020: only the 2019 line qualifies
        let record = store.select(date(20191231)).unwrap();
        assert_eq!(record.payload, vec!["old".to_string()]);
    }

    #[test]
    fn test_non_numeric_payload() {
        let store = DatedRecordStore::parse("t", "20150101_v01 1.0 abc\n");
        assert_eq!(
            store.select_values(date(20150101)),
            Err(RssError::InvalidCalibrationValue {
                file: "t".into(),
                reason: "non-numeric payload in record 20150101_v01".into()
            })
        );
    }
}
