//! # Observation log: per-file header keywords
//!
//! The partitioners never read FITS headers themselves. They work on an
//! [`ObservationLog`], a table mapping each **header keyword** to the ordered sequence of
//! its values, one per input file, in the same order as the file list.
//!
//! ## Overview
//! -----------------
//! * [`ObservationLog`] – the keyword → column table, with typed record extraction
//!   ([`ObservationLog::records`]).
//! * [`ObservationLogProvider`] – the seam through which callers supply a log for a list
//!   of files (a FITS header reader, a database, a CSV dump...).
//! * [`csv_reader::CsvObservationLog`] – a provider reading a CSV table with a `FILE`
//!   column.
//! * [`record::ObservationRecord`] – one typed row of the log.
//!
//! Required keywords
//! -----------------
//! `DATE-OBS`, `BS-STATE`, `GRATING`, `GR-ANGLE`, `CAMANG` must be present for every file.
//! `TRKRHO`, `BVISITID`, `CCDTYPE` and `OBJECT` are optional at this level; the
//! partitioner that needs one of them reports its absence.
pub mod csv_reader;
pub mod record;

use std::collections::HashMap;

use ahash::RandomState;
use camino::{Utf8Path, Utf8PathBuf};

use crate::{
    constants::{
        Keyword, KW_BS_STATE, KW_BVISITID, KW_CAMANG, KW_CCDTYPE, KW_DATE_OBS, KW_GRATING,
        KW_GR_ANGLE, KW_OBJECT, KW_TRKRHO,
    },
    rss_errors::RssError,
};
use record::ObservationRecord;

/// Keyword → values table for an ordered list of files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationLog {
    files: Vec<Utf8PathBuf>,
    columns: HashMap<Keyword, Vec<String>, RandomState>,
}

impl ObservationLog {
    /// An empty log over `files`; columns are added with [`insert_column`](Self::insert_column).
    pub fn new(files: Vec<Utf8PathBuf>) -> Self {
        ObservationLog {
            files,
            columns: HashMap::default(),
        }
    }

    /// Add (or replace) the values of `keyword`, one per file.
    pub fn insert_column<K, V>(&mut self, keyword: K, values: Vec<V>) -> Result<(), RssError>
    where
        K: Into<Keyword>,
        V: Into<String>,
    {
        let keyword = keyword.into();
        if values.len() != self.files.len() {
            return Err(RssError::ColumnLengthMismatch {
                keyword,
                expected: self.files.len(),
                found: values.len(),
            });
        }
        self.columns
            .insert(keyword, values.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Builder-style [`insert_column`](Self::insert_column).
    pub fn with_column<K, V>(mut self, keyword: K, values: Vec<V>) -> Result<Self, RssError>
    where
        K: Into<Keyword>,
        V: Into<String>,
    {
        self.insert_column(keyword, values)?;
        Ok(self)
    }

    pub fn files(&self) -> &[Utf8PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Values of `keyword`, if the column exists.
    pub fn column(&self, keyword: &str) -> Option<&[String]> {
        self.columns.get(keyword).map(Vec::as_slice)
    }

    /// Values of `keyword`, or [`RssError::MissingKeyword`].
    pub fn require(&self, keyword: &str) -> Result<&[String], RssError> {
        self.column(keyword)
            .ok_or_else(|| RssError::MissingKeyword(keyword.to_string()))
    }

    /// Extract one typed [`ObservationRecord`] per file.
    ///
    /// Return
    /// ----------
    /// * The records in file order, or the first missing-keyword / invalid-value error.
    pub fn records(&self) -> Result<Vec<ObservationRecord>, RssError> {
        let date_obs = self.require(KW_DATE_OBS)?;
        let bs_state = self.require(KW_BS_STATE)?;
        let grating = self.require(KW_GRATING)?;
        let gr_angle = self.require(KW_GR_ANGLE)?;
        let camang = self.require(KW_CAMANG)?;
        let trkrho = self.column(KW_TRKRHO);
        let bvisitid = self.column(KW_BVISITID);
        let ccdtype = self.column(KW_CCDTYPE);
        let object = self.column(KW_OBJECT);

        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| -> Result<ObservationRecord, RssError> {
                Ok(ObservationRecord {
                    path: file.clone(),
                    date_obs: date_obs[i].trim().to_string(),
                    bs_state: bs_state[i].clone(),
                    grating: grating[i].trim().to_string(),
                    grating_angle: parse_value(file, KW_GR_ANGLE, &gr_angle[i])?,
                    articulation_angle: parse_value(file, KW_CAMANG, &camang[i])?,
                    tracker_rho: optional(trkrho, i)
                        .map(|v| parse_value(file, KW_TRKRHO, v))
                        .transpose()?,
                    block_visit: optional(bvisitid, i)
                        .map(|v| parse_value(file, KW_BVISITID, v))
                        .transpose()?,
                    ccd_type: optional(ccdtype, i).map(|v| v.trim().to_string()),
                    object: optional(object, i).map(str::to_string),
                })
            })
            .collect()
    }
}

fn optional(column: Option<&[String]>, i: usize) -> Option<&str> {
    column
        .map(|c| c[i].as_str())
        .filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_value<T: std::str::FromStr>(
    file: &Utf8Path,
    keyword: &str,
    value: &str,
) -> Result<T, RssError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| RssError::InvalidHeaderValue {
            keyword: keyword.to_string(),
            file: file.to_string(),
            value: value.to_string(),
        })
}

/// Source of observation logs for a list of files.
pub trait ObservationLogProvider {
    /// Build the log of `files`, preserving their order.
    fn observation_log(&self, files: &[Utf8PathBuf]) -> Result<ObservationLog, RssError>;
}

/// A prepared log serves itself, restricted to the requested files.
impl ObservationLogProvider for ObservationLog {
    fn observation_log(&self, files: &[Utf8PathBuf]) -> Result<ObservationLog, RssError> {
        let indices = files
            .iter()
            .map(|f| {
                self.files
                    .iter()
                    .position(|g| g == f)
                    .ok_or_else(|| RssError::FileNotInLog(f.to_string()))
            })
            .collect::<Result<Vec<usize>, RssError>>()?;
        self.subset(&indices, files.to_vec())
    }
}

impl ObservationLog {
    /// Rows `indices` of this log, served under the names `files`.
    pub(crate) fn subset(
        &self,
        indices: &[usize],
        files: Vec<Utf8PathBuf>,
    ) -> Result<ObservationLog, RssError> {
        let mut log = ObservationLog::new(files);
        for (keyword, values) in &self.columns {
            log.insert_column(
                keyword.clone(),
                indices
                    .iter()
                    .map(|&i| values[i].clone())
                    .collect::<Vec<String>>(),
            )?;
        }
        Ok(log)
    }
}
