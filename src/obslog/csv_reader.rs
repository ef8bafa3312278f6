//! # CSV observation log
//!
//! Observation logs are often dumped once per night into a table, one row per raw file:
//!
//! ```text
//! FILE,DATE-OBS,BS-STATE,GRATING,GR-ANGLE,CAMANG,BVISITID,CCDTYPE,OBJECT,TRKRHO
//! P201505050010.fits,2015-05-05,S2,PG0900,15.875,31.75,12,ARC,ARC,0.0
//! ```
//!
//! [`CsvObservationLog`] reads such a table and serves it through
//! [`ObservationLogProvider`]. Requested files are looked up by full path first, then by
//! file name, so a log written in the raw directory still matches absolute input paths.
use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};

use super::{ObservationLog, ObservationLogProvider};
use crate::{constants::KW_FILE, rss_errors::RssError};

/// Observation log read from a CSV file with a `FILE` column.
#[derive(Debug, Clone)]
pub struct CsvObservationLog {
    log: ObservationLog,
}

impl CsvObservationLog {
    /// Read the whole table.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: CSV file; first row is the header (`FILE` plus one column per keyword).
    ///
    /// Return
    /// ----------
    /// * The parsed log, or an I/O / CSV error, or [`RssError::MissingKeyword`] if the
    ///   `FILE` column is absent.
    pub fn from_path(path: &Utf8Path) -> Result<Self, RssError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_path(path)?;
        Self::from_reader(reader)
    }

    /// Parse a table from any reader (e.g. an in-memory string).
    pub fn from_csv_reader<R: std::io::Read>(input: R) -> Result<Self, RssError> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(input);
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, RssError> {
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if !headers.iter().any(|h| h == KW_FILE) {
            return Err(RssError::MissingKeyword(KW_FILE.to_string()));
        }

        let rows = reader
            .deserialize::<HashMap<String, String>>()
            .collect::<Result<Vec<_>, csv::Error>>()?;

        let files: Vec<Utf8PathBuf> = rows
            .iter()
            .map(|row| Utf8PathBuf::from(row.get(KW_FILE).map_or("", |f| f.trim())))
            .collect();
        let mut log = ObservationLog::new(files);
        for keyword in headers.iter().filter(|h| h.as_str() != KW_FILE) {
            let values: Vec<String> = rows
                .iter()
                .map(|row| row.get(keyword).cloned().unwrap_or_default())
                .collect();
            log.insert_column(keyword.clone(), values)?;
        }
        Ok(CsvObservationLog { log })
    }

    /// The full table, in file order.
    pub fn log(&self) -> &ObservationLog {
        &self.log
    }

    fn find(&self, file: &Utf8Path) -> Option<usize> {
        let files = self.log.files();
        files.iter().position(|f| f == file).or_else(|| {
            let name = file.file_name()?;
            files.iter().position(|f| f.file_name() == Some(name))
        })
    }
}

impl ObservationLogProvider for CsvObservationLog {
    fn observation_log(&self, files: &[Utf8PathBuf]) -> Result<ObservationLog, RssError> {
        let indices = files
            .iter()
            .map(|f| self.find(f).ok_or_else(|| RssError::FileNotInLog(f.to_string())))
            .collect::<Result<Vec<usize>, RssError>>()?;
        // values are served under the caller's paths
        self.log.subset(&indices, files.to_vec())
    }
}
