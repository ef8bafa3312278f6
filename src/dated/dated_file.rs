//! Versioned calibration files selected by observation date.
//!
//! Some calibration products are whole files named after their date of applicability,
//! e.g. `RSSarcs_20130402_v01.fits`. A pattern such as `RSSarcs_yyyymmdd_vnn.fits`
//! describes the family; [`dated_file`] lists the matching files next to it, orders them
//! by full file name and applies [`select_latest`](super::select_latest).
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;

use super::{parse_dated_label, select_latest, Dated, DatedLabel};
use crate::{rss_errors::RssError, time::ObservationDate};

/// Placeholder for the dated label in a file pattern.
pub const DATED_PLACEHOLDER: &str = "yyyymmdd_vnn";

/// A file whose name carries a dated label.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedFile {
    pub path: Utf8PathBuf,
    pub label: DatedLabel,
}

impl Dated for DatedFile {
    fn date(&self) -> ObservationDate {
        self.label.date
    }
}

fn pattern_regex(file_name: &str) -> Result<Regex, RssError> {
    let (prefix, suffix) = file_name
        .split_once(DATED_PLACEHOLDER)
        .ok_or_else(|| RssError::InvalidDatedPattern(file_name.to_string()))?;
    let expr = format!(
        r"^{}(\d{{8}}_v\d{{2}}){}$",
        regex::escape(prefix),
        regex::escape(suffix)
    );
    Regex::new(&expr).map_err(|e| RssError::InvalidDatedPattern(e.to_string()))
}

/// List the files matching a dated pattern, sorted by file name.
///
/// Arguments
/// -----------------
/// * `pattern`: path whose file name contains [`DATED_PLACEHOLDER`]; the parent directory
///   is the one searched (current directory if none).
///
/// Return
/// ----------
/// * The matching files with their parsed labels, or an error if the pattern has no
///   placeholder or the directory cannot be read.
pub fn list_dated_files(pattern: &Utf8Path) -> Result<Vec<DatedFile>, RssError> {
    let file_name = pattern
        .file_name()
        .ok_or_else(|| RssError::InvalidDatedPattern(pattern.to_string()))?;
    let regex = pattern_regex(file_name)?;
    let dir = match pattern.parent() {
        Some(p) if !p.as_str().is_empty() => p,
        _ => Utf8Path::new("."),
    };

    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let Some(caps) = regex.captures(entry.file_name()) else {
            continue;
        };
        if let Ok(("", label)) = parse_dated_label(&caps[1]) {
            files.push(DatedFile {
                path: entry.path().to_path_buf(),
                label,
            });
        }
    }
    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}

/// Select the version of a dated file family applicable at `date`.
///
/// Return
/// ----------
/// * `Ok(None)` when no file matches or every file is dated after `date`.
pub fn dated_file(pattern: &Utf8Path, date: ObservationDate) -> Result<Option<Utf8PathBuf>, RssError> {
    let files = list_dated_files(pattern)?;
    Ok(select_latest(&files, date).map(|f| f.path.clone()))
}
