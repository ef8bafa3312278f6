//! # Block diagnostics of the legacy partitioner
//!
//! One row per input frame, recording the signals the segmentation used:
//!
//! | column | meaning |
//! |--------|---------|
//! | `rho`  | tracker rotation `TRKRHO` (degrees) |
//! | `img`  | image number |
//! | `grp`  | file group (contiguous image numbers) |
//! | `trk`  | track |
//! | `conf` | configuration id |
//! | `wblk` | wavelength-calibration block, before arc-less configurations are dropped |
//! | `arc`  | 1 for an arc frame |
//!
//! The text export is whitespace delimited with a single comment header, loadable by any
//! `loadtxt`-style reader. [`BlockDiagnostics::table`] renders the same rows for a terminal.
use std::{fmt, fs, io::Write};

use camino::Utf8Path;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};

use crate::{
    constants::{Degree, ImageNumber},
    rss_errors::RssError,
};

const HEADER: &str = "#  rho img grp trk conf wblk arc";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockDiagnosticRow {
    pub tracker_rho: Degree,
    pub image_number: ImageNumber,
    pub file_group: usize,
    pub track: usize,
    pub config: usize,
    pub block: usize,
    pub is_arc: bool,
}

impl BlockDiagnosticRow {
    fn to_line(self) -> String {
        format!(
            "{:7.2} {:3} {:3} {:3} {:3} {:3} {:3} ",
            self.tracker_rho,
            self.image_number,
            self.file_group,
            self.track,
            self.config,
            self.block,
            u8::from(self.is_arc)
        )
    }
}

/// The block table, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockDiagnostics {
    pub rows: Vec<BlockDiagnosticRow>,
}

impl BlockDiagnostics {
    /// The text export: header line then one line per frame, newline terminated.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(40 * (self.rows.len() + 1));
        text.push_str(HEADER);
        text.push('\n');
        for row in &self.rows {
            text.push_str(&row.to_line());
            text.push('\n');
        }
        text
    }

    /// Write [`to_text`](Self::to_text) to `path`, replacing any existing file.
    pub fn write_to(&self, path: &Utf8Path) -> Result<(), RssError> {
        let mut file = fs::File::create(path)?;
        file.write_all(self.to_text().as_bytes())?;
        Ok(())
    }

    /// Terminal rendering with comfy-table.
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("rho"),
            Cell::new("img"),
            Cell::new("grp"),
            Cell::new("trk"),
            Cell::new("conf"),
            Cell::new("wblk"),
            Cell::new("arc"),
        ]);

        for r in &self.rows {
            table.add_row(Row::from(vec![
                Cell::new(format!("{:.2}", r.tracker_rho)).set_alignment(CellAlignment::Right),
                Cell::new(r.image_number).set_alignment(CellAlignment::Right),
                Cell::new(r.file_group).set_alignment(CellAlignment::Right),
                Cell::new(r.track).set_alignment(CellAlignment::Right),
                Cell::new(r.config).set_alignment(CellAlignment::Right),
                Cell::new(r.block).set_alignment(CellAlignment::Right),
                Cell::new(if r.is_arc { "ARC" } else { "" }),
            ]));
        }
        table
    }
}

impl fmt::Display for BlockDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table())
    }
}
