//! # Constants and type definitions for rssmap
//!
//! This module centralizes the **header keywords**, **instrument set-points**, and
//! **common type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - FITS header keywords read from the observation log
//! - Default thresholds of the configuration partitioners
//! - RSS wavelength model constants
//! - Core type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Header keywords
// -------------------------------------------------------------------------------------------------

/// Beam-splitter state; the second character carries the status digit.
pub const KW_BS_STATE: &str = "BS-STATE";
/// Observation date, `yyyy-mm-dd`.
pub const KW_DATE_OBS: &str = "DATE-OBS";
/// Tracker rotation angle (degrees).
pub const KW_TRKRHO: &str = "TRKRHO";
/// Grating name.
pub const KW_GRATING: &str = "GRATING";
/// Commanded grating angle (degrees).
pub const KW_GR_ANGLE: &str = "GR-ANGLE";
/// Commanded camera articulation angle (degrees).
pub const KW_CAMANG: &str = "CAMANG";
/// Block visit identifier.
pub const KW_BVISITID: &str = "BVISITID";
/// Frame classification (`ARC`, `FLAT`, `OBJECT`, ...).
pub const KW_CCDTYPE: &str = "CCDTYPE";
/// Free-text target name, used to detect arcs in old data.
pub const KW_OBJECT: &str = "OBJECT";

/// Column holding the file path in a CSV observation log.
pub const KW_FILE: &str = "FILE";

// -------------------------------------------------------------------------------------------------
// Partitioner defaults
// -------------------------------------------------------------------------------------------------

/// Data observed before this year has no reliable configuration / visit identifiers.
pub const LEGACY_CUTOFF_YEAR: u32 = 2015;

/// Required status digit in `BS-STATE`.
pub const BS_STATE_NOMINAL: u32 = 2;

/// A rotator change larger than this starts a new track (degrees).
pub const NEW_TRACK_DEG: Degree = 5.;

/// Relaxed grating-angle match for the arc fallback (degrees, exclusive).
pub const GR_ANGLE_TOLERANCE: Degree = 0.03;

/// Relaxed articulation-angle match for the arc fallback (degrees, exclusive).
pub const CAMANG_TOLERANCE: Degree = 0.05;

/// Default file name of the legacy block diagnostics table.
pub const WAVBLK_TABLE: &str = "wavblktbl.txt";

// -------------------------------------------------------------------------------------------------
// RSS wavelength model
// -------------------------------------------------------------------------------------------------

/// Image centre (unbinned pixels) of the wavelength calibration model.
pub const MODEL_CENTER: f64 = 3162.;

/// Detector pixel size (mm).
pub const PIXEL_MM: f64 = 0.015;

/// Focal length normalisation of the distortion terms (mm).
pub const FCAM_NORM: f64 = 47.43;

/// Ångström per mm, used with grating densities in lines/mm.
pub const ANGSTROM_PER_MM: f64 = 1e7;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Wavelength in Ångström
pub type Angstrom = f64;
/// Sequential image number (last four digits of the file name stem)
pub type ImageNumber = u32;
/// Header keyword
pub type Keyword = String;
