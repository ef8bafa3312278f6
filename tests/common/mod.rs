#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use rssmap::constants::{
    KW_BS_STATE, KW_BVISITID, KW_CAMANG, KW_CCDTYPE, KW_DATE_OBS, KW_GRATING, KW_GR_ANGLE,
    KW_OBJECT, KW_TRKRHO,
};
use rssmap::obslog::ObservationLog;

/// One raw frame of a synthetic night.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: u32,
    pub date_obs: &'static str,
    pub bs_state: &'static str,
    pub grating: &'static str,
    pub grating_angle: f64,
    pub articulation_angle: f64,
    pub tracker_rho: f64,
    pub block_visit: Option<i64>,
    pub ccd_type: &'static str,
    pub object: &'static str,
}

impl Frame {
    pub fn new(image: u32, date_obs: &'static str) -> Self {
        Frame {
            image,
            date_obs,
            bs_state: "S2",
            grating: "PG0900",
            grating_angle: 15.875,
            articulation_angle: 31.75,
            tracker_rho: 0.,
            block_visit: Some(1),
            ccd_type: "OBJECT",
            object: "NGC 6611",
        }
    }

    pub fn arc(mut self) -> Self {
        self.ccd_type = "ARC";
        self.object = "ARC";
        self
    }

    pub fn flat(mut self) -> Self {
        self.ccd_type = "FLAT";
        self.object = "FLAT";
        self
    }

    pub fn angles(mut self, grating_angle: f64, articulation_angle: f64) -> Self {
        self.grating_angle = grating_angle;
        self.articulation_angle = articulation_angle;
        self
    }

    pub fn visit(mut self, visit: Option<i64>) -> Self {
        self.block_visit = visit;
        self
    }

    pub fn path(&self) -> Utf8PathBuf {
        let digits: String = self.date_obs.chars().filter(|c| *c != '-').collect();
        Utf8PathBuf::from(format!("raw/P{digits}{:04}.fits", self.image))
    }
}

fn column(frames: &[Frame], value: impl Fn(&Frame) -> String) -> Vec<String> {
    frames.iter().map(value).collect()
}

/// Observation log of `frames`, in the given order.
pub fn observation_log(frames: &[Frame]) -> ObservationLog {
    ObservationLog::new(frames.iter().map(Frame::path).collect())
        .with_column(KW_DATE_OBS, column(frames, |f| f.date_obs.to_string()))
        .unwrap()
        .with_column(KW_BS_STATE, column(frames, |f| f.bs_state.to_string()))
        .unwrap()
        .with_column(KW_GRATING, column(frames, |f| f.grating.to_string()))
        .unwrap()
        .with_column(KW_GR_ANGLE, column(frames, |f| f.grating_angle.to_string()))
        .unwrap()
        .with_column(KW_CAMANG, column(frames, |f| f.articulation_angle.to_string()))
        .unwrap()
        .with_column(KW_TRKRHO, column(frames, |f| f.tracker_rho.to_string()))
        .unwrap()
        .with_column(
            KW_BVISITID,
            column(frames, |f| {
                f.block_visit.map(|v| v.to_string()).unwrap_or_default()
            }),
        )
        .unwrap()
        .with_column(KW_CCDTYPE, column(frames, |f| f.ccd_type.to_string()))
        .unwrap()
        .with_column(KW_OBJECT, column(frames, |f| f.object.to_string()))
        .unwrap()
}

/// The same frames as a CSV observation log.
pub fn observation_csv(frames: &[Frame]) -> String {
    let mut csv = String::from(
        "FILE,DATE-OBS,BS-STATE,GRATING,GR-ANGLE,CAMANG,TRKRHO,BVISITID,CCDTYPE,OBJECT\n",
    );
    for f in frames {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{}\n",
            f.path(),
            f.date_obs,
            f.bs_state,
            f.grating,
            f.grating_angle,
            f.articulation_angle,
            f.tracker_rho,
            f.block_visit.map(|v| v.to_string()).unwrap_or_default(),
            f.ccd_type,
            f.object
        ));
    }
    csv
}

pub fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let dir = Utf8Path::from_path(tmp.path()).unwrap().to_path_buf();
    (tmp, dir)
}
