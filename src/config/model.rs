// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::{parse_duration, Hadron, ProcessKind};

/// Job file as read from TOML, before validation.
///
/// ```toml
/// [generation]
/// process = "ww"
/// heartbeat_interval = "600s"
///
/// [runcard]
/// numevts = 5000
/// foldcsi = 2
///
/// [process]
/// vdecaymode1 = 2
///
/// [groups]
/// ckm = false
///
/// [filter]
/// executable = "lhef_filter"
/// args = ["--nevents", "5000"]
/// ```
///
/// Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJobFile {
    #[serde(default)]
    pub generation: GenerationSection,

    #[serde(default)]
    pub runcard: RunCardOverrides,

    #[serde(default)]
    pub process: ProcessOverrides,

    #[serde(default)]
    pub groups: GroupOverrides,

    #[serde(default)]
    pub filter: Option<FilterSection>,
}

/// Validated job file. Build it via `JobFile::try_from(RawJobFile)`.
#[derive(Debug, Clone, Default)]
pub struct JobFile {
    pub generation: GenerationSection,
    pub runcard: RunCardOverrides,
    pub process: ProcessOverrides,
    pub groups: GroupOverrides,
    pub filter: Option<FilterSection>,
}

impl JobFile {
    pub(crate) fn new_unchecked(raw: RawJobFile) -> Self {
        Self {
            generation: raw.generation,
            runcard: raw.runcard,
            process: raw.process,
            groups: raw.groups,
            filter: raw.filter,
        }
    }
}

/// `[generation]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationSection {
    #[serde(default)]
    pub process: ProcessKind,

    /// Generator executable. Relative paths resolve against `$POWHEGPATH`;
    /// when unset, the process family's `pwhg_main` under `$POWHEGPATH` is used.
    #[serde(default)]
    pub executable: Option<String>,

    /// Duration string such as `"600s"` or `"10m"`.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval: String,

    /// Reweight an existing `pwgevents.lhe` instead of generating afresh.
    #[serde(default)]
    pub reweight: bool,
}

pub const DEFAULT_HEARTBEAT_SECS: u64 = 600;

fn default_heartbeat_interval() -> String {
    format!("{DEFAULT_HEARTBEAT_SECS}s")
}

impl Default for GenerationSection {
    fn default() -> Self {
        Self {
            process: ProcessKind::default(),
            executable: None,
            heartbeat_interval: default_heartbeat_interval(),
            reweight: false,
        }
    }
}

impl GenerationSection {
    /// Parsed heartbeat interval; validation guarantees this parses.
    pub fn heartbeat_interval(&self) -> Duration {
        parse_duration(&self.heartbeat_interval)
            .unwrap_or(Duration::from_secs(DEFAULT_HEARTBEAT_SECS))
    }
}

/// `[runcard]` section: overrides for the keys every process understands.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunCardOverrides {
    pub numevts: Option<i64>,
    pub ih1: Option<Hadron>,
    pub ih2: Option<Hadron>,
    pub ebeam1: Option<f64>,
    pub ebeam2: Option<f64>,
    pub lhans1: Option<i64>,
    pub lhans2: Option<i64>,
    pub facscfact: Option<f64>,
    pub renscfact: Option<f64>,
    pub iseed: Option<i64>,
    pub ncall1: Option<i64>,
    pub itmx1: Option<i64>,
    pub ncall2: Option<i64>,
    pub itmx2: Option<i64>,
    pub nubound: Option<i64>,
    pub xupbound: Option<f64>,
    pub iymax: Option<i64>,
    pub ixmax: Option<i64>,
    pub xgriditeration: Option<i64>,
    pub foldcsi: Option<i64>,
    pub foldy: Option<i64>,
    pub foldphi: Option<i64>,
    #[serde(rename = "use-old-grid")]
    pub use_old_grid: Option<bool>,
    #[serde(rename = "use-old-ubound")]
    pub use_old_ubound: Option<bool>,
    pub withnegweights: Option<i64>,
    pub bornktmin: Option<f64>,
    pub bornsuppfact: Option<f64>,
    pub testplots: Option<bool>,
    pub ptsqmin: Option<f64>,
    pub runningscale: Option<i64>,
    pub hdamp: Option<f64>,
    pub hfact: Option<f64>,
}

/// `[process]` section: keys only some process families understand.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessOverrides {
    pub qmass: Option<f64>,
    pub topdecaymode: Option<i64>,
    pub hmass: Option<f64>,
    pub hwidth: Option<f64>,
    pub hdecaymode: Option<i64>,
    pub idvecbos: Option<i64>,
    pub vdecaymode: Option<i64>,
    pub vdecaymode1: Option<i64>,
    pub vdecaymode2: Option<i64>,
    pub delg1_z: Option<f64>,
    pub delg1_g: Option<f64>,
    pub lambda_z: Option<f64>,
    pub lambda_g: Option<f64>,
    pub delk_g: Option<f64>,
    pub delk_z: Option<f64>,
    pub tevscale: Option<f64>,
}

impl ProcessOverrides {
    /// Names of the keys that carry a value.
    pub fn set_keys(&self) -> Vec<&'static str> {
        let present = [
            ("qmass", self.qmass.is_some()),
            ("topdecaymode", self.topdecaymode.is_some()),
            ("hmass", self.hmass.is_some()),
            ("hwidth", self.hwidth.is_some()),
            ("hdecaymode", self.hdecaymode.is_some()),
            ("idvecbos", self.idvecbos.is_some()),
            ("vdecaymode", self.vdecaymode.is_some()),
            ("vdecaymode1", self.vdecaymode1.is_some()),
            ("vdecaymode2", self.vdecaymode2.is_some()),
            ("delg1_z", self.delg1_z.is_some()),
            ("delg1_g", self.delg1_g.is_some()),
            ("lambda_z", self.lambda_z.is_some()),
            ("lambda_g", self.lambda_g.is_some()),
            ("delk_g", self.delk_g.is_some()),
            ("delk_z", self.delk_z.is_some()),
            ("tevscale", self.tevscale.is_some()),
        ];
        present
            .into_iter()
            .filter_map(|(key, set)| set.then_some(key))
            .collect()
    }
}

/// `[groups]` section: switch optional key groups on or off.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupOverrides {
    pub electroweak: Option<bool>,
    pub ckm: Option<bool>,
    pub diboson: Option<bool>,
    pub scales: Option<bool>,
}

/// `[filter]` section: streaming mode through a FIFO.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    /// Filter executable. Relative paths resolve against `$LHEFPATH`.
    pub executable: String,

    /// Arguments passed to the filter verbatim.
    #[serde(default)]
    pub args: Vec<String>,

    /// File the filter writes its accepted events to, relative to the
    /// working directory.
    #[serde(default = "default_filter_output")]
    pub output: String,
}

fn default_filter_output() -> String {
    crate::exec::filter::DEFAULT_FILTER_OUTPUT.to_string()
}
