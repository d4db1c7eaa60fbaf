// src/runcard/mod.rs

//! Run configuration and the `powheg.input` run-card.
//!
//! - [`builder`] assembles a [`RunConfiguration`] from universal defaults,
//!   process-family defaults, job-file overrides and run arguments.
//! - [`process`] holds the process families and their factory defaults.
//! - [`render`] applies the sanity checks and renders/writes the card.
//! - [`parse`] tokenizes a card back into key/value pairs.
//! - [`value`] formats values the way `pwhg_main` expects.

pub mod builder;
pub mod parse;
pub mod process;
pub mod render;
pub mod value;

pub use builder::{RunArgs, RunConfigurationBuilder};
pub use parse::{parse_run_card, ParsedCard};
pub use process::ProcessVariant;
pub use render::{render, write_run_card, SanityWarning};
pub use value::CardValue;

use crate::types::Hadron;

/// Integration grid sizes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSettings {
    pub ncall1: i64,
    pub itmx1: i64,
    pub ncall2: i64,
    pub itmx2: i64,
    pub nubound: i64,
    pub xupbound: f64,
    pub iymax: i64,
    pub ixmax: i64,
    pub xgriditeration: i64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            ncall1: 10000,
            itmx1: 5,
            ncall2: 100000,
            itmx2: 5,
            nubound: 100000,
            xupbound: 2.0,
            iymax: 1,
            ixmax: 1,
            xgriditeration: 1,
        }
    }
}

/// Folding factors for the csi, y and phi integrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Folding {
    pub foldcsi: i64,
    pub foldy: i64,
    pub foldphi: i64,
}

impl Folding {
    pub const UNIT: Folding = Folding {
        foldcsi: 1,
        foldy: 1,
        foldphi: 1,
    };

    pub fn new(foldcsi: i64, foldy: i64, foldphi: i64) -> Self {
        Self {
            foldcsi,
            foldy,
            foldphi,
        }
    }

    pub fn product(&self) -> i64 {
        self.foldcsi * self.foldy * self.foldphi
    }

    pub fn is_unit(&self) -> bool {
        *self == Folding::UNIT
    }
}

impl Default for Folding {
    fn default() -> Self {
        Folding::UNIT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BornSuppression {
    /// Generation cut on the underlying Born kt.
    pub bornktmin: f64,
    pub bornsuppfact: f64,
}

impl Default for BornSuppression {
    fn default() -> Self {
        Self {
            bornktmin: 0.0,
            bornsuppfact: 0.0,
        }
    }
}

/// Which optional key groups are written to the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParameterGroups {
    pub electroweak: bool,
    pub ckm: bool,
    pub diboson: bool,
    pub scales: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectroweakParameters {
    pub zmass: f64,
    pub zwidth: f64,
    pub wmass: f64,
    pub wwidth: f64,
    pub sthw2: f64,
    pub alphaem: f64,
}

impl Default for ElectroweakParameters {
    fn default() -> Self {
        Self {
            zmass: 91.1876,
            zwidth: 2.4952,
            wmass: 80.399,
            wwidth: 2.085,
            sthw2: 0.23113,
            alphaem: 0.0078125,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CkmMatrix {
    pub vud: f64,
    pub vus: f64,
    pub vub: f64,
    pub vcd: f64,
    pub vcs: f64,
    pub vcb: f64,
    pub vtd: f64,
    pub vts: f64,
    pub vtb: f64,
}

impl Default for CkmMatrix {
    fn default() -> Self {
        Self {
            vud: 0.97428,
            vus: 0.2253,
            vub: 0.00347,
            vcd: 0.2252,
            vcs: 0.97345,
            vcb: 0.041,
            vtd: 0.00862,
            vts: 0.0403,
            vtb: 0.999152,
        }
    }
}

/// Anomalous triple gauge couplings for the diboson processes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DibosonCouplings {
    pub delg1_z: f64,
    pub delg1_g: f64,
    pub lambda_z: f64,
    pub lambda_g: f64,
    pub delk_g: f64,
    pub delk_z: f64,
    /// Form-factor scale in TeV.
    pub tevscale: f64,
}

impl Default for DibosonCouplings {
    fn default() -> Self {
        Self {
            delg1_z: 0.0,
            delg1_g: 0.0,
            lambda_z: 0.0,
            lambda_g: 0.0,
            delk_g: 0.0,
            delk_z: 0.0,
            tevscale: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleParameters {
    pub runningscale: i64,
    pub hdamp: f64,
    pub hfact: Option<f64>,
}

impl Default for ScaleParameters {
    fn default() -> Self {
        Self {
            runningscale: 1,
            hdamp: 0.0,
            hfact: None,
        }
    }
}

/// Fully populated configuration for one generator run.
///
/// Only [`RunConfigurationBuilder`] produces these; the renderer reads them
/// and never writes back.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfiguration {
    pub process: ProcessVariant,
    pub numevts: i64,
    pub ih1: Hadron,
    pub ih2: Hadron,
    pub ebeam1: f64,
    pub ebeam2: f64,
    pub lhans1: i64,
    pub lhans2: i64,
    pub facscfact: f64,
    pub renscfact: f64,
    pub iseed: i64,
    pub grid: GridSettings,
    pub folding: Folding,
    pub use_old_grid: bool,
    pub use_old_ubound: bool,
    pub withnegweights: i64,
    pub born: BornSuppression,
    pub testplots: bool,
    pub ptsqmin: Option<f64>,
    /// Reweighting pass over an existing `pwgevents.lhe`.
    pub compute_rwgt: bool,
    pub groups: ParameterGroups,
    pub electroweak: ElectroweakParameters,
    pub ckm: CkmMatrix,
    pub diboson: DibosonCouplings,
    pub scales: ScaleParameters,
}

/// One `<key> <value> ! <comment>` line.
#[derive(Debug, Clone, PartialEq)]
pub struct CardEntry {
    pub key: &'static str,
    pub value: CardValue,
    pub comment: &'static str,
}

impl CardEntry {
    pub fn new(key: &'static str, value: impl Into<CardValue>, comment: &'static str) -> Self {
        Self {
            key,
            value: value.into(),
            comment,
        }
    }

    pub fn line(&self) -> String {
        format!("{} {} ! {}", self.key, self.value, self.comment)
    }
}

/// A rendered run-card plus the sanity warnings raised while rendering it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunCard {
    pub entries: Vec<CardEntry>,
    pub warnings: Vec<SanityWarning>,
}

impl RunCard {
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.line());
            out.push('\n');
        }
        out
    }

    pub fn get(&self, key: &str) -> Option<&CardValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    /// blake3 digest of the card text, for provenance in the logs.
    pub fn digest(&self) -> String {
        blake3::hash(self.to_text().as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folding_product() {
        assert_eq!(Folding::new(5, 5, 2).product(), 50);
        assert!(Folding::default().is_unit());
        assert!(!Folding::new(1, 2, 1).is_unit());
    }

    #[test]
    fn entry_line_format() {
        let e = CardEntry::new("ebeam1", 4000.0, "energy of beam 1");
        assert_eq!(e.line(), "ebeam1 4000.0 ! energy of beam 1");
    }
}
